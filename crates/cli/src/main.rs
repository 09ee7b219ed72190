//! Entry point for the `skillgap` executable.

fn main() -> anyhow::Result<()> {
    skillgap::run()
}
