//! Command-line front end for the skills-gap analysis engine.
//!
//! Every command prints JSON to stdout; logs go to stderr.

mod app;
pub mod cli;

pub use app::run;
