use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface for the `skillgap` application.
#[derive(Debug, Parser)]
#[command(
    name = "skillgap",
    version,
    about = "Compare workforce skills against project demand and market trends"
)]
pub struct Cli {
    /// SQLite database (overrides `SKILLGAP_DATABASE`).
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,
    /// Print single-line JSON instead of pretty JSON.
    #[arg(long, global = true, default_value_t = false)]
    pub compact: bool,
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by the analysis commands.
#[derive(Debug, Clone, Args)]
pub struct AnalysisArgs {
    /// Demand horizon: 1month, 3months, 6months or 1year. Unknown values mean 6months.
    #[arg(long, default_value = "6months", value_name = "RANGE")]
    pub time_range: String,
    /// Restrict coverage to these skill categories (comma separated or repeated).
    #[arg(long = "categories", value_delimiter = ',', value_name = "CATEGORY")]
    pub categories: Vec<String>,
    /// Skip the text provider and use rule-based insights.
    #[arg(long, default_value_t = false)]
    pub no_ai: bool,
    /// Return the canned fallback envelope without touching storage.
    #[arg(long, default_value_t = false)]
    pub force_fallback: bool,
}

/// Available `skillgap` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyzes the whole organization, or one department with `--department`.
    Analyze {
        /// Department id to scope the analysis to.
        #[arg(long, value_name = "ID")]
        department: Option<String>,
        #[command(flatten)]
        args: AnalysisArgs,
    },
    /// Analyzes one department; unknown ids are rejected.
    Department {
        /// Department id.
        id: String,
        #[command(flatten)]
        args: AnalysisArgs,
    },
    /// Analyzes one resource against their role and current assignments.
    Resource {
        /// Resource id.
        id: String,
        /// Skip the text provider and use rule-based insights.
        #[arg(long, default_value_t = false)]
        no_ai: bool,
        /// Return the canned fallback envelope without touching storage.
        #[arg(long, default_value_t = false)]
        force_fallback: bool,
    },
    /// Ranks every department by overall gap score, worst first.
    Departments,
    /// Creates the database schema.
    InitDb {
        /// Also load a small demo organization.
        #[arg(long, default_value_t = false)]
        demo: bool,
    },
}
