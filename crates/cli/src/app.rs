use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};

use skillgap_intelligence::{AnalysisOptions, Narrator, SkillsGapAnalyzer, TimeRange};
use skillgap_state::AnalyzerSettings;
use skillgap_store::SqliteSkillsRepository;

use crate::cli::{AnalysisArgs, Cli, Commands};

#[derive(Debug, Serialize)]
struct InitReport {
    database: PathBuf,
    demo_data: bool,
}

/// The main entry point for the `skillgap` application.
pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(dispatch(cli))
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut settings = AnalyzerSettings::from_env().context("loading configuration")?;
    if let Some(path) = cli.database {
        settings.database_path = path;
    }
    let compact = cli.compact;

    match cli.command {
        Commands::Analyze { department, args } => {
            let analyzer = build_analyzer(&settings)?;
            let options = analysis_options(department, &args, &settings);
            let envelope = analyzer.analyze(&options).await?;
            print_json(&envelope, compact)
        }
        Commands::Department { id, args } => {
            let analyzer = build_analyzer(&settings)?;
            let options = analysis_options(None, &args, &settings);
            let envelope = analyzer.analyze_department(&id, &options).await?;
            print_json(&envelope, compact)
        }
        Commands::Resource {
            id,
            no_ai,
            force_fallback,
        } => {
            let analyzer = build_analyzer(&settings)?;
            let options = AnalysisOptions {
                include_ai_insights: !(no_ai || settings.disable_ai),
                force_fallback,
                ..AnalysisOptions::default()
            };
            let envelope = analyzer.analyze_resource(&id, &options).await?;
            print_json(&envelope, compact)
        }
        Commands::Departments => {
            let analyzer = build_analyzer(&settings)?;
            let summaries = analyzer.list_departments_with_gap_summary().await?;
            print_json(&summaries, compact)
        }
        Commands::InitDb { demo } => {
            let report = init_db(&settings.database_path, demo).await?;
            print_json(&report, compact)
        }
    }
}

fn analysis_options(
    department: Option<String>,
    args: &AnalysisArgs,
    settings: &AnalyzerSettings,
) -> AnalysisOptions {
    let time_range = args.time_range.parse().unwrap_or_else(|err| {
        warn!(error = %err, "Using the default time range");
        TimeRange::default()
    });
    AnalysisOptions {
        department_id: department,
        include_ai_insights: !(args.no_ai || settings.disable_ai),
        time_range,
        skill_categories: args.categories.clone(),
        force_fallback: args.force_fallback,
    }
}

fn build_analyzer(settings: &AnalyzerSettings) -> Result<SkillsGapAnalyzer> {
    let repository = SqliteSkillsRepository::open(&settings.database_path)
        .with_context(|| format!("opening skills database {}", settings.database_path.display()))?;

    let provider = if settings.disable_ai {
        None
    } else {
        skillgap_provider::provider_from_env().unwrap_or_else(|err| {
            warn!(error = %err, "Text provider misconfigured; using rule-based insights");
            None
        })
    };
    let narrator = Narrator::new(provider).with_timeout(settings.provider_timeout);

    Ok(SkillsGapAnalyzer::new(Arc::new(repository))
        .with_narrator(narrator)
        .with_thresholds(settings.thresholds.clone()))
}

async fn init_db(path: &Path, demo: bool) -> Result<InitReport> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let repository = SqliteSkillsRepository::open(path)
        .with_context(|| format!("opening skills database {}", path.display()))?;
    if demo {
        repository
            .seed_demo_data(OffsetDateTime::now_utc().date())
            .await
            .context("seeding demo data")?;
    } else {
        repository.init_schema().await.context("creating schema")?;
    }
    info!(path = %path.display(), demo, "Database initialized");
    Ok(InitReport {
        database: path.to_path_buf(),
        demo_data: demo,
    })
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{text}");
    Ok(())
}
