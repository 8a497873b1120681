use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use workspace_wizard::config::WizardSettings;
use workspace_wizard::template::load_stacks;
use workspace_wizard::template::registry::AnyTemplateRegistry;
use workspace_wizard::wizard::WizardSession;
use workspace_wizard::wizard::events::load_script;

const LOG_FILE_NAME: &str = "workspace_wizard.log";

#[derive(Debug, Parser)]
#[command(
    name = "workspace_wizard",
    about = "Pick project sources for a new workspace"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List templates matching a stack.
    Templates {
        #[arg(long)]
        stack: Option<String>,
    },
    /// Replay a YAML script of wizard actions and print the resulting state.
    Run {
        #[arg(long)]
        script: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let settings = WizardSettings::from_env().context("failed to load configuration")?;
    let _log_guard = init_tracing(&settings)?;

    let cli = Cli::parse();
    let session = build_session(&settings).await?;

    match cli.command {
        Commands::Templates { stack } => {
            session.select_stack(stack.as_deref())?;
            for template in session.filtered_templates() {
                println!(
                    "{}\t{}\t{}",
                    template.name, template.project_type, template.display_name
                );
            }
        }
        Commands::Run { script } => {
            let script = load_script(&script)?;
            let _ready_log = session
                .bus()
                .subscribe(|project: &str| info!(project, "project ready to import"));
            for command in &script.commands {
                session
                    .apply(command)
                    .with_context(|| format!("wizard command failed: {command:?}"))?;
            }
            let summary = serde_json::to_string_pretty(&session.summary())
                .context("failed to serialize wizard summary")?;
            println!("{summary}");
        }
    }

    Ok(())
}

async fn build_session(settings: &WizardSettings) -> Result<WizardSession> {
    let stacks = match &settings.stacks_file {
        Some(path) => load_stacks(path)?,
        None => Vec::new(),
    };
    info!(
        templates_source = %settings.templates_source,
        stacks = stacks.len(),
        "starting wizard session"
    );

    let registry = AnyTemplateRegistry::from_source(
        &settings.templates_source,
        Duration::from_millis(settings.fetch_timeout_ms),
    )?;
    let session = WizardSession::new(stacks);
    session
        .load_templates(&registry)
        .await
        .with_context(|| format!("failed to fetch templates from {}", settings.templates_source))?;

    Ok(session)
}

fn init_tracing(settings: &WizardSettings) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,workspace_wizard=debug"));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(env_filter);

    let (file_layer, guard) = match &settings.log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)
                .with_context(|| format!("failed to create log dir `{}`", log_dir.display()))?;
            let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_filter = EnvFilter::try_new(&settings.file_log_filter)
                .context("failed to parse WIZARD_FILE_LOG")?;
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(file_filter);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(guard)
}
