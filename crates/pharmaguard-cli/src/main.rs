//! PharmaGuard — Pharmacogenomic risk analysis client.
//! Entry point for the `pharmaguard` binary.

mod config;
mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use pharmaguard_client::selector::MedicationSelector;
use pharmaguard_client::{
    resolve_route, AnalysisDispatcher, Dashboard, DrugSelection, HistoryRepository,
    HttpAnalysisClient, IntakeStatus, JsonFileHistory, Route, RouteDecision, RunOutcome,
    StaticSession, UiEvent,
};
use pharmaguard_common::{DrugCode, PharmaGuardError};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "pharmaguard", version, about = "Pharmacogenomic risk analysis client")]
struct Cli {
    /// Path to pharmaguard.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse a VCF file against one or more drugs
    Analyze {
        file: PathBuf,
        /// Drug to assess; repeat for several
        #[arg(long = "drug", required = true)]
        drugs: Vec<DrugCode>,
        /// Assessment to show expanded, counting from 1
        #[arg(long)]
        expand: Option<usize>,
        /// Print the full report as JSON instead of the summary
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Save pharmacogenomic_report.json, into DIR or the configured report_dir
        #[arg(long, value_name = "DIR", num_args = 0..=1)]
        out: Option<Option<PathBuf>>,
    },
    /// List past analyses, newest last
    History {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List the supported drugs and their primary genes
    Drugs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env may carry RUST_LOG, so it goes first
    let dotenv = dotenvy::dotenv();

    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pharmaguard=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dotenv {
        debug!("No .env loaded: {e}");
    }

    let cli = Cli::parse();
    debug!(version = env!("CARGO_PKG_VERSION"), "PharmaGuard starting");

    let config = Config::load(cli.config.as_deref()).context("Could not load pharmaguard.toml")?;

    match cli.command {
        Command::Analyze { file, drugs, expand, json, out } => {
            let out_dir = out.map(|dir| dir.unwrap_or_else(|| config.output.report_dir.clone()));
            analyze(&config, &file, &drugs, expand, json, out_dir.as_deref()).await
        }
        Command::History { limit } => history(&config, limit).await,
        Command::Drugs => {
            print!("{}", render::catalog(&MedicationSelector::new().catalog()));
            Ok(())
        }
    }
}

fn require_session(config: &Config) -> anyhow::Result<()> {
    if !config.session.require_session {
        return Ok(());
    }
    let session = StaticSession::new(config.session.is_active());
    match resolve_route(Route::Dashboard, &session) {
        RouteDecision::Allow => Ok(()),
        RouteDecision::Redirect(route) => bail!(
            "No active session (would redirect to {}). Set PHARMAGUARD_TOKEN or [session] token.",
            route.as_str()
        ),
        RouteDecision::Pending => bail!("Session state is not available yet"),
    }
}

async fn analyze(
    config: &Config,
    file: &Path,
    drugs: &[DrugCode],
    expand: Option<usize>,
    json: bool,
    out_dir: Option<&Path>,
) -> anyhow::Result<()> {
    require_session(config)?;

    let client = HttpAnalysisClient::new(
        Some(&config.service.endpoint),
        Some(Duration::from_secs(config.service.timeout_secs)),
    )?;
    let mut dispatcher = AnalysisDispatcher::new(Arc::new(client));
    if config.history.enabled {
        dispatcher = dispatcher.with_history(
            Arc::new(JsonFileHistory::new(&config.history.path)),
            config.session.user_id.clone(),
        );
    }
    let mut dashboard = Dashboard::new(Arc::new(dispatcher));

    match dashboard.intake_mut().select_path(file).await {
        Ok(_) => {}
        Err(e @ PharmaGuardError::Validation(_)) => bail!("{}", e.user_message()),
        Err(e) => return Err(e).with_context(|| format!("Could not read {}", file.display())),
    }

    dashboard.handle(UiEvent::StartUpload)?;
    while dashboard.intake().status() == IntakeStatus::Uploading {
        dashboard.handle(UiEvent::UploadTick)?;
        debug!(progress = dashboard.intake().progress(), "Upload progress");
    }

    // Dedup so a repeated --drug does not toggle itself back off
    let selection: DrugSelection = drugs.iter().copied().collect();
    for code in selection.iter() {
        dashboard.handle(UiEvent::ToggleDrug(code))?;
    }
    info!(endpoint = %config.service.endpoint, "{}", dashboard.view().selector_summary);

    match dashboard.analyze().await {
        Ok(RunOutcome::Completed(_)) => {}
        Ok(outcome) => bail!("Analysis did not complete: {:?}", outcome),
        Err(e) if e.is_dispatch_failure() => {
            error!(error = %e, "Analysis failed");
            bail!("{}", e.user_message());
        }
        Err(e) => return Err(e.into()),
    }

    if let Some(position) = expand {
        let index = position.saturating_sub(1);
        let already = dashboard.browser().is_some_and(|b| b.is_expanded(index));
        if !already {
            dashboard.handle(UiEvent::ToggleExpand(index))?;
        }
    }

    let Some(browser) = dashboard.browser() else {
        bail!("Analysis finished without a result");
    };

    if json {
        println!("{}", browser.copy_as_json()?);
    } else {
        print!("{}", render::results(&browser.render()));
    }

    if let Some(dir) = out_dir {
        tokio::fs::create_dir_all(dir).await?;
        let path = browser.download_as_json(dir).await?;
        eprintln!("Report saved to {}", path.display());
    }
    Ok(())
}

async fn history(config: &Config, limit: Option<usize>) -> anyhow::Result<()> {
    require_session(config)?;
    if !config.history.enabled {
        warn!("History is disabled in the configuration");
    }

    let repo = JsonFileHistory::new(&config.history.path);
    let mut records = repo.list().await?;
    if let Some(user_id) = &config.session.user_id {
        records.retain(|r| r.user_id.as_deref() == Some(user_id.as_str()));
    }
    if let Some(limit) = limit {
        let skip = records.len().saturating_sub(limit);
        records.drain(..skip);
    }
    print!("{}", render::history(&records));
    Ok(())
}
