use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::DEFAULT_SETTINGS_FILE, controller::AnalyzeOutcome, load_settings,
    HttpPredictionClient, ViewStateController,
};
use shared::domain::{DetailTab, FileCandidate, ViewState};
use tokio::io::BufReader;

mod render;
mod shell;

use render::TerminalRenderer;

#[derive(Parser, Debug)]
#[command(name = "leafscan", about = "Classify guava leaf images from the terminal")]
struct Args {
    /// Server hosting the `/upload` route.
    #[arg(long)]
    server_url: Option<String>,
    /// API base path; images are posted to `{base}/predict` when set.
    #[arg(long)]
    api_base_url: Option<String>,
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one image and print the result.
    Classify {
        path: PathBuf,
        /// Detail tab to show: description, symptoms or treatment.
        #[arg(long, default_value = "description")]
        tab: DetailTab,
    },
    /// Read commands from stdin.
    Shell,
}

async fn read_candidate(path: &Path) -> std::io::Result<FileCandidate> {
    let bytes = tokio::fs::read(path).await?;
    Ok(FileCandidate::from_path(path, bytes))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(api_base_url) = args.api_base_url {
        settings.api_base_url = Some(api_base_url);
    }
    let endpoint = settings
        .endpoint()
        .context("invalid prediction endpoint")?;
    tracing::info!(endpoint = %endpoint.url(), "using prediction endpoint");

    let controller = ViewStateController::new(
        Arc::new(HttpPredictionClient::new(endpoint)),
        Arc::new(TerminalRenderer::default()),
        settings.controller_settings(),
    );

    match args.command {
        Command::Classify { path, tab } => classify(&controller, &path, tab).await,
        Command::Shell => {
            shell::run_shell(controller, BufReader::new(tokio::io::stdin())).await
        }
    }
}

async fn classify(
    controller: &Arc<ViewStateController>,
    path: &Path,
    tab: DetailTab,
) -> Result<()> {
    let candidate = read_candidate(path)
        .await
        .with_context(|| format!("could not read {}", path.display()))?;
    controller.select_file(candidate).await?;

    match controller.analyze().await {
        AnalyzeOutcome::Settled(ViewState::Results) => {
            controller.switch_tab(tab.name()).await?;
            Ok(())
        }
        AnalyzeOutcome::Settled(_) => {
            let snapshot = controller.snapshot().await;
            bail!(snapshot
                .error_message
                .unwrap_or_else(|| "analysis failed".to_string()))
        }
        outcome => bail!("analysis did not settle: {outcome:?}"),
    }
}
