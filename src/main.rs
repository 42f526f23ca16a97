use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use idea_studio::config::LlmArgs;
use idea_studio::history::{JsonFileHistory, DEFAULT_HISTORY_PATH};
use idea_studio::logging::init_tracing;
use idea_studio::pipeline::IdeaPipeline;
use idea_studio::server::{router, AppState};
use tracing::info;

#[derive(Parser)]
#[command(name = "idea-studio")]
#[command(about = "HTTP service that turns game ideas into designer/engineer/artist briefs")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "IDEA_STUDIO_ADDR", default_value = "127.0.0.1:3000")]
    addr: SocketAddr,

    /// Saved-ideas file
    #[arg(long, env = "IDEA_STUDIO_HISTORY", default_value = DEFAULT_HISTORY_PATH)]
    history: PathBuf,

    /// More log output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    llm: LlmArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.llm.into_config()?;
    info!(
        endpoint = %config.base_url,
        model = %config.model_name,
        backend = ?config.backend,
        "using completion service"
    );

    let state = AppState {
        pipeline: Arc::new(IdeaPipeline::from_config(&config)?),
        history: Arc::new(JsonFileHistory::new(&cli.history)),
    };

    let listener = tokio::net::TcpListener::bind(cli.addr).await?;
    info!(addr = %cli.addr, history = %cli.history.display(), "idea-studio listening");
    axum::serve(listener, router(state)).await?;

    Ok(())
}
