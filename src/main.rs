use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use report_card_rag::{
    cli::{self, Cli, Command, TerminalPrompt},
    config::Config,
    routes::create_router,
    utils::init_logger,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration before anything talks to the platform
    let config = Config::from_env()?;
    let _guard = init_logger(config.log_dir.as_deref().map(Path::new));
    info!(
        project = %config.vertex.project_id,
        location = %config.vertex.location,
        corpus = %config.vertex.corpus_name,
        "Configuration loaded"
    );

    match cli.command {
        Command::Serve => serve(config).await,
        command => cli::run(command, &config, &TerminalPrompt::new()).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let corpus = cli::corpus_service(&config);
    let state = AppState {
        corpus: Arc::new(corpus),
        config: config.clone(),
    };
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
