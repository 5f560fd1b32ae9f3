use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crowdcatch_upload::{
    client::{HttpTransport, SelectedFile, UploadForm, DEFAULT_UPLOAD_ENDPOINT},
    config::Config,
    create_router,
    storage::build_store,
    utils::init_logger,
    AppState,
};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "crowdcatch", version, about = "CrowdCatch image upload relay")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the upload relay
    Serve,
    /// Upload an image through the relay
    Upload {
        /// Image file to upload
        path: PathBuf,
        /// Relay upload endpoint
        #[arg(long, env = "UPLOAD_ENDPOINT", default_value = DEFAULT_UPLOAD_ENDPOINT)]
        endpoint: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    match Cli::parse().command {
        Command::Serve => serve().await,
        Command::Upload { path, endpoint } => upload(path, endpoint).await,
    }
}

async fn serve() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);

    let store = build_store(&config.storage)?;
    let state = AppState::new(config.clone(), store);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("HOST and PORT must form a socket address")?;
    info!("Server is running on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

async fn upload(path: PathBuf, endpoint: String) -> anyhow::Result<()> {
    let file = SelectedFile::from_path(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut form = UploadForm::new();
    form.select(file)?;
    if let (Some(file), Some(preview)) = (form.selected_file(), form.preview()) {
        println!("Selected: {} ({}, {} bytes)", file.name, file.content_type, file.size());
        println!("Preview: {}", preview.url());
    }

    let transport = HttpTransport::new(endpoint);
    let result = form.upload(&transport).await;

    if let Some(message) = form.message() {
        println!("{}", message.text);
    }
    if let Ok(response) = &result {
        if let Some(key) = &response.key {
            println!("Key: {}", key);
        }
    }

    result.map(|_| ()).map_err(Into::into)
}
