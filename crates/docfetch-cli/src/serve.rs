//! `docfetch serve`: run the HTTP API

use crate::ClientArgs;
use clap::Args;
use docfetch::server::{self, AppState};
use docfetch::{HttpClient, Pipeline, SearchApiTranscripts};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "DOCFETCH_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on
    #[arg(long, short, env = "PORT", default_value_t = 5050)]
    port: u16,

    /// SearchAPI key for the /transcript endpoint
    #[arg(long, env = "SEARCHAPI_API_KEY", hide_env_values = true)]
    transcript_api_key: Option<String>,

    #[command(flatten)]
    client: ClientArgs,
}

pub async fn run(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = args.client.options();

    // One client for the whole process; every component borrows it
    let client = Arc::new(HttpClient::new(&options)?);
    let pipeline = Pipeline::builder()
        .options(options)
        .client(client.clone())
        .build()?;

    let mut state = AppState::new(Arc::new(pipeline));
    match args.transcript_api_key.filter(|key| !key.trim().is_empty()) {
        Some(key) => {
            state = state.with_transcripts(Arc::new(SearchApiTranscripts::new(client.clone(), key)));
        }
        None => warn!("SEARCHAPI_API_KEY not set, /transcript will answer 500"),
    }

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    server::serve(listener, state, shutdown_signal()).await?;

    drop(client);
    info!("Server stopped, HTTP client closed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
