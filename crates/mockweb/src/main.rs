//! Mockweb CLI
//!
//! Runs a standalone mock web server, optionally scripted from a YAML file,
//! and logs every request it receives until interrupted.
//!
//! Usage:
//!   mockweb [--host <HOST>] [--port <PORT>] [--script <FILE>] [--fail-fast]

use anyhow::Context;
use clap::Parser;
use mockweb::{MockWebServer, ResponseScript, ResponseSource};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scriptable mock HTTP server
#[derive(Parser, Debug)]
#[command(name = "mockweb")]
#[command(author, version, about = "Serve scripted HTTP responses and log requests")]
struct Args {
    /// Address to bind (overrides the script)
    #[arg(long, env = "MOCKWEB_HOST")]
    host: Option<String>,

    /// Port to bind, 0 for any free port (overrides the script)
    #[arg(short, long, env = "MOCKWEB_PORT")]
    port: Option<u16>,

    /// YAML script with queued responses and a default response
    #[arg(short, long, env = "MOCKWEB_SCRIPT")]
    script: Option<PathBuf>,

    /// Answer unscripted requests with 501 Not Implemented
    #[arg(long)]
    fail_fast: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mockweb=info")),
        )
        .init();

    let args = Args::parse();

    let mut script = match &args.script {
        Some(path) => ResponseScript::load(path)
            .with_context(|| format!("loading script {}", path.display()))?,
        None => ResponseScript::default(),
    };
    if let Some(host) = args.host {
        script.server.host = host;
    }
    if let Some(port) = args.port {
        script.server.port = port;
    }
    script.fail_fast |= args.fail_fast;

    let server = Arc::new(MockWebServer::with_config(
        script.server.clone(),
        ResponseSource::queue(),
    ));
    script.apply(&server)?;
    server.start().await?;
    info!("Serving on {}", server.url()?);

    let logger = {
        let server = Arc::clone(&server);
        tokio::spawn(async move {
            loop {
                if let Some(request) = server.next_request(Duration::from_secs(1)).await {
                    info!(
                        "#{} {} {} ({} bytes)",
                        request.sequence_number(),
                        request.method(),
                        request.path(),
                        request.body().len()
                    );
                }
            }
        })
    };

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;
    info!("Shutting down");
    logger.abort();
    server.shutdown().await;
    Ok(())
}
