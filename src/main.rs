use anyhow::Context;
use clap::Parser;
use rusty_summarizer::{
    api, config, logging,
    processing::{ProcessingService, ServiceSettings},
    summarization::{SummarizationModel, build_summarization_client},
};
use std::net::IpAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

const PORT_RANGE: std::ops::RangeInclusive<u16> = 5000..=5099;

/// Summarize raw text and uploaded documents over HTTP.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,
    /// Port to listen on; overrides `SERVER_PORT`.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::init_config().context("Failed to load config from environment")?;
    logging::init_tracing();
    logging::log_startup(config);

    let model = Arc::new(SummarizationModel::new());
    let client =
        build_summarization_client(config).context("Failed to build summarization client")?;
    model
        .load(client)
        .await
        .context("Failed to load summarization model")?;

    let service = ProcessingService::new(model, ServiceSettings::from_config(config))
        .context("Failed to initialize processing service")?;
    let app = api::create_router(Arc::new(service), config.upload_max_bytes);

    let (listener, port) = bind_listener(cli.host, cli.port.or(config.server_port))
        .await
        .context("Failed to bind listener")?;
    tracing::info!("Listening on http://{}:{}", cli.host, port);
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

async fn bind_listener(
    host: IpAddr,
    port: Option<u16>,
) -> Result<(TcpListener, u16), std::io::Error> {
    if let Some(port) = port {
        return TcpListener::bind((host, port))
            .await
            .map(|listener| (listener, port));
    }

    for port in PORT_RANGE {
        match TcpListener::bind((host, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        format!(
            "No available port found in range {}-{}",
            PORT_RANGE.start(),
            PORT_RANGE.end()
        ),
    ))
}
