use std::net::Ipv4Addr;
use std::sync::Arc;

use anyhow::Context as _;
use photomail::mail::SmtpMailer;
use photomail::{AppConfig, BatchRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("invalid configuration")?;
    let mailer = SmtpMailer::from_config(config.smtp.clone())?;
    let credentials = config.credential_map();
    tracing::info!(
        relay = %format!("{}:{}", config.smtp.host, config.smtp.port),
        mapped_senders = credentials.len(),
        "configuration loaded"
    );

    let runner = Arc::new(BatchRunner::new(mailer, credentials, config.batch_settings()));
    let routes = photomail::http::router(runner, config.max_upload_bytes);

    photomail::serve((Ipv4Addr::UNSPECIFIED, config.port), routes)
        .await
        .context("error running HTTP server")?;
    Ok(())
}
