//! Egg Hunt Server
//!
//! Runs the hunt against a host that speaks newline-delimited JSON on
//! stdin/stdout. Logs go to stderr.
//!
//! Usage: `egg-hunt-server [settings.json]` (or `EGG_HUNT_CONFIG`).

use std::path::PathBuf;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use egg_hunt::{
    VERSION,
    service::{HuntService, HuntSettings, Outbound, Stimulus},
};

#[cfg(feature = "debug-tracing")]
const DEFAULT_FILTER: &str = "debug";
#[cfg(not(feature = "debug-tracing"))]
const DEFAULT_FILTER: &str = "info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Egg Hunt Server v{}", VERSION);

    let config_path = std::env::args().nth(1)
        .or_else(|| std::env::var("EGG_HUNT_CONFIG").ok())
        .map(PathBuf::from);
    let settings = HuntSettings::load(config_path.as_deref())
        .context("failed to load settings")?;

    info!(
        "Asset {} size {}, amount {}, {}s rounds",
        settings.egg_asset, settings.egg_size, settings.amount, settings.game_length_secs
    );

    let (out_tx, mut out_rx) = mpsc::channel::<Outbound>(256);
    let (in_tx, in_rx) = mpsc::channel::<Stimulus>(256);

    let service = HuntService::new(settings, out_tx)
        .await
        .context("failed to start hunt service")?;

    let interrupt_tx = in_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted");
            let _ = interrupt_tx.send(Stimulus::Shutdown).await;
        }
    });

    // Host -> hunt
    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => match Stimulus::from_json(&line) {
                    Ok(stimulus) => {
                        if in_tx.send(stimulus).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Ignoring host line: {}", e),
                },
                Ok(None) => {
                    info!("Host closed stdin");
                    break;
                }
                Err(e) => {
                    error!("Failed to read from host: {}", e);
                    break;
                }
            }
        }
        let _ = in_tx.send(Stimulus::Shutdown).await;
    });

    // Hunt -> host
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(msg) = out_rx.recv().await {
            let mut text = match msg.to_json() {
                Ok(t) => t,
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                    continue;
                }
            };
            text.push('\n');
            if stdout.write_all(text.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
                break;
            }
        }
    });

    let result = service.run(in_rx).await;
    reader.abort();
    // The service (and its outbox sender) is gone; let the writer drain.
    let _ = writer.await;
    result.context("hunt service failed")?;

    info!("Egg hunt server stopped");
    Ok(())
}
