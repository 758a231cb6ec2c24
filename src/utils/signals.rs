//! Signal handling for the demo binary

use anyhow::Context;
use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tracing::info;

/// Resolve on the first SIGTERM or SIGINT, yielding the signal number
pub async fn shutdown_signal() -> anyhow::Result<i32> {
    let mut signals = Signals::new([SIGTERM, SIGINT]).context("failed to register signal handler")?;
    let handle = signals.handle();

    let signal = signals
        .next()
        .await
        .context("signal stream closed before a signal arrived")?;
    info!("Received signal: {}", signal);

    handle.close();
    Ok(signal)
}
