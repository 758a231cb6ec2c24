//! UI Timing - demo binary
//!
//! Runs a scripted search box, resend-code button and infinite list on the
//! tokio scheduler, logging what the timing controls do.

use std::sync::Arc;
use tracing::info;

use ui_timing::{
    config::Config,
    scheduler::{Scheduler, TokioScheduler},
    tasks::run_scenario,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("ui_timing={}", config.log_level()))
        .init();

    let settings = config.settings()?;
    info!("Starting ui-timing demo v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: quiet_period={}ms, leading={}, countdown={}s, edge={}, tolerance={}px",
        settings.debounce.quiet_period_ms,
        settings.debounce.leading,
        settings.countdown.total_seconds,
        settings.scroll.edge,
        settings.scroll.tolerance_px
    );

    let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler::current()?);

    tokio::select! {
        result = run_scenario(scheduler, settings) => result?,
        signal = shutdown_signal() => {
            info!("Shutdown signal {} received, abandoning scenario", signal?);
        }
    }

    info!("Demo finished");
    Ok(())
}
