//! Countdown state watcher task

use tokio::sync::watch;
use tracing::{debug, info};

use crate::state::ButtonState;

/// Log every button state change until the countdown is dropped
pub async fn countdown_watcher_task(mut updates: watch::Receiver<ButtonState>) {
    debug!("Starting countdown watcher task");

    let mut locked = updates.borrow_and_update().disabled;
    while updates.changed().await.is_ok() {
        let state = updates.borrow_and_update().clone();

        if state.disabled != locked {
            locked = state.disabled;
            if locked {
                info!("Button locked: {}", state.label);
            } else {
                info!("Button unlocked: {}", state.label);
            }
        } else {
            debug!("Button label: {}", state.label);
        }
    }

    debug!("Countdown dropped, watcher exiting");
}

/// Wait until the button is enabled again
pub async fn wait_until_unlocked(
    updates: &mut watch::Receiver<ButtonState>,
) -> Result<ButtonState, watch::error::RecvError> {
    let state = updates.wait_for(|state| !state.disabled).await?;
    Ok(state.clone())
}
