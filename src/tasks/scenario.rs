//! Scripted demo: a search box, a resend-code button and an infinite list

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::time::sleep;
use tracing::info;

use super::{countdown_watcher_task, wait_until_unlocked};
use crate::{
    config::Settings,
    controls::{
        Countdown, CountdownOptions, DebounceOptions, Debounced, EdgeDetector, Outcome,
        ScrollGeometry, ScrollSnapshot,
    },
    scheduler::Scheduler,
    utils::sync::lock,
};

const KEYSTROKE_INTERVAL: Duration = Duration::from_millis(50);
const PAGE_SIZE: usize = 12;
const ROW_HEIGHT: f64 = 80.0;
const VIEWPORT_HEIGHT: f64 = 600.0;
const SCROLL_STEP: f64 = 120.0;
const FRAME: Duration = Duration::from_millis(16);
const MAX_PAGES: usize = 3;
const MAX_SCROLL_EVENTS: usize = 500;

/// Run the three demo steps in order
pub async fn run_scenario(scheduler: Arc<dyn Scheduler>, settings: Settings) -> anyhow::Result<()> {
    search_box(&scheduler, &settings).await?;
    resend_button(&scheduler, &settings).await?;
    infinite_list(&scheduler, &settings).await?;
    info!("Scenario complete");
    Ok(())
}

async fn search_box(scheduler: &Arc<dyn Scheduler>, settings: &Settings) -> anyhow::Result<()> {
    let options = DebounceOptions::from(&settings.debounce);
    info!(
        "Typing into search box (quiet period {:?}, leading={})",
        options.quiet_period, options.leading
    );

    let search = Debounced::new(Arc::clone(scheduler), options, |query: String| {
        info!("Searching for {:?}", query);
        Ok(())
    });

    for query in ["r", "ru", "rus", "rust"] {
        search.call(query.to_string())?;
        sleep(KEYSTROKE_INTERVAL).await;
    }
    sleep(options.quiet_period + KEYSTROKE_INTERVAL).await;

    info!("Search stats: {}", serde_json::to_string(&search.stats())?);
    Ok(())
}

async fn resend_button(
    scheduler: &Arc<dyn Scheduler>,
    settings: &Settings,
) -> anyhow::Result<Vec<Outcome>> {
    let countdown = Countdown::new(
        Arc::clone(scheduler),
        CountdownOptions::from(&settings.countdown),
    );
    let watcher = tokio::spawn(countdown_watcher_task(countdown.subscribe()));
    let mut updates = countdown.subscribe();

    let button = countdown.clone();
    let send_code = Debounced::new(
        Arc::clone(scheduler),
        DebounceOptions::leading(Duration::from_millis(settings.debounce.quiet_period_ms)),
        move |phone: String| {
            info!("Sending verification code to {}", phone);
            button.start_default();
            Ok(())
        },
    );

    // A double click lands inside one burst and sends a single code.
    let mut clicks = Vec::new();
    for _ in 0..2 {
        let outcome = send_code.call("138****8000".to_string())?;
        info!("Click {:?}, button shows {:?}", outcome, countdown.label());
        clicks.push(outcome);
    }

    let idle = wait_until_unlocked(&mut updates).await?;
    info!("Button ready again: {}", idle.label);

    drop(send_code);
    drop(countdown);
    watcher.await?;
    Ok(clicks)
}

async fn infinite_list(
    scheduler: &Arc<dyn Scheduler>,
    settings: &Settings,
) -> anyhow::Result<Vec<usize>> {
    let detector = EdgeDetector::from(&settings.scroll);
    let pages = Arc::new(Mutex::new(vec![1usize]));

    let loaded = Arc::clone(&pages);
    let options = DebounceOptions::from(&settings.debounce);
    let load_page = Debounced::new(Arc::clone(scheduler), options, move |page: usize| {
        info!("Loading page {} ({} rows)", page, PAGE_SIZE);
        let mut loaded = lock(&loaded);
        if !loaded.contains(&page) {
            loaded.push(page);
        }
        Ok(())
    });

    let mut geometry = ScrollGeometry::new(content_height(1), VIEWPORT_HEIGHT, 0.0);
    for _ in 0..MAX_SCROLL_EVENTS {
        let page_count = lock(&pages).len();
        if page_count >= MAX_PAGES {
            break;
        }

        geometry.scroll_height = content_height(page_count);
        geometry.scroll_top =
            (geometry.scroll_top + SCROLL_STEP).min(geometry.scroll_height - VIEWPORT_HEIGHT);

        let mut event = ScrollSnapshot::new(geometry);
        let mut requested = None;
        detector.check(&mut event, || requested = Some(page_count + 1));
        // Frames keep arriving at the bottom while a load is armed; in
        // trailing mode each one would push the load back past the next frame.
        if let Some(page) = requested {
            if !load_page.is_pending() {
                load_page.call(page)?;
            }
        }

        sleep(FRAME).await;
    }

    let pages = lock(&pages).clone();
    info!("Loaded pages: {:?}", pages);
    Ok(pages)
}

fn content_height(pages: usize) -> f64 {
    (pages * PAGE_SIZE) as f64 * ROW_HEIGHT
}
