//! Helper functions for UI operations.
//!
//! Background work (feed fetches, stream opens, the onboarding pause) is
//! spawned from here and always reports back through the `AppEvent` channel.

use crate::app::{App, AppEvent};
use crate::feed::fetch_posts;
use crate::playback::{PlayerPhase, StreamOpener};
use crate::util::validate_url_for_open;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Task name reported when the stream open panics.
pub(super) const STREAM_TASK: &str = "stream_open";
/// Task name reported when a feed fetch panics.
pub(super) const FEED_TASK: &str = "feed_load";

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of the task silently disappearing (caught by Tokio's runtime but
/// not handled), panics are converted to `Err(String)` containing the panic
/// message so the UI can report them.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

async fn send_event(tx: &mpsc::Sender<AppEvent>, event: AppEvent, name: &'static str) {
    if tx.send(event).await.is_err() {
        tracing::warn!(event = name, "Channel send failed (receiver dropped)");
    }
}

/// Starts the tabbed UI's background work: the feed and the live stream.
pub(super) fn start_main_screen(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    spawn_feed_load(app, event_tx);
    spawn_stream_open(app, event_tx);
}

/// Fetch the Xperience feed in the background.
///
/// In-flight fetches are never cancelled; whichever finishes last wins.
pub(super) fn spawn_feed_load(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    app.begin_feed_load();

    let client = app.http_client.clone();
    let url = app.config.feed_url.clone();
    let tx = event_tx.clone();

    tracing::debug!(url = %url, "Spawning feed load");

    tokio::spawn(async move {
        let tx_panic = tx.clone();
        match catch_task_panic(fetch_posts(&client, &url)).await {
            Ok(result) => {
                let result = result.map_err(|e| {
                    if e.is_network() {
                        format!("Network error: {}", e)
                    } else {
                        e.to_string()
                    }
                });
                send_event(&tx, AppEvent::FeedLoaded(result), "FeedLoaded").await;
            }
            Err(panic_msg) => {
                tracing::error!(task = FEED_TASK, error = %panic_msg, "Background task panicked");
                send_event(
                    &tx_panic,
                    AppEvent::TaskPanicked {
                        task: FEED_TASK,
                        error: panic_msg,
                    },
                    "TaskPanicked",
                )
                .await;
            }
        }
    });
}

/// Open the live stream in the background. A no-op when audio is disabled
/// or a stream is already loading or live.
pub(super) fn spawn_stream_open(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(opener) = app.stream_opener.clone() else {
        tracing::info!("Audio disabled, not opening stream");
        return;
    };
    if !matches!(app.playback.phase(), PlayerPhase::Idle | PlayerPhase::Error) {
        return;
    }

    let handle_events = app.playback.begin_loading();
    let url = app.config.stream_url.clone();
    let volume = app.playback.volume();
    let tx = event_tx.clone();

    tokio::spawn(async move {
        let tx_panic = tx.clone();
        match catch_task_panic(opener.open(&url, volume, handle_events)).await {
            Ok(result) => {
                send_event(&tx, AppEvent::StreamOpened(result), "StreamOpened").await;
            }
            Err(panic_msg) => {
                tracing::error!(task = STREAM_TASK, error = %panic_msg, "Background task panicked");
                send_event(
                    &tx_panic,
                    AppEvent::TaskPanicked {
                        task: STREAM_TASK,
                        error: panic_msg,
                    },
                    "TaskPanicked",
                )
                .await;
            }
        }
    });
}

/// Wait out the "link sent" pause, then let the loop finish onboarding.
pub(super) fn spawn_onboarding_delay(app: &App, event_tx: &mpsc::Sender<AppEvent>) {
    let delay = app.config.sent_delay();
    let tx = event_tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        send_event(&tx, AppEvent::OnboardingDelayElapsed, "OnboardingDelayElapsed").await;
    });
}

/// Open a post link in the system browser.
pub(super) fn open_link(app: &mut App, url: &str) {
    // SEC: Validate URL before open::that() to prevent command injection
    if let Err(e) = validate_url_for_open(url) {
        app.set_status(e.to_string());
    } else if let Err(e) = open::that(url) {
        tracing::warn!(url = %url, error = %e, "Failed to open browser");
        app.set_status(format!("Failed to open browser: {}", e));
    } else {
        app.set_status("Opening in browser...");
    }
}
