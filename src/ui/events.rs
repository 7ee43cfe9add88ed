//! Application event handling.
//!
//! This module applies background task results: feed loads, stream opens,
//! the end of the onboarding pause, and task panics.

use crate::app::{App, AppEvent, Screen};
use crate::playback::PlaybackError;
use tokio::sync::mpsc;

use super::helpers::{start_main_screen, FEED_TASK, STREAM_TASK};

/// Alert text when the profile could not be saved at the end of onboarding.
const SIGN_IN_FAILED: &str =
    "We couldn't save your details. You can keep listening as a guest.";

/// Handle application events from background tasks.
pub(super) async fn handle_app_event(
    app: &mut App,
    event: AppEvent,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match event {
        AppEvent::FeedLoaded(result) => app.apply_feed_result(result),

        AppEvent::StreamOpened(result) => {
            if let Err(ref e) = result {
                app.set_status(format!("Stream unavailable: {}", e));
            }
            app.playback.attach(result);
        }

        AppEvent::OnboardingDelayElapsed => {
            let result = app.onboarding.finish(&mut app.auth).await;
            if !app.onboarding.is_completed() {
                return;
            }
            if let Err(e) = result {
                tracing::error!(error = %e, "Sign-in failed, continuing as guest");
                app.alert("Error", SIGN_IN_FAILED);
            }
            enter_main(app, event_tx);
        }

        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            if task == STREAM_TASK {
                app.playback
                    .attach(Err(PlaybackError::Output(format!("stream task panicked: {}", error))));
            } else if task == FEED_TASK {
                app.apply_feed_result(Err(format!("Error: {} failed unexpectedly", task)));
            } else {
                app.set_status(format!("Error: {} failed unexpectedly", task));
            }
        }
    }
}

/// Leaves onboarding for the tabbed UI and starts its background work.
pub(super) fn enter_main(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    app.screen = Screen::Main;
    app.onboarding_error = None;
    start_main_screen(app, event_tx);
}
