//! Input handling for the TUI.
//!
//! This module processes keyboard input and dispatches to the appropriate
//! handler based on the open overlay, the current screen and the active tab.

use crate::app::{App, AppEvent, FeedState, Modal, Screen, Tab, TalkBackFocus};
use crate::onboarding::{OnboardingFlow, OnboardingStep};
use crate::playback::PlayerPhase;
use crate::share::{self, ShareError, ShareTarget};
use crate::talkback::{TalkBackField, SUBMITTED_MESSAGE};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::events::enter_main;
use super::helpers::{open_link, spawn_feed_load, spawn_onboarding_delay, spawn_stream_open};
use super::Action;

/// Maximum length of a single-line input (name, email).
const MAX_LINE_LEN: usize = 256;
/// Maximum length of a talk back message.
const MAX_MESSAGE_LEN: usize = 2000;

/// Main input dispatch function.
///
/// Routes input to the appropriate handler based on current mode and view.
pub(super) async fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Ok(Action::Quit);
    }

    // Overlays capture all keys while visible
    if app.modal.is_some() {
        handle_modal_input(app, code).await;
        return Ok(Action::Continue);
    }

    if app.screen == Screen::Onboarding {
        handle_onboarding_input(app, code, event_tx).await;
        return Ok(Action::Continue);
    }

    if app.is_typing() {
        handle_talkback_typing(app, code);
        return Ok(Action::Continue);
    }

    match code {
        KeyCode::Char('q') => return Ok(Action::Quit),
        KeyCode::Tab => app.tab = app.tab.next(),
        KeyCode::BackTab => app.tab = app.tab.prev(),
        KeyCode::Char(c @ '1'..='5') => {
            let index = c as usize - '1' as usize;
            app.tab = Tab::ALL[index];
        }
        _ => match app.tab {
            Tab::Radio => handle_radio_input(app, code, event_tx),
            Tab::Xperience => handle_xperience_input(app, code, event_tx),
            Tab::Share => handle_share_input(app, code),
            Tab::TalkBack => handle_talkback_input(app, code),
            Tab::Profile => handle_profile_input(app, code),
        },
    }
    Ok(Action::Continue)
}

/// Alerts close on Enter/Esc; the sign-out confirmation takes y/n.
async fn handle_modal_input(app: &mut App, code: KeyCode) {
    if app.modal == Some(Modal::ConfirmSignOut) {
        match code {
            KeyCode::Char('y') | KeyCode::Enter => {
                app.modal = None;
                app.auth.sign_out().await;
                app.set_status("Signed out");
            }
            KeyCode::Char('n') | KeyCode::Esc => app.modal = None,
            _ => {}
        }
    } else if matches!(code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
        app.modal = None;
    }
}

// ============================================================================
// Onboarding
// ============================================================================

async fn handle_onboarding_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match code {
        KeyCode::Esc => {
            if app.onboarding.skip(&app.auth).await {
                enter_main(app, event_tx);
            }
        }
        KeyCode::Enter => submit_onboarding_step(app, event_tx).await,
        KeyCode::Backspace => {
            if let Some(input) = app.onboarding.input_mut() {
                input.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(input) = app.onboarding.input_mut() {
                push_char(input, c, MAX_LINE_LEN);
                app.onboarding_error = None;
            }
        }
        _ => {}
    }
}

async fn submit_onboarding_step(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let result = match app.onboarding.step() {
        OnboardingStep::Welcome | OnboardingStep::NameEntry => app.onboarding.advance(),
        OnboardingStep::EmailEntry => {
            let result = app.onboarding.submit_email(&app.auth).await;
            if result.is_ok() {
                spawn_onboarding_delay(app, event_tx);
            }
            result
        }
        OnboardingStep::Sent | OnboardingStep::Completed => Ok(()),
    };

    app.onboarding_error = result.err().map(|e| e.to_string());
}

// ============================================================================
// Radio
// ============================================================================

fn handle_radio_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Char('p') => {
            match app.playback.phase() {
                PlayerPhase::Idle | PlayerPhase::Error if app.stream_opener.is_some() => {
                    spawn_stream_open(app, event_tx);
                }
                PlayerPhase::Idle | PlayerPhase::Error => {
                    app.set_status("Audio is disabled (--skip-audio)");
                }
                PlayerPhase::Loading => {}
                PlayerPhase::Playing | PlayerPhase::Paused => app.playback.toggle_play_pause(),
            }
        }
        KeyCode::Char('m') => app.playback.set_volume(0.0),
        KeyCode::Char('h') => app.playback.set_volume(0.5),
        KeyCode::Char('f') => app.playback.set_volume(1.0),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => app.volume_up(),
        KeyCode::Char('-') | KeyCode::Left => app.volume_down(),
        _ => {}
    }
}

// ============================================================================
// Xperience
// ============================================================================

fn handle_xperience_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Char('r') => {
            if app.feed != FeedState::Loading {
                spawn_feed_load(app, event_tx);
            }
        }
        KeyCode::Enter | KeyCode::Char('o') => {
            if let Some(link) = app.selected_post().map(|p| p.link.clone()) {
                if link.is_empty() {
                    app.set_status("This post has no link");
                } else {
                    open_link(app, &link);
                }
            }
        }
        _ => {}
    }
}

// ============================================================================
// Share
// ============================================================================

fn handle_share_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('j') | KeyCode::Down => app.share_down(),
        KeyCode::Char('k') | KeyCode::Up => app.share_up(),
        KeyCode::Enter => {
            let target = ShareTarget::ALL[app.selected_share.min(ShareTarget::ALL.len() - 1)];
            let result = share::prepare(target, app.auth.user(), &app.config)
                .and_then(|payload| share::hand_off(&payload));
            match result {
                Ok(()) => app.set_status("Opening your mail client..."),
                Err(e @ ShareError::LoginRequired) => app.alert("Login Required", e.to_string()),
                Err(e) => {
                    tracing::warn!(error = %e, "Share hand-off failed");
                    app.alert("Error", e.to_string());
                }
            }
        }
        _ => {}
    }
}

// ============================================================================
// Talk Back
// ============================================================================

/// Keys while the kind selector has focus.
fn handle_talkback_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Left => {
            // Three kinds: two steps forward is one step back
            app.talkback.kind = app.talkback.kind.next().next();
        }
        KeyCode::Right | KeyCode::Char(' ') => app.talkback.kind = app.talkback.kind.next(),
        KeyCode::Down | KeyCode::Char('j') => app.talkback_focus = app.talkback_focus.next(),
        KeyCode::Up | KeyCode::Char('k') => app.talkback_focus = app.talkback_focus.prev(),
        KeyCode::Enter => submit_talkback(app),
        _ => {}
    }
}

/// Keys while a text field has focus.
fn handle_talkback_typing(app: &mut App, code: KeyCode) {
    let TalkBackFocus::Field(field) = app.talkback_focus else {
        return;
    };
    match code {
        KeyCode::Esc => app.talkback_focus = TalkBackFocus::Kind,
        KeyCode::Tab => app.tab = app.tab.next(),
        KeyCode::BackTab => app.tab = app.tab.prev(),
        KeyCode::Down => app.talkback_focus = app.talkback_focus.next(),
        KeyCode::Up => app.talkback_focus = app.talkback_focus.prev(),
        KeyCode::Enter => submit_talkback(app),
        KeyCode::Backspace => {
            app.talkback.field_mut(field).pop();
        }
        KeyCode::Char(c) => {
            let max = if field == TalkBackField::Message {
                MAX_MESSAGE_LEN
            } else {
                MAX_LINE_LEN
            };
            push_char(app.talkback.field_mut(field), c, max);
        }
        _ => {}
    }
}

fn submit_talkback(app: &mut App) {
    match app.talkback.submit() {
        Ok(_) => {
            app.talkback_focus = TalkBackFocus::Kind;
            app.alert("Thank You!", SUBMITTED_MESSAGE);
        }
        Err(e) => app.alert("Error", e.to_string()),
    }
}

// ============================================================================
// Profile
// ============================================================================

fn handle_profile_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('s') if app.auth.is_signed_in() => app.modal = Some(Modal::ConfirmSignOut),
        KeyCode::Char('l') if !app.auth.is_signed_in() => {
            app.onboarding = OnboardingFlow::new();
            app.onboarding_error = None;
            app.screen = Screen::Onboarding;
        }
        _ => {}
    }
}

/// Appends a printable character while the field is under `max` chars.
fn push_char(input: &mut String, c: char, max: usize) {
    if !c.is_control() && input.chars().count() < max {
        input.push(c);
    }
}
