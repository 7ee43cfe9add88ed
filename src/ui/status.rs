use crate::app::{App, Screen, Tab, TalkBackFocus};
use crate::onboarding::OnboardingStep;
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // EDGE-001: Guard against zero-width/height areas
    if area.width < 1 || area.height < 1 {
        return;
    }

    // Borrow the status message; key hints are static
    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        Cow::Borrowed(key_hints(app))
    };

    let paragraph = Paragraph::new(text).style(app.palette.status_bar);
    f.render_widget(paragraph, area);
}

fn key_hints(app: &App) -> &'static str {
    if app.modal.is_some() {
        return "[Enter]confirm [Esc]dismiss";
    }
    match app.screen {
        Screen::Onboarding => match app.onboarding.step() {
            OnboardingStep::Welcome => "[Enter]continue [Esc]skip for now [Ctrl+c]quit",
            OnboardingStep::NameEntry | OnboardingStep::EmailEntry => {
                "Type to edit | [Enter]continue [Esc]skip for now"
            }
            OnboardingStep::Sent | OnboardingStep::Completed => "Signing you in...",
        },
        Screen::Main => match app.tab {
            Tab::Radio => "[space]play/pause [m]ute [h]alf [f]ull [+/-]volume [Tab]next [q]uit",
            Tab::Xperience => "[j/k]select [Enter]open [r]efresh [Tab]next [q]uit",
            Tab::Share => "[j/k]select [Enter]share [Tab]next [q]uit",
            Tab::TalkBack => match app.talkback_focus {
                TalkBackFocus::Kind => "[←/→]type [↓]fields [Enter]send [Tab]next [q]uit",
                TalkBackFocus::Field(_) => "Type to edit | [↑/↓]fields [Enter]send [Esc]done",
            },
            Tab::Profile => {
                if app.auth.is_signed_in() {
                    "[s]ign out [Tab]next [q]uit"
                } else {
                    "[l]og in [Tab]next [q]uit"
                }
            }
        },
    }
}
