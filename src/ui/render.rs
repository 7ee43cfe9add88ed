//! Render functions for the TUI.
//!
//! This module handles all rendering logic, dispatching to the onboarding
//! screen or the active tab and drawing overlays on top.

use crate::app::{App, Modal, Screen, Tab};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

use super::{onboarding, profile, radio, share, status, talkback, xperience};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 20;

/// Main render dispatch function.
///
/// Routes to the onboarding screen or the tabbed UI. Handles terminal size
/// validation before rendering.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    // EDGE-001: Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    // EDGE-001: Minimum terminal size check for usable UI
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    f.render_widget(Block::default().style(app.palette.background), area);

    match app.screen {
        Screen::Onboarding => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(1)])
                .split(area);
            onboarding::render(f, app, chunks[0]);
            status::render(f, app, chunks[1]);
        }
        Screen::Main => render_main(f, app),
    }

    if let Some(ref modal) = app.modal {
        render_modal_overlay(f, app, modal);
    }
}

/// Tab bar, active tab, status bar.
fn render_main(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_tab_bar(f, app, chunks[0]);

    match app.tab {
        Tab::Radio => radio::render(f, app, chunks[1]),
        Tab::Xperience => xperience::render(f, app, chunks[1]),
        Tab::Share => share::render(f, app, chunks[1]),
        Tab::TalkBack => talkback::render(f, app, chunks[1]),
        Tab::Profile => profile::render(f, app, chunks[1]),
    }

    status::render(f, app, chunks[2]);
}

fn render_tab_bar(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .style(app.palette.tab_inactive)
        .highlight_style(app.palette.tab_active)
        .divider(Span::styled(" | ", app.palette.muted))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.palette.panel_border)
                .title(Span::styled(" RadioRadioX ", app.palette.title)),
        );

    f.render_widget(tabs, area);
}

/// Render an alert or the sign-out confirmation centered on screen.
fn render_modal_overlay(f: &mut Frame, app: &App, modal: &Modal) {
    let area = f.area();

    let (title, text, hint) = match modal {
        Modal::Alert { title, message } => (title.as_str(), message.as_str(), "(Enter) OK"),
        Modal::ConfirmSignOut => (
            "Sign Out",
            "Are you sure you want to sign out?",
            "(n/Esc) Cancel  (y) Sign Out",
        ),
    };

    // Size: at most 50 chars wide, 8 lines tall, centered
    let width = 50u16.min(area.width.saturating_sub(4));
    let height = 8u16.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);

    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(text, app.palette.text)),
        Line::from(""),
        Line::from(Span::styled(hint, app.palette.muted)),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.palette.panel_border_focused)
                .title(Span::styled(format!(" {} ", title), app.palette.title)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(app.palette.background);

    f.render_widget(paragraph, overlay);
}
