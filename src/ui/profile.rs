use crate::app::App;
use crate::auth::UserProfile;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const VERSION_LINE: &str = concat!("Version ", env!("CARGO_PKG_VERSION"));

/// Render the Profile tab: the signed-in listener or the guest notice.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.palette.panel_border);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(9),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .horizontal_margin(4)
        .split(inner);

    let lines = match app.auth.user() {
        Some(user) => signed_in_lines(app, user),
        None => guest_lines(app),
    };
    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(body, chunks[1]);

    let version = Paragraph::new(Span::styled(VERSION_LINE, app.palette.muted))
        .alignment(Alignment::Center);
    f.render_widget(version, chunks[3]);
}

fn signed_in_lines<'a>(app: &App, user: &'a UserProfile) -> Vec<Line<'a>> {
    let initial = user
        .display_name()
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default();

    vec![
        Line::from(Span::styled(format!(" {} ", initial), app.palette.button)),
        Line::from(""),
        Line::from(Span::styled(user.display_name(), app.palette.title)),
        Line::from(Span::styled(user.email.as_str(), app.palette.muted)),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled("  ⎋ Sign Out [s]  ", app.palette.button)),
    ]
}

fn guest_lines(app: &App) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled("👤", app.palette.muted)),
        Line::from(""),
        Line::from(Span::styled("Not Logged In", app.palette.title)),
        Line::from(Span::styled(
            "You're currently using RadioRadioX as a guest. Log in to access social features and personalize your experience.",
            app.palette.text,
        )),
        Line::from(""),
        Line::from(Span::styled("  Log In [l]  ", app.palette.button)),
    ]
}
