use crate::app::{App, TalkBackFocus};
use crate::talkback::{MessageKind, TalkBackField};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the Talk Back tab: message kind, name, email, message, send.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.palette.panel_border);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(3), // kind
            Constraint::Length(3), // name
            Constraint::Length(3), // email
            Constraint::Min(4),    // message
            Constraint::Length(1), // send
        ])
        .horizontal_margin(2)
        .split(inner);

    let header = Paragraph::new(vec![
        Line::from(Span::styled("Talk Back to RadioRadioX", app.palette.title)),
        Line::from(Span::styled(
            "Send us your requests, tips, or suggestions. No login required!",
            app.palette.muted,
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(header, chunks[0]);

    render_kind_selector(f, app, chunks[1]);
    render_field(f, app, chunks[2], TalkBackField::Name);
    render_field(f, app, chunks[3], TalkBackField::Email);
    render_field(f, app, chunks[4], TalkBackField::Message);

    let send = Paragraph::new(Span::styled("  ➤ Send Message [Enter]  ", app.palette.button))
        .alignment(Alignment::Center);
    f.render_widget(send, chunks[5]);
}

fn render_kind_selector(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.talkback_focus == TalkBackFocus::Kind;

    let mut spans = Vec::with_capacity(MessageKind::ALL.len() * 2);
    for kind in MessageKind::ALL {
        let style = if kind == app.talkback.kind {
            app.palette.choice_active
        } else {
            app.palette.text
        };
        spans.push(Span::styled(format!(" {} ", kind.label()), style));
        spans.push(Span::raw("  "));
    }

    let border = if focused {
        app.palette.panel_border_focused
    } else {
        app.palette.panel_border
    };
    let selector = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(" Message Type "),
    );
    f.render_widget(selector, area);
}

fn render_field(f: &mut Frame, app: &App, area: Rect, field: TalkBackField) {
    let focused = app.talkback_focus == TalkBackFocus::Field(field);
    let value = app.talkback.field(field);

    let line = if value.is_empty() && !focused {
        Line::from(Span::styled(field.placeholder(), app.palette.placeholder))
    } else {
        let cursor = if focused { "▏" } else { "" };
        let style = if focused {
            app.palette.input_focused
        } else {
            app.palette.input
        };
        Line::from(vec![
            Span::styled(value.to_string(), style),
            Span::styled(cursor, app.palette.title),
        ])
    };

    let border = if focused {
        app.palette.panel_border_focused
    } else {
        app.palette.panel_border
    };
    let input = Paragraph::new(line)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).border_style(border));
    f.render_widget(input, area);
}
