use crate::app::App;
use crate::share::{SharePayload, ShareTarget};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the Share tab: the two share cards and a preview of the message.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.palette.panel_border);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let signed_in = app.auth.is_signed_in();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(if signed_in { 0 } else { 2 }),
            Constraint::Length(4), // station card
            Constraint::Length(4), // app card
            Constraint::Min(0),    // preview
        ])
        .split(inner);

    let header = Paragraph::new(vec![
        Line::from(Span::styled("Share RadioRadioX", app.palette.title)),
        Line::from(Span::styled(
            "Spread the word about your favorite radio station!",
            app.palette.muted,
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(header, chunks[0]);

    if !signed_in {
        let notice = Paragraph::new(Span::styled(
            "🔒 Login required to share content",
            app.palette.warning,
        ))
        .alignment(Alignment::Center);
        f.render_widget(notice, chunks[1]);
    }

    for (i, target) in ShareTarget::ALL.iter().enumerate() {
        render_card(f, app, chunks[2 + i], *target, i == app.selected_share);
    }

    let target = ShareTarget::ALL[app.selected_share.min(ShareTarget::ALL.len() - 1)];
    let payload = SharePayload::for_target(target, &app.config);
    let preview = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(payload.title.clone(), app.palette.post_title)),
        Line::from(Span::styled(payload.text(), app.palette.muted)),
    ])
    .wrap(Wrap { trim: false });
    f.render_widget(preview, pad(chunks[4], 2));
}

fn render_card(f: &mut Frame, app: &App, area: Rect, target: ShareTarget, selected: bool) {
    let border = if selected {
        app.palette.panel_border_focused
    } else {
        app.palette.panel_border
    };
    let icon = match target {
        ShareTarget::Station => "📻",
        ShareTarget::App => "📱",
    };

    let card = Paragraph::new(vec![
        Line::from(vec![
            Span::raw(format!("{} ", icon)),
            Span::styled(target.card_title(), app.palette.post_title),
        ]),
        Line::from(Span::styled(target.card_description(), app.palette.muted)),
    ])
    .block(Block::default().borders(Borders::ALL).border_style(border));

    f.render_widget(card, pad(area, 2));
}

/// Shrinks `area` horizontally by `margin` columns on each side.
fn pad(area: Rect, margin: u16) -> Rect {
    let margin = margin.min(area.width / 2);
    Rect::new(
        area.x + margin,
        area.y,
        area.width - margin * 2,
        area.height,
    )
}
