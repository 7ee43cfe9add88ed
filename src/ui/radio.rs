use crate::app::App;
use crate::playback::PlayerPhase;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// Render the Radio tab: logo, on-air indicator, play button, volume.
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
            Constraint::Length(4), // logo
            Constraint::Length(3), // indicator
            Constraint::Length(3), // button
            Constraint::Length(3), // volume
            Constraint::Length(1), // presets
            Constraint::Min(0),
        ])
        .split(inner);

    let palette = &app.palette;

    let logo = Paragraph::new(vec![
        Line::from(Span::styled(
            "RADIORADIOX",
            palette.title.add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("INTERNET RADIO", palette.muted)),
    ])
    .alignment(Alignment::Center);
    f.render_widget(logo, chunks[1]);

    let state = app.playback.state();
    let phase = app.playback.phase();

    let indicator = match phase {
        PlayerPhase::Loading => Line::from(Span::styled(
            "Connecting to RadioRadioX...",
            palette.muted,
        )),
        PlayerPhase::Error => Line::from(Span::styled(
            app.playback
                .last_error()
                .map(|e| format!("Stream unavailable: {}", e))
                .unwrap_or_else(|| "Stream unavailable".to_string()),
            palette.error,
        )),
        _ if state.is_playing => Line::from(Span::styled("● LIVE ON AIR", palette.live)),
        _ => Line::from(Span::styled("○ PAUSED", palette.paused)),
    };
    f.render_widget(
        Paragraph::new(vec![Line::from(""), indicator]).alignment(Alignment::Center),
        chunks[2],
    );

    let (label, style) = match phase {
        PlayerPhase::Loading => ("  ···  ", palette.muted),
        _ if app.stream_opener.is_none() => ("  AUDIO OFF  ", palette.muted),
        PlayerPhase::Error => ("  ↻ RETRY  ", palette.button),
        _ if state.is_playing => ("  ❚❚ PAUSE  ", palette.button),
        _ => ("  ▶ PLAY  ", palette.button),
    };
    let button = Paragraph::new(vec![Line::from(""), Line::from(Span::styled(label, style))])
        .alignment(Alignment::Center);
    f.render_widget(button, chunks[3]);

    render_volume(f, app, chunks[4]);

    let presets = Line::from(vec![
        Span::styled("[m]", palette.title),
        Span::styled(" Mute   ", palette.text),
        Span::styled("[h]", palette.title),
        Span::styled(" 50%   ", palette.text),
        Span::styled("[f]", palette.title),
        Span::styled(" 100%", palette.text),
    ]);
    f.render_widget(
        Paragraph::new(presets).alignment(Alignment::Center),
        chunks[5],
    );
}

fn render_volume(f: &mut Frame, app: &App, area: Rect) {
    // Centered, at most 40 columns
    let width = 40u16.min(area.width);
    let x = area.x + (area.width - width) / 2;
    let area = Rect::new(x, area.y, width, area.height);

    let volume = app.playback.volume();
    let percent = (volume * 100.0).round() as u16;
    let label = if percent == 0 {
        "Muted".to_string()
    } else {
        format!("Volume {}%", percent)
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.palette.volume_track),
        )
        .gauge_style(app.palette.volume_fill)
        .ratio(f64::from(volume).clamp(0.0, 1.0))
        .label(Span::styled(label, app.palette.text));

    f.render_widget(gauge, area);
}
