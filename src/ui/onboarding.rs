use crate::app::App;
use crate::onboarding::OnboardingStep;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const FEATURES: [(&str, &str); 3] = [
    ("📻", "Live Radio Streaming"),
    ("💬", "Talk Back to DJs"),
    ("🔗", "Share with Friends"),
];

/// Render the first-run wizard.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.palette.panel_border);
    let inner = block.inner(area);
    f.render_widget(block, area);

    // Content column, at most 64 wide
    let width = 64u16.min(inner.width);
    let column = Rect::new(
        inner.x + (inner.width - width) / 2,
        inner.y,
        width,
        inner.height,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(3),  // logo
            Constraint::Length(2),  // progress
            Constraint::Length(10), // step body
            Constraint::Length(1),  // error
            Constraint::Length(3),  // buttons
            Constraint::Min(0),
        ])
        .split(column);

    let logo = Paragraph::new(vec![
        Line::from(Span::styled("RadioRadioX", app.palette.title)),
        Line::from(Span::styled("Your Sound, Your Station", app.palette.muted)),
    ])
    .alignment(Alignment::Center);
    f.render_widget(logo, chunks[1]);

    if let Some(current) = app.onboarding.step().number() {
        let dots: Vec<Span> = (1..=3)
            .map(|n| {
                if n == current {
                    Span::styled("● ", app.palette.title)
                } else {
                    Span::styled("○ ", app.palette.muted)
                }
            })
            .collect();
        f.render_widget(
            Paragraph::new(Line::from(dots)).alignment(Alignment::Center),
            chunks[2],
        );
    }

    let body = Paragraph::new(step_lines(app))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(body, chunks[3]);

    if let Some(error) = &app.onboarding_error {
        let error = Paragraph::new(Span::styled(error.as_str(), app.palette.error))
            .alignment(Alignment::Center);
        f.render_widget(error, chunks[4]);
    }

    if matches!(
        app.onboarding.step(),
        OnboardingStep::Welcome | OnboardingStep::NameEntry | OnboardingStep::EmailEntry
    ) {
        let buttons = Paragraph::new(vec![
            Line::from(Span::styled(
                format!("  {} [Enter]  ", app.onboarding.continue_label()),
                app.palette.button,
            )),
            Line::from(""),
            Line::from(Span::styled("Skip for now [Esc]", app.palette.muted)),
        ])
        .alignment(Alignment::Center);
        f.render_widget(buttons, chunks[5]);
    }
}

fn step_lines(app: &App) -> Vec<Line<'_>> {
    let palette = &app.palette;
    let flow = &app.onboarding;

    match flow.step() {
        OnboardingStep::Welcome => {
            let mut lines = vec![
                Line::from(Span::styled("Welcome to RadioRadioX", palette.title)),
                Line::from(""),
                Line::from(Span::styled(
                    "Stream live radio, share with friends, and connect with the RadioRadioX community.",
                    palette.text,
                )),
                Line::from(""),
            ];
            lines.extend(FEATURES.iter().map(|(icon, label)| {
                Line::from(vec![
                    Span::raw(format!("{}  ", icon)),
                    Span::styled(*label, palette.text),
                ])
            }));
            lines
        }
        OnboardingStep::NameEntry => input_lines(
            app,
            "What's your name?",
            "Help us personalize your experience",
            flow.name(),
            "Enter your name",
        ),
        OnboardingStep::EmailEntry => input_lines(
            app,
            "Magic Link Login",
            "Enter your email to receive a secure login link",
            flow.email(),
            "Enter your email",
        ),
        OnboardingStep::Sent | OnboardingStep::Completed => vec![
            Line::from(Span::styled("✉", palette.title)),
            Line::from(""),
            Line::from(Span::styled("Check Your Email!", palette.title)),
            Line::from(Span::styled(
                format!(
                    "We've sent a magic link to {}. Click the link to complete your login.",
                    flow.email()
                ),
                palette.text,
            )),
            Line::from(""),
            Line::from(Span::styled(
                "(Demo mode: Auto-signing you in...)",
                palette.muted,
            )),
        ],
    }
}

fn input_lines<'a>(
    app: &'a App,
    title: &'a str,
    subtitle: &'a str,
    value: &'a str,
    placeholder: &'a str,
) -> Vec<Line<'a>> {
    let field = if value.is_empty() {
        Line::from(vec![
            Span::styled(placeholder, app.palette.placeholder),
            Span::styled("▏", app.palette.title),
        ])
    } else {
        Line::from(vec![
            Span::styled(value, app.palette.input_focused),
            Span::styled("▏", app.palette.title),
        ])
    };

    vec![
        Line::from(Span::styled(title, app.palette.title)),
        Line::from(Span::styled(subtitle, app.palette.muted)),
        Line::from(""),
        Line::from(""),
        field,
    ]
}
