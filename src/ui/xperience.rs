use crate::app::{App, FeedState};
use crate::feed::Post;
use crate::theme::ColorPalette;
use crate::util::truncate_to_width;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Braille spinner shown while the feed loads.
pub(super) const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Render the Xperience tab: the station blog feed.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.palette.panel_border)
        .title(Span::styled(" Xperience ", app.palette.title))
        .title_bottom(Line::from(Span::styled(" [r] refresh ", app.palette.muted)).right_aligned());
    let inner = block.inner(area);
    f.render_widget(block, area);

    match &app.feed {
        FeedState::Loading => render_loading(f, app, inner),
        FeedState::Failed(error) => render_error(f, app, inner, error),
        FeedState::Loaded(posts) if posts.is_empty() => {
            let msg = Paragraph::new(Span::styled("No posts yet.", app.palette.muted))
                .alignment(Alignment::Center);
            f.render_widget(msg, centered_rows(inner, 1));
        }
        FeedState::Loaded(posts) => render_posts(f, app, inner, posts),
    }
}

fn render_loading(f: &mut Frame, app: &App, area: Rect) {
    let spinner = SPINNER[app.spinner_frame % SPINNER.len()];
    let msg = Paragraph::new(Line::from(vec![
        Span::styled(spinner, app.palette.title),
        Span::styled(" Loading Xperience...", app.palette.muted),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(msg, centered_rows(area, 1));
}

fn render_error(f: &mut Frame, app: &App, area: Rect, error: &str) {
    let lines = vec![
        Line::from(Span::styled("⚠", app.palette.error)),
        Line::from(""),
        Line::from(Span::styled("Unable to Load Xperience", app.palette.title)),
        Line::from(Span::styled(
            "Please check your internet connection and try again.",
            app.palette.text,
        )),
        Line::from(""),
        Line::from(Span::styled(
            truncate_to_width(error, area.width.saturating_sub(2) as usize).into_owned(),
            app.palette.muted,
        )),
        Line::from(""),
        Line::from(Span::styled("  [r] Retry  ", app.palette.button)),
    ];
    let height = lines.len() as u16;
    let panel = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(panel, centered_rows(area, height));
}

fn render_posts(f: &mut Frame, app: &App, area: Rect, posts: &[Post]) {
    let width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = posts
        .iter()
        .enumerate()
        .map(|(i, post)| post_item(post, i == app.selected_post, width, &app.palette))
        .collect();

    let mut state = ListState::default().with_selected(Some(app.selected_post));
    let list = List::new(items).highlight_style(app.palette.post_selected);
    f.render_stateful_widget(list, area, &mut state);
}

/// Five lines per post: category and date, title, excerpt, author, gap.
fn post_item(post: &Post, selected: bool, width: usize, palette: &ColorPalette) -> ListItem<'static> {
    let marker = if selected { "▌ " } else { "  " };
    let fit = |s: &str| truncate_to_width(s, width.saturating_sub(2)).into_owned();

    let mut meta = vec![Span::styled(marker, palette.title)];
    if !post.category.is_empty() {
        meta.push(Span::styled(fit(&post.category), palette.category));
    }
    if !post.date.is_empty() {
        if !post.category.is_empty() {
            meta.push(Span::styled("  ·  ", palette.muted));
        }
        meta.push(Span::styled(post.date.clone(), palette.muted));
    }

    let lines = vec![
        Line::from(meta),
        Line::from(vec![
            Span::styled(marker, palette.title),
            Span::styled(fit(&post.title), palette.post_title),
        ]),
        Line::from(vec![
            Span::styled(marker, palette.title),
            Span::styled(fit(&post.excerpt), palette.text),
        ]),
        Line::from(vec![
            Span::styled(marker, palette.title),
            Span::styled(fit(&format!("By {}", post.author)), palette.author),
        ]),
        Line::from(""),
    ];
    ListItem::new(lines)
}

/// A full-width strip of `height` rows centered vertically in `area`.
fn centered_rows(area: Rect, height: u16) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height.min(area.height)),
            Constraint::Min(0),
        ])
        .split(area);
    chunks[1]
}
