//! Station palette for the TUI.
//!
//! Brand colors are true-color RGB; terminals without 24-bit support
//! approximate them. `ColorPalette` maps each semantic UI role to a `Style`
//! so widgets never name raw colors.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Brand Colors
// ============================================================================

pub const PRIMARY: Color = Color::Rgb(0x00, 0x00, 0x00);
pub const PRIMARY_TEXT: Color = Color::Rgb(0xdd, 0x33, 0x33);
pub const SECONDARY_TEXT: Color = Color::Rgb(0xa5, 0x0d, 0x12);
pub const SECONDARY: Color = Color::Rgb(0xf5, 0xf5, 0xf5);
pub const TERTIARY: Color = Color::Rgb(0x60, 0x6c, 0x76);
pub const ALTERNATE: Color = Color::Rgb(0x10, 0x10, 0x10);
pub const SUCCESS: Color = Color::Rgb(0x04, 0xa2, 0x4c);
pub const ERROR: Color = Color::Rgb(0xe2, 0x1c, 0x3d);
pub const WARNING: Color = Color::Rgb(0xfa, 0xcd, 0x0c);
pub const INFO: Color = Color::Rgb(0x1c, 0x4d, 0x94);

// ============================================================================
// Color Palette: semantic roles to Style
// ============================================================================

#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Chrome --
    pub background: Style,
    pub title: Style,
    pub text: Style,
    pub muted: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub status_bar: Style,

    // -- Radio --
    pub live: Style,
    pub paused: Style,
    pub button: Style,
    pub volume_fill: Style,
    pub volume_track: Style,

    // -- Feed --
    pub category: Style,
    pub post_title: Style,
    pub post_selected: Style,
    pub author: Style,

    // -- Forms --
    pub input: Style,
    pub input_focused: Style,
    pub placeholder: Style,
    pub choice_active: Style,

    // -- Feedback --
    pub error: Style,
    pub warning: Style,
    pub success: Style,
    pub info: Style,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::radio()
    }
}

impl ColorPalette {
    /// Red on black, as the station site.
    pub fn radio() -> Self {
        Self {
            background: Style::default().bg(PRIMARY).fg(SECONDARY),
            title: Style::default()
                .fg(PRIMARY_TEXT)
                .add_modifier(Modifier::BOLD),
            text: Style::default().fg(SECONDARY),
            muted: Style::default().fg(TERTIARY),
            panel_border: Style::default().fg(TERTIARY),
            panel_border_focused: Style::default().fg(PRIMARY_TEXT),
            tab_active: Style::default()
                .fg(PRIMARY_TEXT)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(TERTIARY),
            status_bar: Style::default().bg(ALTERNATE).fg(SECONDARY),

            live: Style::default()
                .fg(PRIMARY_TEXT)
                .add_modifier(Modifier::BOLD),
            paused: Style::default().fg(TERTIARY),
            button: Style::default()
                .bg(PRIMARY_TEXT)
                .fg(SECONDARY)
                .add_modifier(Modifier::BOLD),
            volume_fill: Style::default().fg(PRIMARY_TEXT).bg(ALTERNATE),
            volume_track: Style::default().fg(TERTIARY),

            category: Style::default()
                .fg(PRIMARY_TEXT)
                .add_modifier(Modifier::BOLD),
            post_title: Style::default()
                .fg(SECONDARY)
                .add_modifier(Modifier::BOLD),
            post_selected: Style::default().bg(ALTERNATE),
            author: Style::default().fg(SECONDARY_TEXT),

            input: Style::default().fg(SECONDARY).bg(ALTERNATE),
            input_focused: Style::default()
                .fg(SECONDARY)
                .bg(ALTERNATE)
                .add_modifier(Modifier::BOLD),
            placeholder: Style::default().fg(TERTIARY).bg(ALTERNATE),
            choice_active: Style::default()
                .bg(PRIMARY_TEXT)
                .fg(SECONDARY)
                .add_modifier(Modifier::BOLD),

            error: Style::default().fg(ERROR),
            warning: Style::default().fg(WARNING),
            success: Style::default().fg(SUCCESS),
            info: Style::default().fg(INFO),
        }
    }
}
