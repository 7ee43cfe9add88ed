//! Terminal User Interface module.
//!
//! This module provides the TUI for the station client, including:
//! - Main event loop (`run`)
//! - Input handling for the onboarding wizard and each tab
//! - Rendering for the tab bar, tabs, overlays and status bar
//! - Background task event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `helpers` - Background task spawning and link opening
//! - `render` - Screen dispatch, tab bar and overlays
//! - `onboarding` - First-run wizard
//! - `radio` / `xperience` / `share` / `talkback` / `profile` - Tab widgets
//! - `status` - Status bar widget

mod events;
mod helpers;
mod input;
mod loop_runner;
mod onboarding;
mod profile;
mod radio;
mod render;
mod share;
mod status;
mod talkback;
mod xperience;

// Re-export the public API
pub use loop_runner::{run, Action};
