//! RadioRadioX terminal client.
//!
//! The library holds everything the binary drives:
//!
//! - [`feed`] - fetches the station blog RSS and normalizes it into [`feed::Post`]s
//! - [`playback`] - the live stream: controller, handle seam, HTTP/symphonia/cpal backend
//! - [`auth`] - the listener profile persisted in [`storage`]
//! - [`onboarding`] - the first-run wizard
//! - [`talkback`] and [`share`] - the feedback form and the canned share messages
//! - [`app`] and [`ui`] - application state and the ratatui front end

pub mod app;
pub mod auth;
pub mod config;
pub mod feed;
pub mod onboarding;
pub mod playback;
pub mod share;
pub mod storage;
pub mod talkback;
pub mod theme;
pub mod ui;
pub mod util;
