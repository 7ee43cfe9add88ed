//! Live stream playback.
//!
//! - [`PlaybackController`] - play/pause/volume and loading state for the UI
//! - [`StreamHandle`] / [`StreamOpener`] - the seam between the controller and
//!   an audio backend
//! - [`HttpStreamOpener`] - the real backend: reqwest → symphonia → cpal

mod controller;
mod decoder;
mod handle;
mod output;
mod stream;

pub use controller::{PlaybackController, PlaybackState, PlayerPhase};
pub use handle::{HandleEvent, HandleStatus, PlaybackError, StreamHandle, StreamOpener};
pub use stream::{HttpStreamOpener, StreamPlayer};
