use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Stream request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Stream returned HTTP status {0}")]
    HttpStatus(u16),

    #[error("Unsupported or corrupt stream: {0}")]
    Decode(String),

    #[error("Audio output unavailable: {0}")]
    Output(String),

    #[error("Stream ended")]
    Ended,

    #[error("No stream loaded")]
    NotLoaded,
}

// ============================================================================
// Handle Contract
// ============================================================================

/// Snapshot of what the audio backend is actually doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandleStatus {
    pub is_loaded: bool,
    pub is_playing: bool,
}

/// Callbacks from a handle, delivered through the channel given at open.
#[derive(Debug, Clone, PartialEq)]
pub enum HandleEvent {
    Status(HandleStatus),
    Error(String),
}

/// A live stream that can be started, paused and released.
///
/// Methods return immediately; the effect is reported later through a
/// [`HandleEvent::Status`].
pub trait StreamHandle: Send {
    fn status(&self) -> HandleStatus;
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self) -> Result<(), PlaybackError>;
    fn set_volume(&mut self, volume: f32) -> Result<(), PlaybackError>;
    /// Releases the stream and audio device. Safe to call more than once.
    fn unload(&mut self);
}

/// Opens streams. Playback is requested immediately at `volume`.
#[async_trait]
pub trait StreamOpener: Send + Sync {
    type Handle: StreamHandle;

    async fn open(
        &self,
        url: &str,
        volume: f32,
        events: UnboundedSender<HandleEvent>,
    ) -> Result<Self::Handle, PlaybackError>;
}
