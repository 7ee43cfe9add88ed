use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::handle::{HandleEvent, HandleStatus, PlaybackError, StreamHandle, StreamOpener};

/// Lifecycle of the live stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPhase {
    Idle,
    Loading,
    Playing,
    Paused,
    Error,
}

/// What the Radio screen renders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_loading: bool,
    /// Always within [0, 1].
    pub volume: f32,
}

/// Owns the stream handle and the only copy of [`PlaybackState`].
///
/// Opening is split into [`begin_loading`](Self::begin_loading) and
/// [`attach`](Self::attach) so the open can run on a spawned task while the
/// UI keeps drawing; [`initialize`](Self::initialize) does both in place.
pub struct PlaybackController<H: StreamHandle> {
    phase: PlayerPhase,
    state: PlaybackState,
    handle: Option<H>,
    events_tx: UnboundedSender<HandleEvent>,
    events_rx: UnboundedReceiver<HandleEvent>,
    last_error: Option<String>,
}

impl<H: StreamHandle> PlaybackController<H> {
    pub fn new(initial_volume: f32) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let volume = if initial_volume.is_nan() {
            1.0
        } else {
            initial_volume.clamp(0.0, 1.0)
        };
        Self {
            phase: PlayerPhase::Idle,
            state: PlaybackState {
                is_playing: false,
                is_loading: false,
                volume,
            },
            handle: None,
            events_tx,
            events_rx,
            last_error: None,
        }
    }

    pub fn phase(&self) -> PlayerPhase {
        self.phase
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn volume(&self) -> f32 {
        self.state.volume
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Opens the stream and attaches the result.
    pub async fn initialize<O>(&mut self, opener: &O, url: &str)
    where
        O: StreamOpener<Handle = H>,
    {
        let events = self.begin_loading();
        let result = opener.open(url, self.state.volume, events).await;
        self.attach(result);
    }

    /// Enters `Loading` and returns the sender the opener must report through.
    pub fn begin_loading(&mut self) -> UnboundedSender<HandleEvent> {
        self.phase = PlayerPhase::Loading;
        self.state.is_loading = true;
        self.state.is_playing = false;
        self.last_error = None;
        tracing::debug!("Stream loading");
        self.events_tx.clone()
    }

    /// Adopts the outcome of an open started with [`Self::begin_loading`].
    ///
    /// Stays in `Loading` until the handle's first status callback.
    pub fn attach(&mut self, result: Result<H, PlaybackError>) {
        match result {
            Ok(handle) => {
                if let Some(mut previous) = self.handle.replace(handle) {
                    previous.unload();
                }
                tracing::info!("Stream handle attached");
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    /// Applies every queued handle callback. Returns true if anything changed.
    pub fn pump_events(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                HandleEvent::Status(status) => self.apply_status(status),
                HandleEvent::Error(message) => self.fail(message),
            }
            changed = true;
        }
        changed
    }

    fn apply_status(&mut self, status: HandleStatus) {
        if self.phase == PlayerPhase::Error {
            return;
        }
        // Media dropped out from under a live stream: back to buffering
        if !status.is_loaded {
            self.state.is_playing = false;
            if matches!(self.phase, PlayerPhase::Playing | PlayerPhase::Paused) {
                self.phase = PlayerPhase::Loading;
                self.state.is_loading = true;
            }
            return;
        }
        self.state.is_loading = false;
        self.state.is_playing = status.is_playing;
        self.phase = if status.is_playing {
            PlayerPhase::Playing
        } else {
            PlayerPhase::Paused
        };
    }

    fn fail(&mut self, message: String) {
        tracing::error!(error = %message, "Playback error");
        self.phase = PlayerPhase::Error;
        self.state.is_loading = false;
        self.state.is_playing = false;
        self.last_error = Some(message);
    }

    /// Pauses when playing, plays otherwise. No-op until media is loaded.
    pub fn toggle_play_pause(&mut self) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        let status = handle.status();
        if !status.is_loaded {
            return;
        }

        let result = if status.is_playing {
            handle.pause()
        } else {
            handle.play()
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Play/pause request failed");
        }
    }

    /// Clamps to [0, 1], stores, and forwards to the handle. NaN is ignored.
    pub fn set_volume(&mut self, volume: f32) {
        if volume.is_nan() {
            tracing::debug!("Ignoring NaN volume");
            return;
        }
        self.state.volume = volume.clamp(0.0, 1.0);

        if let Some(handle) = self.handle.as_mut() {
            if let Err(e) = handle.set_volume(self.state.volume) {
                tracing::warn!(error = %e, "Failed to apply volume");
            }
        }
    }
}

impl<H: StreamHandle> Drop for PlaybackController<H> {
    fn drop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.unload();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use proptest::prelude::*;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct FakeState {
        status: HandleStatus,
        volume: Option<f32>,
        unloaded: bool,
        fail_volume: bool,
    }

    struct FakeHandle {
        state: Arc<Mutex<FakeState>>,
        events: UnboundedSender<HandleEvent>,
    }

    impl FakeHandle {
        fn set_playing(&mut self, playing: bool) {
            let status = {
                let mut state = self.state.lock();
                state.status.is_playing = playing;
                state.status
            };
            let _ = self.events.send(HandleEvent::Status(status));
        }
    }

    impl StreamHandle for FakeHandle {
        fn status(&self) -> HandleStatus {
            self.state.lock().status
        }

        fn play(&mut self) -> Result<(), PlaybackError> {
            self.set_playing(true);
            Ok(())
        }

        fn pause(&mut self) -> Result<(), PlaybackError> {
            self.set_playing(false);
            Ok(())
        }

        fn set_volume(&mut self, volume: f32) -> Result<(), PlaybackError> {
            let mut state = self.state.lock();
            if state.fail_volume {
                return Err(PlaybackError::NotLoaded);
            }
            state.volume = Some(volume);
            Ok(())
        }

        fn unload(&mut self) {
            self.state.lock().unloaded = true;
        }
    }

    struct FakeOpener {
        state: Arc<Mutex<FakeState>>,
        fail: bool,
    }

    #[async_trait]
    impl StreamOpener for FakeOpener {
        type Handle = FakeHandle;

        async fn open(
            &self,
            _url: &str,
            volume: f32,
            events: UnboundedSender<HandleEvent>,
        ) -> Result<FakeHandle, PlaybackError> {
            if self.fail {
                return Err(PlaybackError::HttpStatus(503));
            }
            self.state.lock().volume = Some(volume);
            Ok(FakeHandle {
                state: self.state.clone(),
                events,
            })
        }
    }

    fn opener() -> (FakeOpener, Arc<Mutex<FakeState>>) {
        let state = Arc::new(Mutex::new(FakeState::default()));
        (
            FakeOpener {
                state: state.clone(),
                fail: false,
            },
            state,
        )
    }

    /// Simulates the backend finishing its buffering.
    fn report_loaded(controller: &PlaybackController<FakeHandle>, state: &Arc<Mutex<FakeState>>) {
        let status = {
            let mut s = state.lock();
            s.status = HandleStatus {
                is_loaded: true,
                is_playing: true,
            };
            s.status
        };
        controller
            .events_tx
            .send(HandleEvent::Status(status))
            .unwrap();
    }

    #[tokio::test]
    async fn test_initialize_loading_then_playing() {
        let (opener, state) = opener();
        let mut controller = PlaybackController::new(0.5);
        controller.initialize(&opener, "http://radio.test/s").await;

        assert_eq!(controller.phase(), PlayerPhase::Loading);
        assert!(controller.state().is_loading);
        assert_eq!(state.lock().volume, Some(0.5));

        report_loaded(&controller, &state);
        assert!(controller.pump_events());
        assert_eq!(controller.phase(), PlayerPhase::Playing);
        assert!(!controller.state().is_loading);
        assert!(controller.state().is_playing);
    }

    #[tokio::test]
    async fn test_open_failure_moves_to_error() {
        let (mut opener, _) = opener();
        opener.fail = true;
        let mut controller = PlaybackController::new(1.0);
        controller.initialize(&opener, "http://radio.test/s").await;

        assert_eq!(controller.phase(), PlayerPhase::Error);
        assert!(!controller.state().is_loading);
        assert!(controller.last_error().is_some());
    }

    #[tokio::test]
    async fn test_async_error_callback_moves_to_error() {
        let (opener, state) = opener();
        let mut controller = PlaybackController::new(1.0);
        controller.initialize(&opener, "http://radio.test/s").await;
        report_loaded(&controller, &state);
        controller
            .events_tx
            .send(HandleEvent::Error("connection reset".to_string()))
            .unwrap();

        controller.pump_events();
        assert_eq!(controller.phase(), PlayerPhase::Error);
        assert!(!controller.state().is_playing);
        assert_eq!(controller.last_error(), Some("connection reset"));
    }

    #[tokio::test]
    async fn test_unloaded_status_returns_to_loading() {
        let (opener, state) = opener();
        let mut controller = PlaybackController::new(1.0);
        controller.initialize(&opener, "http://radio.test/s").await;
        report_loaded(&controller, &state);
        controller.pump_events();
        assert_eq!(controller.phase(), PlayerPhase::Playing);

        controller
            .events_tx
            .send(HandleEvent::Status(HandleStatus {
                is_loaded: false,
                is_playing: false,
            }))
            .unwrap();
        controller.pump_events();

        assert_eq!(controller.phase(), PlayerPhase::Loading);
        assert!(controller.state().is_loading);
        assert!(!controller.state().is_playing);

        report_loaded(&controller, &state);
        controller.pump_events();
        assert_eq!(controller.phase(), PlayerPhase::Playing);
        assert!(!controller.state().is_loading);
    }

    #[tokio::test]
    async fn test_toggle_pauses_and_resumes() {
        let (opener, state) = opener();
        let mut controller = PlaybackController::new(1.0);
        controller.initialize(&opener, "http://radio.test/s").await;
        report_loaded(&controller, &state);
        controller.pump_events();

        controller.toggle_play_pause();
        controller.pump_events();
        assert_eq!(controller.phase(), PlayerPhase::Paused);
        assert!(!controller.state().is_playing);

        controller.toggle_play_pause();
        controller.pump_events();
        assert_eq!(controller.phase(), PlayerPhase::Playing);
    }

    #[tokio::test]
    async fn test_toggle_before_loaded_is_noop() {
        let (opener, state) = opener();
        let mut controller = PlaybackController::new(1.0);
        controller.toggle_play_pause();
        assert_eq!(controller.phase(), PlayerPhase::Idle);

        controller.initialize(&opener, "http://radio.test/s").await;
        controller.toggle_play_pause();
        assert!(!controller.pump_events());
        assert!(!state.lock().status.is_playing);
    }

    #[tokio::test]
    async fn test_volume_forwarded_and_failure_ignored() {
        let (opener, state) = opener();
        let mut controller = PlaybackController::new(1.0);
        controller.initialize(&opener, "http://radio.test/s").await;

        controller.set_volume(0.3);
        assert_eq!(state.lock().volume, Some(0.3));

        state.lock().fail_volume = true;
        controller.set_volume(0.7);
        assert_eq!(controller.volume(), 0.7);
        assert_eq!(controller.phase(), PlayerPhase::Loading);
    }

    #[test]
    fn test_nan_volume_ignored() {
        let mut controller = PlaybackController::<FakeHandle>::new(0.4);
        controller.set_volume(f32::NAN);
        assert_eq!(controller.volume(), 0.4);
    }

    #[tokio::test]
    async fn test_drop_unloads_handle() {
        let (opener, state) = opener();
        let mut controller = PlaybackController::new(1.0);
        controller.initialize(&opener, "http://radio.test/s").await;
        drop(controller);

        assert!(state.lock().unloaded);
    }

    proptest! {
        #[test]
        fn prop_volume_clamped_to_nearest_bound(v in proptest::num::f32::ANY) {
            let mut controller = PlaybackController::<FakeHandle>::new(0.5);
            controller.set_volume(v);
            let stored = controller.volume();
            if v.is_nan() {
                prop_assert_eq!(stored, 0.5);
            } else if v < 0.0 {
                prop_assert_eq!(stored, 0.0);
            } else if v > 1.0 {
                prop_assert_eq!(stored, 1.0);
            } else {
                prop_assert_eq!(stored, v);
            }
        }
    }
}
