//! Live HTTP audio stream.
//!
//! The response body is pumped by a tokio task into a bounded channel. A
//! dedicated OS thread reads that channel as a blocking byte source, decodes
//! with symphonia and feeds the cpal output it owns (cpal streams are not
//! `Send`). The handle talks to that thread only through atomics.

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use symphonia::core::io::{MediaSource, ReadOnlySource};
use tokio::sync::mpsc::{self, UnboundedSender};

use super::decoder::{FrameAdapter, StreamDecoder};
use super::handle::{HandleEvent, HandleStatus, PlaybackError, StreamHandle, StreamOpener};
use super::output::{AudioOutput, OutputControls};

/// Body chunks buffered between the network task and the decoder.
const CHUNK_QUEUE: usize = 64;

type Chunk = Result<Vec<u8>, String>;

// ============================================================================
// Opener
// ============================================================================

pub struct HttpStreamOpener {
    client: reqwest::Client,
}

impl HttpStreamOpener {
    /// `client` must not carry a total request timeout; the body never ends.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StreamOpener for HttpStreamOpener {
    type Handle = StreamPlayer;

    async fn open(
        &self,
        url: &str,
        volume: f32,
        events: UnboundedSender<HandleEvent>,
    ) -> Result<StreamPlayer, PlaybackError> {
        tracing::info!(url = %url, "Opening stream");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(PlaybackError::HttpStatus(response.status().as_u16()));
        }

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let (chunk_tx, chunk_rx) = mpsc::channel(CHUNK_QUEUE);
        let pump = tokio::spawn(pump_body(response, chunk_tx));

        let shared = Arc::new(Shared::new(volume));
        let reader = ChannelReader::new(chunk_rx);
        let thread = {
            let shared = shared.clone();
            let events = events.clone();
            std::thread::Builder::new()
                .name("radiox-audio".to_string())
                .spawn(move || decode_thread(reader, mime, shared, events))
        };
        let thread = match thread {
            Ok(t) => t,
            Err(e) => {
                pump.abort();
                return Err(PlaybackError::Output(format!("Failed to start audio thread: {}", e)));
            }
        };

        Ok(StreamPlayer {
            shared,
            events,
            pump: Some(pump),
            thread: Some(thread),
        })
    }
}

async fn pump_body(response: reqwest::Response, tx: mpsc::Sender<Chunk>) {
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map(|b| b.to_vec()).map_err(|e| e.to_string());
        let failed = chunk.is_err();
        // Receiver gone means the decoder stopped
        if tx.send(chunk).await.is_err() || failed {
            break;
        }
    }
    tracing::debug!("Stream body finished");
}

// ============================================================================
// Blocking Reader
// ============================================================================

/// Presents the chunk channel as a blocking `Read` for symphonia.
struct ChannelReader {
    rx: Mutex<mpsc::Receiver<Chunk>>,
    buf: Vec<u8>,
    pos: usize,
}

impl ChannelReader {
    fn new(rx: mpsc::Receiver<Chunk>) -> Self {
        Self {
            rx: Mutex::new(rx),
            buf: Vec::new(),
            pos: 0,
        }
    }
}

impl Read for ChannelReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        while self.pos >= self.buf.len() {
            match self.rx.get_mut().blocking_recv() {
                Some(Ok(chunk)) => {
                    self.buf = chunk;
                    self.pos = 0;
                }
                Some(Err(e)) => return Err(io::Error::other(e)),
                None => return Ok(0),
            }
        }

        let n = out.len().min(self.buf.len() - self.pos);
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

// ============================================================================
// Decode Thread
// ============================================================================

struct Shared {
    controls: OutputControls,
    loaded: AtomicBool,
    shutdown: AtomicBool,
}

impl Shared {
    fn new(volume: f32) -> Self {
        Self {
            controls: OutputControls {
                volume: Arc::new(Mutex::new(volume.clamp(0.0, 1.0))),
                playing: Arc::new(AtomicBool::new(true)),
                flush: Arc::new(AtomicBool::new(false)),
            },
            loaded: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
        }
    }

    fn status(&self) -> HandleStatus {
        let is_loaded = self.loaded.load(Ordering::SeqCst);
        HandleStatus {
            is_loaded,
            is_playing: is_loaded && self.controls.playing.load(Ordering::SeqCst),
        }
    }
}

fn decode_thread(
    reader: ChannelReader,
    mime: Option<String>,
    shared: Arc<Shared>,
    events: UnboundedSender<HandleEvent>,
) {
    let result = run_decoder(reader, mime.as_deref(), &shared, &events);
    shared.loaded.store(false, Ordering::SeqCst);

    if shared.shutdown.load(Ordering::SeqCst) {
        tracing::debug!("Audio thread stopped");
        return;
    }
    if let Err(e) = result {
        let _ = events.send(HandleEvent::Error(e.to_string()));
    }
}

fn run_decoder(
    reader: ChannelReader,
    mime: Option<&str>,
    shared: &Shared,
    events: &UnboundedSender<HandleEvent>,
) -> Result<(), PlaybackError> {
    let source: Box<dyn MediaSource> = Box::new(ReadOnlySource::new(reader));
    let mut decoder = StreamDecoder::open(source, mime)?;
    let mut output = AudioOutput::open(decoder.sample_rate(), shared.controls.clone())?;
    let mut adapter = FrameAdapter::new(
        decoder.sample_rate(),
        decoder.channels(),
        output.sample_rate(),
        output.channels() as usize,
    );

    shared.loaded.store(true, Ordering::SeqCst);
    let _ = events.send(HandleEvent::Status(shared.status()));
    tracing::info!(
        source_rate = decoder.sample_rate(),
        output_rate = output.sample_rate(),
        resampling = !adapter.is_passthrough(),
        "Stream loaded"
    );

    while !shared.shutdown.load(Ordering::Relaxed) {
        match decoder.decode_next()? {
            Some(samples) => {
                let samples = adapter.process(&samples);
                output.write_blocking(&samples, &shared.shutdown);
            }
            None => return Err(PlaybackError::Ended),
        }
    }
    Ok(())
}

// ============================================================================
// Handle
// ============================================================================

pub struct StreamPlayer {
    shared: Arc<Shared>,
    events: UnboundedSender<HandleEvent>,
    pump: Option<tokio::task::JoinHandle<()>>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl StreamPlayer {
    fn ensure_loaded(&self) -> Result<(), PlaybackError> {
        if self.shared.loaded.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PlaybackError::NotLoaded)
        }
    }

    fn set_playing(&mut self, playing: bool) -> Result<(), PlaybackError> {
        self.ensure_loaded()?;
        if playing {
            self.shared.controls.flush.store(true, Ordering::SeqCst);
        }
        self.shared.controls.playing.store(playing, Ordering::SeqCst);
        let _ = self.events.send(HandleEvent::Status(self.shared.status()));
        Ok(())
    }
}

impl StreamHandle for StreamPlayer {
    fn status(&self) -> HandleStatus {
        self.shared.status()
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        self.set_playing(true)
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        self.set_playing(false)
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), PlaybackError> {
        if self.shared.shutdown.load(Ordering::SeqCst) {
            return Err(PlaybackError::NotLoaded);
        }
        *self.shared.controls.volume.lock() = volume.clamp(0.0, 1.0);
        Ok(())
    }

    fn unload(&mut self) {
        if self.shared.shutdown.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.controls.playing.store(false, Ordering::SeqCst);
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        // The thread exits once the aborted pump closes its channel
        if let Some(thread) = self.thread.take() {
            if thread.is_finished() {
                let _ = thread.join();
            }
        }
        tracing::info!("Stream unloaded");
    }
}

impl Drop for StreamPlayer {
    fn drop(&mut self) {
        self.unload();
    }
}
