// Audio output using cpal
// Pulls samples from a ring buffer filled by the decode thread

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig, SupportedStreamConfig};
use parking_lot::Mutex;
use ringbuf::{
    traits::{Consumer, Producer, Split},
    HeapRb,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::handle::PlaybackError;

const RING_BUFFER_SIZE: usize = 48000 * 2 / 2; // ~500ms of stereo audio at 48kHz

type RingProducer = ringbuf::HeapProd<f32>;
type RingConsumer = ringbuf::HeapCons<f32>;

/// Controls shared between the handle, the decode thread and the device
/// callback.
#[derive(Debug, Clone)]
pub struct OutputControls {
    pub volume: Arc<Mutex<f32>>,
    pub playing: Arc<AtomicBool>,
    /// Set to drop everything queued, so a resumed stream is live again.
    pub flush: Arc<AtomicBool>,
}

/// An open output device. Not `Send`: lives on the decode thread.
pub struct AudioOutput {
    _stream: Stream,
    producer: RingProducer,
    sample_rate: u32,
    channels: u16,
}

impl AudioOutput {
    /// Open the default device, at `preferred_rate` when it supports it.
    pub fn open(preferred_rate: u32, controls: OutputControls) -> Result<Self, PlaybackError> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| PlaybackError::Output("No output device available".to_string()))?;

        let config = Self::pick_config(&device, preferred_rate)?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();

        let rb = HeapRb::<f32>::new(RING_BUFFER_SIZE);
        let (producer, consumer) = rb.split();

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &config.into(),
                consumer,
                controls,
            )?,
            cpal::SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &config.into(),
                consumer,
                controls,
            )?,
            cpal::SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &config.into(),
                consumer,
                controls,
            )?,
            format => {
                return Err(PlaybackError::Output(format!(
                    "Unsupported sample format: {:?}",
                    format
                )))
            }
        };

        stream
            .play()
            .map_err(|e| PlaybackError::Output(format!("Failed to start stream: {}", e)))?;

        tracing::debug!(sample_rate, channels, "Audio output opened");

        Ok(Self {
            _stream: stream,
            producer,
            sample_rate,
            channels,
        })
    }

    fn pick_config(
        device: &cpal::Device,
        preferred_rate: u32,
    ) -> Result<SupportedStreamConfig, PlaybackError> {
        let default = device
            .default_output_config()
            .map_err(|e| PlaybackError::Output(format!("Failed to get default output config: {}", e)))?;

        if default.sample_rate().0 == preferred_rate {
            return Ok(default);
        }

        let matching = device.supported_output_configs().ok().and_then(|mut configs| {
            configs.find(|c| {
                c.channels() == default.channels()
                    && c.sample_format() == default.sample_format()
                    && c.min_sample_rate().0 <= preferred_rate
                    && preferred_rate <= c.max_sample_rate().0
            })
        });

        Ok(match matching {
            Some(range) => range.with_sample_rate(SampleRate(preferred_rate)),
            None => default,
        })
    }

    fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
        device: &cpal::Device,
        config: &StreamConfig,
        mut consumer: RingConsumer,
        controls: OutputControls,
    ) -> Result<Stream, PlaybackError> {
        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    if controls.flush.swap(false, Ordering::SeqCst) {
                        while consumer.try_pop().is_some() {}
                    }

                    if !controls.playing.load(Ordering::Relaxed) {
                        data.fill(T::from_sample(0.0));
                        return;
                    }

                    let vol = *controls.volume.lock();
                    for sample in data.iter_mut() {
                        let value = consumer.try_pop().unwrap_or(0.0) * vol;
                        *sample = T::from_sample(value);
                    }
                },
                move |err| {
                    tracing::warn!(error = %err, "Audio output error");
                },
                None,
            )
            .map_err(|e| PlaybackError::Output(format!("Failed to build output stream: {}", e)))?;

        Ok(stream)
    }

    /// Write samples, waiting for space. Gives up early when `cancel` is set.
    pub fn write_blocking(&mut self, samples: &[f32], cancel: &AtomicBool) {
        let mut remaining = samples;

        while !remaining.is_empty() {
            if cancel.load(Ordering::Relaxed) {
                return;
            }
            let written = self.producer.push_slice(remaining);
            if written > 0 {
                remaining = &remaining[written..];
            } else {
                std::thread::sleep(std::time::Duration::from_millis(5));
            }
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}
