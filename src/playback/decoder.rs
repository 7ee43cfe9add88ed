// Stream decoding with Symphonia
// Turns a network byte source into interleaved f32 samples

use symphonia::core::audio::{AudioBufferRef, AudioPlanes, Signal};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

use super::handle::PlaybackError;

pub struct StreamDecoder {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: usize,
}

impl StreamDecoder {
    /// Probe a live source. Blocks until enough bytes have arrived to
    /// identify the container.
    ///
    /// `mime_type` is the response `Content-Type`, used as a probe hint.
    pub fn open(source: Box<dyn MediaSource>, mime_type: Option<&str>) -> Result<Self, PlaybackError> {
        let mss = MediaSourceStream::new(source, Default::default());

        let mut hint = Hint::new();
        if let Some(mime) = mime_type {
            hint.mime_type(mime);
            if let Some(ext) = extension_for_mime(mime) {
                hint.with_extension(ext);
            }
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| PlaybackError::Decode(format!("Failed to probe stream format: {}", e)))?;

        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| PlaybackError::Decode("No audio track found".to_string()))?;

        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
        let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(2);

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| PlaybackError::Decode(format!("Failed to create decoder: {}", e)))?;

        tracing::debug!(sample_rate, channels, "Stream decoder ready");

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Decode the next packet into interleaved f32 samples.
    /// `Ok(None)` means the source ended.
    pub fn decode_next(&mut self) -> Result<Option<Vec<f32>>, PlaybackError> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => return Err(PlaybackError::Decode(format!("Failed to read packet: {}", e))),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => return Ok(Some(audio_buf_to_f32(&decoded))),
                // Live streams often start mid-frame
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::debug!(error = %e, "Skipping undecodable packet");
                    continue;
                }
                Err(e) => return Err(PlaybackError::Decode(format!("Decode failed: {}", e))),
            }
        }
    }
}

fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let essence = mime.split(';').next().unwrap_or(mime).trim();
    match essence {
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/aac" | "audio/aacp" => Some("aac"),
        "audio/ogg" | "application/ogg" => Some("ogg"),
        "audio/mp4" => Some("m4a"),
        _ => None,
    }
}

/// Convert any AudioBufferRef to interleaved f32 samples
fn audio_buf_to_f32(buf: &AudioBufferRef) -> Vec<f32> {
    match buf {
        AudioBufferRef::F32(b) => interleave(b.planes(), b.frames(), |s: f32| s),
        AudioBufferRef::F64(b) => interleave(b.planes(), b.frames(), |s: f64| s as f32),
        AudioBufferRef::S8(b) => interleave(b.planes(), b.frames(), |s: i8| s as f32 / 128.0),
        AudioBufferRef::S16(b) => interleave(b.planes(), b.frames(), |s: i16| s as f32 / 32768.0),
        AudioBufferRef::S24(b) => {
            interleave(b.planes(), b.frames(), |s| s.inner() as f32 / 8388608.0)
        }
        AudioBufferRef::S32(b) => {
            interleave(b.planes(), b.frames(), |s: i32| s as f32 / 2147483648.0)
        }
        AudioBufferRef::U8(b) => {
            interleave(b.planes(), b.frames(), |s: u8| (s as f32 - 128.0) / 128.0)
        }
        AudioBufferRef::U16(b) => {
            interleave(b.planes(), b.frames(), |s: u16| (s as f32 - 32768.0) / 32768.0)
        }
        AudioBufferRef::U24(b) => interleave(b.planes(), b.frames(), |s| {
            (s.inner() as f32 - 8388608.0) / 8388608.0
        }),
        AudioBufferRef::U32(b) => interleave(b.planes(), b.frames(), |s: u32| {
            (s as f64 - 2147483648.0) as f32 / 2147483648.0
        }),
    }
}

fn interleave<T: Sample + Copy, F: Fn(T) -> f32>(
    planes: AudioPlanes<T>,
    frames: usize,
    convert: F,
) -> Vec<f32> {
    let planes = planes.planes();
    if planes.is_empty() || frames == 0 {
        return vec![];
    }

    let mut interleaved = Vec::with_capacity(frames * planes.len());
    for frame in 0..frames {
        for plane in planes {
            interleaved.push(convert(plane[frame]));
        }
    }
    interleaved
}

// ============================================================================
// Format Adaptation
// ============================================================================

/// Maps decoded frames onto the output device's channel count and rate.
///
/// Rate conversion is linear interpolation carried across packet
/// boundaries; it is only used when the device cannot open at the stream's
/// native rate.
#[derive(Debug)]
pub struct FrameAdapter {
    src_channels: usize,
    dst_channels: usize,
    step: f64,
    pos: f64,
    last: Option<Vec<f32>>,
}

impl FrameAdapter {
    pub fn new(src_rate: u32, src_channels: usize, dst_rate: u32, dst_channels: usize) -> Self {
        Self {
            src_channels: src_channels.max(1),
            dst_channels: dst_channels.max(1),
            step: src_rate.max(1) as f64 / dst_rate.max(1) as f64,
            pos: 0.0,
            last: None,
        }
    }

    pub fn is_passthrough(&self) -> bool {
        self.src_channels == self.dst_channels && self.step == 1.0
    }

    pub fn process(&mut self, samples: &[f32]) -> Vec<f32> {
        if self.is_passthrough() {
            return samples.to_vec();
        }

        let frames: Vec<Vec<f32>> = samples
            .chunks_exact(self.src_channels)
            .map(|frame| self.map_channels(frame))
            .collect();

        if self.step == 1.0 {
            return frames.concat();
        }
        self.resample(frames)
    }

    fn map_channels(&self, frame: &[f32]) -> Vec<f32> {
        if self.src_channels == self.dst_channels {
            return frame.to_vec();
        }
        if self.dst_channels == 1 {
            return vec![frame.iter().sum::<f32>() / frame.len() as f32];
        }
        (0..self.dst_channels)
            .map(|ch| frame[ch % frame.len()])
            .collect()
    }

    fn resample(&mut self, frames: Vec<Vec<f32>>) -> Vec<f32> {
        let Some(first) = frames.first() else {
            return vec![];
        };
        let last = self.last.take().unwrap_or_else(|| first.clone());

        let mut combined = Vec::with_capacity(frames.len() + 1);
        combined.push(last);
        combined.extend(frames);
        let n = combined.len() - 1;

        let mut out = Vec::new();
        while self.pos < n as f64 {
            let i = self.pos.floor() as usize;
            let t = (self.pos - i as f64) as f32;
            let (a, b) = (&combined[i], &combined[i + 1]);
            for ch in 0..self.dst_channels {
                out.push(a[ch] * (1.0 - t) + b[ch] * t);
            }
            self.pos += self.step;
        }
        self.pos -= n as f64;
        self.last = combined.pop();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_is_identity() {
        let mut adapter = FrameAdapter::new(44100, 2, 44100, 2);
        assert!(adapter.is_passthrough());
        assert_eq!(adapter.process(&[0.1, 0.2, 0.3, 0.4]), vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_mono_to_stereo_duplicates() {
        let mut adapter = FrameAdapter::new(48000, 1, 48000, 2);
        assert_eq!(adapter.process(&[0.5, -0.5]), vec![0.5, 0.5, -0.5, -0.5]);
    }

    #[test]
    fn test_stereo_to_mono_averages() {
        let mut adapter = FrameAdapter::new(48000, 2, 48000, 1);
        assert_eq!(adapter.process(&[1.0, 0.0, 0.5, 0.5]), vec![0.5, 0.5]);
    }

    #[test]
    fn test_upsampling_doubles_frame_count() {
        let mut adapter = FrameAdapter::new(24000, 1, 48000, 1);
        let mut total = 0;
        for _ in 0..10 {
            total += adapter.process(&[0.0; 100]).len();
        }
        assert!((1990..=2010).contains(&total), "got {total}");
    }

    #[test]
    fn test_interpolates_between_samples() {
        let mut adapter = FrameAdapter::new(1, 1, 2, 1);
        let out = adapter.process(&[0.0, 1.0]);
        assert_eq!(out, vec![0.0, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_mime_hints() {
        assert_eq!(extension_for_mime("audio/mpeg"), Some("mp3"));
        assert_eq!(extension_for_mime("audio/aacp; charset=binary"), Some("aac"));
        assert_eq!(extension_for_mime("text/html"), None);
    }
}
