//! Reply playback
//!
//! Decodes the spoken reply in memory with symphonia (the backend
//! answers with MP3; probing is format-agnostic so WAV or OGG replies
//! work too) and plays it through the default cpal output device.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::io::Cursor;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use super::convert;

/// Playback errors
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("no audio output device available")]
    NoDevice,

    #[error("output configuration error: {0}")]
    ConfigError(String),

    #[error("output stream error: {0}")]
    StreamError(String),

    #[error("could not decode the reply audio: {0}")]
    Decode(String),
}

/// Seam between the chat loop and the speakers.
///
/// The production implementation is [`CpalPlayer`]; tests record the
/// bytes the loop asked to play.
pub trait ReplySink: Send {
    /// Play one complete reply, blocking until it has been heard.
    fn play(&mut self, audio: &[u8]) -> Result<(), PlaybackError>;
}

/// Plays replies through the default output device.
pub struct CpalPlayer;

impl ReplySink for CpalPlayer {
    fn play(&mut self, audio: &[u8]) -> Result<(), PlaybackError> {
        let decoded = decode(audio)?;
        let frames = decoded.samples.len() / decoded.channels.max(1) as usize;
        tracing::info!(
            "reply: {:.1}s audio, {}Hz {}ch",
            frames as f32 / decoded.sample_rate.max(1) as f32,
            decoded.sample_rate,
            decoded.channels
        );
        play_decoded(decoded)
    }
}

/// Interleaved f32 samples plus their source format.
#[derive(Debug)]
struct DecodedAudio {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

/// Decode an in-memory audio asset to interleaved f32 samples.
fn decode(bytes: &[u8]) -> Result<DecodedAudio, PlaybackError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| PlaybackError::Decode(format!("unsupported reply format: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PlaybackError::Decode("no audio track in the reply".to_string()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| PlaybackError::Decode("reply has no sample rate".to_string()))?;
    let channels = codec_params.channels.map(|c| c.count()).unwrap_or(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| PlaybackError::Decode(format!("unsupported reply codec: {}", e)))?;

    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(PlaybackError::Decode(format!("error reading reply: {}", e))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::IoError(_)) | Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(PlaybackError::Decode(format!("decode error: {}", e))),
        };

        let spec = *decoded.spec();
        let num_frames = decoded.capacity();

        let sbuf =
            sample_buf.get_or_insert_with(|| SampleBuffer::<f32>::new(num_frames as u64, spec));
        if sbuf.capacity() < num_frames {
            *sbuf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        }

        sbuf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sbuf.samples());
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels: channels as u16,
    })
}

/// Play decoded samples on the default output device, blocking until
/// they have drained.
fn play_decoded(audio: DecodedAudio) -> Result<(), PlaybackError> {
    if audio.samples.is_empty() {
        tracing::warn!("reply contained no audible samples");
        return Ok(());
    }

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(PlaybackError::NoDevice)?;

    tracing::info!("output device: {:?}", device.name());

    let supported_config = device
        .default_output_config()
        .map_err(|e| PlaybackError::ConfigError(e.to_string()))?;

    let device_rate = supported_config.sample_rate().0;
    let device_channels = (supported_config.channels() as usize).max(1);

    // The reply is converted to the device's native rate and fanned
    // out to its channel count; the same helpers the capture path
    // uses, run in the other direction.
    let mono = convert::downmix_to_mono(&audio.samples, audio.channels);
    let samples = Arc::new(convert::resample(&mono, audio.sample_rate, device_rate));
    let total = samples.len();

    let position = Arc::new(Mutex::new(0usize));
    let (done_tx, done_rx) = mpsc::channel::<()>();

    let cb_samples = Arc::clone(&samples);
    let cb_position = Arc::clone(&position);
    let stream = device
        .build_output_stream(
            &supported_config.into(),
            move |out: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut exhausted = false;
                if let Ok(mut pos) = cb_position.lock() {
                    for frame in out.chunks_mut(device_channels) {
                        let value = if *pos < cb_samples.len() {
                            let v = cb_samples[*pos];
                            *pos += 1;
                            v
                        } else {
                            exhausted = true;
                            0.0
                        };
                        for slot in frame {
                            *slot = value;
                        }
                    }
                }
                if exhausted {
                    let _ = done_tx.send(());
                }
            },
            |err| {
                tracing::error!("output stream error: {}", err);
            },
            None,
        )
        .map_err(|e| PlaybackError::StreamError(e.to_string()))?;

    stream
        .play()
        .map_err(|e| PlaybackError::StreamError(e.to_string()))?;

    let expected = Duration::from_secs_f64(total as f64 / device_rate.max(1) as f64);
    if done_rx.recv_timeout(expected + Duration::from_secs(2)).is_err() {
        tracing::warn!("playback completion signal timed out");
    }
    // Let the device drain its last buffer before the stream drops.
    std::thread::sleep(Duration::from_millis(150));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_fixture(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn decodes_a_wav_reply() {
        let samples: Vec<i16> = (0..1600).map(|i| (i % 100) as i16 * 100).collect();
        let wav = wav_fixture(16_000, &samples);

        let decoded = decode(&wav).unwrap();
        assert_eq!(decoded.sample_rate, 16_000);
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.samples.len(), samples.len());
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = decode(b"definitely not audio").unwrap_err();
        assert!(matches!(err, PlaybackError::Decode(_)));
    }
}
