//! WAV framing for upload payloads.
//!
//! The assembled recording is raw 16-bit little-endian mono PCM; the
//! chat endpoint expects a `recording.wav` file, so the bytes are
//! wrapped in a WAV container without re-encoding. The data chunk is
//! byte-for-byte the assembled fragment concatenation.

use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WavError {
    #[error("WAV encoding error: {0}")]
    Encode(#[from] hound::Error),
}

/// Wrap raw 16-bit LE mono PCM bytes in a WAV container.
///
/// A trailing odd byte cannot form a sample and is dropped with a
/// warning.
pub fn wrap_pcm(pcm: &[u8], sample_rate: u32) -> Result<Vec<u8>, WavError> {
    let whole = pcm.len() - pcm.len() % 2;
    if whole < pcm.len() {
        tracing::warn!("dropping trailing odd byte from a {} byte recording", pcm.len());
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for pair in pcm[..whole].chunks_exact(2) {
            writer.write_sample(i16::from_le_bytes([pair[0], pair[1]]))?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_chunk(wav: &[u8]) -> Vec<u8> {
        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        reader
            .samples::<i16>()
            .flat_map(|s| s.unwrap().to_le_bytes())
            .collect()
    }

    #[test]
    fn data_chunk_equals_the_input_bytes() {
        let pcm = b"AABBCCDD".to_vec();
        let wav = wrap_pcm(&pcm, 16_000).unwrap();
        assert_eq!(data_chunk(&wav), pcm);
    }

    #[test]
    fn header_carries_the_capture_format() {
        let wav = wrap_pcm(&[0, 0, 1, 0], 16_000).unwrap();
        let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
    }

    #[test]
    fn empty_recording_produces_an_empty_data_chunk() {
        let wav = wrap_pcm(&[], 16_000).unwrap();
        assert!(data_chunk(&wav).is_empty());
    }

    #[test]
    fn trailing_odd_byte_is_dropped() {
        let wav = wrap_pcm(&[0x41, 0x41, 0x42], 16_000).unwrap();
        assert_eq!(data_chunk(&wav), vec![0x41, 0x41]);
    }
}
