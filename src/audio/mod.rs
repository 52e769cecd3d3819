//! Audio capture, payload framing and reply playback.

mod convert;
mod microphone;
mod playback;
mod wav;

pub use microphone::{
    CaptureConfig, CaptureControl, CaptureHandle, CaptureSource, Microphone, MicrophoneError,
};
pub use playback::{CpalPlayer, PlaybackError, ReplySink};
pub use wav::{wrap_pcm, WavError};
