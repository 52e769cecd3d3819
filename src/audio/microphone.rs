//! Microphone capture
//!
//! Uses cpal for cross-platform capture. Audio runs on a dedicated
//! thread; each hardware callback is downmixed to mono, resampled to
//! the target rate and delivered as one 16-bit PCM fragment, in
//! capture order. Device acquisition happens before `start` returns,
//! so a missing or unusable microphone surfaces to the caller instead
//! of dying inside the capture thread.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

use super::convert;

/// Audio configuration for capture
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate of the uploaded recording
    pub target_sample_rate: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 16_000,
        }
    }
}

/// Microphone capture errors
#[derive(Error, Debug)]
pub enum MicrophoneError {
    #[error("no audio input device available")]
    NoDevice,

    #[error("input configuration error: {0}")]
    ConfigError(String),

    #[error("input stream error: {0}")]
    StreamError(String),
}

/// Seam between the chat loop and the capture hardware.
///
/// The production implementation is [`Microphone`]; tests drive the
/// loop with fakes that feed canned fragments through the callback.
pub trait CaptureSource: Send {
    type Control: CaptureControl;

    /// Acquire the device and start delivering fragments.
    ///
    /// Fragments are opaque binary chunks delivered in capture order;
    /// the callback runs until [`CaptureControl::stop`] returns.
    fn begin(
        &mut self,
        on_fragment: Box<dyn Fn(Vec<u8>) + Send + 'static>,
    ) -> Result<Self::Control, MicrophoneError>;
}

/// Handle over a live capture.
pub trait CaptureControl: Send {
    /// Stop capturing and wait for the acknowledgment.
    ///
    /// No fragment callback runs after this returns.
    fn stop(&mut self);
}

/// The default microphone as a [`CaptureSource`].
pub struct Microphone {
    config: CaptureConfig,
}

impl Microphone {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }
}

impl CaptureSource for Microphone {
    type Control = CaptureHandle;

    fn begin(
        &mut self,
        on_fragment: Box<dyn Fn(Vec<u8>) + Send + 'static>,
    ) -> Result<CaptureHandle, MicrophoneError> {
        CaptureHandle::start(self.config.clone(), on_fragment)
    }
}

/// Commands to control the capture thread
enum CaptureCommand {
    Stop,
}

/// Handle to a running capture thread
pub struct CaptureHandle {
    command_tx: mpsc::Sender<CaptureCommand>,
    thread_handle: Option<JoinHandle<()>>,
}

impl CaptureHandle {
    /// Start audio capture in a dedicated thread.
    ///
    /// Blocks until the capture thread reports that the input stream
    /// is running, so device problems are returned here.
    pub fn start<F>(config: CaptureConfig, fragment_callback: F) -> Result<Self, MicrophoneError>
    where
        F: Fn(Vec<u8>) + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let thread_handle = thread::spawn(move || {
            run_capture(config, fragment_callback, command_rx, ready_tx);
        });

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                command_tx,
                thread_handle: Some(thread_handle),
            }),
            Ok(Err(e)) => {
                let _ = thread_handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread_handle.join();
                Err(MicrophoneError::StreamError(
                    "capture thread exited before the stream started".to_string(),
                ))
            }
        }
    }

    /// List available input devices
    pub fn list_devices() -> Vec<String> {
        let host = cpal::default_host();
        host.input_devices()
            .map(|devices| devices.filter_map(|d| d.name().ok()).collect())
            .unwrap_or_default()
    }
}

impl CaptureControl for CaptureHandle {
    fn stop(&mut self) {
        let _ = self.command_tx.send(CaptureCommand::Stop);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        CaptureControl::stop(self);
    }
}

/// Run audio capture (in a dedicated thread)
fn run_capture<F>(
    config: CaptureConfig,
    fragment_callback: F,
    command_rx: mpsc::Receiver<CaptureCommand>,
    ready_tx: mpsc::Sender<Result<(), MicrophoneError>>,
) where
    F: Fn(Vec<u8>) + Send + 'static,
{
    let open_stream = move || -> Result<cpal::Stream, MicrophoneError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(MicrophoneError::NoDevice)?;

        tracing::info!("input device: {:?}", device.name());

        let supported_config = device
            .default_input_config()
            .map_err(|e| MicrophoneError::ConfigError(e.to_string()))?;

        let source_sample_rate = supported_config.sample_rate().0;
        let source_channels = supported_config.channels();
        let target_rate = config.target_sample_rate;

        tracing::info!(
            "capture config: {}Hz {}ch -> {}Hz mono",
            source_sample_rate,
            source_channels,
            target_rate
        );

        let stream = device
            .build_input_stream(
                &supported_config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let mono = convert::downmix_to_mono(data, source_channels);
                    let resampled = convert::resample(&mono, source_sample_rate, target_rate);

                    if !resampled.is_empty() {
                        fragment_callback(convert::pcm_bytes(&resampled));
                    }
                },
                |err| {
                    tracing::error!("input stream error: {}", err);
                },
                None,
            )
            .map_err(|e| MicrophoneError::StreamError(e.to_string()))?;

        stream
            .play()
            .map_err(|e| MicrophoneError::StreamError(e.to_string()))?;

        Ok(stream)
    };

    // The stream must stay alive until we are told to stop.
    let _stream = match open_stream() {
        Ok(stream) => {
            let _ = ready_tx.send(Ok(()));
            stream
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    tracing::info!("capture started");

    loop {
        match command_rx.recv_timeout(std::time::Duration::from_millis(100)) {
            Ok(CaptureCommand::Stop) => {
                tracing::info!("capture stopped");
                break;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}
