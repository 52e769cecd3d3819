//! The chat loop: toggle capture, assemble the payload, perform one
//! upload, play one reply.
//!
//! Owns the session state machine and at most one live
//! [`CaptureSession`]. The capture source, backend and reply sink are
//! injected seams, as is the configuration carrying the endpoint and
//! session identifier.

use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

use crate::audio::{wrap_pcm, CaptureSource, ReplySink};
use crate::chat::{ChatBackend, ChatError};
use crate::config::ClientConfig;
use crate::session::{CaptureSession, FragmentBuffer, SessionEvent, SessionState};

use super::status::ChatStatus;

pub struct ChatLoop<C: CaptureSource, B: ChatBackend, S: ReplySink> {
    config: ClientConfig,
    capture: C,
    backend: B,
    sink: S,
    state: SessionState,
    session: Option<CaptureSession<C::Control>>,
    status_tx: broadcast::Sender<ChatStatus>,
}

impl<C: CaptureSource, B: ChatBackend, S: ReplySink> ChatLoop<C, B, S> {
    pub fn new(config: ClientConfig, capture: C, backend: B, sink: S) -> Self {
        let (status_tx, _) = broadcast::channel(16);

        Self {
            config,
            capture,
            backend,
            sink,
            state: SessionState::Idle,
            session: None,
            status_tx,
        }
    }

    /// Subscribe to status updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatStatus> {
        self.status_tx.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The single user trigger: start recording when idle, otherwise
    /// stop, upload and play the reply. Refused while a previous
    /// exchange is still in flight.
    pub async fn toggle(&mut self) {
        match self.state {
            SessionState::Idle => self.start_recording(),
            SessionState::Recording => self.stop_and_exchange().await,
            SessionState::StopPending | SessionState::Uploading => {
                tracing::debug!("toggle refused, an exchange is in flight");
            }
        }
    }

    fn start_recording(&mut self) {
        let buffer = Arc::new(Mutex::new(FragmentBuffer::new()));
        let sink_buffer = Arc::clone(&buffer);

        let result = self.capture.begin(Box::new(move |fragment| {
            if let Ok(mut guard) = sink_buffer.lock() {
                guard.push(fragment);
            }
        }));

        match result {
            Ok(control) => {
                self.session = Some(CaptureSession::new(buffer, control));
                self.advance(SessionEvent::StartGranted);
                self.publish(ChatStatus::Recording);
            }
            Err(e) => {
                tracing::warn!("microphone unavailable: {}", e);
                self.advance(SessionEvent::StartDenied);
                self.publish(ChatStatus::MicDenied);
            }
        }
    }

    async fn stop_and_exchange(&mut self) {
        // The UI flips to busy before the capture acknowledges.
        self.advance(SessionEvent::StopRequested);
        self.publish(ChatStatus::Processing);

        let Some(mut session) = self.session.take() else {
            tracing::error!("recording state without a live session");
            self.advance(SessionEvent::CaptureStopped);
            self.advance(SessionEvent::UploadSettled);
            return;
        };

        // Blocks until the capture thread joins; every fragment has
        // been appended once this returns.
        session.stop();
        self.advance(SessionEvent::CaptureStopped);

        let fragments = session.fragment_count();
        let pcm = session.into_payload();
        tracing::info!("assembled {} fragments into {} bytes", fragments, pcm.len());

        let payload = match wrap_pcm(&pcm, self.config.audio.sample_rate) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("could not frame the recording: {}", e);
                self.publish(ChatStatus::NetworkError);
                self.advance(SessionEvent::UploadSettled);
                return;
            }
        };

        match self
            .backend
            .exchange(payload, &self.config.session_id)
            .await
        {
            Ok(reply) => {
                if let Err(e) = self.sink.play(&reply) {
                    tracing::error!("reply playback failed: {}", e);
                }
                self.publish(ChatStatus::Ready);
            }
            Err(ChatError::Backend { status }) => {
                tracing::warn!("exchange rejected with HTTP {}", status);
                self.publish(ChatStatus::BackendError);
            }
            Err(ChatError::Network(e)) => {
                tracing::error!("exchange failed: {}", e);
                self.publish(ChatStatus::NetworkError);
            }
        }

        self.advance(SessionEvent::UploadSettled);
    }

    fn advance(&mut self, event: SessionEvent) {
        let next = self.state.apply(event);
        tracing::debug!("session {:?} --{:?}--> {:?}", self.state, event, next);
        self.state = next;
    }

    fn publish(&self, status: ChatStatus) {
        let _ = self.status_tx.send(status);
    }
}
