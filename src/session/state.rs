//! Recording session state machine.
//!
//! All transitions run through [`SessionState::apply`]:
//!
//! ```text
//! Idle ──device access granted──▶ Recording
//! Idle ──device access denied───▶ Idle        (permission status only)
//! Recording ──toggle─────────────▶ StopPending (UI flips before the ack)
//! StopPending ──capture stopped──▶ Uploading
//! Uploading ──upload settled─────▶ Idle        (success and failure alike)
//! ```
//!
//! `Uploading` is an explicit in-flight guard: a toggle while the
//! exchange is pending is refused, so a second recording can never
//! start over a live upload.

/// States of one record-and-reply cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the user to start a recording.
    Idle,

    /// Microphone is live; fragments are accumulating.
    Recording,

    /// Stop was requested; waiting for the capture acknowledgment.
    StopPending,

    /// The payload has been handed to the backend; the exchange is in
    /// flight.
    Uploading,
}

/// Events that drive the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Device access granted and capture running.
    StartGranted,

    /// Device access failed; nothing was started.
    StartDenied,

    /// The user toggled while recording.
    StopRequested,

    /// The capture resource acknowledged the stop.
    CaptureStopped,

    /// The upload finished, successfully or not.
    UploadSettled,
}

impl SessionState {
    /// The single transition function. Any pairing not listed in the
    /// module diagram leaves the state unchanged.
    pub fn apply(self, event: SessionEvent) -> SessionState {
        match (self, event) {
            (SessionState::Idle, SessionEvent::StartGranted) => SessionState::Recording,
            (SessionState::Idle, SessionEvent::StartDenied) => SessionState::Idle,
            (SessionState::Recording, SessionEvent::StopRequested) => SessionState::StopPending,
            (SessionState::StopPending, SessionEvent::CaptureStopped) => SessionState::Uploading,
            (SessionState::Uploading, SessionEvent::UploadSettled) => SessionState::Idle,
            (state, _) => state,
        }
    }

    /// True while a stop or exchange is pending; a toggle is refused
    /// in these states.
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::StopPending | SessionState::Uploading)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle
    }
}
