//! User-visible status of the chat loop.
//!
//! The entire observable state of the client is transient status
//! text. Failures collapse to three flat messages: microphone access,
//! backend rejection, network failure. None of them carries detail;
//! the user retries by toggling again.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatStatus {
    /// Capture is live.
    Recording,

    /// The recording is being uploaded and answered.
    Processing,

    /// The reply arrived and playback started.
    Ready,

    /// The microphone could not be acquired.
    MicDenied,

    /// The endpoint answered with a non-success status.
    BackendError,

    /// The request never completed.
    NetworkError,
}

impl ChatStatus {
    /// The fixed status line shown for this state.
    pub fn message(&self) -> &'static str {
        match self {
            ChatStatus::Recording => "Listening... press Enter to stop.",
            ChatStatus::Processing => "Thinking...",
            ChatStatus::Ready => "Here is the reply.",
            ChatStatus::MicDenied => {
                "Microphone unavailable. Please allow microphone access and try again."
            }
            ChatStatus::BackendError => "The assistant could not process that. Please try again.",
            ChatStatus::NetworkError => "Could not reach the assistant. Is the backend running?",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_status_has_a_distinct_fixed_message() {
        let all = [
            ChatStatus::Recording,
            ChatStatus::Processing,
            ChatStatus::Ready,
            ChatStatus::MicDenied,
            ChatStatus::BackendError,
            ChatStatus::NetworkError,
        ];
        for (i, a) in all.iter().enumerate() {
            assert!(!a.message().is_empty());
            for b in &all[i + 1..] {
                assert_ne!(a.message(), b.message());
            }
        }
    }

    #[test]
    fn mic_denied_asks_for_microphone_access() {
        assert!(ChatStatus::MicDenied.message().contains("microphone access"));
    }
}
