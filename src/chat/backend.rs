//! Seam for the conversational backend.

use async_trait::async_trait;
use thiserror::Error;

/// Chat exchange errors
///
/// The taxonomy is deliberately flat: a failed exchange is terminal
/// for the attempt and the user retries by toggling again.
#[derive(Error, Debug)]
pub enum ChatError {
    /// The endpoint answered with a non-success status. The body is
    /// not inspected.
    #[error("backend returned HTTP {status}")]
    Backend { status: u16 },

    /// The request never completed.
    #[error("could not reach the chat endpoint: {0}")]
    Network(String),
}

/// One operation: exchange a recorded utterance for the spoken reply.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Upload one WAV recording under `session_id` and return the
    /// reply audio bytes verbatim.
    async fn exchange(&self, audio_wav: Vec<u8>, session_id: &str) -> Result<Vec<u8>, ChatError>;
}
