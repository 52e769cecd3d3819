//! HTTP implementation of the chat exchange.
//!
//! One multipart POST per completed recording: an `audio_file` part
//! (filename `recording.wav`, MIME `audio/wav`) and a `session_id`
//! text field. The reply body is an encoded audio asset played back
//! verbatim. No retry, no explicit timeout.

use async_trait::async_trait;

use super::backend::{ChatBackend, ChatError};

pub struct HttpChatBackend {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpChatBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn exchange(&self, audio_wav: Vec<u8>, session_id: &str) -> Result<Vec<u8>, ChatError> {
        tracing::info!(
            "uploading {} byte recording to {}",
            audio_wav.len(),
            self.endpoint
        );

        let file_part = reqwest::multipart::Part::bytes(audio_wav)
            .file_name("recording.wav")
            .mime_str("audio/wav")
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .part("audio_file", file_part)
            .text("session_id", session_id.to_string());

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!("chat endpoint returned {}", status);
            return Err(ChatError::Backend {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        tracing::info!("received {} byte reply", body.len());
        Ok(body.to_vec())
    }
}
