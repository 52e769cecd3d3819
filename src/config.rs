//! Client configuration.
//!
//! The endpoint and session identifier are injected here rather than
//! embedded at the upload site. An optional JSON file provides
//! overrides; a missing or invalid file falls back to defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_endpoint() -> String {
    "http://127.0.0.1:8000/chat".to_string()
}

fn default_session_id() -> String {
    "session_123".to_string()
}

fn default_sample_rate() -> u32 {
    16_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Chat endpoint receiving the multipart upload.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Conversation identifier sent with every exchange.
    #[serde(default = "default_session_id")]
    pub session_id: String,

    #[serde(default)]
    pub audio: AudioSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Capture rate of the uploaded recording.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            session_id: default_session_id(),
            audio: AudioSettings::default(),
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
        }
    }
}

impl ClientConfig {
    /// Load config from a JSON file, or return defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    tracing::info!("config loaded from {}", path.display());
                    return config;
                }
                Err(e) => tracing::warn!("invalid config, using defaults: {}", e),
            },
            Err(e) => tracing::warn!("cannot read config {}: {}", path.display(), e),
        }
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_point_at_the_local_backend() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "http://127.0.0.1:8000/chat");
        assert_eq!(config.session_id, "session_123");
        assert_eq!(config.audio.sample_rate, 16_000);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = ClientConfig::load(Path::new("/nonexistent/talkback.json"));
        assert_eq!(config.session_id, "session_123");
    }

    #[test]
    fn partial_file_keeps_defaults_for_absent_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"session_id": "alice"}}"#).unwrap();

        let config = ClientConfig::load(file.path());
        assert_eq!(config.session_id, "alice");
        assert_eq!(config.endpoint, "http://127.0.0.1:8000/chat");
        assert_eq!(config.audio.sample_rate, 16_000);
    }

    #[test]
    fn invalid_json_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let config = ClientConfig::load(file.path());
        assert_eq!(config.session_id, "session_123");
    }
}
