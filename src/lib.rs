//! Talkback - push-to-talk voice chat client
//!
//! Records the microphone, uploads the utterance to a conversational
//! backend over HTTP and plays back the spoken reply.

pub mod audio;
pub mod chat;
pub mod config;
pub mod pipeline;
pub mod session;

pub use chat::{ChatBackend, ChatError, HttpChatBackend};
pub use config::ClientConfig;
pub use pipeline::{ChatLoop, ChatStatus};
