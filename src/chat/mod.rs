//! Chat endpoint client.

mod backend;
mod http;

pub use backend::{ChatBackend, ChatError};
pub use http::HttpChatBackend;
