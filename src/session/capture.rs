//! Session-scoped capture state.
//!
//! One `CaptureSession` exists per recording: it owns the fragment
//! buffer and the live capture handle, and is consumed when the
//! payload is assembled. No recording state outlives its session.

use std::sync::{Arc, Mutex};

use crate::audio::CaptureControl;

use super::buffer::FragmentBuffer;

pub struct CaptureSession<H> {
    buffer: Arc<Mutex<FragmentBuffer>>,
    control: H,
}

impl<H: CaptureControl> CaptureSession<H> {
    /// Wrap a live capture. `buffer` is the sink its fragment
    /// callback appends to.
    pub fn new(buffer: Arc<Mutex<FragmentBuffer>>, control: H) -> Self {
        Self { buffer, control }
    }

    /// Stop capture and wait for the acknowledgment. After this
    /// returns, every fragment has been appended and no more will be.
    pub fn stop(&mut self) {
        self.control.stop();
    }

    pub fn fragment_count(&self) -> usize {
        self.buffer
            .lock()
            .map(|buffer| buffer.fragment_count())
            .unwrap_or(0)
    }

    /// Assemble the upload payload, consuming the session.
    pub fn into_payload(self) -> Vec<u8> {
        match self.buffer.lock() {
            Ok(mut buffer) => buffer.assemble(),
            Err(_) => {
                tracing::warn!("fragment buffer poisoned, assembling an empty payload");
                Vec::new()
            }
        }
    }
}
