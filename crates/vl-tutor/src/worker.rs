//! Background tutor requests.
//!
//! The simulation host keeps ticking while a request is in flight and polls
//! for the reply between frames.

use crate::backend::TutorBackend;
use crate::error::{TutorError, TutorResult};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::thread::{self, JoinHandle};

/// Outcome delivered by the worker thread.
#[derive(Debug)]
pub struct TutorReply {
    pub result: TutorResult<String>,
}

pub struct TutorWorker {
    reply_rx: Receiver<TutorReply>,
    _handle: JoinHandle<()>,
}

impl TutorWorker {
    /// Send `prompt` to `backend` on a new thread.
    pub fn start(backend: Arc<dyn TutorBackend>, prompt: String) -> Self {
        let (tx, rx) = channel();
        let handle = thread::spawn(move || {
            tracing::debug!(backend = backend.name(), "tutor request started");
            let result = backend.generate(&prompt);
            // Receiver may be gone if the host shut down; nothing to do then.
            let _ = tx.send(TutorReply { result });
        });
        Self {
            reply_rx: rx,
            _handle: handle,
        }
    }

    /// Non-blocking poll. `None` while the request is still running.
    pub fn try_reply(&self) -> Option<TutorResult<String>> {
        match self.reply_rx.try_recv() {
            Ok(reply) => Some(reply.result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(TutorError::Disconnected)),
        }
    }

    /// Block until the reply arrives.
    pub fn wait(self) -> TutorResult<String> {
        match self.reply_rx.recv() {
            Ok(reply) => reply.result,
            Err(_) => Err(TutorError::Disconnected),
        }
    }
}
