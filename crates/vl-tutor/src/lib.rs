//! Tutor chat boundary for voltlab.
//!
//! The tutor is an external collaborator: it reads a small context
//! (mode, voltage, current) plus free text and returns free text. Nothing it
//! does flows back into the simulation. Transport failures are replaced by a
//! fixed notice instead of being surfaced as errors.

pub mod backend;
pub mod context;
pub mod error;
pub mod session;
pub mod worker;

// Re-export key types for convenience
pub use backend::{CommandBackend, TutorBackend};
pub use context::TutorContext;
pub use error::{TutorError, TutorResult};
pub use session::{ChatMessage, EMPTY_REPLY_NOTICE, FALLBACK_NOTICE, GREETING, Role, TutorSession};
pub use worker::{TutorReply, TutorWorker};
