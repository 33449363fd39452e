//! Chat transcript and fallback handling.

use crate::backend::TutorBackend;
use crate::context::TutorContext;
use crate::error::TutorResult;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// First message of every session.
pub const GREETING: &str = "Hi! I'm your lab assistant. Ask me anything about batteries, \
voltage, or the science behind this simulation.";

/// Shown in place of any transport failure.
pub const FALLBACK_NOTICE: &str =
    "Sorry, there was a problem reaching the lab database (API error).";

/// Shown when the model answers with nothing.
pub const EMPTY_REPLY_NOTICE: &str = "I couldn't generate a reply, please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

/// One conversation. At most one question is in flight at a time.
#[derive(Debug, Clone)]
pub struct TutorSession {
    messages: Vec<ChatMessage>,
    pending: bool,
}

impl Default for TutorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TutorSession {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::new(Role::Model, GREETING)],
            pending: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Record the user's question and return the prompt to send.
    ///
    /// Returns `None` (and records nothing) for blank input or while a
    /// previous question is still waiting for its answer.
    pub fn submit(&mut self, context: &TutorContext, input: &str) -> Option<String> {
        if input.trim().is_empty() || self.pending {
            return None;
        }
        self.messages.push(ChatMessage::new(Role::User, input));
        self.pending = true;
        Some(context.prompt(input))
    }

    /// Record the answer to the pending question. Failures become
    /// [`FALLBACK_NOTICE`], empty answers become [`EMPTY_REPLY_NOTICE`].
    pub fn complete(&mut self, result: TutorResult<String>) -> &ChatMessage {
        let text = match result {
            Ok(text) if text.trim().is_empty() => EMPTY_REPLY_NOTICE.to_string(),
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "tutor request failed, using fallback");
                FALLBACK_NOTICE.to_string()
            }
        };
        self.pending = false;
        self.messages.push(ChatMessage::new(Role::Model, text));
        &self.messages[self.messages.len() - 1]
    }

    /// Blocking round trip on the caller's thread.
    pub fn ask(
        &mut self,
        backend: &dyn TutorBackend,
        context: &TutorContext,
        input: &str,
    ) -> Option<&ChatMessage> {
        let prompt = self.submit(context, input)?;
        let result = backend.generate(&prompt);
        Some(self.complete(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TutorError;
    use vl_circuit::Mode;

    fn ctx() -> TutorContext {
        TutorContext::new(Mode::Lithium, 4.0, 0.0)
    }

    #[test]
    fn starts_with_greeting() {
        let s = TutorSession::new();
        assert_eq!(s.messages().len(), 1);
        assert_eq!(s.messages()[0].role, Role::Model);
        assert_eq!(s.messages()[0].text, GREETING);
    }

    #[test]
    fn blank_input_ignored() {
        let mut s = TutorSession::new();
        assert!(s.submit(&ctx(), "   ").is_none());
        assert_eq!(s.messages().len(), 1);
        assert!(!s.is_pending());
    }

    #[test]
    fn one_question_in_flight() {
        let mut s = TutorSession::new();
        assert!(s.submit(&ctx(), "first").is_some());
        assert!(s.submit(&ctx(), "second").is_none());
        s.complete(Ok("answer".into()));
        assert!(s.submit(&ctx(), "second").is_some());
    }

    #[test]
    fn failure_becomes_fallback() {
        let mut s = TutorSession::new();
        s.submit(&ctx(), "why 4 volts?");
        let msg = s.complete(Err(TutorError::Backend {
            message: "timeout".into(),
        }));
        assert_eq!(msg.text, FALLBACK_NOTICE);
        assert_eq!(msg.role, Role::Model);
    }

    #[test]
    fn empty_answer_replaced() {
        let mut s = TutorSession::new();
        s.submit(&ctx(), "hello");
        assert_eq!(s.complete(Ok("  ".into())).text, EMPTY_REPLY_NOTICE);
    }
}
