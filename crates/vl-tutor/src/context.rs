//! What the tutor is told about the bench.

use serde::Serialize;
use vl_circuit::Mode;
use vl_sim::Snapshot;

/// Readings the tutor sees alongside each question.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TutorContext {
    pub mode: Mode,
    /// Volts
    pub voltage: f64,
    /// Amps
    pub current: f64,
}

impl TutorContext {
    pub fn new(mode: Mode, voltage: f64, current: f64) -> Self {
        Self {
            mode,
            voltage,
            current,
        }
    }

    /// Full prompt sent to the model for one user question.
    pub fn prompt(&self, question: &str) -> String {
        format!(
            "You are a physics tutor inside an interactive battery lab.\n\
             Current simulation: {mode}.\n\
             Voltage reading: {voltage:.2} V.\n\
             Current reading: {current:.2} A.\n\
             Explain concepts in plain language suitable for students.\n\
             Keep answers short (at most three sentences) unless the user asks for detail.\n\
             \n\
             User question: {question}",
            mode = self.mode.label(),
            voltage = self.voltage,
            current = self.current,
            question = question.trim(),
        )
    }
}

impl From<&Snapshot> for TutorContext {
    fn from(snap: &Snapshot) -> Self {
        Self::new(snap.mode, snap.voltage, snap.current)
    }
}
