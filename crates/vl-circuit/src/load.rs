//! External load attached to the source terminals.

use serde::{Deserialize, Serialize};
use vl_core::Bounds;

/// Settable range of the load resistor (ohms).
pub const RESISTANCE_BOUNDS: Bounds = Bounds::new(1.0, 100.0);

/// What the source terminals are connected to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Load {
    /// Nothing connected: no current, open-circuit voltage.
    Open,
    /// Series resistor in ohms, always inside [`RESISTANCE_BOUNDS`].
    Resistive(f64),
}

impl Load {
    /// Resistive load, clamped into the settable range.
    pub fn resistive(ohms: f64) -> Self {
        Self::Resistive(RESISTANCE_BOUNDS.clamp(ohms))
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}
