//! vl-circuit: equivalent-circuit models for the two demonstration sources.
//!
//! Provides:
//! - Source state for a voltaic pile and a lithium-ion cell as one sum type
//! - Load description (open circuit or series resistor)
//! - Pure reading computation (voltage, current, power) per source
//!
//! Everything here is a deterministic function of its inputs. Mutation of
//! source state in response to a reading (lithium drain) is left to the
//! caller so the model can be tested in isolation.
//!
//! # Example
//!
//! ```
//! use vl_circuit::{Load, SourceState, VoltaicState, compute_reading};
//!
//! let pile = SourceState::Voltaic(VoltaicState::default());
//! let r = compute_reading(&pile, 0, Load::resistive(10.0));
//! assert!((r.voltage - 3.8).abs() < 1e-12);
//! assert!((r.current - 0.304).abs() < 1e-12);
//! ```

pub mod load;
pub mod model;
pub mod reading;
pub mod source;

// Re-exports
pub use load::{Load, RESISTANCE_BOUNDS};
pub use model::{
    compute_reading, discharge_amount, internal_resistance, loaded_voltage,
    open_circuit_voltage,
};
pub use reading::CircuitReading;
pub use source::{LithiumState, Mode, SourceState, VoltaicState};
