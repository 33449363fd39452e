//! Discrete-time simulation runtime for voltlab.
//!
//! Provides:
//! - Bounded chart history of (tick, voltage, current) samples
//! - Cancellable periodic scheduler driven by an injectable time source
//! - Controller owning all mutable state, with clamped commands and snapshots
//! - YAML/JSON configuration and deterministic scenario replay

pub mod clock;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod scenario;
pub mod snapshot;

// Re-exports for public API
pub use clock::{ManualClock, Millis, PeriodicTask, SimulationClock, TaskKind, TimeSource, WallClock};
pub use command::Command;
pub use config::{InitialState, SimConfig};
pub use controller::SimulationController;
pub use error::{SimError, SimResult};
pub use history::{HistoryBuffer, HistorySample};
pub use scenario::{Scenario, ScenarioStep};
pub use snapshot::{Phase, Snapshot};
