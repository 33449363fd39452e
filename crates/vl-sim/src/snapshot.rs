//! Read-only view of controller state for presentation layers.

use crate::history::HistorySample;
use serde::Serialize;
use std::fmt;
use vl_circuit::Mode;

/// Composite of mode and run flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    VoltaicIdle,
    VoltaicRunning,
    LithiumIdle,
    LithiumCharging,
    LithiumDischarging,
}

impl Phase {
    pub fn mode(&self) -> Mode {
        match self {
            Phase::VoltaicIdle | Phase::VoltaicRunning => Mode::Voltaic,
            Phase::LithiumIdle | Phase::LithiumCharging | Phase::LithiumDischarging => {
                Mode::Lithium
            }
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Phase::VoltaicIdle | Phase::LithiumIdle)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::VoltaicIdle => "voltaic/idle",
            Phase::VoltaicRunning => "voltaic/running",
            Phase::LithiumIdle => "lithium/idle",
            Phase::LithiumCharging => "lithium/charging",
            Phase::LithiumDischarging => "lithium/discharging",
        };
        f.write_str(s)
    }
}

/// Everything a renderer needs, copied out of the controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub mode: Mode,
    pub phase: Phase,
    pub is_running: bool,
    pub is_charging: bool,
    /// Tick counter
    pub time: u64,
    pub voltage: f64,
    pub current: f64,
    pub power: f64,
    /// Load resistance (ohm)
    pub resistance: f64,
    /// Lithium only
    pub charge_level: Option<f64>,
    /// Voltaic only
    pub layer_count: Option<u32>,
    /// Voltaic only
    pub electrolyte_quality: Option<f64>,
    /// Oldest first
    pub history: Vec<HistorySample>,
}
