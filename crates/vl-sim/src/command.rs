//! Serializable controller commands.

use serde::{Deserialize, Serialize};
use vl_circuit::Mode;

/// One user-issued command, as a presentation layer or scenario file sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Start,
    Stop,
    ToggleRun,
    ToggleCharging,
    Reset,
    SwitchMode { mode: Mode },
    SetResistance { ohms: f64 },
    SetLayerCount { layers: i64 },
    SetElectrolyteQuality { quality: f64 },
    SetChargeLevel { percent: f64 },
}
