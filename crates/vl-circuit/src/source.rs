//! Source variants and their mutable state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use vl_core::{Bounds, clamp_count};

/// Which power source is on the bench.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Voltaic,
    Lithium,
}

impl Mode {
    /// Human-readable name used in prompts and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Voltaic => "Voltaic pile (1800)",
            Mode::Lithium => "Lithium-ion cell (modern)",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Voltaic => write!(f, "voltaic"),
            Mode::Lithium => write!(f, "lithium"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "voltaic" | "volta" | "pile" => Ok(Mode::Voltaic),
            "lithium" | "li-ion" | "liion" => Ok(Mode::Lithium),
            other => Err(format!("unknown mode '{other}'")),
        }
    }
}

/// Zinc/copper disk stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoltaicState {
    layer_count: u32,
    /// Reserved resistance modifier; carried but not used by the model yet.
    electrolyte_quality: f64,
}

impl VoltaicState {
    pub const MIN_LAYERS: u32 = 1;
    pub const MAX_LAYERS: u32 = 20;
    pub const DEFAULT_LAYERS: u32 = 5;
    pub const QUALITY_BOUNDS: Bounds = Bounds::new(0.0, 1.0);

    /// New stack; arguments are clamped into their valid ranges.
    pub fn new(layer_count: i64, electrolyte_quality: f64) -> Self {
        Self {
            layer_count: clamp_count(layer_count, Self::MIN_LAYERS, Self::MAX_LAYERS),
            electrolyte_quality: Self::QUALITY_BOUNDS.clamp(electrolyte_quality),
        }
    }

    pub fn layer_count(&self) -> u32 {
        self.layer_count
    }

    pub fn electrolyte_quality(&self) -> f64 {
        self.electrolyte_quality
    }

    pub fn set_layer_count(&mut self, n: i64) {
        self.layer_count = clamp_count(n, Self::MIN_LAYERS, Self::MAX_LAYERS);
    }

    pub fn set_electrolyte_quality(&mut self, q: f64) {
        self.electrolyte_quality = Self::QUALITY_BOUNDS.clamp(q);
    }
}

impl Default for VoltaicState {
    fn default() -> Self {
        Self {
            layer_count: Self::DEFAULT_LAYERS,
            electrolyte_quality: 1.0,
        }
    }
}

/// Rechargeable lithium-ion cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LithiumState {
    /// State of charge in percent, always inside [`LithiumState::CHARGE_BOUNDS`].
    charge_level: f64,
    is_charging: bool,
}

impl LithiumState {
    pub const FULL: f64 = 100.0;
    pub const CHARGE_BOUNDS: Bounds = Bounds::new(0.0, Self::FULL);

    /// Fully charged, charger disconnected.
    pub fn full() -> Self {
        Self {
            charge_level: Self::FULL,
            is_charging: false,
        }
    }

    pub fn with_charge(charge_level: f64) -> Self {
        Self {
            charge_level: Self::CHARGE_BOUNDS.clamp(charge_level),
            is_charging: false,
        }
    }

    pub fn charge_level(&self) -> f64 {
        self.charge_level
    }

    /// State of charge as a fraction in [0, 1].
    pub fn soc(&self) -> f64 {
        self.charge_level / Self::FULL
    }

    pub fn is_empty(&self) -> bool {
        self.charge_level <= 0.0
    }

    pub fn is_charging(&self) -> bool {
        self.is_charging
    }

    pub fn set_charging(&mut self, charging: bool) {
        self.is_charging = charging;
    }

    pub fn set_charge_level(&mut self, pct: f64) {
        self.charge_level = Self::CHARGE_BOUNDS.clamp(pct);
    }

    /// Remove `amount` percent, floored at empty. Returns the new level.
    pub fn drain(&mut self, amount: f64) -> f64 {
        self.charge_level = (self.charge_level - amount.max(0.0)).max(0.0);
        self.charge_level
    }

    /// Add `amount` percent, capped at full. Returns the new level.
    pub fn replenish(&mut self, amount: f64) -> f64 {
        self.charge_level = (self.charge_level + amount.max(0.0)).min(Self::FULL);
        self.charge_level
    }
}

impl Default for LithiumState {
    fn default() -> Self {
        Self::full()
    }
}

/// State of whichever source is active.
///
/// The variant is the mode: physics branches match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceState {
    Voltaic(VoltaicState),
    Lithium(LithiumState),
}

impl SourceState {
    /// Fresh state for a mode, as after a mode switch.
    pub fn default_for(mode: Mode) -> Self {
        match mode {
            Mode::Voltaic => SourceState::Voltaic(VoltaicState::default()),
            Mode::Lithium => SourceState::Lithium(LithiumState::full()),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            SourceState::Voltaic(_) => Mode::Voltaic,
            SourceState::Lithium(_) => Mode::Lithium,
        }
    }

    pub fn is_charging(&self) -> bool {
        match self {
            SourceState::Voltaic(_) => false,
            SourceState::Lithium(li) => li.is_charging(),
        }
    }

    pub fn layer_count(&self) -> Option<u32> {
        match self {
            SourceState::Voltaic(v) => Some(v.layer_count()),
            SourceState::Lithium(_) => None,
        }
    }

    pub fn charge_level(&self) -> Option<f64> {
        match self {
            SourceState::Voltaic(_) => None,
            SourceState::Lithium(li) => Some(li.charge_level()),
        }
    }
}

impl Default for SourceState {
    fn default() -> Self {
        Self::default_for(Mode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voltaic_defaults() {
        let v = VoltaicState::default();
        assert_eq!(v.layer_count(), 5);
        assert_eq!(v.electrolyte_quality(), 1.0);
    }

    #[test]
    fn voltaic_layer_clamp() {
        let mut v = VoltaicState::new(0, 2.0);
        assert_eq!(v.layer_count(), 1);
        assert_eq!(v.electrolyte_quality(), 1.0);
        v.set_layer_count(99);
        assert_eq!(v.layer_count(), 20);
        v.set_electrolyte_quality(-0.3);
        assert_eq!(v.electrolyte_quality(), 0.0);
    }

    #[test]
    fn lithium_drain_floors_at_zero() {
        let mut li = LithiumState::with_charge(0.3);
        assert_eq!(li.drain(1.0), 0.0);
        assert!(li.is_empty());
        // negative drain is ignored
        li.set_charge_level(10.0);
        assert_eq!(li.drain(-5.0), 10.0);
    }

    #[test]
    fn lithium_replenish_caps_at_full() {
        let mut li = LithiumState::with_charge(99.8);
        assert_eq!(li.replenish(0.5), 100.0);
        assert_eq!(li.soc(), 1.0);
    }

    #[test]
    fn source_mode_and_accessors() {
        let s = SourceState::default();
        assert_eq!(s.mode(), Mode::Voltaic);
        assert_eq!(s.layer_count(), Some(5));
        assert_eq!(s.charge_level(), None);

        let li = SourceState::default_for(Mode::Lithium);
        assert_eq!(li.mode(), Mode::Lithium);
        assert_eq!(li.charge_level(), Some(100.0));
        assert!(!li.is_charging());
    }

    #[test]
    fn mode_parse() {
        assert_eq!("Voltaic".parse::<Mode>(), Ok(Mode::Voltaic));
        assert_eq!("li-ion".parse::<Mode>(), Ok(Mode::Lithium));
        assert!("lead-acid".parse::<Mode>().is_err());
    }
}
