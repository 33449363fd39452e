//! Simulation configuration (YAML or JSON).

use crate::clock::Millis;
use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use vl_circuit::{Mode, RESISTANCE_BOUNDS, VoltaicState};
use vl_core::{Time, ms};

/// State the controller starts in and returns to on mode switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialState {
    pub mode: Mode,
    pub layer_count: u32,
    pub electrolyte_quality: f64,
    pub resistance_ohm: f64,
}

impl Default for InitialState {
    fn default() -> Self {
        Self {
            mode: Mode::Voltaic,
            layer_count: VoltaicState::DEFAULT_LAYERS,
            electrolyte_quality: 1.0,
            resistance_ohm: 10.0,
        }
    }
}

/// Cadence and sizing of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Discharge tick period while running.
    pub tick_period_ms: Millis,
    /// Replenishment period while charging.
    pub charge_period_ms: Millis,
    /// Percent added per replenishment step.
    pub charge_step_pct: f64,
    /// Chart history length.
    pub history_capacity: usize,
    pub initial: InitialState,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 100,
            charge_period_ms: 50,
            charge_step_pct: 0.5,
            history_capacity: 50,
            initial: InitialState::default(),
        }
    }
}

impl SimConfig {
    /// Longest accepted tick or charge period (one hour).
    pub const MAX_PERIOD_MS: Millis = 3_600_000;

    pub fn validate(&self) -> SimResult<()> {
        check_period(self.tick_period_ms, "tick_period_ms")?;
        check_period(self.charge_period_ms, "charge_period_ms")?;
        if self.history_capacity == 0 {
            return Err(invalid("history_capacity must be positive"));
        }
        if !self.charge_step_pct.is_finite() || self.charge_step_pct <= 0.0 {
            return Err(invalid("charge_step_pct must be positive"));
        }
        let layers = self.initial.layer_count;
        if !(VoltaicState::MIN_LAYERS..=VoltaicState::MAX_LAYERS).contains(&layers) {
            return Err(invalid(format!(
                "initial.layer_count {layers} outside {}..={}",
                VoltaicState::MIN_LAYERS,
                VoltaicState::MAX_LAYERS
            )));
        }
        VoltaicState::QUALITY_BOUNDS
            .check(self.initial.electrolyte_quality, "initial.electrolyte_quality")?;
        RESISTANCE_BOUNDS.check(self.initial.resistance_ohm, "initial.resistance_ohm")?;
        Ok(())
    }

    /// Discharge tick period as a typed duration.
    pub fn tick_period(&self) -> Time {
        ms(self.tick_period_ms as f64)
    }

    pub fn charge_period(&self) -> Time {
        ms(self.charge_period_ms as f64)
    }

    pub fn from_yaml_str(s: &str) -> SimResult<Self> {
        let config: SimConfig = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> SimResult<Self> {
        let config: SimConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load by extension: `.json` is JSON, anything else is YAML.
    pub fn load(path: &Path) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    pub fn to_yaml_string(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn check_period(period_ms: Millis, name: &str) -> SimResult<()> {
    if period_ms == 0 || period_ms > SimConfig::MAX_PERIOD_MS {
        return Err(invalid(format!(
            "{name} {period_ms} outside 1..={}",
            SimConfig::MAX_PERIOD_MS
        )));
    }
    Ok(())
}

fn invalid(what: impl Into<String>) -> SimError {
    SimError::InvalidConfig { what: what.into() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = SimConfig::default();
        c.validate().unwrap();
        assert_eq!(c.tick_period_ms, 100);
        assert_eq!(c.charge_period_ms, 50);
        assert_eq!(c.history_capacity, 50);
        assert_eq!(c.initial.layer_count, 5);
        assert_eq!(c.initial.resistance_ohm, 10.0);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let c = SimConfig::from_yaml_str("tick_period_ms: 20\ninitial:\n  mode: lithium\n").unwrap();
        assert_eq!(c.tick_period_ms, 20);
        assert_eq!(c.charge_period_ms, 50);
        assert_eq!(c.initial.mode, Mode::Lithium);
        assert_eq!(c.initial.layer_count, 5);
    }

    #[test]
    fn rejects_zero_period() {
        let err = SimConfig::from_yaml_str("tick_period_ms: 0\n").unwrap_err();
        assert!(err.to_string().contains("tick_period_ms"));
    }

    #[test]
    fn rejects_huge_period() {
        let err = SimConfig::from_yaml_str("tick_period_ms: 18446744073709551615\n").unwrap_err();
        assert!(err.to_string().contains("tick_period_ms"));
        let err = SimConfig::from_yaml_str("charge_period_ms: 3600001\n").unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig { .. }));
        SimConfig::from_yaml_str("tick_period_ms: 3600000\n").unwrap();
    }

    #[test]
    fn periods_as_typed_time() {
        use uom::si::time::second;
        let c = SimConfig::default();
        assert!((c.tick_period().get::<second>() - 0.1).abs() < 1e-12);
        assert!((c.charge_period().get::<second>() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn rejects_out_of_range_initial_values() {
        let mut c = SimConfig::default();
        c.initial.layer_count = 21;
        assert!(c.validate().is_err());

        let mut c = SimConfig::default();
        c.initial.resistance_ohm = 0.5;
        assert!(matches!(c.validate(), Err(SimError::InvalidConfig { .. })));
    }

    #[test]
    fn json_and_yaml_agree() {
        let c = SimConfig::default();
        let yaml = c.to_yaml_string().unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(SimConfig::from_yaml_str(&yaml).unwrap(), c);
        assert_eq!(SimConfig::from_json_str(&json).unwrap(), c);
    }
}
