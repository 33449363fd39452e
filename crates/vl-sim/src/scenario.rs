//! Scripted command sequences replayed on a manual clock.
//!
//! ```yaml
//! config:
//!   initial:
//!     mode: lithium
//! steps:
//!   - at_ms: 0
//!     action: { command: start }
//!   - at_ms: 2000
//!     action: { command: set_resistance, ohms: 2.0 }
//! end_ms: 5000
//! ```
//!
//! Ticks that fall due at exactly `at_ms` fire before that step's command.

use crate::clock::{ManualClock, Millis};
use crate::command::Command;
use crate::config::SimConfig;
use crate::controller::SimulationController;
use crate::error::{SimError, SimResult};
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub at_ms: Millis,
    pub action: Command,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: SimConfig,
    pub steps: Vec<ScenarioStep>,
    /// Run on until this time after the last step. Defaults to the last step.
    #[serde(default)]
    pub end_ms: Option<Millis>,
}

impl Scenario {
    pub fn from_yaml_str(s: &str) -> SimResult<Self> {
        let scenario: Scenario = serde_yaml::from_str(s)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => {
                let scenario: Scenario = serde_json::from_str(&content)?;
                scenario.validate()?;
                Ok(scenario)
            }
            _ => Self::from_yaml_str(&content),
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        self.config.validate()?;
        if let Some(w) = self.steps.windows(2).find(|w| w[1].at_ms < w[0].at_ms) {
            return Err(SimError::InvalidScenario {
                what: format!("step at {} ms follows step at {} ms", w[1].at_ms, w[0].at_ms),
            });
        }
        if let (Some(end), Some(last)) = (self.end_ms, self.steps.last()) {
            if end < last.at_ms {
                return Err(SimError::InvalidScenario {
                    what: format!("end_ms {end} precedes last step at {} ms", last.at_ms),
                });
            }
        }
        Ok(())
    }

    pub fn end_ms(&self) -> Millis {
        self.end_ms
            .or_else(|| self.steps.last().map(|s| s.at_ms))
            .unwrap_or(0)
    }

    /// Replay every step and return the controller at `end_ms`.
    pub fn replay(&self) -> SimResult<SimulationController<ManualClock>> {
        self.validate()?;
        let clock = ManualClock::new();
        let mut ctl = SimulationController::new(self.config.clone(), clock.clone())?;
        for step in &self.steps {
            clock.set(step.at_ms);
            ctl.advance();
            ctl.apply(&step.action);
        }
        clock.set(self.end_ms());
        ctl.advance();
        tracing::debug!(steps = self.steps.len(), end_ms = self.end_ms(), "scenario replayed");
        Ok(ctl)
    }

    /// Replay and keep only the final snapshot.
    pub fn run(&self) -> SimResult<Snapshot> {
        Ok(self.replay()?.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Phase;

    const LITHIUM_RUN: &str = r#"
config:
  initial:
    mode: lithium
steps:
  - at_ms: 0
    action: { command: start }
  - at_ms: 1000
    action: { command: stop }
end_ms: 3000
"#;

    #[test]
    fn replays_yaml_script() {
        let scenario = Scenario::from_yaml_str(LITHIUM_RUN).unwrap();
        let snap = scenario.run().unwrap();
        assert_eq!(snap.phase, Phase::LithiumIdle);
        assert_eq!(snap.time, 10);
        assert_eq!(snap.history.len(), 10);
        assert!(snap.charge_level.unwrap() < 100.0);
    }

    #[test]
    fn rejects_out_of_order_steps() {
        let yaml = r#"
steps:
  - at_ms: 500
    action: { command: start }
  - at_ms: 100
    action: { command: stop }
"#;
        let err = Scenario::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, SimError::InvalidScenario { .. }));
    }

    #[test]
    fn end_defaults_to_last_step() {
        let yaml = r#"
steps:
  - at_ms: 0
    action: { command: start }
  - at_ms: 450
    action: { command: set_layer_count, layers: 8 }
"#;
        let scenario = Scenario::from_yaml_str(yaml).unwrap();
        assert_eq!(scenario.end_ms(), 450);
        let snap = scenario.run().unwrap();
        assert_eq!(snap.time, 4);
        assert_eq!(snap.layer_count, Some(8));
        assert!(snap.is_running);
    }
}
