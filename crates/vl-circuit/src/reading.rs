//! Instantaneous electrical reading.

use serde::{Deserialize, Serialize};
use vl_core::units::{Current, Potential, Power, Resistance, amps, ohms, volts, watts};

/// Terminal voltage, current and power at one instant.
///
/// Never persisted; recomputed every tick while running and on any input
/// change while idle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CircuitReading {
    /// Terminal voltage (V)
    pub voltage: f64,
    /// Load current (A)
    pub current: f64,
    /// Delivered power (W)
    pub power: f64,
    /// Source internal resistance (ohm)
    pub internal_resistance: f64,
}

impl CircuitReading {
    /// All-zero reading.
    pub const ZERO: Self = Self {
        voltage: 0.0,
        current: 0.0,
        power: 0.0,
        internal_resistance: 0.0,
    };

    /// Reading with no current drawn.
    pub fn open_circuit(voltage: f64, internal_resistance: f64) -> Self {
        Self {
            voltage,
            current: 0.0,
            power: 0.0,
            internal_resistance,
        }
    }

    pub fn potential(&self) -> Potential {
        volts(self.voltage)
    }

    pub fn amperage(&self) -> Current {
        amps(self.current)
    }

    pub fn wattage(&self) -> Power {
        watts(self.power)
    }

    pub fn source_resistance(&self) -> Resistance {
        ohms(self.internal_resistance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uom::si::electric_potential::volt;
    use uom::si::power::watt;

    #[test]
    fn typed_accessors_match_fields() {
        let r = CircuitReading {
            voltage: 3.8,
            current: 0.304,
            power: 3.8 * 0.304,
            internal_resistance: 2.5,
        };
        assert_eq!(r.potential().get::<volt>(), 3.8);
        assert!((r.wattage().get::<watt>() - 1.1552).abs() < 1e-12);
    }

    #[test]
    fn open_circuit_has_no_flow() {
        let r = CircuitReading::open_circuit(4.0, 0.1);
        assert_eq!(r.current, 0.0);
        assert_eq!(r.power, 0.0);
        assert_eq!(r.voltage, 4.0);
    }
}
