//! Equivalent-circuit physics for both sources.
//!
//! Each source is an ideal voltage source in series with an internal
//! resistance. Voltaic polarization and the lithium discharge curve are
//! empirical shapes, not electrochemistry.

use crate::load::Load;
use crate::reading::CircuitReading;
use crate::source::{LithiumState, SourceState, VoltaicState};

/// Open-circuit volts per zinc/copper pair.
pub const VOLTS_PER_LAYER: f64 = 0.76;
/// Internal ohms per zinc/copper pair.
pub const OHMS_PER_LAYER: f64 = 0.5;
/// Polarization decay constant (ticks).
pub const POLARIZATION_TICKS: f64 = 200.0;

/// Lithium cell internal resistance (ohm).
pub const LITHIUM_INTERNAL_OHMS: f64 = 0.1;
const LITHIUM_BASE_V: f64 = 3.2;
const LITHIUM_SLOPE_V: f64 = 0.5;
const LITHIUM_KNEE_V: f64 = 0.3;
const LITHIUM_KNEE_SOC: f64 = 0.9;
const LITHIUM_TAPER_SOC: f64 = 0.1;

/// Percent of charge removed per ampere per tick.
pub const DISCHARGE_SCALE: f64 = 0.05;

pub fn internal_resistance(source: &SourceState) -> f64 {
    match source {
        SourceState::Voltaic(v) => f64::from(v.layer_count()) * OHMS_PER_LAYER,
        SourceState::Lithium(_) => LITHIUM_INTERNAL_OHMS,
    }
}

/// Terminal voltage with nothing connected.
pub fn open_circuit_voltage(source: &SourceState) -> f64 {
    match source {
        SourceState::Voltaic(v) => voltaic_max(v),
        SourceState::Lithium(li) if li.is_empty() => 0.0,
        SourceState::Lithium(li) => lithium_plateau(li.soc()),
    }
}

/// Source EMF while a load has been connected for `elapsed_ticks`.
pub fn loaded_voltage(source: &SourceState, elapsed_ticks: u64) -> f64 {
    match source {
        SourceState::Voltaic(v) => {
            voltaic_max(v) * (-(elapsed_ticks as f64) / POLARIZATION_TICKS).exp()
        }
        SourceState::Lithium(li) => lithium_under_load(li),
    }
}

/// Compute the reading for `source` driving `load`.
///
/// Total over its input domain: `Load::Resistive` is at least 1 ohm, so the
/// series resistance is never zero.
pub fn compute_reading(source: &SourceState, elapsed_ticks: u64, load: Load) -> CircuitReading {
    let r_int = internal_resistance(source);
    match load {
        Load::Open => CircuitReading::open_circuit(open_circuit_voltage(source), r_int),
        Load::Resistive(r_load) => {
            let v = loaded_voltage(source, elapsed_ticks);
            let current = v / (r_load + r_int);
            CircuitReading {
                voltage: v,
                current,
                power: v * current,
                internal_resistance: r_int,
            }
        }
    }
}

/// Charge percent a lithium cell loses over one tick delivering `reading`.
pub fn discharge_amount(reading: &CircuitReading) -> f64 {
    reading.current * DISCHARGE_SCALE
}

fn voltaic_max(v: &VoltaicState) -> f64 {
    f64::from(v.layer_count()) * VOLTS_PER_LAYER
}

fn lithium_plateau(soc: f64) -> f64 {
    let knee = if soc > LITHIUM_KNEE_SOC {
        LITHIUM_KNEE_V
    } else {
        0.0
    };
    LITHIUM_BASE_V + LITHIUM_SLOPE_V * soc + knee
}

// Below 10% the plateau is scaled linearly toward zero. The breakpoint sits
// exactly at soc = 0.1 with no smoothing.
fn lithium_under_load(li: &LithiumState) -> f64 {
    if li.is_empty() {
        return 0.0;
    }
    let soc = li.soc();
    let v = lithium_plateau(soc);
    if soc < LITHIUM_TAPER_SOC {
        v * soc * 10.0
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vl_core::{Tolerances, nearly_equal};

    fn tol() -> Tolerances {
        Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        }
    }

    fn lithium(pct: f64) -> SourceState {
        SourceState::Lithium(LithiumState::with_charge(pct))
    }

    #[test]
    fn default_pile_first_tick() {
        let pile = SourceState::Voltaic(VoltaicState::default());
        let r = compute_reading(&pile, 0, Load::resistive(10.0));
        assert!(nearly_equal(r.internal_resistance, 2.5, tol()));
        assert!(nearly_equal(r.voltage, 3.8, tol()));
        assert!(nearly_equal(r.current, 0.304, tol()));
        assert!(nearly_equal(r.power, 1.1552, tol()));
    }

    #[test]
    fn voltaic_idle_is_open_circuit() {
        for n in 1..=20 {
            let pile = SourceState::Voltaic(VoltaicState::new(n, 1.0));
            let r = compute_reading(&pile, 500, Load::Open);
            assert_eq!(r.voltage, n as f64 * 0.76);
            assert_eq!(r.current, 0.0);
            assert_eq!(r.power, 0.0);
        }
    }

    #[test]
    fn voltaic_polarization_one_time_constant() {
        let pile = SourceState::Voltaic(VoltaicState::default());
        let v = loaded_voltage(&pile, 200);
        assert!(nearly_equal(v, 3.8 * (-1.0_f64).exp(), tol()));
    }

    #[test]
    fn electrolyte_quality_does_not_change_physics() {
        let a = SourceState::Voltaic(VoltaicState::new(5, 1.0));
        let b = SourceState::Voltaic(VoltaicState::new(5, 0.1));
        let load = Load::resistive(10.0);
        assert_eq!(compute_reading(&a, 17, load), compute_reading(&b, 17, load));
    }

    #[test]
    fn lithium_open_circuit_points() {
        assert!(nearly_equal(open_circuit_voltage(&lithium(100.0)), 4.0, tol()));
        assert!(nearly_equal(open_circuit_voltage(&lithium(50.0)), 3.45, tol()));
        assert_eq!(open_circuit_voltage(&lithium(0.0)), 0.0);

        let r = compute_reading(&lithium(100.0), 0, Load::Open);
        assert_eq!(r.current, 0.0);
        assert_eq!(r.power, 0.0);
        assert_eq!(r.internal_resistance, 0.1);
    }

    #[test]
    fn lithium_knee_only_above_ninety() {
        assert!(nearly_equal(open_circuit_voltage(&lithium(90.0)), 3.65, tol()));
        assert!(nearly_equal(open_circuit_voltage(&lithium(91.0)), 3.2 + 0.455 + 0.3, tol()));
    }

    #[test]
    fn lithium_taper_below_ten_percent() {
        // at exactly 10% no taper
        assert!(nearly_equal(loaded_voltage(&lithium(10.0), 0), 3.25, tol()));
        // at 5%: (3.2 + 0.025) * 0.5
        assert!(nearly_equal(loaded_voltage(&lithium(5.0), 0), 1.6125, tol()));
        assert_eq!(loaded_voltage(&lithium(0.0), 0), 0.0);
    }

    #[test]
    fn lithium_ignores_elapsed_ticks() {
        let cell = lithium(70.0);
        assert_eq!(loaded_voltage(&cell, 0), loaded_voltage(&cell, 10_000));
    }

    #[test]
    fn discharge_tracks_current() {
        let cell = lithium(100.0);
        let light = compute_reading(&cell, 0, Load::resistive(100.0));
        let heavy = compute_reading(&cell, 0, Load::resistive(1.0));
        assert!(discharge_amount(&heavy) > discharge_amount(&light));
        assert!(nearly_equal(discharge_amount(&heavy), 4.0 / 1.1 * 0.05, tol()));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn running_pile_never_exceeds_idle(
            layers in 1_i64..=20,
            ticks in 0_u64..100_000,
            r_load in 1.0_f64..=100.0,
        ) {
            let pile = SourceState::Voltaic(VoltaicState::new(layers, 1.0));
            let running = compute_reading(&pile, ticks, Load::resistive(r_load));
            let idle = compute_reading(&pile, ticks, Load::Open);
            prop_assert!(running.voltage <= idle.voltage);
            prop_assert!(running.current >= 0.0);
        }

        #[test]
        fn pile_voltage_decays_monotonically(layers in 1_i64..=20, t in 0_u64..10_000) {
            let pile = SourceState::Voltaic(VoltaicState::new(layers, 1.0));
            prop_assert!(loaded_voltage(&pile, t + 1) <= loaded_voltage(&pile, t));
        }

        #[test]
        fn power_is_voltage_times_current(pct in 0.0_f64..=100.0, r_load in 1.0_f64..=100.0) {
            let cell = SourceState::Lithium(LithiumState::with_charge(pct));
            let r = compute_reading(&cell, 0, Load::resistive(r_load));
            prop_assert!(r.voltage >= 0.0);
            prop_assert!((r.power - r.voltage * r.current).abs() < 1e-12);
        }
    }
}
