//! Integration test: long lithium discharge followed by a recharge.

use vl_circuit::Mode;
use vl_sim::{ManualClock, Phase, SimConfig, SimulationController};

#[test]
fn discharge_then_recharge() {
    let clock = ManualClock::new();
    let mut ctl = SimulationController::new(SimConfig::default(), clock.clone()).unwrap();
    ctl.switch_mode(Mode::Lithium);
    ctl.set_resistance(1.0);
    ctl.start();

    // 60 simulated seconds at 100 ms per tick
    clock.advance(60_000);
    assert_eq!(ctl.advance(), 600);
    let drained = ctl.source().charge_level().unwrap();
    assert!(drained < 20.0, "charge {drained}");
    assert!(ctl.is_running());

    // Voltage under load follows the plateau while above 10%.
    let v = ctl.reading().voltage;
    assert!(v > 0.0 && v < 4.0);

    ctl.toggle_charging();
    assert_eq!(ctl.phase(), Phase::LithiumCharging);
    let time_at_charge = ctl.time();
    let history_len = ctl.history().len();

    // 10 seconds at 50 ms per step, 0.5% each
    clock.advance(10_000);
    assert_eq!(ctl.advance(), 200);
    let charged = ctl.source().charge_level().unwrap();
    assert!((charged - (drained + 100.0).min(100.0)).abs() < 1e-9);

    // Charging does not tick the simulation clock or the chart.
    assert_eq!(ctl.time(), time_at_charge);
    assert_eq!(ctl.history().len(), history_len);

    ctl.toggle_charging();
    assert_eq!(ctl.phase(), Phase::LithiumIdle);
    assert!((ctl.reading().voltage - 4.0).abs() < 1e-12);
}
