//! Simulation controller: sole owner of mutable simulation state.
//!
//! Commands clamp their arguments and never fail. Time only moves when the
//! host calls [`SimulationController::advance`], which fires every periodic
//! task that has come due on the injected [`TimeSource`].
//!
//! A discharge tick runs, in order:
//! 1. compute the reading at `elapsed = time` against the load resistor
//! 2. advance `time` and store the reading
//! 3. append `(elapsed, voltage, current)` to history
//! 4. lithium only: drain charge by `current * 0.05`; if the cell is now
//!    empty, stop (system-initiated) and fall back to the idle reading
//!
//! Step 4 feeds model output back into source state.

use crate::clock::{Millis, SimulationClock, TaskKind, TimeSource, WallClock};
use crate::command::Command;
use crate::config::SimConfig;
use crate::error::SimResult;
use crate::history::{HistoryBuffer, HistorySample};
use crate::snapshot::{Phase, Snapshot};
use tracing::{debug, info, trace, warn};
use vl_circuit::{
    CircuitReading, LithiumState, Load, Mode, RESISTANCE_BOUNDS, SourceState, VoltaicState,
    compute_reading, discharge_amount,
};
use vl_core::timing::{Timer, tick_timing};

pub struct SimulationController<T: TimeSource = WallClock> {
    time_source: T,
    config: SimConfig,
    source: SourceState,
    is_running: bool,
    time: u64,
    resistance: f64,
    reading: CircuitReading,
    history: HistoryBuffer,
    clock: SimulationClock,
}

impl SimulationController<WallClock> {
    /// Controller on the wall clock with default configuration.
    pub fn with_defaults() -> Self {
        Self::build(SimConfig::default(), WallClock::new())
    }
}

impl<T: TimeSource> SimulationController<T> {
    /// Validate `config` and start idle in its initial mode.
    pub fn new(config: SimConfig, time_source: T) -> SimResult<Self> {
        config.validate()?;
        Ok(Self::build(config, time_source))
    }

    fn build(config: SimConfig, time_source: T) -> Self {
        let source = initial_source(&config, config.initial.mode);
        let mut ctl = Self {
            time_source,
            source,
            is_running: false,
            time: 0,
            resistance: RESISTANCE_BOUNDS.clamp(config.initial.resistance_ohm),
            reading: CircuitReading::ZERO,
            history: HistoryBuffer::new(config.history_capacity),
            clock: SimulationClock::new(config.tick_period_ms, config.charge_period_ms),
            config,
        };
        ctl.refresh_idle();
        ctl
    }

    // ----- commands -----

    /// Idle -> Running/Discharging. Disconnects the charger.
    pub fn start(&mut self) {
        if self.is_running {
            return;
        }
        if let SourceState::Lithium(li) = &mut self.source {
            li.set_charging(false);
        }
        self.is_running = true;
        self.sync_scheduler();
        debug!(phase = %self.phase(), "start");
    }

    /// Running/Discharging -> Idle. The tick counter keeps its value.
    pub fn stop(&mut self) {
        if !self.is_running {
            return;
        }
        self.is_running = false;
        self.sync_scheduler();
        self.refresh_idle();
        debug!(phase = %self.phase(), time = self.time, "stop");
    }

    /// Start if idle, stop if running. Always disconnects the charger.
    pub fn toggle_run(&mut self) {
        if self.is_running {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Lithium only: Idle <-> Charging. Entering charge ends any discharge.
    pub fn toggle_charging(&mut self) {
        let mode = self.mode();
        let SourceState::Lithium(li) = &mut self.source else {
            warn!(%mode, "toggle_charging ignored: source is not rechargeable");
            return;
        };
        let charging = !li.is_charging();
        li.set_charging(charging);
        self.is_running = false;
        self.sync_scheduler();
        // Computed once on entry; charge steps do not recompute.
        self.reading = compute_reading(&self.source, self.time, Load::Open);
        debug!(phase = %self.phase(), "toggle_charging");
    }

    /// Any state -> Idle with time 0, empty history and a full lithium cell.
    /// The voltaic layer count is kept.
    pub fn reset(&mut self) {
        self.is_running = false;
        self.time = 0;
        self.history.clear();
        if let SourceState::Lithium(li) = &mut self.source {
            *li = LithiumState::full();
        }
        self.sync_scheduler();
        self.refresh_idle();
        debug!(phase = %self.phase(), "reset");
    }

    /// Any state -> `{mode}Idle`. Nothing carries over from the previous mode.
    pub fn switch_mode(&mut self, mode: Mode) {
        self.clock.cancel();
        self.source = initial_source(&self.config, mode);
        self.is_running = false;
        self.time = 0;
        self.history.clear();
        self.sync_scheduler();
        self.refresh_idle();
        debug!(phase = %self.phase(), "switch_mode");
    }

    /// Load resistance, clamped to 1..=100 ohm. Takes effect next tick.
    pub fn set_resistance(&mut self, ohms: f64) {
        self.resistance = RESISTANCE_BOUNDS.clamp(ohms);
        self.refresh_idle();
        debug!(resistance = self.resistance, "set_resistance");
    }

    /// Voltaic only: disk pair count, clamped to 1..=20.
    pub fn set_layer_count(&mut self, n: i64) {
        let mode = self.mode();
        let SourceState::Voltaic(v) = &mut self.source else {
            warn!(%mode, "set_layer_count ignored: source has no layers");
            return;
        };
        v.set_layer_count(n);
        let layers = v.layer_count();
        self.refresh_idle();
        debug!(layers, "set_layer_count");
    }

    /// Voltaic only: clamped to 0..=1. Carried in state, unused by the model.
    pub fn set_electrolyte_quality(&mut self, q: f64) {
        let mode = self.mode();
        let SourceState::Voltaic(v) = &mut self.source else {
            warn!(%mode, "set_electrolyte_quality ignored: source has no electrolyte pad");
            return;
        };
        v.set_electrolyte_quality(q);
        debug!(quality = v.electrolyte_quality(), "set_electrolyte_quality");
    }

    /// Lithium only: state of charge in percent, clamped to 0..=100.
    pub fn set_charge_level(&mut self, pct: f64) {
        let mode = self.mode();
        let SourceState::Lithium(li) = &mut self.source else {
            warn!(%mode, "set_charge_level ignored: source is not rechargeable");
            return;
        };
        li.set_charge_level(pct);
        let charge_level = li.charge_level();
        self.refresh_idle();
        debug!(charge_level, "set_charge_level");
    }

    /// Dispatch a serialized command.
    pub fn apply(&mut self, command: &Command) {
        match *command {
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::ToggleRun => self.toggle_run(),
            Command::ToggleCharging => self.toggle_charging(),
            Command::Reset => self.reset(),
            Command::SwitchMode { mode } => self.switch_mode(mode),
            Command::SetResistance { ohms } => self.set_resistance(ohms),
            Command::SetLayerCount { layers } => self.set_layer_count(layers),
            Command::SetElectrolyteQuality { quality } => self.set_electrolyte_quality(quality),
            Command::SetChargeLevel { percent } => self.set_charge_level(percent),
        }
    }

    // ----- time -----

    /// Fire every task due at the time source's "now". Returns firings handled.
    pub fn advance(&mut self) -> usize {
        let mut fired = 0;
        while self.step_due().is_some() {
            fired += 1;
        }
        fired
    }

    /// Fire at most one due task. Lets a host stop part way through a
    /// catch-up burst.
    pub fn step_due(&mut self) -> Option<TaskKind> {
        let kind = self.clock.take_due(self.time_source.now_ms())?;
        match kind {
            TaskKind::Discharge => self.tick(),
            TaskKind::Charge => self.charge_step(),
        }
        Some(kind)
    }

    /// When the armed task next fires, if any.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.clock.next_deadline()
    }

    pub fn active_task(&self) -> Option<TaskKind> {
        self.clock.active()
    }

    pub fn time_source(&self) -> &T {
        &self.time_source
    }

    fn tick(&mut self) {
        let timer = Timer::start();
        let elapsed = self.time;
        let reading = compute_reading(&self.source, elapsed, Load::Resistive(self.resistance));
        self.time += 1;
        self.reading = reading;
        self.history.push(HistorySample {
            time: elapsed,
            voltage: reading.voltage,
            current: reading.current,
        });
        trace!(tick = elapsed, voltage = reading.voltage, current = reading.current, "tick");

        if let SourceState::Lithium(li) = &mut self.source {
            let remaining = li.drain(discharge_amount(&reading));
            if remaining <= 0.0 {
                self.is_running = false;
                self.sync_scheduler();
                self.refresh_idle();
                info!(tick = elapsed, "lithium cell empty, discharge stopped");
            }
        }
        timer.stop_into(&tick_timing::TICK);
    }

    fn charge_step(&mut self) {
        let timer = Timer::start();
        if let SourceState::Lithium(li) = &mut self.source {
            if li.is_charging() && !self.is_running {
                let level = li.replenish(self.config.charge_step_pct);
                trace!(charge_level = level, "charge step");
            }
        }
        timer.stop_into(&tick_timing::CHARGE_STEP);
    }

    /// Arm the task matching current flags, cancelling first if it differs.
    fn sync_scheduler(&mut self) {
        let wanted = if self.is_running {
            Some(TaskKind::Discharge)
        } else if self.source.is_charging() {
            Some(TaskKind::Charge)
        } else {
            None
        };
        if wanted == self.clock.active() {
            return;
        }
        self.clock.cancel();
        if let Some(kind) = wanted {
            self.clock.arm(kind, self.time_source.now_ms());
        }
    }

    /// Open-circuit reading when neither discharging nor charging.
    fn refresh_idle(&mut self) {
        if !self.is_running && !self.source.is_charging() {
            self.reading = compute_reading(&self.source, self.time, Load::Open);
        }
    }

    // ----- queries -----

    pub fn mode(&self) -> Mode {
        self.source.mode()
    }

    pub fn phase(&self) -> Phase {
        match (&self.source, self.is_running) {
            (SourceState::Voltaic(_), false) => Phase::VoltaicIdle,
            (SourceState::Voltaic(_), true) => Phase::VoltaicRunning,
            (SourceState::Lithium(_), true) => Phase::LithiumDischarging,
            (SourceState::Lithium(li), false) if li.is_charging() => Phase::LithiumCharging,
            (SourceState::Lithium(_), false) => Phase::LithiumIdle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_charging(&self) -> bool {
        self.source.is_charging()
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn resistance(&self) -> f64 {
        self.resistance
    }

    pub fn reading(&self) -> &CircuitReading {
        &self.reading
    }

    pub fn source(&self) -> &SourceState {
        &self.source
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Snapshot {
        let (layer_count, electrolyte_quality) = match &self.source {
            SourceState::Voltaic(v) => (Some(v.layer_count()), Some(v.electrolyte_quality())),
            SourceState::Lithium(_) => (None, None),
        };
        Snapshot {
            mode: self.mode(),
            phase: self.phase(),
            is_running: self.is_running,
            is_charging: self.is_charging(),
            time: self.time,
            voltage: self.reading.voltage,
            current: self.reading.current,
            power: self.reading.power,
            resistance: self.resistance,
            charge_level: self.source.charge_level(),
            layer_count,
            electrolyte_quality,
            history: self.history.to_vec(),
        }
    }
}

fn initial_source(config: &SimConfig, mode: Mode) -> SourceState {
    match mode {
        Mode::Voltaic => SourceState::Voltaic(VoltaicState::new(
            i64::from(config.initial.layer_count),
            config.initial.electrolyte_quality,
        )),
        Mode::Lithium => SourceState::Lithium(LithiumState::full()),
    }
}
