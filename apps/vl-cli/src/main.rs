use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use vl_circuit::Mode;
use vl_core::timing::{enable_timing, tick_timing};
use vl_sim::{
    HistorySample, ManualClock, Millis, Scenario, SimConfig, SimError, SimulationController,
    Snapshot, TimeSource, WallClock,
};
use vl_tutor::{CommandBackend, Role, TutorBackend, TutorContext, TutorSession, TutorWorker};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Usage(String),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "voltlab")]
#[command(about = "VoltLab CLI - voltaic pile and lithium-ion cell bench", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discharge a source through the load resistor
    Run {
        #[command(flatten)]
        bench: BenchArgs,
        /// Stop after this many ticks (the cell may stop earlier when empty)
        #[arg(long, default_value_t = 50)]
        ticks: u64,
        /// Follow the wall clock instead of jumping between deadlines
        #[arg(long)]
        realtime: bool,
        /// Write the chart history to a .csv or .json file
        #[arg(short, long)]
        export: Option<PathBuf>,
        /// Print handler timing after the run
        #[arg(long)]
        timing: bool,
    },
    /// Charge a lithium cell until it is full
    Charge {
        #[command(flatten)]
        bench: BenchArgs,
        /// Give up after this many charge steps
        #[arg(long, default_value_t = 400)]
        max_steps: u64,
    },
    /// Replay a scripted scenario and print the final state
    Scenario {
        /// Path to the scenario YAML (or JSON) file
        path: PathBuf,
        /// Output format for the final snapshot
        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
    },
    /// Ask the tutor a question about the current bench
    Ask {
        /// The question
        question: String,
        #[command(flatten)]
        bench: BenchArgs,
        /// Run this many ticks first so the readings reflect a loaded source
        #[arg(long, default_value_t = 0)]
        ticks: u64,
    },
    /// Print the default configuration as YAML
    Config,
}

#[derive(clap::Args)]
struct BenchArgs {
    /// Configuration file (.yaml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Power source: voltaic or lithium
    #[arg(short, long)]
    mode: Option<Mode>,
    /// Zinc/copper layer pairs (voltaic)
    #[arg(long)]
    layers: Option<i64>,
    /// Load resistance in ohms
    #[arg(short, long)]
    resistance: Option<f64>,
    /// Starting state of charge in percent (lithium)
    #[arg(long)]
    charge: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            bench,
            ticks,
            realtime,
            export,
            timing,
        } => cmd_run(&bench, ticks, realtime, export.as_deref(), timing),
        Commands::Charge { bench, max_steps } => cmd_charge(&bench, max_steps),
        Commands::Scenario { path, format } => cmd_scenario(&path, format),
        Commands::Ask {
            question,
            bench,
            ticks,
        } => cmd_ask(&question, &bench, ticks),
        Commands::Config => cmd_config(),
    }
}

impl BenchArgs {
    fn load_config(&self) -> CliResult<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path)?,
            None => SimConfig::default(),
        };
        if let Some(mode) = self.mode {
            config.initial.mode = mode;
        }
        if let Some(ohms) = self.resistance {
            config.initial.resistance_ohm = ohms;
        }
        Ok(config)
    }

    /// Controller in the requested initial state, not yet running.
    fn build<T: TimeSource>(&self, time_source: T) -> CliResult<SimulationController<T>> {
        let mut ctl = SimulationController::new(self.load_config()?, time_source)?;
        if let Some(n) = self.layers {
            ctl.set_layer_count(n);
        }
        if let Some(pct) = self.charge {
            ctl.set_charge_level(pct);
        }
        Ok(ctl)
    }
}

fn cmd_run(
    bench: &BenchArgs,
    ticks: u64,
    realtime: bool,
    export: Option<&Path>,
    timing: bool,
) -> CliResult<()> {
    if timing {
        enable_timing();
    }

    let (snapshot, emptied) = if realtime {
        let mut ctl = bench.build(WallClock::new())?;
        print_header(&ctl.snapshot(), ctl.config());
        ctl.start();
        run_ticks(&mut ctl, ticks, |ctl, deadline| {
            let now = ctl.time_source().now_ms();
            if deadline > now {
                std::thread::sleep(Duration::from_millis(deadline - now));
            }
        });
        finish_run(&mut ctl)
    } else {
        let clock = ManualClock::new();
        let mut ctl = bench.build(clock.clone())?;
        print_header(&ctl.snapshot(), ctl.config());
        ctl.start();
        run_ticks(&mut ctl, ticks, |_, deadline| clock.set(deadline));
        finish_run(&mut ctl)
    };
    clear_progress_line();

    if emptied {
        println!("✓ Cell emptied after {} ticks", snapshot.time);
    } else {
        println!("✓ Ran {} ticks", snapshot.time);
    }
    print_snapshot(&snapshot);

    if let Some(path) = export {
        export_history(&snapshot.history, path)?;
        println!(
            "✓ Exported {} samples to {}",
            snapshot.history.len(),
            path.display()
        );
    }

    if timing {
        tick_timing::print_summary();
    }
    Ok(())
}

/// Stop a finished run. Reports whether the source stopped on its own first.
fn finish_run<T: TimeSource>(ctl: &mut SimulationController<T>) -> (Snapshot, bool) {
    let emptied = !ctl.is_running();
    ctl.stop();
    (ctl.snapshot(), emptied)
}

/// Let time pass deadline by deadline until `ticks` ticks have run or the
/// source stops on its own.
fn run_ticks<T: TimeSource>(
    ctl: &mut SimulationController<T>,
    ticks: u64,
    mut wait_until: impl FnMut(&SimulationController<T>, Millis),
) {
    while ctl.is_running() && ctl.time() < ticks {
        let Some(deadline) = ctl.next_deadline() else {
            break;
        };
        wait_until(ctl, deadline);
        let mut fired = false;
        while ctl.time() < ticks && ctl.step_due().is_some() {
            fired = true;
        }
        if fired {
            render_progress(ctl.time(), ticks, ctl.reading().voltage, ctl.reading().current);
        }
    }
}

fn cmd_charge(bench: &BenchArgs, max_steps: u64) -> CliResult<()> {
    let clock = ManualClock::new();
    let mut ctl = bench.build(clock.clone())?;
    if ctl.mode() != Mode::Lithium {
        return Err(CliError::Usage(
            "only the lithium cell can be charged (use --mode lithium)".to_string(),
        ));
    }

    let start = ctl.snapshot();
    print_header(&start, ctl.config());
    ctl.toggle_charging();

    let mut steps = 0;
    while steps < max_steps {
        let level = ctl.source().charge_level().unwrap_or(0.0);
        if level >= 100.0 {
            break;
        }
        let Some(deadline) = ctl.next_deadline() else {
            break;
        };
        clock.set(deadline);
        steps += ctl.advance() as u64;
        print!("\rcharging {:>6.1}%", ctl.source().charge_level().unwrap_or(0.0));
        let _ = io::stdout().flush();
    }
    ctl.toggle_charging();
    clear_progress_line();

    let end = ctl.snapshot();
    println!(
        "✓ Charged {:.1}% -> {:.1}% in {} steps ({:.1} s)",
        start.charge_level.unwrap_or(0.0),
        end.charge_level.unwrap_or(0.0),
        steps,
        clock.now_ms() as f64 / 1000.0
    );
    print_snapshot(&end);
    Ok(())
}

fn cmd_scenario(path: &Path, format: Format) -> CliResult<()> {
    println!("Replaying scenario: {}", path.display());
    let scenario = Scenario::load(path)?;
    let snapshot = scenario.run()?;
    println!(
        "✓ {} steps replayed to {} ms",
        scenario.steps.len(),
        scenario.end_ms()
    );
    match format {
        Format::Yaml => print!("{}", serde_yaml::to_string(&snapshot)?),
        Format::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
    }
    Ok(())
}

fn cmd_ask(question: &str, bench: &BenchArgs, ticks: u64) -> CliResult<()> {
    let clock = ManualClock::new();
    let mut ctl = bench.build(clock.clone())?;
    if ticks > 0 {
        ctl.start();
        run_ticks(&mut ctl, ticks, |_, deadline| clock.set(deadline));
        ctl.stop();
        clear_progress_line();
    }
    let context = TutorContext::from(&ctl.snapshot());

    let mut session = TutorSession::new();
    let Some(prompt) = session.submit(&context, question) else {
        return Err(CliError::Usage("question is empty".to_string()));
    };

    let reply = match CommandBackend::from_env() {
        Ok(backend) => {
            let backend: Arc<dyn TutorBackend> = Arc::new(backend);
            let worker = TutorWorker::start(backend, prompt);
            let spinner = ['|', '/', '-', '\\'];
            let mut spin_idx = 0;
            loop {
                if let Some(result) = worker.try_reply() {
                    break result;
                }
                print!("\r{} thinking", spinner[spin_idx % spinner.len()]);
                let _ = io::stdout().flush();
                spin_idx += 1;
                std::thread::sleep(Duration::from_millis(100));
            }
        }
        Err(e) => Err(e),
    };
    clear_progress_line();
    session.complete(reply);

    for message in session.messages() {
        let who = match message.role {
            Role::User => "you",
            Role::Model => "tutor",
        };
        println!("[{}] {:>5}: {}", message.at.format("%H:%M:%S"), who, message.text);
    }
    Ok(())
}

fn cmd_config() -> CliResult<()> {
    print!("{}", SimConfig::default().to_yaml_string()?);
    Ok(())
}

#[derive(Serialize)]
struct HistoryExport<'a> {
    samples: &'a [HistorySample],
}

fn export_history(history: &[HistorySample], path: &Path) -> CliResult<()> {
    let body = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::to_string_pretty(&HistoryExport { samples: history })?,
        Some("csv") => {
            let mut csv = String::from("time,voltage_v,current_a\n");
            for s in history {
                csv.push_str(&format!("{},{},{}\n", s.time, s.voltage, s.current));
            }
            csv
        }
        _ => {
            return Err(CliError::Usage(format!(
                "cannot export to {}: use a .csv or .json extension",
                path.display()
            )));
        }
    };
    std::fs::write(path, body)?;
    Ok(())
}

fn print_header(snap: &Snapshot, config: &SimConfig) {
    use uom::si::time::second;
    println!("Source: {} ({})", snap.mode.label(), snap.phase);
    println!(
        "  Tick:   {:.3} s (charge step every {:.3} s)",
        config.tick_period().get::<second>(),
        config.charge_period().get::<second>()
    );
    match (snap.layer_count, snap.charge_level) {
        (Some(layers), _) => println!("  Layers: {}", layers),
        (_, Some(level)) => println!("  Charge: {:.1}%", level),
        _ => {}
    }
    println!("  Load:   {:.1} Ω", snap.resistance);
}

fn print_snapshot(snap: &Snapshot) {
    println!("\nFinal state: {}", snap.phase);
    println!("  Voltage: {:.3} V", snap.voltage);
    println!("  Current: {:.3} A", snap.current);
    println!("  Power:   {:.3} W", snap.power);
    if let Some(level) = snap.charge_level {
        println!("  Charge:  {:.2}%", level);
    }
    if let (Some(first), Some(last)) = (snap.history.first(), snap.history.last()) {
        println!(
            "  History: {} samples, t={}..{}",
            snap.history.len(),
            first.time,
            last.time
        );
    }
}

fn render_progress(time: u64, ticks: u64, voltage: f64, current: f64) {
    let width = 28usize;
    let fraction = if ticks == 0 {
        1.0
    } else {
        (time as f64 / ticks as f64).min(1.0)
    };
    let filled = ((fraction * width as f64).round() as usize).min(width);
    print!(
        "\r[{}{}] t={:<5} {:>7.3} V {:>7.3} A",
        "#".repeat(filled),
        "-".repeat(width - filled),
        time,
        voltage,
        current
    );
    let _ = io::stdout().flush();
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(80));
    let _ = io::stdout().flush();
}
