use anyhow::{Context, Result};
use armdroid::{ArmController, ArmError, Clock, Direction, Joint, OutputPort, SpinClock};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

mod config;
mod gpio;
mod jog;

use config::HostConfig;
use gpio::{GpioPort, TracePort};

#[derive(Parser, Debug)]
#[command(about = "Drive an ArmDroid 1000 from the Raspberry Pi GPIO header")]
struct Cli {
    /// Config file (TOML); defaults to $ARMDROID_HOST_CONFIG or ./armdroid-host.toml
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log bus bytes instead of driving GPIO
    #[arg(long)]
    dry_run: bool,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Mode {
    /// Jog joints from the keyboard
    Jog,
    /// Drive every joint back and forth once
    Sweep {
        /// Phase advances each way; four make one full commutation cycle
        #[arg(long, default_value_t = 400)]
        steps: i32,
    },
}

fn init_tracing() {
    // Default INFO; allow override via RUST_LOG
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .compact()
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let cfg = HostConfig::load(cli.config.clone())?;
    let mode = cli.mode.unwrap_or(Mode::Jog);
    let timing = cfg.timing();
    info!(
        "ArmDroid host - {:?} (pulse interval={:?}, strobe hold={:?})",
        mode, timing.pulse_interval, timing.strobe_hold
    );

    if cli.dry_run || cfg.dry_run() {
        info!("Dry run: bus bytes are logged at debug level");
        let mut arm = ArmController::new(TracePort::default(), SpinClock::default(), timing);
        run(&mut arm, mode, &cfg)
    } else {
        let port = GpioPort::open(cfg.pins())?;
        let mut arm = ArmController::new(port, SpinClock::default(), timing);
        run(&mut arm, mode, &cfg)
    }
}

fn run<P: OutputPort, C: Clock>(
    arm: &mut ArmController<P, C>,
    mode: Mode,
    cfg: &HostConfig,
) -> Result<()> {
    let result = match mode {
        Mode::Jog => {
            let map = jog::keymap(cfg.jog_steps(), cfg.keys.as_ref());
            jog::print_help(&map);
            jog::run(arm, &map)
        }
        Mode::Sweep { steps } => sweep(arm, steps).context("Sweep aborted"),
    };

    if cfg.release_on_exit() {
        arm.set_energized(false);
    }
    let status = arm.status();
    for (joint, js) in Joint::ALL.iter().zip(status.joints.iter()) {
        info!("{:>11}: position={} phase={}", joint.name(), js.position, js.phase);
    }
    result
}

/// Each joint `steps` one way then back; stops at the first rejected drive.
fn sweep<P: OutputPort, C: Clock>(
    arm: &mut ArmController<P, C>,
    steps: i32,
) -> Result<(), ArmError> {
    for joint in Joint::ALL {
        info!("Sweeping {} by {} steps", joint.name(), steps);
        arm.drive(joint.index(), steps, Direction::Backward)?;
        arm.drive(joint.index(), steps, Direction::Forward)?;
    }
    Ok(())
}
