use anyhow::{Context, Result};
use armdroid::ArmTiming;
use armdroid_protocol::ArmCommand;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use std::{env, fs, path::{Path, PathBuf}};

/// BCM numbers of WiringPi pins 0-7, bus bit n on entry n.
pub const DEFAULT_PINS: [u8; 8] = [17, 18, 27, 22, 23, 24, 25, 4];

#[derive(Debug, Default, Deserialize, Clone)]
pub struct HostConfig {
    pub pins: Option<[u8; 8]>,         // BCM pin per bus bit, bit 0 (strobe) first
    pub pulse_interval_us: Option<u64>, // default: 1000
    pub strobe_hold_us: Option<u64>,   // default: 2000
    pub jog_steps: Option<i32>,        // default: 20
    pub dry_run: Option<bool>,         // default: false
    pub release_on_exit: Option<bool>, // default: true
    pub keys: Option<BTreeMap<String, ArmCommand>>, // extra/overriding jog keys
}

/// Phase advances per jog key press; one press of the stock keymap turns
/// a joint through five full commutation cycles.
pub const DEFAULT_JOG_STEPS: i32 = 20;

impl HostConfig {
    /// Load the config named on the command line, `$ARMDROID_HOST_CONFIG`,
    /// or `./armdroid-host.toml`, in that order.
    ///
    /// A named file that cannot be read or parsed is an error. Defaults are
    /// used only when nothing was named and the working directory has no
    /// config file.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self> {
        let from_env = env::var_os("ARMDROID_HOST_CONFIG").map(PathBuf::from);
        let cwd = env::current_dir().ok();
        Self::resolve(explicit.or(from_env), cwd)
    }

    fn resolve(named: Option<PathBuf>, cwd: Option<PathBuf>) -> Result<Self> {
        if let Some(p) = named {
            return Self::from_path(&p);
        }
        match cwd.map(|dir| dir.join("armdroid-host.toml")) {
            Some(p) if p.exists() => Self::from_path(&p),
            _ => Ok(Self::default()),
        }
    }

    fn from_path(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let cfg = toml::from_str::<HostConfig>(&s)
            .with_context(|| format!("Failed to parse config (TOML) {}", path.display()))?;
        tracing::info!("Loaded config {}", path.display());
        Ok(cfg)
    }

    pub fn pins(&self) -> [u8; 8] { self.pins.unwrap_or(DEFAULT_PINS) }
    pub fn jog_steps(&self) -> i32 { self.jog_steps.unwrap_or(DEFAULT_JOG_STEPS) }
    pub fn dry_run(&self) -> bool { self.dry_run.unwrap_or(false) }
    pub fn release_on_exit(&self) -> bool { self.release_on_exit.unwrap_or(true) }

    pub fn timing(&self) -> ArmTiming {
        let stock = ArmTiming::default();
        ArmTiming {
            pulse_interval: self
                .pulse_interval_us
                .map(Duration::from_micros)
                .unwrap_or(stock.pulse_interval),
            strobe_hold: self
                .strobe_hold_us
                .map(Duration::from_micros)
                .unwrap_or(stock.strobe_hold),
        }
    }
}
