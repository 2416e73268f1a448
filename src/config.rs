use std::env;
use std::str::FromStr;

use camino::Utf8PathBuf;
use rand::Rng;

use crate::error::{Error, InvalidEnvSnafu, InvalidPowerOnSnafu, Result};
use crate::trigger::Clock;

/// How the counter comes up before the first reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerOn {
    Zero,
    Value(u8),
    /// Undefined in hardware; drawn from the run's seeded RNG.
    Random,
}

impl PowerOn {
    pub fn counter<R: Rng>(&self, rng: &mut R) -> u8 {
        match self {
            PowerOn::Zero => 0,
            PowerOn::Value(v) => *v,
            PowerOn::Random => rng.gen(),
        }
    }
}

impl FromStr for PowerOn {
    type Err = Error;

    /// `zero`, `random` or a counter value in 0..=255.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "zero" => Ok(PowerOn::Zero),
            "random" => Ok(PowerOn::Random),
            v => v
                .parse()
                .map(PowerOn::Value)
                .map_err(|_| InvalidPowerOnSnafu { value: s }.build()),
        }
    }
}

/// Optional configuration for a testbench run. Usually, you can just use
/// [`TestbenchOptions::default()`].
#[derive(Debug, Clone)]
pub struct TestbenchOptions {
    pub clock: Clock,

    /// Simulator time resolution as a power of ten of a second.
    pub precision: i8,

    /// Hard cap on rising edges per scenario, so a scenario waiting on a
    /// transition that never comes fails instead of hanging.
    pub max_edges: u64,

    pub power_on: PowerOn,

    /// Seeds every random draw of the run. Logged at start so a failing run
    /// can be reproduced.
    pub seed: u64,

    /// If set, one VCD file per scenario is written into this directory.
    pub trace_directory: Option<Utf8PathBuf>,

    /// If set, a JUnit XML report is written here after the run.
    pub junit_path: Option<Utf8PathBuf>,

    pub suite_name: String,

    /// Whether to print the result table to stdout after the run.
    pub print_summary: bool,
}

impl Default for TestbenchOptions {
    fn default() -> Self {
        Self {
            clock: Clock::default(),
            precision: -9,
            max_edges: 100_000,
            power_on: PowerOn::Random,
            seed: rand::random(),
            trace_directory: None,
            junit_path: None,
            suite_name: env!("CARGO_PKG_NAME").to_string(),
            print_summary: true,
        }
    }
}

impl TestbenchOptions {
    /// The defaults, overridden by any `SIMPLEPWM_*` environment variables
    /// that are set.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();
        if let Some(clock) = var("SIMPLEPWM_CLOCK") {
            options.clock = clock.parse()?;
        }
        if let Some(seed) = var("SIMPLEPWM_SEED") {
            options.seed = parse("SIMPLEPWM_SEED", &seed)?;
        }
        if let Some(max_edges) = var("SIMPLEPWM_MAX_EDGES") {
            options.max_edges = parse("SIMPLEPWM_MAX_EDGES", &max_edges)?;
        }
        if let Some(power_on) = var("SIMPLEPWM_POWER_ON") {
            options.power_on = power_on.parse()?;
        }
        if let Some(dir) = var("SIMPLEPWM_TRACE_DIR") {
            options.trace_directory = Some(dir.into());
        }
        if let Some(path) = var("SIMPLEPWM_JUNIT") {
            options.junit_path = Some(path.into());
        }
        Ok(options)
    }

    /// Defaults with a fixed seed and the counter powering up at zero.
    pub fn deterministic(seed: u64) -> Self {
        Self {
            seed,
            power_on: PowerOn::Zero,
            print_summary: false,
            ..Default::default()
        }
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| InvalidEnvSnafu { name, value }.build())
}
