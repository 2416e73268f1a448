//! Cycle-accurate model of a minimal 8-bit PWM generator, and the testbench
//! that verifies it.
//!
//! The [`device`] module holds the synchronous state machine. Everything else
//! is the harness: a [`Simulator`] puts one device behind its pins and drives
//! it from a [`Clock`](trigger::Clock); a [`Testbench`] adds stimulus and
//! checks on top; [`scenarios`] are the acceptance tests, run in isolation by
//! [`run_scenarios`].

mod assertion;
pub mod config;
pub mod device;
mod error;
pub mod junit;
pub mod prelude;
pub mod report;
pub mod scenarios;
pub mod sequence;
pub mod signal;
pub mod simulator;
pub mod testbench;
pub mod trigger;
pub mod utils;
mod value;
pub mod vcd;

use std::panic::{self, AssertUnwindSafe};
use std::time;

use rand::{rngs::StdRng, SeedableRng};
use snafu::ResultExt;

pub use assertion::AssertionStats;
pub use config::{PowerOn, TestbenchOptions};
pub use device::{Device, PwmDevice};
pub use error::{Error, Result};
pub use report::{ScenarioReport, SuiteReport};
pub use simulator::Simulator;
pub use test::Scenarios;
pub use testbench::Testbench;
pub use value::Val;

use error::{CreateFileSnafu, PanickedSnafu};
use test::Scenario;
use trigger::TimeUnit;

/// What a scenario returns: a pass message, or why it failed.
pub type TbResult = Result<Val, Error>;

/// Run the five acceptance scenarios against the reference device.
pub fn run(options: &TestbenchOptions) -> Result<SuiteReport> {
    run_scenarios(&scenarios::all(), options, PwmDevice::with_counter)
}

/// Run every scenario against a fresh device from `make_device`, which is
/// handed the counter value to power up with.
///
/// A failing or panicking scenario is recorded and the next one still runs.
/// The returned error is reserved for problems with the run itself, such as
/// an unusable clock or an unwritable report.
pub fn run_scenarios<D, F>(
    scenarios: &Scenarios<D>,
    options: &TestbenchOptions,
    mut make_device: F,
) -> Result<SuiteReport>
where
    D: Device,
    F: FnMut(u8) -> D,
{
    let start = time::Instant::now();
    // fail early on a clock that can't be represented
    options.clock.edges(options.precision)?;
    if let Some(dir) = &options.trace_directory {
        std::fs::create_dir_all(dir).context(CreateFileSnafu { path: dir })?;
    }
    log::info!(
        "Running {} scenarios, clock {}, seed {}",
        scenarios.len(),
        options.clock,
        options.seed
    );

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut reports = Vec::with_capacity(scenarios.len());
    for scenario in scenarios.iter() {
        let power_on = options.power_on.counter(&mut rng);
        let report = run_one(scenario, make_device(power_on), power_on, options);
        report.log();
        reports.push(report);
    }

    let suite = SuiteReport {
        name: options.suite_name.clone(),
        seed: options.seed,
        time_secs: start.elapsed().as_secs_f64(),
        scenarios: reports,
    };
    suite.log_totals();
    if options.print_summary {
        suite.print_summary();
    }
    if let Some(path) = &options.junit_path {
        junit::write_junit_xml(&suite, path)?;
    }
    Ok(suite)
}

fn run_one<D: Device>(
    scenario: &Scenario<D>,
    device: D,
    power_on: u8,
    options: &TestbenchOptions,
) -> ScenarioReport {
    let time_start = time::Instant::now();
    log::info!("TEST {}: start (power-on counter {})", scenario.name, power_on);

    let mut report = ScenarioReport {
        name: scenario.name.clone(),
        result: Ok(Val::None),
        time_secs: 0.0,
        sim_time_ns: 0.0,
        edges: 0,
        stats: AssertionStats::default(),
        power_on,
    };

    let mut tb = match Testbench::new(&scenario.name, device, options) {
        Ok(tb) => tb,
        Err(e) => {
            report.result = Err(e);
            return report;
        }
    };

    let result = start_trace(&mut tb, options).and_then(|_| {
        panic::catch_unwind(AssertUnwindSafe(|| (scenario.generator)(&mut tb))).unwrap_or_else(
            |payload| {
                PanickedSnafu {
                    scenario: scenario.name.as_str(),
                    message: panic_message(payload.as_ref()),
                }
                .fail()
            },
        )
    });
    // a scenario failure takes precedence over a trace that failed to close
    let finished = tb.finish();
    report.result = result.and_then(|val| finished.map(|_| val));

    report.time_secs = time_start.elapsed().as_secs_f64();
    report.sim_time_ns = tb.sim().get_sim_time(TimeUnit::Ns);
    report.edges = tb.edge();
    report.stats = tb.stats();
    report
}

fn start_trace<D: Device>(tb: &mut Testbench<D>, options: &TestbenchOptions) -> Result<()> {
    match &options.trace_directory {
        Some(dir) => {
            let path = dir.join(format!("{}.vcd", tb.name()));
            tb.sim_mut().trace_to(&path)
        }
        None => Ok(()),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
