use std::env;
use std::process::ExitCode;

use simplepwm::{scenarios, PwmDevice, TestbenchOptions};
use snafu::{ResultExt, Whatever};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", snafu::Report::from_error(e));
            ExitCode::FAILURE
        }
    }
}

/// Whether every scenario passed.
fn run() -> Result<bool, Whatever> {
    let options = TestbenchOptions::from_env().whatever_context("Invalid configuration")?;
    let mut suite = scenarios::all();
    // optional substring filter on scenario names
    if let Some(pattern) = env::args().nth(1) {
        suite = suite.filter(&pattern);
    }

    let report = simplepwm::run_scenarios(&suite, &options, PwmDevice::with_counter)
        .whatever_context("Testbench run failed")?;
    Ok(report.passed())
}
