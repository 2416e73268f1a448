use std::fs;

use camino::Utf8PathBuf;
use simplepwm::prelude::*;
use snafu::{ResultExt, Whatever};

fn scratch_dir(name: &str) -> Utf8PathBuf {
    let dir = Utf8PathBuf::try_from(std::env::temp_dir())
        .expect("temp dir is not UTF-8")
        .join(format!("simplepwm-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
#[snafu::report]
fn reference_device_passes_every_scenario() -> Result<(), Whatever> {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = env_logger::try_init();
    }

    let report = run(&TestbenchOptions::deterministic(0)).whatever_context("run failed")?;

    assert_eq!(report.scenarios.len(), 5);
    for scenario in &report.scenarios {
        assert!(scenario.passed(), "{}", scenario.message());
        assert!(scenario.stats.checked > 0);
        assert_eq!(scenario.stats.failed, 0);
    }
    assert!(report.passed());
    Ok(())
}

#[test]
#[snafu::report]
fn power_on_state_does_not_matter() -> Result<(), Whatever> {
    for seed in 0..4 {
        let options = TestbenchOptions {
            power_on: PowerOn::Random,
            ..TestbenchOptions::deterministic(seed)
        };
        let report = run(&options).whatever_context("run failed")?;
        for scenario in &report.scenarios {
            assert!(
                scenario.passed(),
                "seed {} power-on {}: {}",
                seed,
                scenario.power_on,
                scenario.message()
            );
        }
    }
    Ok(())
}

#[test]
fn same_seed_same_power_on() {
    let options = TestbenchOptions {
        power_on: PowerOn::Random,
        ..TestbenchOptions::deterministic(1234)
    };
    let a = run(&options).unwrap();
    let b = run(&options).unwrap();
    let power_on = |r: &simplepwm::SuiteReport| -> Vec<u8> {
        r.scenarios.iter().map(|s| s.power_on).collect()
    };
    assert_eq!(power_on(&a), power_on(&b));
}

#[test]
fn scenario_edge_counts() {
    let report = run(&TestbenchOptions::deterministic(0)).unwrap();
    let edges = |name: &str| report.get(name).unwrap().edges;

    // reset, 300 edges at duty 0, 300 at duty 255
    assert_eq!(edges("boundary_duty_cycles"), 10 + 300 + 300);
    // reset, then 10 settle + 256 measured per duty
    assert_eq!(edges("duty_cycle_sweep"), 5 + 6 * (10 + 256));
    assert_eq!(edges("counter_sequence"), 5 + 2 + 260);
    // disable window, then the counter moves on the second enabled edge
    assert_eq!(edges("enable_gating"), 5 + 10 + 10 + 2);
    assert_eq!(edges("reset_behavior"), 5 + 50 + 3 + 20);

    let sim_ns = report.get("reset_behavior").unwrap().sim_time_ns;
    // 100 kHz clock, rising edges at 5 us into each period
    assert_eq!(sim_ns, (78.0 * 10_000.0) - 5_000.0);
}

#[test]
fn filter_selects_scenarios() {
    let suite: Scenarios = scenarios::all().filter("duty");
    let names: Vec<_> = suite.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["boundary_duty_cycles", "duty_cycle_sweep"]);
}

#[test]
#[snafu::report]
fn traces_and_junit_are_written() -> Result<(), Whatever> {
    let dir = scratch_dir("reports");
    let junit = dir.join("results.xml");
    let options = TestbenchOptions {
        trace_directory: Some(dir.join("waves")),
        junit_path: Some(junit.clone()),
        ..TestbenchOptions::deterministic(0)
    };

    let suite = scenarios::all().filter("reset");
    let report = run_scenarios(&suite, &options, PwmDevice::with_counter)
        .whatever_context("run failed")?;
    assert!(report.passed());

    let vcd = fs::read_to_string(dir.join("waves").join("reset_behavior.vcd"))
        .whatever_context("missing trace")?;
    assert!(vcd.contains("$timescale 1ns $end"));
    assert!(vcd.contains("$var wire 8 & uo_out [7:0] $end"));
    assert!(vcd.contains("$enddefinitions $end"));
    // first rising edge of the default clock
    assert!(vcd.contains("#5000\n"));

    let xml = fs::read_to_string(&junit).whatever_context("missing junit")?;
    assert!(xml.contains("reset_behavior"));
    assert!(!xml.contains("<failure"));

    fs::remove_dir_all(&dir).whatever_context("cleanup")?;
    Ok(())
}

#[test]
fn unrepresentable_clock_is_rejected_up_front() {
    let options = TestbenchOptions {
        clock: Clock::new(3, TimeUnit::Ps),
        ..TestbenchOptions::deterministic(0)
    };
    let err = run(&options).unwrap_err();
    assert!(matches!(err, Error::TimeRounding { .. }));
}
