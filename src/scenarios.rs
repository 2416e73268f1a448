//! The acceptance scenarios for the PWM device.
//!
//! Each scenario gets a fresh device and starts with a reset, so scenarios
//! can run in any order and a failure in one says nothing about the others.

use log::{debug, info};

use crate::device::Device;
use crate::sequence::Sequence;
use crate::signal::{ENA, RST_N, UI_IN};
use crate::test::Scenarios;
use crate::testbench::Testbench;
use crate::trigger::Trigger;
use crate::utils;
use crate::value::Val;
use crate::TbResult;

/// One full counter period.
pub const PERIOD: u32 = 256;

/// Duty values measured by [`duty_cycle_sweep`].
pub const SWEEP_DUTIES: [u8; 6] = [0, 32, 64, 128, 192, 255];

/// Allowed deviation of a measured duty cycle, in percentage points. Covers
/// the 255 vs 256 full-scale difference, not model imprecision.
pub const DUTY_TOLERANCE: f64 = 2.0;

/// All scenarios, in the order they are run.
pub fn all<D: Device>() -> Scenarios<D> {
    let mut scenarios = Scenarios::new();
    scenarios.push("boundary_duty_cycles", boundary_duty_cycles::<D>);
    scenarios.push("duty_cycle_sweep", duty_cycle_sweep::<D>);
    scenarios.push("counter_sequence", counter_sequence::<D>);
    scenarios.push("enable_gating", enable_gating::<D>);
    scenarios.push("reset_behavior", reset_behavior::<D>);
    scenarios
}

/// Duty 0 keeps the output low; duty 255 drives it high.
pub fn boundary_duty_cycles<D: Device>(tb: &mut Testbench<D>) -> TbResult {
    info!("Start SimplePWM basic test");
    tb.reset(10)?;

    info!("Test SimplePWM behavior");
    tb.set_duty(0)?;
    // longer than one full period
    for _ in 0..300 {
        tb.rising_edge()?;
        let pwm = tb.pwm_bit();
        tb.check_eq("pwm", false, pwm)?;
    }
    info!("0% duty cycle test passed");

    tb.set_duty(255)?;
    tb.clock_cycles(300)?;
    let pwm = tb.pwm_bit();
    tb.check_eq("pwm", true, pwm)?;
    info!("100% duty cycle test passed");

    Ok(Val::from("output low at 0% and high at ~100% duty"))
}

/// The measured high fraction over one period tracks the duty input.
pub fn duty_cycle_sweep<D: Device>(tb: &mut Testbench<D>) -> TbResult {
    info!("Start duty cycle variation test");
    tb.reset(5)?;

    for duty in SWEEP_DUTIES {
        let expected = utils::duty_percent(duty);
        info!("Testing duty cycle: {}/255 ({:.1}%)", duty, expected);
        tb.set_duty(duty)?;
        tb.clock_cycles(10)?;

        let mut high = 0;
        for _ in 0..PERIOD {
            tb.rising_edge()?;
            if tb.pwm_bit() {
                high += 1;
            }
        }
        let actual = utils::high_percent(high, PERIOD);
        debug!("duty {}: {} of {} samples high", duty, high, PERIOD);
        tb.check_within(&format!("duty cycle {}", duty), expected, actual, DUTY_TOLERANCE)?;
        info!(
            "Duty cycle {}: Expected {:.1}%, Got {:.1}%",
            duty, expected, actual
        );
    }

    Ok(Val::from(format!("{} duty cycles within {}%", SWEEP_DUTIES.len(), DUTY_TOLERANCE)))
}

/// The debug bits are `counter[7:1]`, so sampled every edge they step by one
/// on every second edge.
pub fn counter_sequence<D: Device>(tb: &mut Testbench<D>) -> TbResult {
    const SAMPLES: u32 = 260;
    const SETTLE: u32 = 5;

    info!("Start PWM counter test");
    tb.reset(5)?;
    tb.set_duty(128)?;
    // let counter start
    tb.clock_cycles(2)?;

    let mut previous: Option<u8> = None;
    let mut before_previous: Option<u8> = None;
    for i in 0..SAMPLES {
        tb.rising_edge()?;
        let sample = tb.debug_bits();

        if i > SETTLE {
            if let Some(prev) = previous {
                let next = (prev + 1) % 128;
                tb.check(
                    "debug_bits",
                    sample == prev || sample == next,
                    format!("{} or {}", prev, next),
                    sample,
                )?;
            }
            if let Some(two_back) = before_previous {
                tb.check_eq("debug_bits", (two_back + 1) % 128, sample)?;
            }
        }

        if i == 50 {
            info!("Counter at cycle {}: {}", i, sample);
        }
        before_previous = previous;
        previous = Some(sample);
    }
    info!("Counter sequence test passed");

    Ok(Val::from(format!("{} samples in sequence", SAMPLES - SETTLE - 1)))
}

/// A disabled device holds its counter; enabling it lets it run again.
pub fn enable_gating<D: Device>(tb: &mut Testbench<D>) -> TbResult {
    info!("Start enable functionality test");

    // reset with enable low
    tb.run_sequence(
        Sequence::new("reset disabled")
            .set(ENA, 0)
            .set(UI_IN, 128)
            .set(RST_N, 0)
            .wait(Trigger::ClockCycles(5))
            .set(RST_N, 1),
    )?;

    tb.clock_cycles(10)?;
    let counter_before = tb.debug_bits();
    for _ in 0..10 {
        tb.rising_edge()?;
        let counter = tb.debug_bits();
        tb.check_eq("debug_bits", counter_before, counter)?;
    }
    let counter_after = tb.debug_bits();
    info!("Disable test passed");

    tb.set_enable(true)?;
    let waited = tb.wait_until("debug bits to change after enable", 20, |tb| {
        tb.debug_bits() != counter_after
    })?;
    info!("Enable test passed");

    Ok(Val::from(format!("counter resumed {} edges after enable", waited)))
}

/// Reset forces the outputs to zero within three edges; release restarts
/// the counter.
pub fn reset_behavior<D: Device>(tb: &mut Testbench<D>) -> TbResult {
    const RESET_BUDGET: u64 = 3;
    const RELEASE_BUDGET: u64 = 20;

    info!("Start reset functionality test");
    tb.reset(5)?;
    tb.set_duty(200)?;

    // let PWM run for a while
    tb.clock_cycles(50)?;

    tb.set_rst_n(false)?;
    let waited = tb.wait_until("outputs to clear under reset", RESET_BUDGET, |tb| {
        tb.packed() == 0
    })?;
    // reset is held for the whole window
    tb.clock_cycles(RESET_BUDGET - waited)?;
    let pwm = tb.pwm_bit();
    tb.check_eq("pwm", false, pwm)?;
    let counter = tb.debug_bits();
    tb.check_eq("debug_bits", 0, counter)?;
    info!("Reset state verified");

    tb.set_rst_n(true)?;
    let waited = tb.wait_until("debug bits to leave zero after release", RELEASE_BUDGET, |tb| {
        tb.debug_bits() != 0
    })?;
    tb.clock_cycles(RELEASE_BUDGET - waited)?;
    let packed = tb.packed();
    tb.check("uo_out[7:1]", packed & 0xfe != 0, "nonzero", packed)?;
    info!("Reset functionality test passed");

    Ok(Val::from(format!("counter restarted {} edges after release", waited)))
}
