use crate::assertion::AssertionStats;
use crate::config::TestbenchOptions;
use crate::device::{Device, Outputs, PwmDevice};
use crate::error::{Result, TimeoutExceededSnafu, ValueMismatchSnafu};
use crate::sequence::{Sequence, Stimulus};
use crate::signal::{SimObject, ENA, RST_N, UIO_IN, UI_IN, UO_OUT};
use crate::simulator::Simulator;
use crate::trigger::Trigger;
use crate::value::Val;

/// Enabled, zero duty and reset held for `cycles` edges, then released.
pub fn reset_sequence(cycles: u64) -> Sequence {
    Sequence::new("reset")
        .set(ENA, 1)
        .set(UI_IN, 0)
        .set(UIO_IN, 0)
        .set(RST_N, 0)
        .wait(Trigger::ClockCycles(cycles))
        .set(RST_N, 1)
}

/// Ties one scenario to its own device and simulator.
///
/// Every wait is a blocking call: the testbench pulls clock edges from the
/// simulator until the requested trigger has fired, then samples outputs.
pub struct Testbench<D: Device = PwmDevice> {
    name: String,
    sim: Simulator<D>,
    stats: AssertionStats,
}

impl<D: Device> Testbench<D> {
    pub fn new(name: &str, device: D, options: &TestbenchOptions) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            sim: Simulator::new(name, device, options)?,
            stats: AssertionStats::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sim(&self) -> &Simulator<D> {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut Simulator<D> {
        &mut self.sim
    }

    pub fn stats(&self) -> AssertionStats {
        self.stats
    }

    /// Index of the last rising edge.
    pub fn edge(&self) -> u64 {
        self.sim.edge_count()
    }

    pub fn c(&self, name: &str) -> Result<SimObject> {
        SimObject::from_name(name)
    }

    pub fn set(&mut self, name: &str, value: u32) -> Result<()> {
        let obj = self.c(name)?;
        self.sim.set_value(obj, value)
    }

    pub fn get(&self, name: &str) -> Result<u32> {
        Ok(self.sim.get_value(self.c(name)?))
    }

    pub fn set_duty(&mut self, duty: u8) -> Result<()> {
        self.sim.set_value(UI_IN, duty as u32)
    }

    pub fn set_enable(&mut self, enabled: bool) -> Result<()> {
        self.sim.set_value(ENA, enabled as u32)
    }

    /// Drive the active-low reset pin.
    pub fn set_rst_n(&mut self, level: bool) -> Result<()> {
        self.sim.set_value(RST_N, level as u32)
    }

    pub fn rising_edge(&mut self) -> Result<()> {
        self.sim.wait(Trigger::RisingEdge)
    }

    pub fn clock_cycles(&mut self, n_cycles: u64) -> Result<()> {
        self.sim.wait(Trigger::ClockCycles(n_cycles))
    }

    pub fn run_sequence(&mut self, sequence: Sequence) -> Result<()> {
        log::debug!("[{}] Running sequence {:?}", self.name, sequence);
        for step in sequence {
            match step {
                Stimulus::Set(obj, value) => self.sim.set_value(obj, value)?,
                Stimulus::Wait(trigger) => self.sim.wait(trigger)?,
            }
        }
        Ok(())
    }

    pub fn reset(&mut self, cycles: u64) -> Result<()> {
        log::info!("[{}] Reset", self.name);
        self.run_sequence(reset_sequence(cycles))
    }

    pub fn packed(&self) -> u8 {
        self.sim.get_value(UO_OUT) as u8
    }

    pub fn outputs(&self) -> Outputs {
        Outputs::from_packed(self.packed())
    }

    pub fn pwm_bit(&self) -> bool {
        self.outputs().pwm_bit
    }

    pub fn debug_bits(&self) -> u8 {
        self.outputs().debug_bits
    }

    /// Record a check and fail with a [`ValueMismatch`](crate::Error::ValueMismatch)
    /// if it did not hold.
    pub fn check(
        &mut self,
        signal: &str,
        ok: bool,
        expected: impl Into<Val>,
        actual: impl Into<Val>,
    ) -> Result<()> {
        if self.stats.record(ok) {
            return Ok(());
        }
        ValueMismatchSnafu {
            scenario: self.name.as_str(),
            signal,
            edge: self.edge(),
            expected: expected.into(),
            actual: actual.into(),
        }
        .fail()
    }

    pub fn check_eq<T>(&mut self, signal: &str, expected: T, actual: T) -> Result<()>
    where
        T: PartialEq + Into<Val>,
    {
        let ok = expected == actual;
        self.check(signal, ok, expected, actual)
    }

    /// Compare two percentages with an absolute tolerance in percentage
    /// points.
    pub fn check_within(
        &mut self,
        signal: &str,
        expected: f64,
        actual: f64,
        tolerance: f64,
    ) -> Result<()> {
        let ok = (actual - expected).abs() <= tolerance;
        self.check(signal, ok, Val::Percent(expected), Val::Percent(actual))
    }

    /// Clock until `condition` holds after a rising edge, for at most
    /// `budget` edges. Returns how many edges it took.
    pub fn wait_until<F>(&mut self, what: &str, budget: u64, mut condition: F) -> Result<u64>
    where
        F: FnMut(&Self) -> bool,
    {
        for waited in 1..=budget {
            self.rising_edge()?;
            if condition(self) {
                self.stats.record(true);
                return Ok(waited);
            }
        }
        self.stats.record(false);
        TimeoutExceededSnafu {
            scenario: self.name.as_str(),
            what,
            budget,
            edge: self.edge(),
        }
        .fail()
    }

    /// Close the waveform trace, if one was opened.
    pub fn finish(&mut self) -> Result<()> {
        self.sim.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn tb() -> Testbench {
        Testbench::new("unit", PwmDevice::with_counter(99), &TestbenchOptions::deterministic(0))
            .unwrap()
    }

    #[test]
    fn reset_sequence_zeroes_counter() {
        let mut tb = tb();
        tb.reset(5).unwrap();
        assert_eq!(tb.edge(), 5);
        assert_eq!(tb.sim().device().counter(), 0);
        assert_eq!(tb.packed(), 0);
        assert_eq!(tb.get("ena").unwrap(), 1);
        assert_eq!(tb.get("rst_n").unwrap(), 1);
    }

    #[test]
    fn mismatch_carries_context() {
        let mut tb = tb();
        tb.reset(2).unwrap();
        tb.clock_cycles(4).unwrap();
        let err = tb.check_eq("debug_bits", 3u8, tb.debug_bits()).unwrap_err();
        match &err {
            Error::ValueMismatch {
                scenario,
                signal,
                edge,
                expected,
                actual,
            } => {
                assert_eq!(scenario, "unit");
                assert_eq!(signal, "debug_bits");
                assert_eq!(*edge, 6);
                assert_eq!(*expected, Val::Int(3));
                assert_eq!(*actual, Val::Int(2));
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(
            err.to_string(),
            "[unit] debug_bits mismatch at edge 6: expected 3 (0x03), got 2 (0x02)"
        );
        assert_eq!(tb.stats().failed, 1);
    }

    #[test]
    fn percentages_within_tolerance() {
        let mut tb = tb();
        assert!(tb.check_within("duty", 100.0, 99.6, 2.0).is_ok());
        assert!(tb.check_within("duty", 50.0, 47.9, 2.0).is_err());
        assert_eq!(tb.stats().checked, 2);
    }

    #[test]
    fn wait_until_counts_edges() {
        let mut tb = tb();
        tb.reset(3).unwrap();
        let waited = tb
            .wait_until("debug bits", 20, |tb| tb.debug_bits() != 0)
            .unwrap();
        assert_eq!(waited, 2);
    }

    #[test]
    fn wait_until_times_out() {
        let mut tb = tb();
        tb.reset(3).unwrap();
        tb.set_enable(false).unwrap();
        let err = tb
            .wait_until("counter to move", 20, |tb| tb.debug_bits() != 0)
            .unwrap_err();
        assert!(matches!(err, Error::TimeoutExceeded { budget: 20, edge: 23, .. }));
        assert_eq!(
            err.to_string(),
            "[unit] timed out after 20 edges waiting for counter to move (at edge 23)"
        );
    }

    #[test]
    fn unknown_signals_and_outputs() {
        let mut tb = tb();
        assert!(matches!(tb.set("pwm_out", 1), Err(Error::UnknownSignal { .. })));
        assert!(matches!(tb.set("uo_out", 1), Err(Error::NotWritable { .. })));
        assert!(matches!(tb.set("ui_in", 256), Err(Error::ValueTooWide { .. })));
    }
}
