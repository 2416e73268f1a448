use camino::Utf8PathBuf;
use snafu::Snafu;

use crate::value::Val;

/// Everything that can go wrong while driving or checking the device.
///
/// `ValueMismatch` and `TimeoutExceeded` are scenario failures: they are
/// deterministic, so a rerun with the same seed reproduces them exactly.
/// `Panicked` is a scenario that panicked instead of returning an error. The
/// remaining variants are misuse of the harness or I/O around traces and
/// reports.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display(
        "[{scenario}] {signal} mismatch at edge {edge}: expected {expected}, got {actual}"
    ))]
    ValueMismatch {
        scenario: String,
        signal: String,
        edge: u64,
        expected: Val,
        actual: Val,
    },

    #[snafu(display(
        "[{scenario}] timed out after {budget} edges waiting for {what} (at edge {edge})"
    ))]
    TimeoutExceeded {
        scenario: String,
        what: String,
        budget: u64,
        edge: u64,
    },

    #[snafu(display("[{scenario}] panicked: {message}"))]
    Panicked { scenario: String, message: String },

    #[snafu(display("No signal named '{name}'"))]
    UnknownSignal { name: String },

    #[snafu(display("Signal '{name}' can't be driven by the testbench"))]
    NotWritable { name: String },

    #[snafu(display("Value {value} does not fit into {width}-bit signal '{name}'"))]
    ValueTooWide { name: String, value: u32, width: u32 },

    #[snafu(display(
        "Can't convert {time} {unit} to sim steps without rounding (sim precision: 1e{precision} s)"
    ))]
    TimeRounding { time: f64, unit: String, precision: i8 },

    #[snafu(display("Sim precision 1e{precision} s is outside 1e-15 s to 1 s"))]
    InvalidPrecision { precision: i8 },

    #[snafu(display("Unknown time unit '{unit}'"))]
    UnknownTimeUnit { unit: String },

    #[snafu(display("Invalid clock specification '{spec}', expected e.g. '10us'"))]
    InvalidClock { spec: String },

    #[snafu(display(
        "Invalid power-on policy '{value}', expected 'zero', 'random' or a counter value"
    ))]
    InvalidPowerOn { value: String },

    #[snafu(display("Invalid value '{value}' for {name}"))]
    InvalidEnv { name: String, value: String },

    #[snafu(display("Failed to create {path}"))]
    CreateFile {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Failed to write waveform trace"))]
    WriteTrace { source: std::io::Error },

    #[snafu(display("Failed to write JUnit report to {path}"))]
    WriteJunit {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// Whether this error is an assertion failure of the device, as opposed
    /// to a harness or I/O problem.
    pub fn is_scenario_failure(&self) -> bool {
        matches!(
            self,
            Error::ValueMismatch { .. } | Error::TimeoutExceeded { .. } | Error::Panicked { .. }
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
