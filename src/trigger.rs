use std::fmt;
use std::str::FromStr;

use snafu::{ensure, OptionExt};

use crate::error::{
    Error, InvalidClockSnafu, InvalidPrecisionSnafu, Result, TimeRoundingSnafu,
    UnknownTimeUnitSnafu,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimeUnit {
    Fs,
    Ps,
    Ns,
    Us,
    Ms,
    Sec,
}

impl TimeUnit {
    /// Power of ten relative to one second.
    pub fn scale(self) -> i8 {
        match self {
            TimeUnit::Fs => -15,
            TimeUnit::Ps => -12,
            TimeUnit::Ns => -9,
            TimeUnit::Us => -6,
            TimeUnit::Ms => -3,
            TimeUnit::Sec => 0,
        }
    }

    pub fn from_scale(scale: i8) -> Option<Self> {
        match scale {
            -15 => Some(TimeUnit::Fs),
            -12 => Some(TimeUnit::Ps),
            -9 => Some(TimeUnit::Ns),
            -6 => Some(TimeUnit::Us),
            -3 => Some(TimeUnit::Ms),
            0 => Some(TimeUnit::Sec),
            _ => None,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeUnit::Fs => "fs",
            TimeUnit::Ps => "ps",
            TimeUnit::Ns => "ns",
            TimeUnit::Us => "us",
            TimeUnit::Ms => "ms",
            TimeUnit::Sec => "sec",
        }
        .fmt(f)
    }
}

impl FromStr for TimeUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fs" => Ok(TimeUnit::Fs),
            "ps" => Ok(TimeUnit::Ps),
            "ns" => Ok(TimeUnit::Ns),
            "us" => Ok(TimeUnit::Us),
            "ms" => Ok(TimeUnit::Ms),
            "s" | "sec" => Ok(TimeUnit::Sec),
            _ => UnknownTimeUnitSnafu { unit: s }.fail(),
        }
    }
}

/// Like `math.ldexp`, but base 10.
pub(crate) fn ldexp10(frac: f64, exp: i8) -> f64 {
    if exp >= 0 {
        frac * 10_u64.pow(exp as u32) as f64
    } else {
        let div = 10_u64.pow(-exp as u32) as f64;
        frac / div
    }
}

fn check_precision(precision: i8) -> Result<()> {
    ensure!(
        (TimeUnit::Fs.scale()..=TimeUnit::Sec.scale()).contains(&precision),
        InvalidPrecisionSnafu { precision }
    );
    Ok(())
}

/// Length of one simulator step as a VCD timescale: 1, 10 or 100 of a unit.
pub fn timescale(precision: i8) -> Result<(u32, TimeUnit)> {
    check_precision(precision)?;
    let exp = precision.rem_euclid(3);
    let unit = TimeUnit::from_scale(precision - exp)
        .context(InvalidPrecisionSnafu { precision })?;
    Ok((10_u32.pow(exp as u32), unit))
}

/// Convert a time to simulator steps, refusing to round.
pub(crate) fn to_steps(time: f64, unit: TimeUnit, precision: i8) -> Result<u64> {
    check_precision(precision)?;
    let steps = ldexp10(time, unit.scale() - precision);
    ensure!(
        steps % 1.0 == 0.0 && steps >= 0.0,
        TimeRoundingSnafu {
            time,
            unit: unit.to_string(),
            precision,
        }
    );
    Ok(steps as u64)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// One transition of the clock, at an absolute simulation time in steps.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClockEvent {
    pub time: u64,
    pub edge: Edge,
}

/// A free-running clock with a fixed period.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Clock {
    pub period: u64,
    pub unit: TimeUnit,
}

impl Clock {
    pub fn new(period: u64, unit: TimeUnit) -> Self {
        Self { period, unit }
    }

    /// Low and high time in simulator steps.
    pub fn phases(&self, precision: i8) -> Result<(u64, u64)> {
        let high_t = self.period / 2;
        let low_t = self.period - high_t;
        if self.period % 2 != 0 {
            log::warn!(
                "Clock period {period}{unit} not dividable by 2. High time will be {high}{unit}; low time will be {low}{unit}.",
                period = self.period,
                unit = self.unit,
                high = high_t,
                low = low_t
            );
        }
        Ok((
            to_steps(low_t as f64, self.unit, precision)?,
            to_steps(high_t as f64, self.unit, precision)?,
        ))
    }

    /// The clock starts low at time zero; the first event is a rising edge
    /// after the low phase.
    pub fn edges(&self, precision: i8) -> Result<ClockEdges> {
        let (low, high) = self.phases(precision)?;
        Ok(ClockEdges {
            low,
            high,
            time: 0,
            level: false,
        })
    }
}

impl Default for Clock {
    /// 10 us, i.e. 100 kHz.
    fn default() -> Self {
        Self::new(10, TimeUnit::Us)
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.period, self.unit)
    }
}

impl FromStr for Clock {
    type Err = Error;

    /// Parses strings such as `10us` or `20 ns`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| InvalidClockSnafu { spec: s }.build())?;
        let (period, unit) = s.split_at(split);
        let period: u64 = period
            .parse()
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| InvalidClockSnafu { spec: s }.build())?;
        Ok(Self::new(period, unit.trim().parse()?))
    }
}

/// Endless stream of clock transitions. Pulling an event advances time.
#[derive(Clone, Debug)]
pub struct ClockEdges {
    low: u64,
    high: u64,
    time: u64,
    level: bool,
}

impl ClockEdges {
    /// Current clock level, `true` while high.
    pub fn level(&self) -> bool {
        self.level
    }

    pub fn time(&self) -> u64 {
        self.time
    }
}

impl Iterator for ClockEdges {
    type Item = ClockEvent;

    fn next(&mut self) -> Option<ClockEvent> {
        let (wait, edge) = match self.level {
            false => (self.low, Edge::Rising),
            true => (self.high, Edge::Falling),
        };
        self.time += wait;
        self.level = !self.level;
        Some(ClockEvent {
            time: self.time,
            edge,
        })
    }
}

/// Something the testbench can block on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    RisingEdge,
    FallingEdge,
    /// `n` rising edges.
    ClockCycles(u64),
    /// Advance until at least this many steps have passed.
    Timer(u64),
}
