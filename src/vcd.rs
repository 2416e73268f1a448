use std::fs::File;
use std::io::{BufWriter, Write};

use camino::Utf8Path;
use intmap::IntMap;
use snafu::ResultExt;

use crate::error::{CreateFileSnafu, Result, WriteTraceSnafu};
use crate::signal::SimObject;
use crate::trigger::{self, TimeUnit};

/// A VCD dump of all device ports.
///
/// Values are only written when they change. Time stamps are in simulator
/// steps, which the header declares as the timescale.
pub struct Vcd {
    out: BufWriter<File>,
    last: IntMap<u32>,
    last_time: Option<u64>,
}

impl Vcd {
    /// `precision` is the simulator step as a power of ten of a second.
    pub fn create(path: &Utf8Path, scope: &str, precision: i8) -> Result<Self> {
        let (multiplier, unit) = trigger::timescale(precision)?;
        let file = File::create(path).context(CreateFileSnafu { path })?;
        let mut vcd = Self {
            out: BufWriter::new(file),
            last: IntMap::new(),
            last_time: None,
        };
        vcd.header(scope, multiplier, unit).context(WriteTraceSnafu)?;
        Ok(vcd)
    }

    fn header(&mut self, scope: &str, multiplier: u32, unit: TimeUnit) -> std::io::Result<()> {
        writeln!(self.out, "$version {} {} $end", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))?;
        let unit = match unit {
            TimeUnit::Sec => "s".to_string(),
            unit => unit.to_string(),
        };
        writeln!(self.out, "$timescale {}{} $end", multiplier, unit)?;
        writeln!(self.out, "$scope module {} $end", scope.replace(' ', "_"))?;
        for obj in SimObject::all() {
            match obj.width() {
                1 => writeln!(self.out, "$var wire 1 {} {} $end", code(obj), obj.name())?,
                w => writeln!(
                    self.out,
                    "$var wire {w} {} {} [{}:0] $end",
                    code(obj),
                    obj.name(),
                    w - 1
                )?,
            }
        }
        writeln!(self.out, "$upscope $end")?;
        writeln!(self.out, "$enddefinitions $end")
    }

    /// Write every port whose value differs from the last dump. `values` is
    /// indexed by signal handle.
    pub fn dump(&mut self, timestamp: u64, values: &[u32]) -> Result<()> {
        let first = self.last_time.is_none();
        let changed: Vec<SimObject> = SimObject::all()
            .filter(|obj| self.last.get(obj.handle() as u64) != Some(&values[obj.handle()]))
            .collect();
        if changed.is_empty() {
            return Ok(());
        }
        if self.last_time != Some(timestamp) {
            writeln!(self.out, "#{}", timestamp).context(WriteTraceSnafu)?;
            self.last_time = Some(timestamp);
        }
        if first {
            writeln!(self.out, "$dumpvars").context(WriteTraceSnafu)?;
        }
        for obj in changed {
            let value = values[obj.handle()];
            let written = match obj.width() {
                1 => writeln!(self.out, "{}{}", value & 1, code(obj)),
                w => writeln!(self.out, "b{:0w$b} {}", value, code(obj), w = w as usize),
            };
            written.context(WriteTraceSnafu)?;
            self.last.insert(obj.handle() as u64, value);
        }
        if first {
            writeln!(self.out, "$end").context(WriteTraceSnafu)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().context(WriteTraceSnafu)
    }

    /// The VCD is flushed when dropped, but only an explicit close reports
    /// errors.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }
}

/// Printable one-character identifier code per port.
fn code(obj: SimObject) -> char {
    (b'!' + obj.handle() as u8) as char
}
