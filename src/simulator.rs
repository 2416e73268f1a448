use camino::Utf8Path;
use snafu::ensure;

use crate::config::TestbenchOptions;
use crate::device::{Device, Inputs, PwmDevice};
use crate::error::{NotWritableSnafu, Result, TimeoutExceededSnafu, ValueTooWideSnafu};
use crate::signal::{SimObject, CLK, ENA, RST_N, UI_IN, UO_OUT};
use crate::trigger::{self, ClockEdges, ClockEvent, Edge, TimeUnit, Trigger};
use crate::vcd::Vcd;

/// One device behind its pins, driven by a clock.
///
/// Inputs written between edges are held until the next rising edge, except
/// for `ui_in`, which feeds the comparator combinationally. `uio_in` is
/// accepted and ignored; `uio_out` and `uio_oe` stay low.
pub struct Simulator<D: Device = PwmDevice> {
    name: String,
    device: D,
    edges: ClockEdges,
    precision: i8,
    values: [u32; 8],
    rising_edges: u64,
    max_edges: u64,
    vcd: Option<Vcd>,
}

impl<D: Device> Simulator<D> {
    pub fn new(name: &str, device: D, options: &TestbenchOptions) -> Result<Self> {
        let edges = options.clock.edges(options.precision)?;
        let mut sim = Self {
            name: name.to_string(),
            device,
            edges,
            precision: options.precision,
            values: [0; 8],
            rising_edges: 0,
            max_edges: options.max_edges,
            vcd: None,
        };
        sim.settle();
        Ok(sim)
    }

    /// Start dumping all ports to a VCD file.
    pub fn trace_to(&mut self, path: &Utf8Path) -> Result<()> {
        let mut vcd = Vcd::create(path, &self.name, self.precision)?;
        vcd.dump(self.get_sim_time_steps(), &self.values)?;
        self.vcd = Some(vcd);
        Ok(())
    }

    pub fn set_value(&mut self, obj: SimObject, value: u32) -> Result<()> {
        ensure!(
            obj.is_modifiable() && obj != CLK,
            NotWritableSnafu { name: obj.name() }
        );
        ensure!(
            value <= obj.mask(),
            ValueTooWideSnafu {
                name: obj.name(),
                value,
                width: obj.width(),
            }
        );
        self.values[obj.handle()] = value;
        if obj == UI_IN {
            self.settle();
        }
        self.dump()
    }

    pub fn get_value(&self, obj: SimObject) -> u32 {
        self.values[obj.handle()]
    }

    /// Advance to the next clock transition.
    pub fn step(&mut self) -> Result<ClockEvent> {
        let event = match self.edges.next() {
            Some(event) => event,
            None => unreachable!("clock edges are endless"),
        };
        match event.edge {
            Edge::Rising => {
                ensure!(
                    self.rising_edges < self.max_edges,
                    TimeoutExceededSnafu {
                        scenario: self.name.as_str(),
                        what: "the scenario to finish",
                        budget: self.max_edges,
                        edge: self.rising_edges,
                    }
                );
                self.values[CLK.handle()] = 1;
                self.rising_edges += 1;
                let outputs = self.device.advance(self.inputs());
                self.values[UO_OUT.handle()] = outputs.packed() as u32;
            }
            Edge::Falling => self.values[CLK.handle()] = 0,
        }
        self.dump()?;
        Ok(event)
    }

    /// Block until `trigger` has fired.
    pub fn wait(&mut self, trigger: Trigger) -> Result<()> {
        match trigger {
            Trigger::RisingEdge => self.wait_edge(Edge::Rising),
            Trigger::FallingEdge => self.wait_edge(Edge::Falling),
            Trigger::ClockCycles(n) => {
                for _ in 0..n {
                    self.wait_edge(Edge::Rising)?;
                }
                Ok(())
            }
            Trigger::Timer(steps) => {
                let until = self.get_sim_time_steps() + steps;
                while self.get_sim_time_steps() < until {
                    self.step()?;
                }
                Ok(())
            }
        }
    }

    fn wait_edge(&mut self, edge: Edge) -> Result<()> {
        while self.step()?.edge != edge {}
        Ok(())
    }

    fn inputs(&self) -> Inputs {
        Inputs {
            duty: self.values[UI_IN.handle()] as u8,
            enabled: self.values[ENA.handle()] != 0,
            reset_requested: self.values[RST_N.handle()] == 0,
        }
    }

    /// Recompute the combinational outputs from the current state.
    fn settle(&mut self) {
        let outputs = self.device.outputs(self.values[UI_IN.handle()] as u8);
        self.values[UO_OUT.handle()] = outputs.packed() as u32;
    }

    fn dump(&mut self) -> Result<()> {
        let time = self.get_sim_time_steps();
        match self.vcd.as_mut() {
            Some(vcd) => vcd.dump(time, &self.values),
            None => Ok(()),
        }
    }

    /// Flush and close the trace, if any.
    pub fn finish(&mut self) -> Result<()> {
        match self.vcd.take() {
            Some(vcd) => vcd.close(),
            None => Ok(()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Rising edges seen so far.
    pub fn edge_count(&self) -> u64 {
        self.rising_edges
    }

    pub fn get_sim_time_steps(&self) -> u64 {
        self.edges.time()
    }

    /// This function does not preserve precision, so don't use it for
    /// anything but reporting.
    pub fn get_sim_time(&self, unit: TimeUnit) -> f64 {
        trigger::ldexp10(
            self.get_sim_time_steps() as f64,
            self.precision - unit.scale(),
        )
    }

    pub fn get_sim_steps(&self, time: f64, unit: TimeUnit) -> Result<u64> {
        trigger::to_steps(time, unit, self.precision)
    }
}
