use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use prettytable::{format, Cell, Row, Table};

use crate::assertion::AssertionStats;
use crate::error::Error;
use crate::value::Val;

/// Outcome of one scenario.
#[derive(Debug)]
pub struct ScenarioReport {
    pub name: String,
    pub result: Result<Val, Error>,
    pub time_secs: f64,
    pub sim_time_ns: f64,
    pub edges: u64,
    pub stats: AssertionStats,
    /// Counter value the device powered up with.
    pub power_on: u8,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }

    pub fn message(&self) -> String {
        match &self.result {
            Ok(val) => val.to_string(),
            Err(e) => e.to_string(),
        }
    }

    /// One-line outcome as logged after the scenario ends.
    pub fn status_line(&self) -> String {
        match &self.result {
            Ok(val) => format!("TEST {}: {} ({})", self.name, "PASS".green(), val),
            Err(e) => format!(
                "TEST {}: {} {} {}",
                self.name,
                "FAIL".red(),
                e,
                self.stats.result_str()
            ),
        }
    }

    pub(crate) fn log(&self) {
        match self.passed() {
            true => log::info!("{}", self.status_line()),
            false => log::error!("{}", self.status_line()),
        }
    }
}

/// Outcome of a whole run.
#[derive(Debug)]
pub struct SuiteReport {
    pub name: String,
    pub seed: u64,
    pub time_secs: f64,
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn passed(&self) -> bool {
        self.scenarios.iter().all(ScenarioReport::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioReport> {
        self.scenarios.iter().filter(|s| !s.passed())
    }

    pub fn get(&self, name: &str) -> Option<&ScenarioReport> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    pub fn total_edges(&self) -> u64 {
        self.scenarios.iter().map(|s| s.edges).sum()
    }

    pub fn sim_time_ns(&self) -> f64 {
        self.scenarios.iter().map(|s| s.sim_time_ns).sum()
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(Row::new(
            ["Scenario", "Result", "Time [s]", "Sim time [ns]", "Edges", "Checks", "Message"]
                .iter()
                .map(|title| Cell::new(title).style_spec("b"))
                .collect(),
        ));
        for s in &self.scenarios {
            let result = match s.passed() {
                true => Cell::new("passed").style_spec("Fg"),
                false => Cell::new("failed").style_spec("Fr"),
            };
            table.add_row(Row::new(vec![
                Cell::new(&s.name),
                result,
                Cell::new(&format!("{:.3}", s.time_secs)).style_spec("r"),
                Cell::new(&(s.sim_time_ns as u64).to_formatted_string(&Locale::en)).style_spec("r"),
                Cell::new(&s.edges.to_formatted_string(&Locale::en)).style_spec("r"),
                Cell::new(&s.stats.to_string()).style_spec("r"),
                Cell::new(&s.message()),
            ]));
        }
        table
    }

    pub fn print_summary(&self) {
        self.table().printstd();
    }

    pub(crate) fn log_totals(&self) {
        let failed = self.failures().count();
        let sim_time_ns = self.sim_time_ns();
        log::info!("TOTAL SIMULATION");
        log::info!(
            "Scenarios: {} passed, {} failed (seed {})",
            self.scenarios.len() - failed,
            failed,
            self.seed
        );
        log::info!(
            "Clock edges: {}",
            self.total_edges().to_formatted_string(&Locale::en)
        );
        log::info!(
            "Simulation time: {} ns",
            (sim_time_ns as u64).to_formatted_string(&Locale::en)
        );
        log::info!("Real time: {:.3} s", self.time_secs);
        if self.time_secs > 0.0 {
            log::info!(
                "Simulation speed: {} ns/s",
                ((sim_time_ns / self.time_secs) as u64).to_formatted_string(&Locale::en)
            );
        }
    }
}
