use std::fs::File;
use std::io;

use camino::Utf8Path;
use junit_report::{Duration, Report, ReportBuilder, TestCaseBuilder, TestSuiteBuilder};
use snafu::ResultExt;

use crate::error::{CreateFileSnafu, Result, WriteJunitSnafu};
use crate::report::SuiteReport;

pub fn build_report(suite: &SuiteReport) -> Report {
    let mut test_cases = Vec::new();

    for s in &suite.scenarios {
        let time = Duration::seconds_f64(s.time_secs);
        let tc = match &s.result {
            Ok(_) => TestCaseBuilder::success(&s.name, time),
            Err(e) => {
                let kind = match e.is_scenario_failure() {
                    true => "failure",
                    false => "error",
                };
                TestCaseBuilder::failure(&s.name, time, kind, &e.to_string())
            }
        }
        .build();
        test_cases.push(tc);
    }

    let test_suite = TestSuiteBuilder::new(&suite.name)
        .add_testcases(test_cases)
        .build();
    ReportBuilder::new().add_testsuite(test_suite).build()
}

pub fn write_junit_xml(suite: &SuiteReport, path: &Utf8Path) -> Result<()> {
    let file = File::create(path).context(CreateFileSnafu { path })?;
    build_report(suite)
        .write_xml(file)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
        .context(WriteJunitSnafu { path })?;
    log::info!("Wrote JUnit report to {}", path);
    Ok(())
}
