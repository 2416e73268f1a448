use std::fmt;

/// Counts of the checks a scenario made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssertionStats {
    pub checked: u32,
    pub passed: u32,
    pub failed: u32,
}

impl AssertionStats {
    pub(crate) fn record(&mut self, passed: bool) -> bool {
        self.checked += 1;
        match passed {
            true => self.passed += 1,
            false => self.failed += 1,
        }
        passed
    }

    pub fn result_str(&self) -> String {
        format!(
            "Checked: {}, Passed: {}, Failed: {}.",
            self.checked, self.passed, self.failed
        )
    }
}

impl fmt::Display for AssertionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.passed, self.checked)
    }
}
