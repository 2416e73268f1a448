use std::fmt;

use queues::{IsQueue, Queue};

use crate::signal::SimObject;
use crate::trigger::Trigger;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stimulus {
    Set(SimObject, u32),
    Wait(Trigger),
}

/// A named, ordered list of pin writes and waits, played back by
/// [`Testbench::run_sequence`](crate::testbench::Testbench::run_sequence).
pub struct Sequence {
    name: String,
    steps: Queue<Stimulus>,
    cycles: u64,
}

impl Sequence {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            steps: Queue::new(),
            cycles: 0,
        }
    }

    pub fn set(self, obj: SimObject, value: u32) -> Self {
        self.then(Stimulus::Set(obj, value))
    }

    pub fn wait(self, trigger: Trigger) -> Self {
        self.then(Stimulus::Wait(trigger))
    }

    pub fn then(mut self, step: Stimulus) -> Self {
        self.cycles += match step {
            Stimulus::Wait(Trigger::RisingEdge) => 1,
            Stimulus::Wait(Trigger::ClockCycles(n)) => n,
            _ => 0,
        };
        // unbounded queue, can't fail
        let _ = self.steps.add(step);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.steps.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of rising edges the sequence waits for in total.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("name", &self.name)
            .field("steps", &self.len())
            .field("cycles", &self.cycles)
            .finish()
    }
}

impl Iterator for Sequence {
    type Item = Stimulus;

    fn next(&mut self) -> Option<Stimulus> {
        self.steps.remove().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{ENA, RST_N};

    #[test]
    fn plays_back_in_order() {
        let seq = Sequence::new("reset")
            .set(ENA, 1)
            .set(RST_N, 0)
            .wait(Trigger::ClockCycles(10))
            .set(RST_N, 1)
            .wait(Trigger::RisingEdge);
        assert_eq!(seq.name(), "reset");
        assert_eq!(seq.len(), 5);
        assert_eq!(seq.cycles(), 11);

        let steps: Vec<_> = seq.collect();
        assert_eq!(steps[0], Stimulus::Set(ENA, 1));
        assert_eq!(steps[2], Stimulus::Wait(Trigger::ClockCycles(10)));
        assert_eq!(steps[4], Stimulus::Wait(Trigger::RisingEdge));
    }

    #[test]
    fn empty_sequence() {
        let mut seq = Sequence::new("nothing");
        assert!(seq.is_empty());
        assert_eq!(seq.next(), None);
    }
}
