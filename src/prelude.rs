pub use crate::config::{PowerOn, TestbenchOptions};
pub use crate::device::{Device, DeviceState, Inputs, Outputs, PwmDevice};
pub use crate::sequence::{Sequence, Stimulus};
pub use crate::signal::{SimObject, CLK, ENA, RST_N, UIO_IN, UI_IN, UO_OUT};
pub use crate::simulator::Simulator;
pub use crate::test::Scenarios;
pub use crate::testbench::{reset_sequence, Testbench};
pub use crate::trigger::{Clock, Edge, TimeUnit, Trigger};
pub use crate::{run, run_scenarios, scenarios, utils};
pub use crate::{Error, Result, TbResult, Val};
