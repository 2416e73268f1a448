use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

use crate::error::{Result, UnknownSignalSnafu};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// A port of the device, addressed by its handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimObject {
    pub(crate) handle: usize,
}

struct Port {
    name: &'static str,
    width: u32,
    direction: Direction,
}

pub const CLK: SimObject = SimObject { handle: 0 };
pub const RST_N: SimObject = SimObject { handle: 1 };
pub const ENA: SimObject = SimObject { handle: 2 };
pub const UI_IN: SimObject = SimObject { handle: 3 };
pub const UIO_IN: SimObject = SimObject { handle: 4 };
pub const UO_OUT: SimObject = SimObject { handle: 5 };
pub const UIO_OUT: SimObject = SimObject { handle: 6 };
pub const UIO_OE: SimObject = SimObject { handle: 7 };

// Order matches the handles above.
const PORTS: [Port; 8] = [
    Port { name: "clk", width: 1, direction: Direction::Input },
    Port { name: "rst_n", width: 1, direction: Direction::Input },
    Port { name: "ena", width: 1, direction: Direction::Input },
    Port { name: "ui_in", width: 8, direction: Direction::Input },
    Port { name: "uio_in", width: 8, direction: Direction::Input },
    Port { name: "uo_out", width: 8, direction: Direction::Output },
    Port { name: "uio_out", width: 8, direction: Direction::Output },
    Port { name: "uio_oe", width: 8, direction: Direction::Output },
];

static SIG_MAP_NAME: Lazy<HashMap<&'static str, SimObject>> = Lazy::new(|| {
    PORTS
        .iter()
        .enumerate()
        .map(|(handle, port)| (port.name, SimObject { handle }))
        .collect()
});

impl SimObject {
    pub fn from_name(name: &str) -> Result<Self> {
        SIG_MAP_NAME
            .get(name)
            .copied()
            .ok_or_else(|| UnknownSignalSnafu { name }.build())
    }

    /// All ports, in declaration order.
    pub fn all() -> impl Iterator<Item = SimObject> {
        (0..PORTS.len()).map(|handle| SimObject { handle })
    }

    pub fn handle(&self) -> usize {
        self.handle
    }

    pub fn name(&self) -> &'static str {
        PORTS[self.handle].name
    }

    pub fn width(&self) -> u32 {
        PORTS[self.handle].width
    }

    pub fn direction(&self) -> Direction {
        PORTS[self.handle].direction
    }

    pub fn is_modifiable(&self) -> bool {
        self.direction() == Direction::Input
    }

    /// Largest value the port can hold.
    pub fn mask(&self) -> u32 {
        (1u32 << self.width()) - 1
    }
}

impl fmt::Display for SimObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        let ui_in = SimObject::from_name("ui_in").unwrap();
        assert_eq!(ui_in, UI_IN);
        assert_eq!(ui_in.width(), 8);
        assert!(ui_in.is_modifiable());
        assert_eq!(SimObject::from_name("uo_out").unwrap().direction(), Direction::Output);
        assert_eq!(RST_N.mask(), 1);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let err = SimObject::from_name("pwm").unwrap_err();
        assert_eq!(err.to_string(), "No signal named 'pwm'");
    }

    #[test]
    fn handles_are_dense() {
        let names: Vec<_> = SimObject::all().map(|s| s.name()).collect();
        assert_eq!(
            names,
            ["clk", "rst_n", "ena", "ui_in", "uio_in", "uo_out", "uio_out", "uio_oe"]
        );
        for obj in SimObject::all() {
            assert_eq!(SimObject::from_name(obj.name()).unwrap(), obj);
        }
    }
}
