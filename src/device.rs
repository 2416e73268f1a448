//! The PWM device: an 8-bit free-running counter compared against the duty
//! input, with a synchronous reset and a counter enable.
//!
//! Everything here is a pure, single-owner state machine. The simulator calls
//! [`Device::advance`] exactly once per rising clock edge and
//! [`Device::outputs`] whenever an input changes between edges.

/// Inputs sampled by the device at a rising edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inputs {
    pub duty: u8,
    pub enabled: bool,
    pub reset_requested: bool,
}

/// Combinational outputs of the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outputs {
    pub pwm_bit: bool,
    /// Upper 7 bits of the counter. Only exposed for observability.
    pub debug_bits: u8,
}

impl Outputs {
    /// Bit 0 is the PWM output, bits 7:1 are `counter[7:1]`.
    pub fn packed(&self) -> u8 {
        (self.debug_bits << 1) | self.pwm_bit as u8
    }

    pub fn from_packed(packed: u8) -> Self {
        Self {
            pwm_bit: packed & 0x01 != 0,
            debug_bits: packed >> 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Held in reset: counter is zero and the output is forced low.
    Reset,
    /// Free running, gated by the enable input.
    Run,
}

/// A synchronous device that can sit behind the simulator.
///
/// [`PwmDevice`] is the reference implementation. Other implementations exist
/// to check that the testbench actually catches a misbehaving device.
pub trait Device {
    /// Consume the inputs present at a rising edge and return the outputs
    /// settled after it.
    fn advance(&mut self, inputs: Inputs) -> Outputs;

    /// Re-evaluate the outputs against the current state for a new duty
    /// value, without a clock edge.
    fn outputs(&self, duty: u8) -> Outputs;

    fn counter(&self) -> u8;

    fn state(&self) -> DeviceState;
}

#[derive(Debug, Clone)]
pub struct PwmDevice {
    counter: u8,
    state: DeviceState,
}

impl PwmDevice {
    pub fn new() -> Self {
        Self::with_counter(0)
    }

    /// A device that powered up with an arbitrary counter value. The state is
    /// only defined after the first reset.
    pub fn with_counter(counter: u8) -> Self {
        Self {
            counter,
            state: DeviceState::Run,
        }
    }
}

impl Default for PwmDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for PwmDevice {
    fn advance(&mut self, inputs: Inputs) -> Outputs {
        if inputs.reset_requested {
            self.state = DeviceState::Reset;
            self.counter = 0;
        } else {
            self.state = DeviceState::Run;
            if inputs.enabled {
                self.counter = self.counter.wrapping_add(1);
            }
        }
        self.outputs(inputs.duty)
    }

    fn outputs(&self, duty: u8) -> Outputs {
        let pwm_bit = match self.state {
            DeviceState::Reset => false,
            DeviceState::Run => self.counter < duty,
        };
        Outputs {
            pwm_bit,
            debug_bits: self.counter >> 1,
        }
    }

    fn counter(&self) -> u8 {
        self.counter
    }

    fn state(&self) -> DeviceState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    const RUN: Inputs = Inputs {
        duty: 0,
        enabled: true,
        reset_requested: false,
    };

    fn held_in_reset() -> Inputs {
        Inputs {
            reset_requested: true,
            ..RUN
        }
    }

    #[test]
    fn comparator_matches_for_every_counter_and_duty() {
        for counter in 0..=255u8 {
            let device = PwmDevice::with_counter(counter);
            for duty in 0..=255u8 {
                assert_eq!(device.outputs(duty).pwm_bit, counter < duty);
                assert_eq!(device.outputs(duty).debug_bits, counter >> 1);
            }
        }
    }

    #[test]
    fn counter_wraps_at_256() {
        let mut device = PwmDevice::with_counter(254);
        device.advance(RUN);
        assert_eq!(device.counter(), 255);
        device.advance(RUN);
        assert_eq!(device.counter(), 0);
    }

    #[test]
    fn enabled_counter_advances_by_edge_count() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..64 {
            let start: u8 = rng.gen();
            let edges: u32 = rng.gen_range(0..2048);
            let mut device = PwmDevice::with_counter(start);
            for _ in 0..edges {
                device.advance(RUN);
            }
            assert_eq!(device.counter() as u32, (start as u32 + edges) % 256);
        }
    }

    #[test]
    fn disabled_counter_is_frozen() {
        let mut rng = StdRng::seed_from_u64(7);
        let start: u8 = rng.gen();
        let mut device = PwmDevice::with_counter(start);
        for _ in 0..1000 {
            let duty = rng.gen();
            let out = device.advance(Inputs {
                duty,
                enabled: false,
                reset_requested: false,
            });
            assert_eq!(device.counter(), start);
            // outputs stay combinational against the frozen counter
            assert_eq!(out.pwm_bit, start < duty);
        }
    }

    #[test]
    fn reset_wins_over_enable_and_forces_output_low() {
        let mut device = PwmDevice::with_counter(100);
        let out = device.advance(Inputs {
            duty: 200,
            ..held_in_reset()
        });
        assert_eq!(device.state(), DeviceState::Reset);
        assert_eq!(device.counter(), 0);
        assert_eq!(out.packed(), 0x00);
        assert!(!device.outputs(255).pwm_bit);
    }

    #[test]
    fn release_resumes_counting_from_zero() {
        let mut device = PwmDevice::with_counter(42);
        for _ in 0..3 {
            device.advance(held_in_reset());
        }
        let out = device.advance(Inputs { duty: 128, ..RUN });
        assert_eq!(device.state(), DeviceState::Run);
        assert_eq!(device.counter(), 1);
        assert!(out.pwm_bit);
    }

    #[test]
    fn full_period_high_count_equals_duty() {
        for duty in 0..=255u8 {
            let mut device = PwmDevice::new();
            device.advance(held_in_reset());
            let mut high = 0;
            // counter sweeps 1..=255 then 0 after release
            for _ in 0..256 {
                if device.advance(Inputs { duty, ..RUN }).pwm_bit {
                    high += 1;
                }
            }
            assert_eq!(high, duty as u32, "duty {}", duty);
        }
    }

    #[test]
    fn half_duty_is_one_contiguous_pulse() {
        let mut device = PwmDevice::with_counter(255);
        let samples: Vec<bool> = (0..256)
            .map(|_| device.advance(Inputs { duty: 128, ..RUN }).pwm_bit)
            .collect();
        // starting at counter 0 the period is 128 highs then 128 lows
        assert!(samples[..128].iter().all(|&b| b));
        assert!(samples[128..].iter().all(|&b| !b));
    }

    #[test]
    fn packed_layout() {
        let device = PwmDevice::with_counter(0b1010_1011);
        let out = device.outputs(0xff);
        assert_eq!(out.packed(), 0b1010_1011);
        assert_eq!(Outputs::from_packed(out.packed()), out);
        let out = device.outputs(0);
        assert_eq!(out.packed(), 0b1010_1010);
    }
}
