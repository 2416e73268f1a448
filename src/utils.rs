use rand::Rng;

/// Nominal duty cycle of a threshold, relative to full scale (255).
#[inline]
pub fn duty_percent(duty: u8) -> f64 {
    duty as f64 / 255.0 * 100.0
}

/// Fraction of high samples, in percent.
#[inline]
pub fn high_percent(high: u32, total: u32) -> f64 {
    match total {
        0 => 0.0,
        _ => high as f64 / total as f64 * 100.0,
    }
}

#[inline]
pub fn rand_duty<R: Rng>(rng: &mut R) -> u8 {
    rng.gen()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages() {
        assert_eq!(duty_percent(0), 0.0);
        assert_eq!(duty_percent(255), 100.0);
        assert_eq!(high_percent(128, 256), 50.0);
        assert_eq!(high_percent(3, 0), 0.0);
        // full scale is 255, a period is 256 edges
        assert!((duty_percent(255) - high_percent(255, 256)).abs() < 0.4);
    }
}
