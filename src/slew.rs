//! Slew Limiting
//!
//! Asymmetric lag processing between an input target and a tracked output,
//! used to soften mute/unmute clicks and stepped CV transitions.

use libm::Libm;

/// Slowest slew rate, in volts per second.
const SLEW_MIN: f32 = 0.1;

/// Fastest slew rate, in volts per second.
const SLEW_MAX: f32 = 10_000.0;

/// Gain applied to the distance-proportional response at full shape.
const SHAPE_SCALE: f32 = 0.1;

/// Lag Processor
///
/// Slew limiter with independent rise and fall times and a shape control
/// that blends between constant-rate and proportional-to-remaining-distance
/// response. The output steps toward the target once per call and never
/// overshoots it.
#[derive(Debug, Clone, Copy)]
pub struct LagProcessor {
    out: f32,
}

impl LagProcessor {
    pub const fn new() -> Self {
        Self { out: 0.0 }
    }

    /// Advance one step of `dt` seconds toward `target`.
    ///
    /// `shape`, `rise_time`, and `fall_time` are normalized 0-1 controls.
    /// The time controls map geometrically from the fastest to the slowest
    /// rate, so the knob feel matches an analog lag circuit.
    pub fn process(
        &mut self,
        target: f32,
        shape: f32,
        rise_time: f32,
        fall_time: f32,
        dt: f32,
    ) -> f32 {
        let shape = shape.clamp(0.0, 1.0);

        if target > self.out {
            let slew = slew_rate(rise_time);
            let rate = crossfade(1.0, SHAPE_SCALE * (target - self.out), shape);
            self.out += slew * rate * dt;
            if self.out > target {
                self.out = target;
            }
        } else if target < self.out {
            let slew = slew_rate(fall_time);
            let rate = crossfade(1.0, SHAPE_SCALE * (self.out - target), shape);
            self.out -= slew * rate * dt;
            if self.out < target {
                self.out = target;
            }
        }

        self.out
    }

    pub fn output(&self) -> f32 {
        self.out
    }

    pub fn reset(&mut self) {
        self.out = 0.0;
    }
}

impl Default for LagProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Geometric interpolation from the fastest to the slowest rate.
fn slew_rate(time: f32) -> f32 {
    SLEW_MAX * Libm::<f32>::pow(SLEW_MIN / SLEW_MAX, time.clamp(0.0, 1.0))
}

fn crossfade(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const DT: f32 = 1.0 / 44_100.0;

    #[test]
    fn test_lag_reaches_target() {
        let mut lag = LagProcessor::new();

        // Fastest rise covers 10 V per millisecond, so 5 V lands in one step
        let out = lag.process(5.0, 0.0, 0.0, 0.0, 1.0 / 1_000.0);
        assert_eq!(out, 5.0);
    }

    #[test]
    fn test_lag_never_overshoots() {
        let mut lag = LagProcessor::new();
        let mut previous = 0.0;

        for _ in 0..20_000 {
            let out = lag.process(5.0, 0.0, 0.5, 0.5, DT);
            assert!(out <= 5.0);
            assert!(out >= previous);
            previous = out;
        }
        assert_abs_diff_eq!(lag.output(), 5.0, epsilon = 1e-3);

        // Falling side behaves the same way in mirror
        let mut previous = lag.output();
        for _ in 0..20_000 {
            let out = lag.process(0.0, 0.0, 0.5, 0.5, DT);
            assert!(out >= 0.0);
            assert!(out <= previous);
            previous = out;
        }
        assert_abs_diff_eq!(lag.output(), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_lag_asymmetric_times() {
        let mut lag = LagProcessor::new();

        // Slow rise barely moves in one step
        lag.process(5.0, 0.0, 1.0, 0.0, DT);
        assert!(lag.output() < 0.001);

        // Fast fall from a held value snaps down immediately
        let mut lag = LagProcessor::new();
        lag.process(5.0, 0.0, 0.0, 0.0, 1.0);
        assert_eq!(lag.output(), 5.0);
        let out = lag.process(0.0, 0.0, 1.0, 0.0, 1.0 / 1_000.0);
        assert_eq!(out, 0.0);
    }

    #[test]
    fn test_lag_shape_blends_toward_proportional() {
        // At full shape the step size shrinks with the remaining distance
        let mut lag = LagProcessor::new();
        let first = lag.process(5.0, 1.0, 0.5, 0.5, DT);
        let second = lag.process(5.0, 1.0, 0.5, 0.5, DT) - first;
        assert!(second < first);
        assert!(second > 0.0);
    }

    #[test]
    fn test_lag_holds_at_target() {
        let mut lag = LagProcessor::new();
        lag.process(3.0, 0.0, 0.0, 0.0, 1.0);
        let out = lag.process(3.0, 0.0, 0.0, 0.0, 1.0);
        assert_eq!(out, 3.0);
    }

    #[test]
    fn test_lag_reset() {
        let mut lag = LagProcessor::new();
        lag.process(5.0, 0.0, 0.0, 0.0, 1.0);
        lag.reset();
        assert_eq!(lag.output(), 0.0);
    }
}
