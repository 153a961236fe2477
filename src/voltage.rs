//! Voltage Conventions
//!
//! Gate and CV conventions shared by every primitive in the crate. Gates
//! are 0 V low and 10 V high. The Schmitt thresholds sit at 0.1 V and
//! 2.0 V so a noisy signal near ground cannot chatter an edge detector.

/// Output level of a high gate, in volts.
pub const GATE_OUTPUT_VOLTAGE: f32 = 10.0;

/// Voltage at and below which a Schmitt comparator returns to low.
pub const GATE_LOW_THRESHOLD: f32 = 0.1;

/// Voltage at and above which a Schmitt comparator goes high.
pub const GATE_HIGH_THRESHOLD: f32 = 2.0;

/// Gate voltage for a boolean state.
#[inline]
pub fn gate_voltage(high: bool) -> f32 {
    if high {
        GATE_OUTPUT_VOLTAGE
    } else {
        0.0
    }
}

/// Fraction of the unipolar 0-10 V CV range, clamped into [0, 1].
#[inline]
pub fn unipolar_fraction(cv: f32) -> f32 {
    cv.clamp(0.0, GATE_OUTPUT_VOLTAGE) / GATE_OUTPUT_VOLTAGE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_voltage() {
        assert_eq!(gate_voltage(true), 10.0);
        assert_eq!(gate_voltage(false), 0.0);
    }

    #[test]
    fn test_unipolar_fraction() {
        assert_eq!(unipolar_fraction(0.0), 0.0);
        assert_eq!(unipolar_fraction(5.0), 0.5);
        assert_eq!(unipolar_fraction(10.0), 1.0);

        // Out-of-range CV clamps instead of extrapolating
        assert_eq!(unipolar_fraction(-3.0), 0.0);
        assert_eq!(unipolar_fraction(12.0), 1.0);
    }
}
