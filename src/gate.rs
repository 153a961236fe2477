//! Gate and Edge Detection
//!
//! Schmitt-trigger thresholding plus edge detection over gate voltages.
//! Nearly every other primitive in the crate embeds a [`GateProcessor`]
//! for its clock, reset, or run input.

use crate::voltage::{GATE_HIGH_THRESHOLD, GATE_LOW_THRESHOLD};

/// Schmitt Trigger
///
/// Hysteresis comparator over a normalized input: goes high once the input
/// reaches 1.0 and stays high until it falls back to 0.0. Values in
/// between hold the previous state.
#[derive(Debug, Clone, Copy)]
pub struct SchmittTrigger {
    high: bool,
}

impl SchmittTrigger {
    pub const fn new() -> Self {
        Self { high: false }
    }

    /// Feed a normalized value and return the comparator state.
    pub fn set(&mut self, value: f32) -> bool {
        if self.high {
            if value <= 0.0 {
                self.high = false;
            }
        } else if value >= 1.0 {
            self.high = true;
        }
        self.high
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Force the comparator state, for restoring a saved session.
    pub fn preset(&mut self, high: bool) {
        self.high = high;
    }

    pub fn reset(&mut self) {
        self.high = false;
    }
}

impl Default for SchmittTrigger {
    fn default() -> Self {
        Self::new()
    }
}

/// Gate Processor
///
/// Converts an analog control voltage into a debounced boolean gate with
/// edge detection. The input is rescaled linearly from the 0.1 V / 2.0 V
/// threshold pair into the comparator's normalized range, so anything at
/// or below 0.1 V is a firm low and anything at or above 2.0 V is a firm
/// high.
#[derive(Debug, Clone, Copy)]
pub struct GateProcessor {
    comparator: SchmittTrigger,
    previous: bool,
    current: bool,
}

impl GateProcessor {
    pub const fn new() -> Self {
        Self {
            comparator: SchmittTrigger::new(),
            previous: false,
            current: false,
        }
    }

    /// Feed a gate voltage and return the new state.
    pub fn set(&mut self, voltage: f32) -> bool {
        let normalized =
            (voltage - GATE_LOW_THRESHOLD) / (GATE_HIGH_THRESHOLD - GATE_LOW_THRESHOLD);
        self.previous = self.current;
        self.current = self.comparator.set(normalized);
        self.current
    }

    pub fn high(&self) -> bool {
        self.current
    }

    pub fn low(&self) -> bool {
        !self.current
    }

    /// Low-to-high transition on the most recent `set`.
    pub fn leading_edge(&self) -> bool {
        self.current && !self.previous
    }

    /// High-to-low transition on the most recent `set`.
    pub fn trailing_edge(&self) -> bool {
        self.previous && !self.current
    }

    /// Either transition on the most recent `set`.
    pub fn any_edge(&self) -> bool {
        self.current != self.previous
    }

    /// Seed the gate state from a saved session so the next `set` cannot
    /// report a spurious edge.
    pub fn preset(&mut self, state: bool) {
        self.comparator.preset(state);
        self.previous = state;
        self.current = state;
    }

    pub fn reset(&mut self) {
        self.comparator.reset();
        self.previous = false;
        self.current = false;
    }
}

impl Default for GateProcessor {
    fn default() -> Self {
        Self::new()
    }
}
