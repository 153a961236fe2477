//! Clock Division
//!
//! Divided-down gates from an input clock. The current divider counts
//! every edge of the clock so its output stays square; the legacy divider
//! is kept alongside it because old sessions depend on its behavior.

use crate::gate::GateProcessor;
use crate::voltage::unipolar_fraction;
use serde::{Deserialize, Serialize};

#[cfg(feature = "alloc")]
use crate::persist::DividerSnapshot;

/// Count direction for a frequency divider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountMode {
    /// Counter climbs from zero; the output flips on edge N of each window.
    CountUp,
    /// Counter falls toward zero; the output flips on the first edge after
    /// reset and every N edges after that.
    CountDown,
}

/// Frequency Divider
///
/// Produces a divided-down gate from an input clock. Every input edge,
/// leading or trailing, advances an internal counter; the output phase
/// flips once per `n` edges, so a square clock divided by `n` comes out
/// square as well.
#[derive(Debug, Clone, Copy)]
pub struct FrequencyDivider {
    gate: GateProcessor,
    count: i32,
    n: i32,
    max_n: i32,
    count_mode: CountMode,
    phase: bool,
}

impl FrequencyDivider {
    pub fn new() -> Self {
        Self {
            gate: GateProcessor::new(),
            count: 0,
            n: 1,
            max_n: 64,
            count_mode: CountMode::CountUp,
            phase: false,
        }
    }

    pub fn with_count_mode(mut self, mode: CountMode) -> Self {
        self.set_count_mode(mode);
        self
    }

    /// Set the division factor, clamped into `[1, max_n]`.
    pub fn set_n(&mut self, n: i32) {
        self.n = n.clamp(1, self.max_n);
    }

    /// Set the largest allowed division factor, clamped into `[1, 64]`.
    /// The current factor is re-clamped against the new limit.
    pub fn set_max_n(&mut self, max_n: i32) {
        self.max_n = max_n.clamp(1, 64);
        self.n = self.n.clamp(1, self.max_n);
    }

    pub fn set_count_mode(&mut self, mode: CountMode) {
        self.count_mode = mode;
    }

    pub fn n(&self) -> i32 {
        self.n
    }

    pub fn max_n(&self) -> i32 {
        self.max_n
    }

    pub fn count_mode(&self) -> CountMode {
        self.count_mode
    }

    pub fn phase(&self) -> bool {
        self.phase
    }

    /// Feed one sample of the input clock and return the divided phase.
    pub fn process(&mut self, clock_voltage: f32) -> bool {
        self.gate.set(clock_voltage);

        if self.gate.any_edge() {
            match self.count_mode {
                CountMode::CountUp => {
                    self.count += 1;
                    if self.count >= self.n {
                        self.phase = !self.phase;
                        self.count = 0;
                    }
                }
                CountMode::CountDown => {
                    self.count -= 1;
                    if self.count <= 0 {
                        self.phase = !self.phase;
                        self.count = self.n;
                    }
                }
            }
        }

        self.phase
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.phase = false;
        self.gate.reset();
    }
}

impl Default for FrequencyDivider {
    fn default() -> Self {
        Self::new()
    }
}

/// Legacy Frequency Divider
///
/// Earlier divider retained so sessions saved against it keep their
/// timing. It differs from [`FrequencyDivider`] in two audible ways: the
/// division factor comes from a 0-10 V CV mapped onto `[1, max_n + 1]`,
/// and only leading clock edges are counted, so the divided output holds
/// through trailing edges. Whether the edge handling was deliberate is
/// unknown, so the two are never merged.
#[derive(Debug, Clone, Copy)]
pub struct LegacyFrequencyDivider {
    gate: GateProcessor,
    count: i32,
    n: i32,
    max_n: i32,
    count_mode: CountMode,
    phase: bool,
}

impl LegacyFrequencyDivider {
    pub fn new() -> Self {
        Self {
            gate: GateProcessor::new(),
            count: 0,
            n: 1,
            max_n: 63,
            count_mode: CountMode::CountUp,
            phase: false,
        }
    }

    /// Map a 0-10 V CV onto the division factor. Full scale lands on
    /// `max_n + 1`, so a `max_n` of 63 spans divisions 1 through 64.
    pub fn set_division_voltage(&mut self, cv: f32) {
        let n = (unipolar_fraction(cv) * self.max_n as f32) as i32 + 1;
        self.n = n.clamp(1, self.max_n + 1);
    }

    /// Set the CV mapping ceiling, clamped into `[0, 63]`.
    pub fn set_max_n(&mut self, max_n: i32) {
        self.max_n = max_n.clamp(0, 63);
        self.n = self.n.clamp(1, self.max_n + 1);
    }

    pub fn set_count_mode(&mut self, mode: CountMode) {
        self.count_mode = mode;
    }

    pub fn n(&self) -> i32 {
        self.n
    }

    pub fn phase(&self) -> bool {
        self.phase
    }

    /// Feed one sample of the input clock and return the divided phase.
    /// Only leading edges count.
    pub fn process(&mut self, clock_voltage: f32) -> bool {
        self.gate.set(clock_voltage);

        if self.gate.leading_edge() {
            match self.count_mode {
                CountMode::CountUp => {
                    self.count += 1;
                    if self.count >= self.n {
                        self.phase = !self.phase;
                        self.count = 0;
                    }
                }
                CountMode::CountDown => {
                    self.count -= 1;
                    if self.count <= 0 {
                        self.phase = !self.phase;
                        self.count = self.n;
                    }
                }
            }
        }

        self.phase
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.phase = false;
        self.gate.reset();
    }
}

impl Default for LegacyFrequencyDivider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "alloc")]
impl FrequencyDivider {
    /// Capture the divider state for session persistence.
    pub fn snapshot(&self) -> DividerSnapshot {
        DividerSnapshot {
            n: self.n,
            max_n: self.max_n,
            count: self.count,
            count_mode: self.count_mode,
            phase: self.phase,
            gate: self.gate.high(),
        }
    }

    /// Restore a saved state. Fields are clamped like the live setters.
    pub fn restore(&mut self, snap: &DividerSnapshot) {
        self.max_n = snap.max_n.clamp(1, 64);
        self.n = snap.n.clamp(1, self.max_n);
        self.count = snap.count.clamp(0, self.n);
        self.count_mode = snap.count_mode;
        self.phase = snap.phase;
        self.gate.preset(snap.gate);
    }
}
