//! Shift-Register CV Loop
//!
//! A clocked analog-style shift register: CV values march through a
//! fixed buffer, one position per clock, and the front of the buffer is
//! the output. With looping enabled, the value falling off the end can
//! re-enter at the back, optionally combined with the incoming CV, which
//! turns the register into a self-sustaining loop in the spirit of a
//! Turing machine sequencer. A `chance` probability decides per shift
//! whether the loop or the raw input wins.

use crate::gate::GateProcessor;
use crate::rng::SequenceRng;
use crate::voltage::GATE_OUTPUT_VOLTAGE;
use serde::{Deserialize, Serialize};

#[cfg(feature = "alloc")]
use crate::persist::ShiftRegisterSnapshot;

/// How a recirculated value is combined with the incoming CV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopMode {
    /// The dropped value re-enters unchanged; at full chance the loop is
    /// locked.
    Lock,
    /// Element-wise minimum of dropped and input, the CV analogue of AND.
    Min,
    /// Element-wise maximum, the CV analogue of OR.
    Max,
    /// Arithmetic mean of dropped and input.
    Average,
    /// Unipolar inversion of the dropped value; the input is ignored.
    Invert,
}

/// Shift-Register Loop
///
/// Owns the value buffer, the clock comparator, and the RNG behind the
/// chance roll. The active region is the first `length` elements;
/// `reverse` flips which end drops and which end receives.
#[derive(Debug, Clone)]
pub struct ShiftRegisterLoop<const N: usize> {
    values: [f32; N],
    length: usize,
    reverse: bool,
    loop_enabled: bool,
    mode: LoopMode,
    chance: f32,
    clock: GateProcessor,
    rng: SequenceRng,
}

impl<const N: usize> ShiftRegisterLoop<N> {
    pub fn new() -> Self {
        Self {
            values: [0.0; N],
            length: N,
            reverse: false,
            loop_enabled: false,
            mode: LoopMode::Lock,
            chance: 1.0,
            clock: GateProcessor::new(),
            rng: SequenceRng::default(),
        }
    }

    /// Builder: use a specific RNG, for deterministic replay.
    pub fn with_rng(mut self, rng: SequenceRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn set_length(&mut self, length: usize) {
        self.length = length.clamp(1, N);
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn set_reverse(&mut self, reverse: bool) {
        self.reverse = reverse;
    }

    pub fn set_loop_enabled(&mut self, enabled: bool) {
        self.loop_enabled = enabled;
    }

    pub fn set_mode(&mut self, mode: LoopMode) {
        self.mode = mode;
    }

    pub fn set_chance(&mut self, chance: f32) {
        self.chance = chance.clamp(0.0, 1.0);
    }

    /// Preload one register position. Out-of-range indices are ignored.
    pub fn set_value(&mut self, index: usize, value: f32) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    pub fn value(&self, index: usize) -> Option<f32> {
        if index < self.length {
            Some(self.values[index])
        } else {
            None
        }
    }

    /// The active region, oldest position first.
    pub fn values(&self) -> &[f32] {
        &self.values[..self.length]
    }

    /// The CV currently at the output position, held between clocks.
    pub fn output(&self) -> f32 {
        if self.reverse {
            self.values[self.length - 1]
        } else {
            self.values[0]
        }
    }

    /// Feed one sample of the clock and the input CV. Shifts on the
    /// clock's leading edge and returns the new output value; between
    /// edges, returns None and the register holds.
    pub fn process(&mut self, clock_voltage: f32, input: f32) -> Option<f32> {
        self.clock.set(clock_voltage);
        if self.clock.leading_edge() {
            Some(self.shift(input))
        } else {
            None
        }
    }

    /// Advance the register by one position and return the new output.
    ///
    /// The oldest element is dropped from the output end and a new value
    /// enters at the other end: the raw input, or, when looping is
    /// enabled and the chance roll passes, the dropped value combined
    /// with the input per the loop mode.
    pub fn shift(&mut self, input: f32) -> f32 {
        let active = &mut self.values[..self.length];
        let dropped = if self.reverse {
            active[self.length - 1]
        } else {
            active[0]
        };

        let inserted = if self.loop_enabled && self.rng.next_bool_with_probability(self.chance) {
            combine(self.mode, dropped, input)
        } else {
            input
        };

        if self.reverse {
            active.rotate_right(1);
            active[0] = inserted;
        } else {
            active.rotate_left(1);
            active[self.length - 1] = inserted;
        }

        self.output()
    }

    /// Zero the buffer and clock state. Length, mode, and chance are
    /// kept.
    pub fn reset(&mut self) {
        self.values = [0.0; N];
        self.clock.reset();
    }
}

impl<const N: usize> Default for ShiftRegisterLoop<N> {
    fn default() -> Self {
        Self::new()
    }
}

fn combine(mode: LoopMode, dropped: f32, input: f32) -> f32 {
    match mode {
        LoopMode::Lock => dropped,
        LoopMode::Min => dropped.min(input),
        LoopMode::Max => dropped.max(input),
        LoopMode::Average => 0.5 * (dropped + input),
        LoopMode::Invert => GATE_OUTPUT_VOLTAGE - dropped,
    }
}

#[cfg(feature = "alloc")]
impl<const N: usize> ShiftRegisterLoop<N> {
    /// Capture the register state for session persistence. The RNG
    /// stream is not stored.
    pub fn snapshot(&self) -> ShiftRegisterSnapshot {
        ShiftRegisterSnapshot {
            values: self.values.to_vec(),
            length: self.length,
            reverse: self.reverse,
            loop_enabled: self.loop_enabled,
            mode: self.mode,
            chance: self.chance,
            clock: self.clock.high(),
        }
    }

    /// Restore a saved state. Extra values in an oversized snapshot are
    /// dropped.
    pub fn restore(&mut self, snap: &ShiftRegisterSnapshot) {
        for (slot, saved) in self.values.iter_mut().zip(snap.values.iter()) {
            *slot = *saved;
        }
        self.length = snap.length.clamp(1, N);
        self.reverse = snap.reverse;
        self.loop_enabled = snap.loop_enabled;
        self.mode = snap.mode;
        self.chance = snap.chance.clamp(0.0, 1.0);
        self.clock.preset(snap.clock);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register<const N: usize>() -> ShiftRegisterLoop<N> {
        ShiftRegisterLoop::<N>::new().with_rng(SequenceRng::from_seed(0x5eed))
    }

    fn preload<const N: usize>(reg: &mut ShiftRegisterLoop<N>, values: &[f32]) {
        for (i, v) in values.iter().enumerate() {
            reg.set_value(i, *v);
        }
    }

    #[test]
    fn test_plain_fifo_when_loop_disabled() {
        let mut reg = register::<4>();

        let outputs: Vec<f32> = (1..=7).map(|i| reg.shift(i as f32)).collect();
        assert_eq!(outputs, vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(reg.values(), &[4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_lock_recirculates() {
        let mut reg = register::<4>();
        preload(&mut reg, &[1.0, 2.0, 3.0, 4.0]);
        reg.set_loop_enabled(true);
        reg.set_mode(LoopMode::Lock);
        reg.set_chance(1.0);

        // The input never enters a fully locked loop
        let outputs: Vec<f32> = (0..8).map(|_| reg.shift(99.0)).collect();
        assert_eq!(outputs, vec![2.0, 3.0, 4.0, 1.0, 2.0, 3.0, 4.0, 1.0]);
        assert_eq!(reg.values(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_chance_zero_never_loops() {
        let mut reg = register::<4>();
        preload(&mut reg, &[1.0, 2.0, 3.0, 4.0]);
        reg.set_loop_enabled(true);
        reg.set_mode(LoopMode::Lock);
        reg.set_chance(0.0);

        let outputs: Vec<f32> = (1..=4).map(|i| reg.shift(i as f32 * 10.0)).collect();
        assert_eq!(outputs, vec![2.0, 3.0, 4.0, 10.0]);
        assert_eq!(reg.values(), &[10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_combine_modes() {
        let cases = [
            (LoopMode::Min, 3.0, 5.0, 3.0),
            (LoopMode::Min, 7.0, 5.0, 5.0),
            (LoopMode::Max, 3.0, 5.0, 5.0),
            (LoopMode::Max, 7.0, 5.0, 7.0),
            (LoopMode::Average, 3.0, 5.0, 4.0),
            (LoopMode::Invert, 3.0, 5.0, 7.0),
            (LoopMode::Lock, 3.0, 5.0, 3.0),
        ];

        for (mode, dropped, input, expected) in cases {
            let mut reg = register::<2>();
            preload(&mut reg, &[dropped, 0.0]);
            reg.set_loop_enabled(true);
            reg.set_mode(mode);
            reg.set_chance(1.0);

            reg.shift(input);
            assert_eq!(reg.value(1), Some(expected), "{:?}", mode);
        }
    }

    #[test]
    fn test_reverse_shifts_other_way() {
        let mut reg = register::<4>();
        preload(&mut reg, &[1.0, 2.0, 3.0, 4.0]);
        reg.set_reverse(true);
        reg.set_loop_enabled(true);
        reg.set_mode(LoopMode::Lock);
        reg.set_chance(1.0);

        let outputs: Vec<f32> = (0..4).map(|_| reg.shift(99.0)).collect();
        assert_eq!(outputs, vec![3.0, 2.0, 1.0, 4.0]);
        assert_eq!(reg.values(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_shift_only_on_leading_edge() {
        let mut reg = register::<4>();

        assert!(reg.process(10.0, 1.0).is_some());
        assert!(reg.process(10.0, 2.0).is_none());
        assert!(reg.process(0.0, 3.0).is_none());
        assert!(reg.process(10.0, 4.0).is_some());
        assert_eq!(reg.values(), &[0.0, 0.0, 1.0, 4.0]);
    }

    #[test]
    fn test_length_limits_active_region() {
        let mut reg = register::<8>();
        reg.set_length(3);
        preload(&mut reg, &[1.0, 2.0, 3.0]);

        assert_eq!(reg.shift(9.0), 2.0);
        assert_eq!(reg.values(), &[2.0, 3.0, 9.0]);
        assert_eq!(reg.value(2), Some(9.0));
        assert_eq!(reg.value(3), None);

        reg.set_length(0);
        assert_eq!(reg.length(), 1);
        reg.set_length(99);
        assert_eq!(reg.length(), 8);
    }

    #[test]
    fn test_output_holds_between_clocks() {
        let mut reg = register::<2>();
        preload(&mut reg, &[5.0, 6.0]);

        assert_eq!(reg.output(), 5.0);
        reg.shift(0.0);
        assert_eq!(reg.output(), 6.0);
        assert_eq!(reg.output(), 6.0);
    }

    #[test]
    fn test_reset_clears_values_keeps_config() {
        let mut reg = register::<4>();
        preload(&mut reg, &[1.0, 2.0, 3.0, 4.0]);
        reg.set_length(3);
        reg.set_mode(LoopMode::Average);
        reg.set_chance(0.5);

        reg.reset();
        assert_eq!(reg.values(), &[0.0, 0.0, 0.0]);
        assert_eq!(reg.length(), 3);
    }
}
