//! Pattern Sequencer
//!
//! A CV/gate pattern sequencer: a table of per-step voltages and a gate
//! mask, played by the full transport with all five directions, one-shot
//! playback, and addressed access. Unlike the multi-step engine there is
//! no per-step timing; every clock edge moves the playhead, and masked
//! steps still occupy their tick with the gate held low.
//!
//! `PatternSequencer64` is the shipped size.

use crate::gate::GateProcessor;
use crate::rng::SequenceRng;
use crate::transport::{Direction, SequencerTransport};

#[cfg(feature = "alloc")]
use crate::persist::PatternSequencerSnapshot;

/// One sample of pattern sequencer output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternOutput {
    /// The current step's CV value.
    pub cv: f32,
    /// Follows the input clock level through unmasked steps.
    pub gate: bool,
    /// High for exactly one sample when an unmasked step starts.
    pub trigger: bool,
    /// Index of the current step.
    pub step: usize,
    /// Set once a one-shot pass has completed.
    pub ended: bool,
}

/// Pattern Sequencer
///
/// Owns the step table and the clock, reset, and run comparators. Call
/// [`process`](Self::process) once per host sample.
#[derive(Debug, Clone)]
pub struct PatternSequencer<const N: usize> {
    cv: [f32; N],
    gates: [bool; N],
    transport: SequencerTransport,
    clock: GateProcessor,
    reset: GateProcessor,
    run: GateProcessor,
    rng: SequenceRng,
}

/// Sixty-four step pattern sequencer, the shipped size.
pub type PatternSequencer64 = PatternSequencer<64>;

impl<const N: usize> PatternSequencer<N> {
    pub fn new() -> Self {
        Self {
            cv: [0.0; N],
            gates: [true; N],
            transport: SequencerTransport::new(N),
            clock: GateProcessor::new(),
            reset: GateProcessor::new(),
            run: GateProcessor::new(),
            rng: SequenceRng::default(),
        }
    }

    /// Builder: start in the given direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.transport = self.transport.with_direction(direction);
        self
    }

    /// Builder: play one pass and then stop.
    pub fn with_one_shot(mut self, one_shot: bool) -> Self {
        self.transport = self.transport.with_one_shot(one_shot);
        self
    }

    /// Builder: use a specific RNG, for deterministic replay.
    pub fn with_rng(mut self, rng: SequenceRng) -> Self {
        self.rng = rng;
        self
    }

    /// Set one step's voltage and gate mask. Out-of-range indices are
    /// ignored.
    pub fn set_step(&mut self, index: usize, voltage: f32, gate: bool) {
        if index < N {
            self.cv[index] = voltage;
            self.gates[index] = gate;
        }
    }

    pub fn step(&self, index: usize) -> Option<(f32, bool)> {
        if index < N {
            Some((self.cv[index], self.gates[index]))
        } else {
            None
        }
    }

    pub fn set_length(&mut self, length: usize) {
        self.transport.set_length(length);
    }

    pub fn length(&self) -> usize {
        self.transport.length()
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.transport.set_direction(direction);
    }

    pub fn direction(&self) -> Direction {
        self.transport.direction()
    }

    pub fn set_one_shot(&mut self, one_shot: bool) {
        self.transport.set_one_shot(one_shot);
    }

    pub fn current_step(&self) -> usize {
        self.transport.current_step()
    }

    pub fn ended(&self) -> bool {
        self.transport.ended()
    }

    /// Feed one sample of the control inputs.
    ///
    /// Every clock leading edge advances the playhead while the run
    /// input is high. A reset leading edge re-seeds the playhead and
    /// fires the seeded step's trigger; a simultaneous clock edge is
    /// swallowed.
    pub fn process(
        &mut self,
        clock_voltage: f32,
        reset_voltage: f32,
        run_voltage: f32,
        address_cv: f32,
    ) -> PatternOutput {
        self.run.set(run_voltage);
        self.reset.set(reset_voltage);
        self.clock.set(clock_voltage);

        if self.reset.leading_edge() {
            self.transport.reset();
        } else if self.clock.leading_edge() && self.run.high() {
            self.transport.advance(&mut self.rng, address_cv);
        }

        let index = self.transport.current_step();
        let ended = self.transport.ended();
        let active = self.run.high() && !ended && self.gates[index.min(N - 1)];

        PatternOutput {
            cv: self.cv[index.min(N - 1)],
            gate: active && self.clock.high(),
            trigger: active && (self.clock.leading_edge() || self.reset.leading_edge()),
            step: index,
            ended,
        }
    }

    /// Park the playhead at the start without producing output.
    pub fn reset(&mut self) {
        self.transport.reset();
        self.clock.reset();
        self.reset.reset();
        self.run.reset();
    }
}

impl<const N: usize> Default for PatternSequencer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "alloc")]
impl<const N: usize> PatternSequencer<N> {
    /// Capture the sequencer state for session persistence. The RNG
    /// stream is not stored.
    pub fn snapshot(&self) -> PatternSequencerSnapshot {
        PatternSequencerSnapshot {
            cv: self.cv.to_vec(),
            gates: self.gates.to_vec(),
            transport: self.transport.snapshot(),
            clock: self.clock.high(),
            reset: self.reset.high(),
            run: self.run.high(),
        }
    }

    /// Restore a saved state. Extra steps in an oversized snapshot are
    /// dropped.
    pub fn restore(&mut self, snap: &PatternSequencerSnapshot) {
        for (slot, saved) in self.cv.iter_mut().zip(snap.cv.iter()) {
            *slot = *saved;
        }
        for (slot, saved) in self.gates.iter_mut().zip(snap.gates.iter()) {
            *slot = *saved;
        }
        self.transport.restore(&snap.transport);
        self.clock.preset(snap.clock);
        self.reset.preset(snap.reset);
        self.run.preset(snap.run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequencer<const N: usize>() -> PatternSequencer<N> {
        PatternSequencer::<N>::new().with_rng(SequenceRng::from_seed(0x5eed))
    }

    fn pulse<const N: usize>(seq: &mut PatternSequencer<N>) -> PatternOutput {
        let out = seq.process(10.0, 0.0, 10.0, 0.0);
        seq.process(0.0, 0.0, 10.0, 0.0);
        out
    }

    #[test]
    fn test_forward_playback() {
        let mut seq = sequencer::<64>();
        seq.set_length(4);
        for i in 0..4 {
            seq.set_step(i, i as f32, true);
        }

        for expected in [1, 2, 3, 0, 1] {
            let out = pulse(&mut seq);
            assert_eq!(out.step, expected);
            assert_eq!(out.cv, expected as f32);
            assert!(out.gate);
            assert!(out.trigger);
        }
    }

    #[test]
    fn test_gate_follows_clock_width() {
        let mut seq = sequencer::<64>();
        seq.set_length(2);

        let out = seq.process(10.0, 0.0, 10.0, 0.0);
        assert!(out.gate);
        assert!(out.trigger);

        // Clock still high, gate holds, trigger is one sample
        let out = seq.process(10.0, 0.0, 10.0, 0.0);
        assert!(out.gate);
        assert!(!out.trigger);

        let out = seq.process(0.0, 0.0, 10.0, 0.0);
        assert!(!out.gate);
    }

    #[test]
    fn test_masked_steps_stay_quiet_but_play_through() {
        let mut seq = sequencer::<64>();
        seq.set_length(3);
        seq.set_step(0, 1.0, true);
        seq.set_step(1, 2.0, false);
        seq.set_step(2, 3.0, true);

        let out = pulse(&mut seq);
        assert_eq!(out.step, 1);
        assert_eq!(out.cv, 2.0);
        assert!(!out.gate);
        assert!(!out.trigger);

        // The masked step still occupied its tick
        let out = pulse(&mut seq);
        assert_eq!(out.step, 2);
        assert!(out.gate);
    }

    #[test]
    fn test_pendulum_playback() {
        let mut seq = sequencer::<64>().with_direction(Direction::Pendulum);
        seq.set_length(4);

        let steps: Vec<usize> = (0..8).map(|_| pulse(&mut seq).step).collect();
        assert_eq!(steps, vec![1, 2, 3, 3, 2, 1, 0, 0]);
    }

    #[test]
    fn test_one_shot_ends() {
        let mut seq = sequencer::<64>().with_one_shot(true);
        seq.set_length(4);

        for expected in [1, 2, 3] {
            let out = pulse(&mut seq);
            assert_eq!(out.step, expected);
            assert!(!out.ended);
        }

        let out = pulse(&mut seq);
        assert!(out.ended);
        assert!(!out.gate);
        assert!(!out.trigger);
        assert_eq!(out.step, 0);

        // Reset pulse revives playback
        seq.process(0.0, 10.0, 10.0, 0.0);
        seq.process(0.0, 0.0, 10.0, 0.0);
        assert!(!seq.ended());
        assert_eq!(pulse(&mut seq).step, 1);
    }

    #[test]
    fn test_addressed_playback() {
        let mut seq = sequencer::<64>().with_direction(Direction::Addressed);
        seq.set_length(8);
        for i in 0..8 {
            seq.set_step(i, i as f32, true);
        }

        let out = seq.process(10.0, 0.0, 10.0, 5.0);
        assert_eq!(out.step, 4);
        assert_eq!(out.cv, 4.0);
        seq.process(0.0, 0.0, 10.0, 5.0);

        let out = seq.process(10.0, 0.0, 10.0, 10.0);
        assert_eq!(out.step, 7);
    }

    #[test]
    fn test_random_stays_in_bounds() {
        let mut seq = sequencer::<64>().with_direction(Direction::Random);
        seq.set_length(5);

        for _ in 0..100 {
            let out = pulse(&mut seq);
            assert!(out.step < 5);
        }
    }

    #[test]
    fn test_reset_reseeds_and_triggers() {
        let mut seq = sequencer::<64>();
        seq.set_length(8);
        for _ in 0..5 {
            pulse(&mut seq);
        }
        assert_eq!(seq.current_step(), 5);

        let out = seq.process(0.0, 10.0, 10.0, 0.0);
        assert_eq!(out.step, 0);
        assert!(out.trigger);
        assert!(!out.gate);
        seq.process(0.0, 0.0, 10.0, 0.0);

        // The next clock edge moves on from the seeded step
        assert_eq!(pulse(&mut seq).step, 1);
    }

    #[test]
    fn test_run_low_freezes() {
        let mut seq = sequencer::<64>();
        seq.set_length(4);
        pulse(&mut seq);
        assert_eq!(seq.current_step(), 1);

        for _ in 0..3 {
            let out = seq.process(10.0, 0.0, 0.0, 0.0);
            assert!(!out.gate);
            seq.process(0.0, 0.0, 0.0, 0.0);
        }
        assert_eq!(seq.current_step(), 1);
    }

    #[test]
    fn test_reverse_seeds_last_step() {
        let mut seq = sequencer::<64>().with_direction(Direction::Reverse);
        seq.set_length(4);
        assert_eq!(seq.current_step(), 3);

        let steps: Vec<usize> = (0..5).map(|_| pulse(&mut seq).step).collect();
        assert_eq!(steps, vec![2, 1, 0, 3, 2]);
    }
}
