//! Multi-Step Sequencer
//!
//! A step sequencer whose steps each carry their own clock division,
//! repeat count, and probability. A step occupies `division * repeats`
//! clock ticks before the playhead moves to the next enabled step, and
//! within that window the gate fires once per repeat, on the first tick
//! of each repeat window, for as long as the input clock stays high.
//!
//! The capacity is a const-generic parameter; `StepSequencer8`,
//! `StepSequencer16`, and `StepSequencer32` are the shipped sizes.

use crate::gate::GateProcessor;
use crate::rng::SequenceRng;
use crate::transport::{Direction, SequencerTransport};
use serde::{Deserialize, Serialize};

#[cfg(feature = "alloc")]
use crate::persist::StepSequencerSnapshot;

/// How a step's probability value is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbabilityMode {
    /// No roll, the step always plays.
    Off,
    /// One roll on step entry; failure silences the whole step while the
    /// playhead still walks through its window.
    Step,
    /// One roll per repeat window; failure silences that repeat only.
    Repeats,
}

/// One step of a [`StepSequencer`].
///
/// Fields are plain data the host edits directly; the engine clamps
/// `division` and `repeats` to at least one wherever it reads them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SequencerStep {
    pub cv: f32,
    pub enabled: bool,
    pub division: i32,
    pub repeats: i32,
    pub probability: f32,
    pub probability_mode: ProbabilityMode,
}

impl SequencerStep {
    pub const fn new(cv: f32) -> Self {
        Self {
            cv,
            enabled: true,
            division: 1,
            repeats: 1,
            probability: 1.0,
            probability_mode: ProbabilityMode::Off,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_division(mut self, division: i32) -> Self {
        self.division = division.max(1);
        self
    }

    pub fn with_repeats(mut self, repeats: i32) -> Self {
        self.repeats = repeats.max(1);
        self
    }

    pub fn with_probability(mut self, probability: f32) -> Self {
        self.probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn with_probability_mode(mut self, mode: ProbabilityMode) -> Self {
        self.probability_mode = mode;
        self
    }

    /// Clock ticks this step occupies before the playhead moves on.
    pub fn span(&self) -> i32 {
        self.division.max(1) * self.repeats.max(1)
    }

    fn division_ticks(&self) -> i32 {
        self.division.max(1)
    }

    /// Bring host-edited or restored fields back into range.
    fn sanitize(&mut self) {
        self.division = self.division.max(1);
        self.repeats = self.repeats.max(1);
        self.probability = self.probability.clamp(0.0, 1.0);
    }
}

impl Default for SequencerStep {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// One sample of sequencer output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutput {
    /// High while the input clock is high on a permitted repeat start.
    pub gate: bool,
    /// High for exactly one sample at each permitted repeat start.
    pub trigger: bool,
    /// The current step's CV value, held between steps.
    pub cv: f32,
    /// Index of the current step.
    pub step: usize,
}

/// Multi-Step Sequencer
///
/// Owns a fixed table of [`SequencerStep`]s plus the transport, clock,
/// reset, and run comparators. Call [`process`](Self::process) once per
/// host sample with the raw input voltages.
#[derive(Debug, Clone)]
pub struct StepSequencer<const N: usize> {
    steps: [SequencerStep; N],
    transport: SequencerTransport,
    clock: GateProcessor,
    reset: GateProcessor,
    run: GateProcessor,
    rng: SequenceRng,
    tick_count: i32,
    first_tick: bool,
    step_allowed: bool,
    repeat_allowed: bool,
}

/// Eight-step sequencer, the smallest shipped size.
pub type StepSequencer8 = StepSequencer<8>;
/// Sixteen-step sequencer.
pub type StepSequencer16 = StepSequencer<16>;
/// Thirty-two-step sequencer.
pub type StepSequencer32 = StepSequencer<32>;

impl<const N: usize> StepSequencer<N> {
    pub fn new() -> Self {
        Self {
            steps: [SequencerStep::new(0.0); N],
            transport: SequencerTransport::new(N),
            clock: GateProcessor::new(),
            reset: GateProcessor::new(),
            run: GateProcessor::new(),
            rng: SequenceRng::default(),
            tick_count: 0,
            first_tick: false,
            step_allowed: true,
            repeat_allowed: true,
        }
    }

    /// Builder: use a specific RNG, for deterministic replay.
    pub fn with_rng(mut self, rng: SequenceRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn step(&self, index: usize) -> Option<&SequencerStep> {
        self.steps.get(index)
    }

    /// Replace one step. Out-of-range indices are ignored.
    pub fn set_step(&mut self, index: usize, mut step: SequencerStep) {
        step.sanitize();
        if let Some(slot) = self.steps.get_mut(index) {
            *slot = step;
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
    /// A reset leading edge re-seeds the playhead and counts as the
    /// entry tick of the seeded step, so its trigger fires immediately;
    /// a simultaneous clock edge is swallowed. While the run input is
    /// low, clock edges are ignored and the outputs stay quiet.
    pub fn process(
        &mut self,
        clock_voltage: f32,
        reset_voltage: f32,
        run_voltage: f32,
        address_cv: f32,
    ) -> StepOutput {
        self.run.set(run_voltage);
        self.reset.set(reset_voltage);
        self.clock.set(clock_voltage);

        if self.reset.leading_edge() {
            self.transport.reset();
            self.tick_count = 0;
            self.enter_step();
            self.first_tick = true;
            self.enter_repeat();
            self.tick_count = 1;
        } else if self.clock.leading_edge() && self.run.high() {
            if self.tick_count >= self.current_span() {
                self.advance_step(address_cv);
            }
            if self.tick_count == 0 {
                self.enter_step();
            }
            self.first_tick = self.tick_count % self.current_division() == 0;
            if self.first_tick {
                self.enter_repeat();
            }
            self.tick_count += 1;
        }

        let index = self.transport.current_step();
        let step = &self.steps[index.min(N - 1)];
        let active = self.run.high()
            && !self.transport.ended()
            && step.enabled
            && self.step_allowed
            && self.repeat_allowed
            && self.first_tick;

        StepOutput {
            gate: active && self.clock.high(),
            trigger: active && (self.clock.leading_edge() || self.reset.leading_edge()),
            cv: step.cv,
            step: index,
        }
    }

    /// Park the playhead at the start without producing output. The next
    /// clock edge plays the seeded step.
    pub fn reset(&mut self) {
        self.transport.reset();
        self.tick_count = 0;
        self.first_tick = false;
        self.step_allowed = true;
        self.repeat_allowed = true;
        self.clock.reset();
        self.reset.reset();
        self.run.reset();
    }

    fn current_span(&self) -> i32 {
        self.steps[self.transport.current_step().min(N - 1)].span()
    }

    fn current_division(&self) -> i32 {
        self.steps[self.transport.current_step().min(N - 1)].division_ticks()
    }

    /// Move to the next enabled step, scanning at most one full lap.
    fn advance_step(&mut self, address_cv: f32) {
        self.tick_count = 0;
        if !self.transport.advance(&mut self.rng, address_cv) {
            return;
        }

        let mut scanned = 0;
        while scanned < N && !self.steps[self.transport.current_step().min(N - 1)].enabled {
            if !self.transport.advance(&mut self.rng, address_cv) {
                return;
            }
            scanned += 1;
        }
    }

    fn enter_step(&mut self) {
        let step = &self.steps[self.transport.current_step().min(N - 1)];
        self.step_allowed = match step.probability_mode {
            ProbabilityMode::Step => self.rng.next_bool_with_probability(step.probability),
            _ => true,
        };
    }

    fn enter_repeat(&mut self) {
        let step = &self.steps[self.transport.current_step().min(N - 1)];
        self.repeat_allowed = match step.probability_mode {
            ProbabilityMode::Repeats => self.rng.next_bool_with_probability(step.probability),
            _ => true,
        };
    }
}

impl<const N: usize> Default for StepSequencer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "alloc")]
impl<const N: usize> StepSequencer<N> {
    /// Capture the sequencer state for session persistence. The RNG
    /// stream is not stored; a restored sequencer re-rolls from fresh
    /// entropy.
    pub fn snapshot(&self) -> StepSequencerSnapshot {
        StepSequencerSnapshot {
            steps: self.steps.to_vec(),
            transport: self.transport.snapshot(),
            tick_count: self.tick_count,
            first_tick: self.first_tick,
            step_allowed: self.step_allowed,
            repeat_allowed: self.repeat_allowed,
            clock: self.clock.high(),
            reset: self.reset.high(),
            run: self.run.high(),
        }
    }

    /// Restore a saved state, clamping every field like the live
    /// setters. Extra steps in an oversized snapshot are dropped.
    pub fn restore(&mut self, snap: &StepSequencerSnapshot) {
        for (slot, saved) in self.steps.iter_mut().zip(snap.steps.iter()) {
            *slot = *saved;
            slot.sanitize();
        }
        self.transport.restore(&snap.transport);
        self.tick_count = snap.tick_count.max(0);
        self.first_tick = snap.first_tick;
        self.step_allowed = snap.step_allowed;
        self.repeat_allowed = snap.repeat_allowed;
        self.clock.preset(snap.clock);
        self.reset.preset(snap.reset);
        self.run.preset(snap.run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequencer<const N: usize>() -> StepSequencer<N> {
        StepSequencer::<N>::new().with_rng(SequenceRng::from_seed(0x5eed))
    }

    /// Drive one full clock pulse and return the output at the high
    /// sample.
    fn pulse<const N: usize>(seq: &mut StepSequencer<N>) -> StepOutput {
        let out = seq.process(10.0, 0.0, 10.0, 0.0);
        seq.process(0.0, 0.0, 10.0, 0.0);
        out
    }

    #[test]
    fn test_steps_advance_on_each_clock() {
        let mut seq = sequencer::<8>();
        seq.set_length(4);
        for i in 0..4 {
            seq.set_step(i, SequencerStep::new(i as f32));
        }

        for expected in [0, 1, 2, 3, 0, 1] {
            let out = pulse(&mut seq);
            assert_eq!(out.step, expected);
            assert_eq!(out.cv, expected as f32);
            assert!(out.gate);
            assert!(out.trigger);
        }
    }

    #[test]
    fn test_division_holds_step() {
        let mut seq = sequencer::<8>();
        seq.set_length(2);
        seq.set_step(0, SequencerStep::new(0.0).with_division(2));

        let steps: Vec<usize> = (0..6).map(|_| pulse(&mut seq).step).collect();
        assert_eq!(steps, vec![0, 0, 1, 0, 0, 1]);

        // Only the first tick of the divided window fires
        seq.reset();
        let triggers: Vec<bool> = (0..6).map(|_| pulse(&mut seq).trigger).collect();
        assert_eq!(triggers, vec![true, false, true, true, false, true]);
    }

    #[test]
    fn test_repeats_trigger_each_window() {
        let mut seq = sequencer::<8>();
        seq.set_length(2);
        seq.set_step(0, SequencerStep::new(0.0).with_repeats(3));

        // Three one-tick windows on step 0, then step 1
        for _ in 0..3 {
            let out = pulse(&mut seq);
            assert_eq!(out.step, 0);
            assert!(out.trigger);
        }
        let out = pulse(&mut seq);
        assert_eq!(out.step, 1);
        assert!(out.trigger);
    }

    #[test]
    fn test_division_and_repeats_combine() {
        let mut seq = sequencer::<8>();
        seq.set_length(2);
        seq.set_step(0, SequencerStep::new(0.0).with_division(2).with_repeats(2));

        // Four ticks on step 0, repeat windows starting at ticks 0 and 2
        let outs: Vec<StepOutput> = (0..5).map(|_| pulse(&mut seq)).collect();
        let steps: Vec<usize> = outs.iter().map(|o| o.step).collect();
        let triggers: Vec<bool> = outs.iter().map(|o| o.trigger).collect();
        assert_eq!(steps, vec![0, 0, 0, 0, 1]);
        assert_eq!(triggers, vec![true, false, true, false, true]);
    }

    #[test]
    fn test_step_probability_zero_silences_but_advances() {
        let mut seq = sequencer::<8>();
        seq.set_length(3);
        for i in 0..3 {
            seq.set_step(
                i,
                SequencerStep::new(0.0)
                    .with_probability(0.0)
                    .with_probability_mode(ProbabilityMode::Step),
            );
        }

        for expected in [0, 1, 2, 0] {
            let out = pulse(&mut seq);
            assert_eq!(out.step, expected);
            assert!(!out.gate);
            assert!(!out.trigger);
        }
    }

    #[test]
    fn test_probability_one_always_plays() {
        let mut seq = sequencer::<8>();
        seq.set_length(2);
        for i in 0..2 {
            seq.set_step(
                i,
                SequencerStep::new(0.0)
                    .with_probability(1.0)
                    .with_probability_mode(ProbabilityMode::Repeats)
                    .with_repeats(2),
            );
        }

        for _ in 0..8 {
            assert!(pulse(&mut seq).trigger);
        }
    }

    #[test]
    fn test_repeat_probability_zero_silences_repeats() {
        let mut seq = sequencer::<8>();
        seq.set_length(2);
        seq.set_step(
            0,
            SequencerStep::new(0.0)
                .with_repeats(3)
                .with_probability(0.0)
                .with_probability_mode(ProbabilityMode::Repeats),
        );

        // Step 0's repeats are all suppressed, step 1 still plays
        for _ in 0..3 {
            let out = pulse(&mut seq);
            assert_eq!(out.step, 0);
            assert!(!out.trigger);
        }
        let out = pulse(&mut seq);
        assert_eq!(out.step, 1);
        assert!(out.trigger);
    }

    #[test]
    fn test_disabled_steps_skipped() {
        let mut seq = sequencer::<8>();
        seq.set_length(4);
        seq.set_step(1, SequencerStep::new(0.0).with_enabled(false));

        let steps: Vec<usize> = (0..6).map(|_| pulse(&mut seq).step).collect();
        assert_eq!(steps, vec![0, 2, 3, 0, 2, 3]);
    }

    #[test]
    fn test_run_low_freezes() {
        let mut seq = sequencer::<8>();
        seq.set_length(4);
        pulse(&mut seq);
        pulse(&mut seq);
        assert_eq!(seq.current_step(), 1);

        for _ in 0..4 {
            let out = seq.process(10.0, 0.0, 0.0, 0.0);
            assert!(!out.gate);
            assert!(!out.trigger);
            seq.process(0.0, 0.0, 0.0, 0.0);
        }
        assert_eq!(seq.current_step(), 1);

        // Clock resumes where it left off
        let out = pulse(&mut seq);
        assert_eq!(out.step, 2);
    }

    #[test]
    fn test_reset_edge_reseeds_and_triggers() {
        let mut seq = sequencer::<8>();
        seq.set_length(4);
        for _ in 0..3 {
            pulse(&mut seq);
        }
        assert_eq!(seq.current_step(), 2);

        // Reset with the clock low still fires the seeded step's trigger
        let out = seq.process(0.0, 10.0, 10.0, 0.0);
        assert_eq!(out.step, 0);
        assert!(out.trigger);
        assert!(!out.gate);
        seq.process(0.0, 0.0, 10.0, 0.0);

        // The reset consumed step 0's entry tick
        let out = pulse(&mut seq);
        assert_eq!(out.step, 1);
    }

    #[test]
    fn test_one_shot_quiets_after_pass() {
        let mut seq = sequencer::<8>();
        seq.set_length(2);
        seq.set_one_shot(true);

        assert_eq!(pulse(&mut seq).step, 0);
        assert_eq!(pulse(&mut seq).step, 1);

        let out = pulse(&mut seq);
        assert!(!out.gate);
        assert!(!out.trigger);
        assert!(seq.ended());
        assert_eq!(out.step, 0);

        // A reset pulse revives playback
        seq.process(0.0, 10.0, 10.0, 0.0);
        assert!(!seq.ended());
        seq.process(0.0, 0.0, 10.0, 0.0);
        assert_eq!(pulse(&mut seq).step, 1);
    }

    #[test]
    fn test_cv_holds_between_clocks() {
        let mut seq = sequencer::<8>();
        seq.set_length(2);
        seq.set_step(0, SequencerStep::new(3.5));
        seq.set_step(1, SequencerStep::new(7.0));

        assert_eq!(pulse(&mut seq).cv, 3.5);
        // Clock idle, CV holds
        for _ in 0..5 {
            let out = seq.process(0.0, 0.0, 10.0, 0.0);
            assert_eq!(out.cv, 3.5);
        }
        assert_eq!(pulse(&mut seq).cv, 7.0);
    }
}
