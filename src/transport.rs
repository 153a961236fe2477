//! Sequencer Transport
//!
//! Every sequencer engine shares the same playback-position problem: walk
//! an index over the first `length` steps of a fixed-capacity table,
//! honoring a play direction, an optional one-shot latch, and direction
//! changes that must wait for the current cycle to finish. This module
//! owns that state machine so the engines only decide what each step
//! produces.
//!
//! Direction changes are staged in a pending slot and applied when the
//! running cycle completes, which keeps a half-finished pendulum swing or
//! random cycle from being cut short. Addressed playback is the
//! exception, since it has no cycles to finish.

use crate::rng::SequenceRng;
use crate::voltage::unipolar_fraction;
use serde::{Deserialize, Serialize};

#[cfg(feature = "alloc")]
use crate::persist::TransportSnapshot;

/// Playback direction for sequencer engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Steps ascend from the first step and wrap.
    Forward,
    /// Steps descend from the last step and wrap.
    Reverse,
    /// Steps ascend then descend, revisiting both end steps.
    Pendulum,
    /// Each advance draws a uniformly random step.
    Random,
    /// The step index follows an address CV instead of the clock.
    Addressed,
}

/// Sequencer Transport
///
/// Tracks the playing step of a sequence and moves it on each clock
/// tick. The capacity is fixed at construction; the active `length` can
/// be any value from one up to that capacity.
///
/// A cycle is one full pass in the active direction: first-to-last for
/// `Forward`, last-to-first for `Reverse`, out-and-back for `Pendulum`,
/// and `length` positions for `Random`. Pending direction changes and
/// the one-shot end condition are both evaluated at cycle boundaries.
#[derive(Debug, Clone, Copy)]
pub struct SequencerTransport {
    capacity: usize,
    length: usize,
    current: usize,
    direction: Direction,
    pending: Direction,
    pendulum_reverse: bool,
    one_shot: bool,
    ended: bool,
    steps_taken: usize,
}

impl SequencerTransport {
    pub const fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 { 1 } else { capacity };
        Self {
            capacity,
            length: capacity,
            current: 0,
            direction: Direction::Forward,
            pending: Direction::Forward,
            pendulum_reverse: false,
            one_shot: false,
            ended: false,
            steps_taken: 1,
        }
    }

    /// Builder: start in the given direction, seeded at its natural
    /// first step.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self.pending = direction;
        self.reset();
        self
    }

    /// Builder: play one cycle and then stop.
    pub fn with_one_shot(mut self, one_shot: bool) -> Self {
        self.one_shot = one_shot;
        self
    }

    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_direction(&self) -> Direction {
        self.pending
    }

    pub fn one_shot(&self) -> bool {
        self.one_shot
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Set the active length, clamped into `[1, capacity]`. The current
    /// step is pulled back in range if the length shrinks past it.
    pub fn set_length(&mut self, length: usize) {
        self.length = length.clamp(1, self.capacity);
        if self.current >= self.length {
            self.current = self.length - 1;
        }
    }

    /// Request a direction change. It takes effect at the next cycle
    /// boundary, except that entering or leaving `Addressed` applies
    /// immediately because addressed playback has no cycle to finish.
    pub fn set_direction(&mut self, direction: Direction) {
        self.pending = direction;
        if direction == Direction::Addressed || self.direction == Direction::Addressed {
            self.direction = direction;
            self.pendulum_reverse = false;
            self.steps_taken = 1;
        }
    }

    /// Enable or disable one-shot playback. Disabling it releases an
    /// ended sequence so the next advance resumes from the start.
    pub fn set_one_shot(&mut self, one_shot: bool) {
        self.one_shot = one_shot;
        if !one_shot {
            self.ended = false;
        }
    }

    /// Move the playhead by one clock tick.
    ///
    /// `address_cv` is consulted only in `Addressed` mode, where 0-10 V
    /// spans the active steps. Returns false once a one-shot sequence has
    /// ended; the playhead parks on the first step until `reset` or the
    /// one-shot latch is released.
    pub fn advance(&mut self, rng: &mut SequenceRng, address_cv: f32) -> bool {
        if self.ended {
            return false;
        }

        match self.direction {
            Direction::Forward => {
                if self.current + 1 >= self.length {
                    if self.finish_cycle() {
                        self.reseed(rng, address_cv);
                    } else {
                        return false;
                    }
                } else {
                    self.current += 1;
                }
            }
            Direction::Reverse => {
                if self.current == 0 {
                    if self.finish_cycle() {
                        self.reseed(rng, address_cv);
                    } else {
                        return false;
                    }
                } else {
                    self.current -= 1;
                }
            }
            Direction::Pendulum => {
                if self.pendulum_reverse {
                    if self.current == 0 {
                        if self.finish_cycle() {
                            self.reseed(rng, address_cv);
                        } else {
                            return false;
                        }
                    } else {
                        self.current -= 1;
                    }
                } else if self.current + 1 >= self.length {
                    // Revisit the top step before walking back down
                    self.pendulum_reverse = true;
                } else {
                    self.current += 1;
                }
            }
            Direction::Random => {
                if self.steps_taken < self.length {
                    self.steps_taken += 1;
                    self.current = rng.next_index(self.length);
                } else if self.finish_cycle() {
                    self.reseed(rng, address_cv);
                } else {
                    return false;
                }
            }
            Direction::Addressed => {
                self.current = self.addressed_index(address_cv);
            }
        }

        true
    }

    /// Return to the start of the sequence, applying any pending
    /// direction change. Reverse playback seeds the last step; every
    /// other direction seeds the first.
    pub fn reset(&mut self) {
        self.direction = self.pending;
        self.pendulum_reverse = false;
        self.ended = false;
        self.steps_taken = 1;
        self.current = if self.direction == Direction::Reverse {
            self.length.saturating_sub(1)
        } else {
            0
        };
    }

    /// Close out a cycle. One-shot playback latches ended and parks the
    /// playhead; otherwise the caller reseeds for the next cycle.
    fn finish_cycle(&mut self) -> bool {
        if self.one_shot {
            self.ended = true;
            self.current = 0;
            false
        } else {
            true
        }
    }

    /// Begin a fresh cycle in the pending direction.
    fn reseed(&mut self, rng: &mut SequenceRng, address_cv: f32) {
        self.direction = self.pending;
        self.pendulum_reverse = false;
        self.steps_taken = 1;
        self.current = match self.direction {
            Direction::Forward | Direction::Pendulum => 0,
            Direction::Reverse => self.length - 1,
            Direction::Random => rng.next_index(self.length),
            Direction::Addressed => self.addressed_index(address_cv),
        };
    }

    fn addressed_index(&self, cv: f32) -> usize {
        let scaled = unipolar_fraction(cv) * self.length as f32;
        (scaled as usize).min(self.length - 1)
    }
}

impl Default for SequencerTransport {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(feature = "alloc")]
impl SequencerTransport {
    /// Capture the playhead state for session persistence. Capacity is
    /// structural and is not stored.
    pub fn snapshot(&self) -> TransportSnapshot {
        TransportSnapshot {
            length: self.length,
            current: self.current,
            direction: self.direction,
            pending: self.pending,
            pendulum_reverse: self.pendulum_reverse,
            one_shot: self.one_shot,
            ended: self.ended,
            steps_taken: self.steps_taken,
        }
    }

    /// Restore a saved playhead. Indices are clamped to this transport's
    /// capacity, so a snapshot from a longer table degrades safely.
    pub fn restore(&mut self, snap: &TransportSnapshot) {
        self.length = snap.length.clamp(1, self.capacity);
        self.current = snap.current.min(self.length - 1);
        self.direction = snap.direction;
        self.pending = snap.pending;
        self.pendulum_reverse = snap.pendulum_reverse;
        self.one_shot = snap.one_shot;
        self.ended = snap.ended;
        self.steps_taken = snap.steps_taken.clamp(1, self.length);
    }
}
