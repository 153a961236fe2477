//! Expander Messages
//!
//! Adjacent host modules exchange extra per-sample state through a small
//! mailbox: the producer fills one buffer while the consumer reads the
//! other, and the host scheduler swaps them between samples. Messages
//! are plain copyable values; nothing is shared or locked. Field order
//! is part of the wire contract with existing expander hardware, so it
//! is preserved here.

use crate::euclid::EuclideanAlgorithm;
use serde::{Deserialize, Serialize};

/// Channels carried by one expander message.
pub const EXPANDER_CHANNELS: usize = 8;

/// Per-channel gate, clock, and trigger states published to a
/// clocked-random-gate expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClockedRandomGateExpanderMessage {
    pub gate_states: [bool; EXPANDER_CHANNELS],
    pub clock_states: [bool; EXPANDER_CHANNELS],
    pub trigger_states: [bool; EXPANDER_CHANNELS],
    pub channel: u8,
}

/// Pattern summary published to a Euclidean expander: how many beats,
/// rests, and total steps the selected channel is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EuclidExpanderMessage {
    pub beat_count: i32,
    pub rest_count: i32,
    pub step_count: i32,
    pub channel: u8,
}

impl EuclidExpanderMessage {
    /// Summarize a generator's current pattern for the given channel.
    pub fn from_pattern(pattern: &EuclideanAlgorithm, channel: u8) -> Self {
        let step_count = pattern.length();
        let beat_count = pattern.hits().min(step_count);
        Self {
            beat_count,
            rest_count: step_count - beat_count,
            step_count,
            channel,
        }
    }
}

/// Expander Mailbox
///
/// Two message buffers with an explicit flip. The producer writes
/// through [`producer_mut`](Self::producer_mut) and calls
/// [`request_flip`](Self::request_flip) when the message is complete;
/// the host scheduler calls [`flip`](Self::flip) once per sample, and
/// only a requested flip swaps the buffers. The consumer always reads a
/// complete message, never one mid-write.
#[derive(Debug, Clone)]
pub struct ExpanderMailbox<M> {
    buffers: [M; 2],
    producer: usize,
    flip_requested: bool,
}

impl<M: Default + Copy> ExpanderMailbox<M> {
    pub fn new() -> Self {
        Self {
            buffers: [M::default(); 2],
            producer: 0,
            flip_requested: false,
        }
    }

    /// The buffer currently being written.
    pub fn producer_mut(&mut self) -> &mut M {
        &mut self.buffers[self.producer]
    }

    /// The last completed message.
    pub fn consumer(&self) -> &M {
        &self.buffers[1 - self.producer]
    }

    /// Mark the producer buffer complete; the next flip will publish it.
    pub fn request_flip(&mut self) {
        self.flip_requested = true;
    }

    /// Swap the buffers if a flip was requested. Returns whether a swap
    /// happened.
    pub fn flip(&mut self) -> bool {
        if self.flip_requested {
            self.producer = 1 - self.producer;
            self.flip_requested = false;
            true
        } else {
            false
        }
    }
}

impl<M: Default + Copy> Default for ExpanderMailbox<M> {
    fn default() -> Self {
        Self::new()
    }
}
