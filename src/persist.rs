//! Session Persistence
//!
//! Snapshot types for every stateful engine, so a host can save a
//! session and restore it without replaying the input history. Each
//! engine pairs `snapshot()` with `restore(&snap)`; the snapshot structs
//! here are plain serde values with a JSON encoding on top. Restoring
//! clamps every field the same way the live setters do, so a snapshot
//! from a different configuration (or a hand-edited file) degrades
//! safely instead of breaking invariants.
//!
//! Fixed-capacity engine buffers are stored as variable-length vectors;
//! restore copies what fits and drops the rest, which keeps snapshots
//! portable across capacities.

#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::divider::CountMode;
use crate::shift_register::LoopMode;
use crate::step_sequencer::SequencerStep;
use crate::transport::Direction;

/// Error raised by snapshot JSON encoding or decoding.
#[derive(Debug)]
pub enum SnapshotError {
    Encode(serde_json::Error),
    Decode(serde_json::Error),
}

impl core::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SnapshotError::Encode(e) => write!(f, "failed to encode snapshot: {}", e),
            SnapshotError::Decode(e) => write!(f, "failed to decode snapshot: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SnapshotError {}

/// JSON encoding for snapshot types.
///
/// Implemented by every snapshot struct in this module; the defaults are
/// the whole implementation.
pub trait JsonSnapshot: Serialize + DeserializeOwned {
    fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(SnapshotError::Encode)
    }

    fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(SnapshotError::Decode)
    }
}

/// Saved state of a [`FrequencyDivider`](crate::divider::FrequencyDivider).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividerSnapshot {
    pub n: i32,
    pub max_n: i32,
    pub count: i32,
    pub count_mode: CountMode,
    pub phase: bool,
    pub gate: bool,
}

impl JsonSnapshot for DividerSnapshot {}

/// Saved parameters of a
/// [`EuclideanAlgorithm`](crate::euclid::EuclideanAlgorithm); the
/// pattern buffer is rebuilt on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EuclidSnapshot {
    pub hits: i32,
    pub length: i32,
    pub shift: i32,
}

impl JsonSnapshot for EuclidSnapshot {}

/// Saved state of a [`GateDelayLine`](crate::delay::GateDelayLine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelaySnapshot {
    pub delay: f32,
    pub time: f32,
    pub head: usize,
    pub slots: Vec<u64>,
    pub gate: bool,
}

impl JsonSnapshot for DelaySnapshot {}

/// Saved playhead of a
/// [`SequencerTransport`](crate::transport::SequencerTransport).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportSnapshot {
    pub length: usize,
    pub current: usize,
    pub direction: Direction,
    pub pending: Direction,
    pub pendulum_reverse: bool,
    pub one_shot: bool,
    pub ended: bool,
    pub steps_taken: usize,
}

impl JsonSnapshot for TransportSnapshot {}

/// Saved state of a
/// [`StepSequencer`](crate::step_sequencer::StepSequencer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSequencerSnapshot {
    pub steps: Vec<SequencerStep>,
    pub transport: TransportSnapshot,
    pub tick_count: i32,
    pub first_tick: bool,
    pub step_allowed: bool,
    pub repeat_allowed: bool,
    pub clock: bool,
    pub reset: bool,
    pub run: bool,
}

impl JsonSnapshot for StepSequencerSnapshot {}

/// Saved state of a
/// [`PatternSequencer`](crate::pattern_sequencer::PatternSequencer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSequencerSnapshot {
    pub cv: Vec<f32>,
    pub gates: Vec<bool>,
    pub transport: TransportSnapshot,
    pub clock: bool,
    pub reset: bool,
    pub run: bool,
}

impl JsonSnapshot for PatternSequencerSnapshot {}

/// Saved state of a
/// [`ShiftRegisterLoop`](crate::shift_register::ShiftRegisterLoop).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftRegisterSnapshot {
    pub values: Vec<f32>,
    pub length: usize,
    pub reverse: bool,
    pub loop_enabled: bool,
    pub mode: LoopMode,
    pub chance: f32,
    pub clock: bool,
}

impl JsonSnapshot for ShiftRegisterSnapshot {}
