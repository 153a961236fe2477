//! # Gatework: Gate, Clock, and Sequencing Primitives
//!
//! `gatework` is the host-independent logic core of a modular synthesis
//! module collection: Schmitt-trigger gate processing, clock division,
//! Euclidean rhythm generation, multi-tap gate delays, slew limiting,
//! and a family of sequencer engines, all written to sit behind a
//! per-sample host loop.
//!
//! ## Host Contract
//!
//! - Gates follow the 0 V / 10 V convention; comparators go high at
//!   2.0 V and low below 0.1 V, with hysteresis in between.
//! - Every processor is a plain value: construct it, feed it one sample
//!   of input voltages at a time, read plain outputs. No host types,
//!   no I/O, no locking, and no allocation in the per-sample path.
//! - Out-of-range parameters are clamped, never rejected; nothing here
//!   returns an error at audio rate.
//! - The crate is `no_std` by default capability: disable the `std`
//!   feature for embedded targets, keep `alloc` for JSON state
//!   snapshots.
//!
//! ## Quick Start
//!
//! ```rust
//! use gatework::prelude::*;
//!
//! // A five-against-sixteen Euclidean pattern
//! let mut euclid = EuclideanAlgorithm::new();
//! euclid.set(5, 16, 0);
//! assert!(euclid.pattern(0));
//!
//! // Divide the incoming clock by four
//! let mut divider = FrequencyDivider::new();
//! divider.set_n(4);
//!
//! // A four-step pendulum pattern
//! let mut sequencer = PatternSequencer64::new().with_direction(Direction::Pendulum);
//! sequencer.set_length(4);
//! for step in 0..4 {
//!     sequencer.set_step(step, step as f32, true);
//! }
//!
//! // The host drives everything one sample at a time
//! for sample in 0..64 {
//!     let clock = if sample % 8 < 4 { 10.0 } else { 0.0 };
//!     let divided = divider.process(clock);
//!     let out = sequencer.process(clock, 0.0, 10.0, 0.0);
//!     let _ = (divided, out.cv, out.gate);
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod delay;
pub mod divider;
pub mod euclid;
pub mod expander;
pub mod gate;
pub mod pattern_sequencer;
#[cfg(feature = "alloc")]
pub mod persist;
pub mod rng;
pub mod shift_register;
pub mod slew;
pub mod step_sequencer;
pub mod transport;
pub mod voltage;

/// Prelude module for convenient imports
pub mod prelude {
    // Voltage conventions and gate processing
    pub use crate::gate::{GateProcessor, SchmittTrigger};
    pub use crate::voltage::{
        gate_voltage, unipolar_fraction, GATE_HIGH_THRESHOLD, GATE_LOW_THRESHOLD,
        GATE_OUTPUT_VOLTAGE,
    };

    // Clock utilities
    pub use crate::delay::{GateDelayLine, DELAY_SLOTS, DELAY_TICKS, MAX_TAPS};
    pub use crate::divider::{CountMode, FrequencyDivider, LegacyFrequencyDivider};
    pub use crate::slew::LagProcessor;

    // Rhythm generation
    pub use crate::euclid::{EuclideanAlgorithm, MAX_PATTERN_LENGTH};

    // Sequencer engines
    pub use crate::pattern_sequencer::{PatternOutput, PatternSequencer, PatternSequencer64};
    pub use crate::rng::SequenceRng;
    pub use crate::shift_register::{LoopMode, ShiftRegisterLoop};
    pub use crate::step_sequencer::{
        ProbabilityMode, SequencerStep, StepOutput, StepSequencer, StepSequencer16,
        StepSequencer32, StepSequencer8,
    };
    pub use crate::transport::{Direction, SequencerTransport};

    // Expander messaging
    pub use crate::expander::{
        ClockedRandomGateExpanderMessage, EuclidExpanderMessage, ExpanderMailbox,
        EXPANDER_CHANNELS,
    };

    // Session persistence
    #[cfg(feature = "alloc")]
    pub use crate::persist::{
        DelaySnapshot, DividerSnapshot, EuclidSnapshot, JsonSnapshot, PatternSequencerSnapshot,
        ShiftRegisterSnapshot, SnapshotError, StepSequencerSnapshot, TransportSnapshot,
    };
}

// Re-export key types at crate root for convenience
pub use prelude::*;
