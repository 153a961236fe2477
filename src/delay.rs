//! Gate Delay
//!
//! Multi-tap digital delay of a gate signal, quantized to a fixed number
//! of ticks spanning the configured delay time. The line stores bit
//! history rather than samples, so thirty-two taps cost one word.

use crate::gate::GateProcessor;

#[cfg(feature = "alloc")]
use crate::persist::DelaySnapshot;

/// Number of bit-history words in the circular buffer.
pub const DELAY_SLOTS: usize = 1024;

/// Number of delay ticks spanning the configured delay time.
pub const DELAY_TICKS: u32 = 8192;

/// Highest readable tap.
pub const MAX_TAPS: i32 = 32;

const DELAY_MIN: f32 = 0.001;
const DELAY_MAX: f32 = 10.0;

/// Gate Delay Line
///
/// Feeds a gate through a Schmitt comparator and records its history one
/// bit per tick, where a tick is `delay / 8192` seconds. Each tick shifts
/// the history word left and ORs in the current gate bit, then stores the
/// word in a circular buffer of snapshots. Tap `k` reads bit `k - 1` of
/// the newest word, so successive taps sit exactly one tick apart.
///
/// The tick length tracks the configured delay rather than the host
/// sample rate, which can introduce up to one sample of jitter at each
/// tick boundary. That approximation is accepted.
#[derive(Debug, Clone)]
pub struct GateDelayLine {
    gate: GateProcessor,
    slots: [u64; DELAY_SLOTS],
    head: usize,
    history: u64,
    time: f32,
    delay: f32,
    sample_time: f32,
}

impl GateDelayLine {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            gate: GateProcessor::new(),
            slots: [0; DELAY_SLOTS],
            head: 0,
            history: 0,
            time: 0.0,
            delay: 1.0,
            sample_time: 1.0 / sample_rate,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_time = 1.0 / sample_rate;
    }

    /// Delay time in seconds, as clamped by the last `process` call.
    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// Feed one sample of the gate and the requested delay time. Returns
    /// the current, undelayed gate state.
    pub fn process(&mut self, gate_value: f32, delay_seconds: f32) -> bool {
        self.gate.set(gate_value);
        self.delay = delay_seconds.clamp(DELAY_MIN, DELAY_MAX);

        let tick = self.delay / DELAY_TICKS as f32;
        let bit = self.gate.high() as u64;

        self.time += self.sample_time;
        while self.time >= tick {
            self.time -= tick;
            self.history = (self.history << 1) | bit;
            self.head = (self.head + 1) % DELAY_SLOTS;
            self.slots[self.head] = self.history;
        }

        self.gate.high()
    }

    /// Read a delayed gate. `tap` is clamped into `[1, 32]`; tap `k`
    /// reports the input roughly `k * delay / 8192` seconds ago.
    pub fn tap_value(&self, tap: i32) -> bool {
        let tap = tap.clamp(1, MAX_TAPS);
        (self.history >> (tap - 1)) & 1 == 1
    }

    /// Clear the recorded history. The configured delay time is kept.
    pub fn reset(&mut self) {
        self.slots = [0; DELAY_SLOTS];
        self.head = 0;
        self.history = 0;
        self.time = 0.0;
        self.gate.reset();
    }
}

impl Default for GateDelayLine {
    fn default() -> Self {
        Self::new(44_100.0)
    }
}

#[cfg(feature = "alloc")]
impl GateDelayLine {
    /// Capture the full line state for session persistence, including
    /// in-flight gates.
    pub fn snapshot(&self) -> DelaySnapshot {
        DelaySnapshot {
            delay: self.delay,
            time: self.time,
            head: self.head,
            slots: self.slots.to_vec(),
            gate: self.gate.high(),
        }
    }

    /// Restore a saved state. Fields are clamped like the live paths.
    pub fn restore(&mut self, snap: &DelaySnapshot) {
        self.delay = snap.delay.clamp(DELAY_MIN, DELAY_MAX);
        self.time = snap.time.max(0.0);
        self.head = snap.head % DELAY_SLOTS;

        self.slots = [0; DELAY_SLOTS];
        for (slot, value) in self.slots.iter_mut().zip(snap.slots.iter()) {
            *slot = *value;
        }

        self.history = self.slots[self.head];
        self.gate.preset(snap.gate);
    }
}
