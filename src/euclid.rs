//! Euclidean Rhythms
//!
//! Bjorklund's algorithm distributes a number of hits as evenly as
//! possible across a pattern, which is the construction behind most
//! traditional rhythm necklaces. The pattern lives in a fixed buffer and
//! is rebuilt only when its parameters change, so per-sample reads stay
//! O(1).

#[cfg(feature = "alloc")]
use crate::persist::EuclidSnapshot;

/// Longest supported pattern.
pub const MAX_PATTERN_LENGTH: usize = 96;

/// Euclidean Algorithm
///
/// Computes a maximally even distribution of `hits` active steps among
/// `length` steps and serves rotated reads of the result. Consecutive
/// hits in the generated pattern are never more than one step further
/// apart than any other pair.
///
/// `shift` rotates the read index without touching the buffer, so
/// changing it costs nothing.
#[derive(Debug, Clone)]
pub struct EuclideanAlgorithm {
    buffer: [bool; MAX_PATTERN_LENGTH],
    length: i32,
    hits: i32,
    shift: i32,
}

impl EuclideanAlgorithm {
    pub const fn new() -> Self {
        Self {
            buffer: [false; MAX_PATTERN_LENGTH],
            length: 0,
            hits: 0,
            shift: 0,
        }
    }

    /// Update the pattern parameters. Returns whether anything changed.
    ///
    /// `length` clamps into `[1, 96]` and `hits` into `[0, length]`. The
    /// buffer is rebuilt only when `hits` or `length` differ from the
    /// stored values; a shift-only change just moves the read rotation.
    /// A degenerate request (`hits` or `length` below one) clears the
    /// whole buffer and always reports a change.
    pub fn set(&mut self, hits: i32, length: i32, shift: i32) -> bool {
        if length < 1 || hits < 1 {
            self.buffer = [false; MAX_PATTERN_LENGTH];
            self.hits = hits.max(0);
            self.length = length.clamp(1, MAX_PATTERN_LENGTH as i32);
            self.shift = shift;
            return true;
        }

        let length = length.min(MAX_PATTERN_LENGTH as i32);
        let hits = hits.min(length);

        let changed = hits != self.hits || length != self.length || shift != self.shift;
        let rebuild = hits != self.hits || length != self.length;

        self.hits = hits;
        self.length = length;
        self.shift = shift;

        if rebuild {
            self.rebuild();
        }

        changed
    }

    /// Read the pattern bit at `(index + shift) mod length`. Out-of-range
    /// indices read false.
    pub fn pattern(&self, index: i32) -> bool {
        if self.length < 1 || index < 0 || index >= self.length {
            return false;
        }

        let mut i = (index + self.shift) % self.length;
        if i < 0 {
            i += self.length;
        }
        self.buffer[i as usize]
    }

    pub fn hits(&self) -> i32 {
        self.hits
    }

    pub fn length(&self) -> i32 {
        self.length
    }

    pub fn shift(&self) -> i32 {
        self.shift
    }

    /// Zero the parameters. The buffer contents are left stale until the
    /// next `set`, and reads report false meanwhile.
    pub fn reset(&mut self) {
        self.length = 0;
        self.hits = 0;
        self.shift = 0;
    }

    /// Bjorklund's bisection, in run-length form: group A starts as the
    /// hit runs and group B as the rest runs; each round folds one B run
    /// onto every A run, and whichever side has leftovers becomes the new
    /// remainder. The round trips stop once the remainder is down to one
    /// run, and laying out the groups yields the maximally even pattern.
    fn rebuild(&mut self) {
        let length = self.length as usize;
        let hits = self.hits as usize;

        self.buffer = [false; MAX_PATTERN_LENGTH];

        let mut a_pat = [false; MAX_PATTERN_LENGTH];
        let mut a_len = 1usize;
        let mut a_count = hits;
        a_pat[0] = true;

        let mut b_pat = [false; MAX_PATTERN_LENGTH];
        let mut b_len = 1usize;
        let mut b_count = length - hits;

        while b_count > 1 {
            let old_a = a_pat;
            let old_a_len = a_len;
            let old_a_count = a_count;

            a_pat[old_a_len..old_a_len + b_len].copy_from_slice(&b_pat[..b_len]);
            a_len = old_a_len + b_len;

            if old_a_count > b_count {
                // Leftover A runs become the next remainder
                a_count = b_count;
                b_pat = old_a;
                b_len = old_a_len;
                b_count = old_a_count - b_count;
            } else if b_count > old_a_count {
                b_count -= old_a_count;
            } else {
                b_count = 0;
            }
        }

        let mut pos = 0;
        for _ in 0..a_count {
            self.buffer[pos..pos + a_len].copy_from_slice(&a_pat[..a_len]);
            pos += a_len;
        }
        for _ in 0..b_count {
            self.buffer[pos..pos + b_len].copy_from_slice(&b_pat[..b_len]);
            pos += b_len;
        }
    }
}

impl Default for EuclideanAlgorithm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "alloc")]
impl EuclideanAlgorithm {
    /// Capture the pattern parameters for session persistence. The buffer
    /// itself is derived, so only the parameters are stored.
    pub fn snapshot(&self) -> EuclidSnapshot {
        EuclidSnapshot {
            hits: self.hits,
            length: self.length,
            shift: self.shift,
        }
    }

    /// Restore saved parameters, rebuilding the pattern.
    pub fn restore(&mut self, snap: &EuclidSnapshot) {
        self.set(snap.hits, snap.length, snap.shift);
    }
}
