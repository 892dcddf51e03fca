//! Polling checkpoint

use std::fmt;

/// Lower bound (seconds since the Unix epoch) for the next status query
///
/// Owned by the poll loop. It only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Checkpoint(i64);

impl Checkpoint {
    pub fn new(secs: i64) -> Self {
        Self(secs)
    }

    /// Checkpoint at the current wall-clock time
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp())
    }

    pub fn as_secs(self) -> i64 {
        self.0
    }

    /// Moves the checkpoint to `next` unless that would move it backwards
    ///
    /// Returns `false` when `next` is earlier than the current value; the
    /// checkpoint is left untouched in that case.
    pub fn advance(&mut self, next: Checkpoint) -> bool {
        if next < *self {
            return false;
        }
        *self = next;
        true
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
