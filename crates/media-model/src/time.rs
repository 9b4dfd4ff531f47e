//! Rational media time.
//!
//! Times are `value / timescale` seconds. A time with a non-positive
//! timescale is invalid and never compares equal to a valid time.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Timescale used when converting from floating-point seconds.
pub const DEFAULT_TIMESCALE: i32 = 600;

/// A point in media time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MediaTime {
    pub value: i64,
    pub timescale: i32,
}

impl MediaTime {
    pub const ZERO: MediaTime = MediaTime {
        value: 0,
        timescale: 1,
    };

    pub const INVALID: MediaTime = MediaTime {
        value: 0,
        timescale: 0,
    };

    pub const fn new(value: i64, timescale: i32) -> Self {
        Self { value, timescale }
    }

    /// Convert seconds to media time, rounding to the nearest tick.
    /// Non-finite input yields [`MediaTime::INVALID`].
    pub fn from_secs_f64(secs: f64, timescale: i32) -> Self {
        if !secs.is_finite() || timescale <= 0 {
            return Self::INVALID;
        }
        Self {
            value: (secs * timescale as f64).round() as i64,
            timescale,
        }
    }

    pub fn as_secs_f64(&self) -> f64 {
        if !self.is_valid() {
            return f64::NAN;
        }
        self.value as f64 / self.timescale as f64
    }

    pub fn is_valid(&self) -> bool {
        self.timescale > 0
    }

    pub fn is_zero(&self) -> bool {
        self.is_valid() && self.value == 0
    }

    pub fn is_negative(&self) -> bool {
        self.is_valid() && self.value < 0
    }

    /// Exact sum of two times, expressed in the least common multiple of
    /// both timescales. Returns `None` if either side is invalid or the
    /// result does not fit.
    pub fn checked_add(self, other: MediaTime) -> Option<MediaTime> {
        if !self.is_valid() || !other.is_valid() {
            return None;
        }
        if self.timescale == other.timescale {
            return Some(Self::new(
                self.value.checked_add(other.value)?,
                self.timescale,
            ));
        }
        let a = self.timescale as i64;
        let b = other.timescale as i64;
        let timescale = i32::try_from(a / gcd(a, b) * b).ok()?;
        let lhs = self.value.checked_mul(timescale as i64 / a)?;
        let rhs = other.value.checked_mul(timescale as i64 / b)?;
        Some(Self::new(lhs.checked_add(rhs)?, timescale))
    }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl PartialEq for MediaTime {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for MediaTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if !self.is_valid() || !other.is_valid() {
            return None;
        }
        let lhs = self.value as i128 * other.timescale as i128;
        let rhs = other.value as i128 * self.timescale as i128;
        Some(lhs.cmp(&rhs))
    }
}

impl Default for MediaTime {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for MediaTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{:.3}s", self.as_secs_f64())
        } else {
            f.write_str("invalid")
        }
    }
}

/// A half-open range `[start, start + duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: MediaTime,
    pub duration: MediaTime,
}

impl TimeRange {
    pub fn new(start: MediaTime, duration: MediaTime) -> Self {
        Self { start, duration }
    }

    /// Range starting at zero with the given duration.
    pub fn from_zero(duration: MediaTime) -> Self {
        Self::new(MediaTime::ZERO, duration)
    }

    pub fn end(&self) -> Option<MediaTime> {
        self.start.checked_add(self.duration)
    }

    /// Valid times, non-negative start, strictly positive duration.
    pub fn is_well_formed(&self) -> bool {
        self.start.is_valid()
            && self.duration.is_valid()
            && !self.start.is_negative()
            && self.duration > MediaTime::ZERO
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end() {
            Some(end) => write!(f, "[{}, {})", self.start, end),
            None => write!(f, "[{}, +{})", self.start, self.duration),
        }
    }
}
