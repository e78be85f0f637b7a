/*
 *  timespec.rs
 *
 *  constatus - console status dashboard
 *  (c) 2020-26 Stuart Hunter
 *
 *  Monotonic timestamps and overflow-safe millisecond conversion
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

//! Absolute and relative monotonic timestamps.
//!
//! A [`Timestamp`] is a `(secs, nanos)` pair kept normalized so that
//! `0 <= nanos < 1_000_000_000`. Because of that, the derived ordering
//! (secs first, then nanos) is the chronological one.

use std::io;
use std::time::Duration;

pub const NANOS_PER_SEC: i64 = 1_000_000_000;
pub const NANOS_PER_MILLI: i64 = 1_000_000;
pub const MILLIS_PER_SEC: i64 = 1_000;

/// A point on (or a span of) the monotonic clock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub secs: i64,
    pub nanos: i64,
}

/// Millisecond conversion did not fit in an `i32`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MillisOverflow;

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp { secs: 0, nanos: 0 };
    pub const MAX: Timestamp = Timestamp { secs: i64::MAX, nanos: NANOS_PER_SEC - 1 };

    /// Build a timestamp, folding any out-of-range nanoseconds into seconds
    pub fn new(secs: i64, nanos: i64) -> Self {
        let carry = nanos.div_euclid(NANOS_PER_SEC);
        Self {
            secs: secs.saturating_add(carry),
            nanos: nanos.rem_euclid(NANOS_PER_SEC),
        }
    }

    pub fn from_millis(millis: i64) -> Self {
        Self::new(millis.div_euclid(MILLIS_PER_SEC), millis.rem_euclid(MILLIS_PER_SEC) * NANOS_PER_MILLI)
    }

    pub fn is_negative(&self) -> bool {
        self.secs < 0
    }

    /// `self + other`, carrying one second when the nanoseconds overflow
    pub fn add(&self, other: &Timestamp) -> Timestamp {
        let mut ret = Timestamp {
            secs: self.secs.wrapping_add(other.secs),
            nanos: self.nanos + other.nanos,
        };
        if ret.nanos >= NANOS_PER_SEC {
            ret.secs = ret.secs.wrapping_add(1);
            ret.nanos -= NANOS_PER_SEC;
        }
        ret
    }

    /// `self - other`, borrowing one second when the nanoseconds go negative
    pub fn sub(&self, other: &Timestamp) -> Timestamp {
        let mut ret = Timestamp {
            secs: self.secs.wrapping_sub(other.secs),
            nanos: self.nanos - other.nanos,
        };
        if ret.nanos < 0 {
            ret.secs = ret.secs.wrapping_sub(1);
            ret.nanos += NANOS_PER_SEC;
        }
        ret
    }

    /// Anchor a relative delay at this instant, pinning to [`Timestamp::MAX`]
    /// rather than wrapping around
    pub fn saturating_add_duration(&self, delay: Duration) -> Timestamp {
        let Ok(secs) = i64::try_from(delay.as_secs()) else {
            return Timestamp::MAX;
        };
        let mut nanos = self.nanos + i64::from(delay.subsec_nanos());
        let mut carry = 0;
        if nanos >= NANOS_PER_SEC {
            nanos -= NANOS_PER_SEC;
            carry = 1;
        }
        match self.secs.checked_add(secs).and_then(|s| s.checked_add(carry)) {
            Some(secs) => Timestamp { secs, nanos },
            None => Timestamp::MAX,
        }
    }

    /// Whole milliseconds in this span, truncating sub-millisecond precision.
    ///
    /// Every arithmetic step is overflow checked.
    pub fn to_millis(&self) -> Result<i32, MillisOverflow> {
        let millis = self
            .secs
            .checked_mul(MILLIS_PER_SEC)
            .and_then(|ms| ms.checked_add(self.nanos / NANOS_PER_MILLI))
            .ok_or(MillisOverflow)?;
        i32::try_from(millis).map_err(|_| MillisOverflow)
    }
}

impl From<Duration> for Timestamp {
    fn from(d: Duration) -> Self {
        match i64::try_from(d.as_secs()) {
            Ok(secs) => Timestamp { secs, nanos: i64::from(d.subsec_nanos()) },
            Err(_) => Timestamp::MAX,
        }
    }
}

/// Milliseconds from `now` until `deadline`, as a poll timeout.
///
/// Returns `(millis, overflow)`. A deadline that has already passed yields
/// zero. When the span does not fit in an `i32` the result is `i32::MAX` with
/// the overflow flag set; callers must not treat that value as a deadline.
pub fn millis_until(deadline: Timestamp, now: Timestamp) -> (i32, bool) {
    let delta = deadline.sub(&now);
    if delta.is_negative() {
        return (0, false);
    }
    match delta.to_millis() {
        Ok(millis) => (millis, false),
        Err(MillisOverflow) => (i32::MAX, true),
    }
}

/// Source of monotonic time for the event loop
pub trait Clock {
    fn now(&self) -> io::Result<Timestamp>;
}

/// `CLOCK_MONOTONIC`
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> io::Result<Timestamp> {
        let mut ts = libc::timespec { tv_sec: 0, tv_nsec: 0 };
        // SAFETY: `ts` is a valid, writable timespec for the duration of the call
        let rc = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Timestamp::new(ts.tv_sec as i64, ts.tv_nsec as i64))
    }
}
