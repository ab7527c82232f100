use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::fmt;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A fixed, midnight-anchored slice of a calendar day.
///
/// Two timestamps share a bucket iff they fall on the same local date and
/// `minutes_since_midnight / window_minutes` agrees. Ordering follows time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowBucketId {
    pub date: NaiveDate,
    pub index: u32,
}

impl fmt::Display for WindowBucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.date, self.index)
    }
}

/// Minutes elapsed since local midnight. Seconds are ignored.
pub fn minutes_since_midnight(ts: &NaiveDateTime) -> u32 {
    ts.hour() * 60 + ts.minute()
}

/// Bucket for `ts` under a window of `window_minutes`, or `None` when the
/// window is zero (no limiting applies).
pub fn compute_bucket(ts: &NaiveDateTime, window_minutes: u32) -> Option<WindowBucketId> {
    if window_minutes == 0 {
        return None;
    }
    Some(WindowBucketId {
        date: ts.date(),
        index: minutes_since_midnight(ts) / window_minutes,
    })
}
