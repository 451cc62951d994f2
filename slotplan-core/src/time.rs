//! Time-of-day arithmetic on naive wall-clock times.
//!
//! All values are minute-precision `NaiveTime`s within a single calendar day.
//! Nothing here rolls over midnight.

use chrono::{NaiveTime, Timelike};

/// Smallest block the allocator will carve out of a free interval (30 minutes).
pub const MIN_BLOCK_HOURS: f64 = 0.5;

/// Tolerance used when comparing accumulated hours.
pub const HOURS_EPSILON: f64 = 0.01;

/// Latest representable time-of-day, 23:59.
const LAST_MINUTE: i64 = 23 * 60 + 59;

/// Half-open `[start, end)` interval within one day.
pub type Interval = (NaiveTime, NaiveTime);

fn minutes_of(t: NaiveTime) -> i64 {
    t.hour() as i64 * 60 + t.minute() as i64
}

/// Build a time-of-day from minutes since midnight.
pub fn from_minutes(total: i64) -> NaiveTime {
    let total = total.clamp(0, LAST_MINUTE);
    NaiveTime::from_hms_opt((total / 60) as u32, (total % 60) as u32, 0).unwrap_or_default()
}

/// `HH:00` for a whole hour.
pub fn at_hour(hour: u32) -> NaiveTime {
    from_minutes(hour as i64 * 60)
}

/// Hours from `a` to `b`. Never negative: returns 0 when `b <= a`.
pub fn duration_hours(a: NaiveTime, b: NaiveTime) -> f64 {
    let minutes = minutes_of(b) - minutes_of(a);
    minutes.max(0) as f64 / 60.0
}

/// Time reached by adding `hours` to `t`, rounded to the minute and capped at 23:59.
pub fn advance(t: NaiveTime, hours: f64) -> NaiveTime {
    // a day is the most that can ever be added; keeps the cast and sum in range
    let minutes = (hours.clamp(-24.0, 24.0) * 60.0).round() as i64;
    from_minutes(minutes_of(t) + minutes)
}

/// Half-open overlap test.
pub fn overlaps(a: Interval, b: Interval) -> bool {
    a.0 < b.1 && b.0 < a.1
}

/// Remove `[remove_start, remove_end)` from every interval in `intervals`.
///
/// Each input produces zero (fully covered), one (clipped or untouched) or two
/// (split around the removed range) outputs. Input order is preserved.
pub fn subtract_interval(
    intervals: &[Interval],
    remove_start: NaiveTime,
    remove_end: NaiveTime,
) -> Vec<Interval> {
    let mut out = Vec::with_capacity(intervals.len() + 1);
    for &(s, e) in intervals {
        if remove_end <= s || remove_start >= e {
            out.push((s, e));
        } else if remove_start <= s && remove_end >= e {
            // fully covered
        } else if remove_start > s && remove_end < e {
            out.push((s, remove_start));
            out.push((remove_end, e));
        } else if remove_start <= s {
            out.push((remove_end, e));
        } else {
            out.push((s, remove_start));
        }
    }
    out
}
