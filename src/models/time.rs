use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Half-open time interval `[start, end)` in UTC.
///
/// Invariant: `start < end`. Construction through [`TimeRange::new`] enforces
/// this; a range never has zero or negative length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a new time range. Returns `None` when `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Length of the interval.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Check if an instant lies inside this interval (endpoints included).
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }

    /// Check if this interval overlaps another.
    ///
    /// Half-open semantics: two ranges that only touch at an endpoint
    /// (`a.end == b.start`) do not overlap. Symmetric, and reflexive for any
    /// range (all ranges have positive length by construction).
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Recurring weekly availability slot declared by a provider.
///
/// A slot is a weekday plus a clock interval expressed in minutes from
/// midnight, e.g. Monday 09:00-12:00 is `{ day: Mon, start_min: 540,
/// end_min: 720 }`. Concrete reservation windows are checked against slots
/// with [`WeeklySlot::covers_window`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySlot {
    pub day: Weekday,
    /// Minutes from midnight, inclusive.
    pub start_min: u32,
    /// Minutes from midnight, exclusive.
    pub end_min: u32,
}

/// Minutes from midnight, rounding an end instant up so a sub-minute
/// remainder still counts against the slot boundary.
fn minute_of_day_ceil(t: DateTime<Utc>) -> u32 {
    let minutes = t.hour() * 60 + t.minute();
    if t.second() > 0 || t.nanosecond() > 0 {
        minutes + 1
    } else {
        minutes
    }
}

impl WeeklySlot {
    /// Create a new slot. Returns `None` when the clock interval is empty
    /// or runs past midnight.
    pub fn new(day: Weekday, start_min: u32, end_min: u32) -> Option<Self> {
        if start_min < end_min && end_min <= 24 * 60 {
            Some(Self {
                day,
                start_min,
                end_min,
            })
        } else {
            None
        }
    }

    /// Check whether a concrete window falls entirely within this slot.
    ///
    /// The window must start on the slot's weekday and both endpoints must
    /// lie inside the slot's clock interval on that same day. Windows that
    /// cross midnight never fit a single-day slot.
    pub fn covers_window(&self, window: &TimeRange) -> bool {
        let start = window.start();
        let end = window.end();
        if start.weekday() != self.day || start.date_naive() != end.date_naive() {
            return false;
        }
        let window_start_min = start.hour() * 60 + start.minute();
        let window_end_min = minute_of_day_ceil(end);
        self.start_min <= window_start_min && window_end_min <= self.end_min
    }

    /// Check whether a concrete window overlaps this slot at all (same
    /// weekday and clock intervals intersect). Used by availability
    /// matching, where a partial overlap is enough to surface a provider.
    pub fn overlaps_window(&self, window: &TimeRange) -> bool {
        let start = window.start();
        if start.weekday() != self.day {
            return false;
        }
        let window_start_min = start.hour() * 60 + start.minute();
        let window_end_min = if start.date_naive() == window.end().date_naive() {
            minute_of_day_ceil(window.end())
        } else {
            // Window runs past midnight; clamp to end of day.
            24 * 60
        };
        self.start_min < window_end_min && window_start_min < self.end_min
    }
}
