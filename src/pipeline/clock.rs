//! Wall-clock timestamps that never step backwards.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Latest timestamp handed out, in microseconds since the epoch.
static LAST_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Current UTC time, clamped so it is never earlier than a previous result.
///
/// If the system clock is stepped back, callers keep seeing the last issued
/// instant until real time catches up.
pub fn now() -> DateTime<Utc> {
    clamped(&LAST_MICROS, Utc::now().timestamp_micros())
}

/// Advance `last` to at least `wall` and return the later of the two.
fn clamped(last: &AtomicI64, wall: i64) -> DateTime<Utc> {
    let previous = last.fetch_max(wall, Ordering::AcqRel);
    let micros = wall.max(previous);
    Utc.timestamp_micros(micros).single().unwrap_or_else(Utc::now)
}
