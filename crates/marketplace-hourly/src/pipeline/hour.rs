use chrono::{Duration, NaiveDateTime, Timelike};

/// Truncates a timestamp down to the start of its hour.
pub fn floor_to_hour(timestamp: NaiveDateTime) -> NaiveDateTime {
    let into_hour = Duration::seconds(i64::from(timestamp.minute() * 60 + timestamp.second()))
        + Duration::nanoseconds(i64::from(timestamp.nanosecond()));
    timestamp - into_hour
}
