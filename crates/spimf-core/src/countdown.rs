//! Operational-hours countdown.
//!
//! The backend is in maintenance from 01:00 to 06:00 local time and
//! operational otherwise.

use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Timelike};

/// How often a watching display recomputes the countdown.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

const MAINTENANCE_START_HOUR: u32 = 1;
const MAINTENANCE_END_HOUR: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    pub label: String,
    pub is_maintenance: bool,
    /// Time until the window changes, floored to whole minutes
    pub remaining: TimeDelta,
}

/// Countdown for the current local time.
pub fn report_now() -> Countdown {
    report_at(&Local::now())
}

/// Countdown at `now`. Window edges are wall-clock times in `now`'s zone;
/// the remaining time is real elapsed time, so DST shifts are accounted for.
pub fn report_at<Tz: TimeZone>(now: &DateTime<Tz>) -> Countdown {
    let local = now.naive_local();
    let midnight = local.date().and_time(NaiveTime::MIN);
    let hour = local.hour();

    let is_maintenance = (MAINTENANCE_START_HOUR..MAINTENANCE_END_HOUR).contains(&hour);
    let target = if is_maintenance {
        midnight + TimeDelta::hours(i64::from(MAINTENANCE_END_HOUR))
    } else if hour >= MAINTENANCE_END_HOUR {
        midnight + TimeDelta::days(1) + TimeDelta::hours(i64::from(MAINTENANCE_START_HOUR))
    } else {
        midnight + TimeDelta::hours(i64::from(MAINTENANCE_START_HOUR))
    };

    let target = resolve_local(&now.timezone(), target);
    let remaining = TimeDelta::minutes(target.signed_duration_since(now).num_minutes());
    let prefix = if is_maintenance {
        "Maintenance"
    } else {
        "Operational"
    };
    let label = format!(
        "{prefix}: {}h {}m",
        remaining.num_hours(),
        remaining.num_minutes() % 60
    );

    Countdown {
        label,
        is_maintenance,
        remaining,
    }
}

/// Maps a wall-clock time to an instant. A time skipped by a forward DST
/// jump resolves to the hour after it.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(naive + TimeDelta::hours(1)))
                .earliest()
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}
