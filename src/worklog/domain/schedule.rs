//! Cycle schedules: `HH:MM` daily and `<weekday> HH:MM` weekly.

use super::{ParseScheduleError, ReportCalendar};
use chrono::{DateTime, Datelike, NaiveTime, TimeDelta, Utc, Weekday};
use std::fmt;
use std::str::FromStr;

/// When a reporting cycle fires, in the reporting calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleSchedule {
    /// Every day at the given local time.
    DailyAt(NaiveTime),
    /// Once a week on the given day at the given local time.
    WeeklyAt(Weekday, NaiveTime),
}

impl CycleSchedule {
    /// Returns the first fire instant strictly after `after`.
    #[must_use]
    pub fn next_after(&self, after: DateTime<Utc>, calendar: &ReportCalendar) -> DateTime<Utc> {
        let today = calendar.date_of(after);
        match *self {
            Self::DailyAt(time) => {
                let candidate = calendar.to_utc(today.and_time(time));
                if candidate > after {
                    candidate
                } else {
                    candidate + TimeDelta::days(1)
                }
            }
            Self::WeeklyAt(weekday, time) => {
                let days_ahead = i64::from(weekday.num_days_from_monday())
                    - i64::from(today.weekday().num_days_from_monday());
                let candidate = calendar.to_utc(today.and_time(time))
                    + TimeDelta::days(days_ahead.rem_euclid(7));
                if candidate > after {
                    candidate
                } else {
                    candidate + TimeDelta::days(7)
                }
            }
        }
    }
}

fn parse_time(value: &str, raw: &str) -> Result<NaiveTime, ParseScheduleError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|err| ParseScheduleError::new(raw, format!("expected HH:MM ({err})")))
}

impl FromStr for CycleSchedule {
    type Err = ParseScheduleError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        match trimmed.split_once(char::is_whitespace) {
            None => parse_time(trimmed, raw).map(Self::DailyAt),
            Some((day, time)) => {
                let weekday = day
                    .parse::<Weekday>()
                    .map_err(|_| ParseScheduleError::new(raw, format!("unknown weekday '{day}'")))?;
                parse_time(time, raw).map(|at| Self::WeeklyAt(weekday, at))
            }
        }
    }
}

impl fmt::Display for CycleSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DailyAt(time) => write!(f, "{}", time.format("%H:%M")),
            Self::WeeklyAt(day, time) => write!(f, "{day} {}", time.format("%H:%M")),
        }
    }
}
