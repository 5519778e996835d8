//! Reporting calendar: maps instants onto reporting days.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};

/// Calendar in which "today" and cycle fire times are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportCalendar {
    offset: FixedOffset,
}

impl ReportCalendar {
    /// Creates a calendar for a fixed UTC offset.
    #[must_use]
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Creates a calendar evaluated in UTC.
    #[must_use]
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Returns the configured offset.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Returns the reporting day containing `instant`.
    #[must_use]
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Returns the local wall-clock time of `instant`.
    #[must_use]
    pub fn local_time_of(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset).naive_local()
    }

    /// Converts a local wall-clock time in this calendar to UTC.
    #[must_use]
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let shifted = local - TimeDelta::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&shifted)
    }
}

impl Default for ReportCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

/// Formats a day as `DD/MM/YYYY`.
#[must_use]
pub fn format_day(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
