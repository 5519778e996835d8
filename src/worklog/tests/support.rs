//! Shared builders for worklog unit tests.

use crate::worklog::domain::{CommitEvent, Hours, TaskEntry, TaskName};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

pub(super) fn instant(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn day(year: i32, month: u32, day_of_month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day_of_month).expect("valid date")
}

pub(super) fn entry(name: &str, centi: u32, date: NaiveDate, message: &str) -> TaskEntry {
    let event = CommitEvent::new(TaskName::new(name).expect("valid name"), Hours::from_centi(centi))
        .with_message(message);
    TaskEntry::from_commit(&event, date)
}
