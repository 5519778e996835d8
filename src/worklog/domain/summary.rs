//! Report grouping: collapses table rows into per-task summaries.
//!
//! The grouping key is the exact task name string. This differs on purpose
//! from the aggregator's merge key, which may fold case: rows written by
//! different days under `"Fix Bug"` and `"fix bug"` stay separate here.

use super::{Hours, TaskEntry};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Per-task summary of a row set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    task_name: String,
    hours_total: Hours,
    description_lines: Vec<String>,
    status: String,
    branch: String,
    dates_seen: BTreeSet<NaiveDate>,
}

impl TaskSummary {
    fn start(entry: &TaskEntry) -> Self {
        Self {
            task_name: entry.task_name().as_str().to_owned(),
            hours_total: Hours::ZERO,
            description_lines: Vec::new(),
            status: String::new(),
            branch: String::new(),
            dates_seen: BTreeSet::new(),
        }
    }

    fn absorb(&mut self, entry: &TaskEntry) {
        self.hours_total = self.hours_total.saturating_add(entry.hours());
        self.description_lines.extend(
            entry
                .description()
                .iter()
                .filter(|line| !line.trim().is_empty())
                .cloned(),
        );
        entry.status().clone_into(&mut self.status);
        entry.branch().clone_into(&mut self.branch);
        self.dates_seen.insert(entry.date());
    }

    /// Returns the task name.
    #[must_use]
    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    /// Returns the summed hours of all rows for this task.
    #[must_use]
    pub const fn hours_total(&self) -> Hours {
        self.hours_total
    }

    /// Returns every non-blank description line, in row order.
    #[must_use]
    pub fn description_lines(&self) -> &[String] {
        &self.description_lines
    }

    /// Returns the status of the last row seen.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns the branch of the last row seen.
    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Returns the distinct days this task appeared on.
    #[must_use]
    pub const fn dates_seen(&self) -> &BTreeSet<NaiveDate> {
        &self.dates_seen
    }
}

/// Grouped view of a table snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedReport {
    summaries: Vec<TaskSummary>,
    total_hours: Hours,
    first_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
}

impl GroupedReport {
    /// Groups rows by exact task name, preserving first-appearance order.
    #[must_use]
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a TaskEntry>) -> Self {
        let mut report = Self::default();
        let mut index: HashMap<String, usize> = HashMap::new();

        for entry in entries {
            let position = *index
                .entry(entry.task_name().as_str().to_owned())
                .or_insert_with(|| {
                    report.summaries.push(TaskSummary::start(entry));
                    report.summaries.len().saturating_sub(1)
                });
            if let Some(summary) = report.summaries.get_mut(position) {
                summary.absorb(entry);
            }

            report.total_hours = report.total_hours.saturating_add(entry.hours());
            report.first_date = Some(
                report
                    .first_date
                    .map_or(entry.date(), |date| date.min(entry.date())),
            );
            report.last_date = Some(
                report
                    .last_date
                    .map_or(entry.date(), |date| date.max(entry.date())),
            );
        }
        report
    }

    /// Returns the summaries in first-appearance order.
    #[must_use]
    pub fn summaries(&self) -> &[TaskSummary] {
        &self.summaries
    }

    /// Returns the summary for an exact task name.
    #[must_use]
    pub fn get(&self, task_name: &str) -> Option<&TaskSummary> {
        self.summaries
            .iter()
            .find(|summary| summary.task_name == task_name)
    }

    /// Returns the sum of hours over every grouped row.
    #[must_use]
    pub const fn total_hours(&self) -> Hours {
        self.total_hours
    }

    /// Returns the earliest and latest day in the row set.
    #[must_use]
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.first_date.zip(self.last_date)
    }

    /// Returns the number of distinct tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    /// Returns `true` when no rows were grouped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}
