//! Report grouping tests.

use super::support::{day, entry};
use crate::worklog::domain::{
    CommitEvent, EntryId, GroupedReport, Hours, PersistedEntryData, TaskEntry, TaskName,
};
use rstest::rstest;

#[rstest]
fn empty_row_set_groups_to_nothing() {
    let report = GroupedReport::from_entries(std::iter::empty());

    assert!(report.is_empty());
    assert_eq!(report.total_hours(), Hours::ZERO);
    assert_eq!(report.date_span(), None);
}

#[rstest]
fn rows_group_by_task_in_first_appearance_order() {
    let rows = [
        entry("Billing", 100, day(2026, 3, 2), "invoice export"),
        entry("Auth", 250, day(2026, 3, 2), "fix login"),
        entry("Billing", 75, day(2026, 3, 3), "tax rounding"),
    ];

    let report = GroupedReport::from_entries(&rows);

    let names: Vec<&str> = report.summaries().iter().map(|s| s.task_name()).collect();
    assert_eq!(names, ["Billing", "Auth"]);
    let billing = report.get("Billing").expect("billing summary");
    assert_eq!(billing.hours_total(), Hours::from_centi(175));
    assert_eq!(billing.description_lines(), ["invoice export", "tax rounding"]);
    assert_eq!(
        billing.dates_seen().iter().copied().collect::<Vec<_>>(),
        [day(2026, 3, 2), day(2026, 3, 3)]
    );
    assert_eq!(report.date_span(), Some((day(2026, 3, 2), day(2026, 3, 3))));
}

#[rstest]
#[case::thirds(&[33, 33, 34])]
#[case::mixed(&[125, 10, 5, 860, 1])]
#[case::single(&[700])]
fn grouped_totals_equal_the_row_total(#[case] centis: &[u32]) {
    let rows: Vec<TaskEntry> = centis
        .iter()
        .zip(["Even", "Odd"].into_iter().cycle())
        .map(|(centi, task)| entry(task, *centi, day(2026, 3, 2), "work"))
        .collect();
    let row_total: u32 = centis.iter().sum();

    let report = GroupedReport::from_entries(&rows);
    let grouped: Hours = report.summaries().iter().map(|s| s.hours_total()).sum();

    assert_eq!(grouped, Hours::from_centi(row_total));
    assert_eq!(report.total_hours(), Hours::from_centi(row_total));
}

#[rstest]
fn grouping_key_is_the_exact_task_name() {
    let rows = [
        entry("Fix Bug", 100, day(2026, 3, 2), "a"),
        entry("fix bug", 100, day(2026, 3, 3), "b"),
    ];

    let report = GroupedReport::from_entries(&rows);

    assert_eq!(report.len(), 2);
    assert!(report.get("FIX BUG").is_none());
}

#[rstest]
fn last_row_sets_status_and_branch() {
    let name = TaskName::new("Auth").expect("valid name");
    let first = TaskEntry::from_commit(
        &CommitEvent::new(name.clone(), Hours::from_centi(100))
            .with_status("In Progress")
            .with_branch("feature/a"),
        day(2026, 3, 2),
    );
    let second = TaskEntry::from_commit(
        &CommitEvent::new(name, Hours::from_centi(100))
            .with_status("Completed")
            .with_branch("feature/b"),
        day(2026, 3, 3),
    );

    let report = GroupedReport::from_entries(&[first, second]);
    let summary = report.get("Auth").expect("auth summary");

    assert_eq!(summary.status(), "Completed");
    assert_eq!(summary.branch(), "feature/b");
}

#[rstest]
fn blank_description_lines_are_dropped() {
    let name = TaskName::new("Auth").expect("valid name");
    let row = TaskEntry::from_persisted(PersistedEntryData {
        id: EntryId::new(),
        date: day(2026, 3, 2),
        task_name: name,
        description: vec!["kept".to_owned(), "  ".to_owned(), String::new()],
        hours: Hours::from_centi(100),
        status: "In Progress".to_owned(),
        branch: String::new(),
        sha: "pending".to_owned(),
    });

    let report = GroupedReport::from_entries(std::slice::from_ref(&row));

    assert_eq!(
        report.get("Auth").expect("summary").description_lines(),
        ["kept"]
    );
}
