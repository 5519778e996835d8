//! Rollover manager tests.

use std::sync::Arc;

use super::support::{day, entry};
use crate::worklog::{
    adapters::memory::InMemoryRowStore,
    domain::{ReportCycle, TableKind, TaskEntry},
    ports::{RowStore, RowStoreError},
    services::{DestinationCopy, RolloverError, RolloverManager},
};
use rstest::{fixture, rstest};

fn snapshot() -> Vec<TaskEntry> {
    vec![
        entry("Auth", 350, day(2026, 3, 2), "fix login"),
        entry("Billing", 125, day(2026, 3, 2), "invoice export"),
    ]
}

#[fixture]
fn seeded_store() -> Arc<InMemoryRowStore> {
    Arc::new(InMemoryRowStore::with_tables([TableKind::Daily]))
}

async fn seed(store: &InMemoryRowStore, table: TableKind, rows: &[TaskEntry]) {
    store.ensure_table(table).await.expect("table exists");
    store.append_rows(table, rows).await.expect("seed rows");
}

async fn ids(store: &InMemoryRowStore, table: TableKind) -> Vec<String> {
    store
        .read_rows(table)
        .await
        .expect("readable table")
        .iter()
        .map(|row| row.entry.id().to_string())
        .collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn daily_rows_copy_to_weekly_and_archive_then_clear(seeded_store: Arc<InMemoryRowStore>) {
    let rows = snapshot();
    seed(&seeded_store, TableKind::Daily, &rows).await;
    let manager = RolloverManager::new(Arc::clone(&seeded_store));

    let summary = manager
        .roll_over(&ReportCycle::Daily.rollover_plan(), &rows)
        .await
        .expect("rollover succeeds");

    assert_eq!(summary.source, TableKind::Daily);
    assert_eq!(summary.cleared, 2);
    assert_eq!(
        summary.copies,
        [
            DestinationCopy {
                table: TableKind::Weekly,
                created: true,
                appended: 2,
            },
            DestinationCopy {
                table: TableKind::Archive,
                created: true,
                appended: 2,
            },
        ]
    );
    let expected: Vec<String> = rows.iter().map(|row| row.id().to_string()).collect();
    assert_eq!(ids(&seeded_store, TableKind::Weekly).await, expected);
    assert_eq!(ids(&seeded_store, TableKind::Archive).await, expected);
    assert!(ids(&seeded_store, TableKind::Daily).await.is_empty());
    assert!(seeded_store.header(TableKind::Daily).is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_append_leaves_the_source_intact(seeded_store: Arc<InMemoryRowStore>) {
    let rows = snapshot();
    seed(&seeded_store, TableKind::Daily, &rows).await;
    seeded_store.fail_appends_to(TableKind::Archive);
    let manager = RolloverManager::new(Arc::clone(&seeded_store));

    let result = manager
        .roll_over(&ReportCycle::Daily.rollover_plan(), &rows)
        .await;

    assert!(matches!(
        result,
        Err(RolloverError::PartialRollover {
            source_table: TableKind::Daily,
            destination: TableKind::Archive,
            source: RowStoreError::Unavailable(_),
        })
    ));
    assert_eq!(ids(&seeded_store, TableKind::Daily).await.len(), 2);
    assert_eq!(ids(&seeded_store, TableKind::Weekly).await.len(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn retry_after_partial_failure_does_not_duplicate(seeded_store: Arc<InMemoryRowStore>) {
    let rows = snapshot();
    seed(&seeded_store, TableKind::Daily, &rows).await;
    let plan = ReportCycle::Daily.rollover_plan();
    let manager = RolloverManager::new(Arc::clone(&seeded_store));
    seeded_store.fail_appends_to(TableKind::Archive);
    manager
        .roll_over(&plan, &rows)
        .await
        .expect_err("archive append fails");

    seeded_store.restore_appends_to(TableKind::Archive);
    let summary = manager.roll_over(&plan, &rows).await.expect("retry succeeds");

    let weekly = summary
        .copies
        .iter()
        .find(|copy| copy.table == TableKind::Weekly)
        .expect("weekly copy");
    assert_eq!(weekly.appended, 0);
    assert!(!weekly.created);
    assert_eq!(ids(&seeded_store, TableKind::Weekly).await.len(), 2);
    assert_eq!(ids(&seeded_store, TableKind::Archive).await.len(), 2);
    assert!(ids(&seeded_store, TableKind::Daily).await.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn weekly_rollover_skips_rows_already_archived() {
    let store = Arc::new(InMemoryRowStore::with_tables(TableKind::ALL));
    let rows = snapshot();
    seed(&store, TableKind::Weekly, &rows).await;
    seed(&store, TableKind::Archive, &rows).await;
    let manager = RolloverManager::new(Arc::clone(&store));

    let summary = manager
        .roll_over(&ReportCycle::Weekly.rollover_plan(), &rows)
        .await
        .expect("rollover succeeds");

    assert_eq!(
        summary.copies,
        [DestinationCopy {
            table: TableKind::Archive,
            created: false,
            appended: 0,
        }]
    );
    assert_eq!(summary.cleared, 2);
    assert_eq!(ids(&store, TableKind::Archive).await.len(), 2);
    assert!(ids(&store, TableKind::Weekly).await.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_source_table_fails_the_clear() {
    let store = Arc::new(InMemoryRowStore::new());
    let rows = snapshot();
    let manager = RolloverManager::new(Arc::clone(&store));

    let result = manager
        .roll_over(&ReportCycle::Weekly.rollover_plan(), &rows)
        .await;

    assert!(matches!(
        result,
        Err(RolloverError::ClearFailed {
            source_table: TableKind::Weekly,
            source: RowStoreError::TableMissing(TableKind::Weekly),
        })
    ));
    assert_eq!(ids(&store, TableKind::Archive).await.len(), 2);
}

#[rstest]
fn rollover_errors_report_retryability() {
    let transient = RolloverError::PartialRollover {
        source_table: TableKind::Daily,
        destination: TableKind::Weekly,
        source: RowStoreError::unavailable(std::io::Error::other("down")),
    };
    let permanent = RolloverError::ClearFailed {
        source_table: TableKind::Daily,
        source: RowStoreError::TableMissing(TableKind::Daily),
    };

    assert!(transient.is_retryable());
    assert!(!permanent.is_retryable());
}
