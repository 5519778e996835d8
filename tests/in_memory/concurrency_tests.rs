//! Concurrent commits and cycles against one shared store.

use std::sync::Arc;
use std::time::Duration;

use super::helpers::{WORKDAY_CONFIG, Workday, at, workday};
use rstest::rstest;
use worklog::{
    app::Aggregator,
    worklog::{
        domain::{DeliveryOutcome, Hours, TableKind},
        services::RecordCommitRequest,
    },
};

fn spawn_commits(
    aggregator: &Arc<Aggregator>,
    count: usize,
    task: &'static str,
) -> Vec<tokio::task::JoinHandle<()>> {
    (0..count)
        .map(|index| {
            let worker = Arc::clone(aggregator);
            tokio::spawn(async move {
                worker
                    .record_commit(
                        RecordCommitRequest::new(task)
                            .with_message(format!("commit {index}"))
                            .with_hours(0.5),
                    )
                    .await
                    .expect("commit recorded");
            })
        })
        .collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_commits_merge_into_one_row(workday: Workday) {
    let handles = spawn_commits(&workday.app.aggregator, 20, "Auth");
    for handle in handles {
        handle.await.expect("commit task");
    }

    let entries = workday.app.aggregator.list_entries().await.expect("list");

    assert_eq!(entries.len(), 1);
    let row = entries.first().expect("merged row");
    assert_eq!(row.hours(), Hours::from_whole(10));
    assert_eq!(row.description().len(), 20);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn commits_racing_a_cycle_are_never_lost(workday: Workday) {
    workday.clock.set(at(2026, 3, 2, 23, 55));
    let handles = spawn_commits(&workday.app.aggregator, 12, "Auth");
    let reporting = Arc::clone(&workday.app.reporting);
    let cycle = tokio::spawn(async move { reporting.run_daily().await });

    for handle in handles {
        handle.await.expect("commit task");
    }
    cycle.await.expect("cycle task").expect("daily cycle");

    let daily = workday.hours_in(TableKind::Daily).await.expect("daily");
    let weekly = workday.hours_in(TableKind::Weekly).await.expect("weekly");
    let archive = workday.hours_in(TableKind::Archive).await.expect("archive");
    assert_eq!(
        daily.checked_add(weekly),
        Some(Hours::from_whole(6)),
        "every commit is in exactly one of daily or weekly"
    );
    assert_eq!(archive, weekly);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn distinct_tasks_keep_distinct_rows(workday: Workday) {
    let mut handles = spawn_commits(&workday.app.aggregator, 6, "Auth");
    handles.extend(spawn_commits(&workday.app.aggregator, 6, "Billing"));
    for handle in handles {
        handle.await.expect("commit task");
    }

    let entries = workday.app.aggregator.list_entries().await.expect("list");

    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|row| row.hours() == Hours::from_whole(3)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn commits_during_a_slow_delivery_are_not_blocked() {
    let config = WORKDAY_CONFIG.replace("lock_timeout_ms = 2000", "lock_timeout_ms = 200");
    let workday = Workday::start(&config, at(2026, 3, 2, 23, 55)).expect("workday services");
    workday
        .app
        .aggregator
        .record_commit(RecordCommitRequest::new("Auth").with_hours(7.0))
        .await
        .expect("commit recorded");
    workday.mailer.set_latency(Some(Duration::from_millis(600)));

    let reporting = Arc::clone(&workday.app.reporting);
    let cycle = tokio::spawn(async move { reporting.run_daily().await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    let late = workday
        .app
        .aggregator
        .record_commit(RecordCommitRequest::new("Billing").with_hours(1.0))
        .await;
    let report = cycle.await.expect("cycle task").expect("daily cycle");

    assert!(late.is_ok(), "commit during delivery failed: {late:?}");
    assert_eq!(report.outcome, DeliveryOutcome::Sent);
    assert_eq!(workday.rows_in(TableKind::Weekly).await.expect("weekly"), 1);
    assert_eq!(
        workday.hours_in(TableKind::Daily).await.expect("daily"),
        Hours::from_whole(1)
    );
}
