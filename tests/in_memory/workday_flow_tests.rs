//! Commits arriving over the webhook flow through daily and weekly cycles.

use super::helpers::{Workday, at, workday};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rstest::rstest;
use serde_json::{Value, json};
use tower::ServiceExt;
use worklog::{
    api::router,
    worklog::{
        domain::{DeliveryOutcome, Hours, TableKind},
        services::RecordCommitRequest,
    },
};

async fn post_event(app: &Router, event: &Value) -> Result<(StatusCode, Value), eyre::Report> {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(event.to_string()))?;
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

async fn commit(workday: &Workday, task: &str, message: &str, hours: f64) {
    workday
        .app
        .aggregator
        .record_commit(
            RecordCommitRequest::new(task)
                .with_message(message)
                .with_hours(hours),
        )
        .await
        .expect("commit recorded");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn webhook_commits_become_one_daily_report(workday: Workday) {
    let app = router(workday.app.api_state());

    let (first_status, first) = post_event(
        &app,
        &json!({"taskName": "Auth", "commitMessage": "fix login", "time": "4"}),
    )
    .await
    .expect("first event");
    let (second_status, second) = post_event(
        &app,
        &json!({"taskName": "auth", "commitMessage": "add tests", "time": 2.5}),
    )
    .await
    .expect("second event");

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first["message"], "Task logged successfully");
    assert_eq!(second["message"], "Task updated (appended to existing entry)");

    workday.clock.set(at(2026, 3, 2, 23, 55));
    let report = workday
        .app
        .reporting
        .run_daily()
        .await
        .expect("daily cycle");

    assert_eq!(report.outcome, DeliveryOutcome::Sent);
    assert_eq!(report.rows, 1);
    let sent = workday.mailer.sent();
    let mail = sent.first().expect("daily mail");
    assert_eq!(mail.subject(), "Atlas | Daily Status Update | 02/03/2026");
    assert_eq!(mail.to(), ["lead@example.com", "qa@example.com"]);
    assert_eq!(mail.cc(), ["pm@example.com"]);
    assert!(mail.html_body().contains("fix login<br>add tests"));
    assert!(mail.html_body().contains("6.5 hrs"));
    assert_eq!(workday.rows_in(TableKind::Daily).await.expect("daily"), 0);
    assert_eq!(workday.rows_in(TableKind::Weekly).await.expect("weekly"), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_week_of_days_reaches_the_weekly_report(workday: Workday) {
    let days = [
        (2, "Auth", "fix login", 7.0),
        (3, "Billing", "invoice export", 2.0),
        (4, "Auth", "token refresh", 6.5),
    ];
    for (day, task, message, hours) in days {
        workday.clock.set(at(2026, 3, day, 10, 0));
        commit(&workday, task, message, hours).await;
        workday.clock.set(at(2026, 3, day, 23, 55));
        workday
            .app
            .reporting
            .run_daily()
            .await
            .expect("daily cycle");
    }

    workday.clock.set(at(2026, 3, 6, 17, 0));
    let weekly = workday
        .app
        .reporting
        .run_weekly()
        .await
        .expect("weekly cycle");

    assert_eq!(weekly.outcome, DeliveryOutcome::Sent);
    assert_eq!(weekly.total_hours, Hours::from_centi(1550));
    let sent = workday.mailer.sent();
    let subjects: Vec<&str> = sent.iter().map(|mail| mail.subject()).collect();
    assert_eq!(
        subjects,
        [
            "Atlas | Daily Status Update | 02/03/2026",
            "Atlas | Daily Status Update | 04/03/2026",
            "Atlas | Weekly Status Update | 02/03/2026 - 04/03/2026",
        ]
    );
    assert_eq!(
        sent.last().map(|mail| mail.cc().to_vec()),
        Some(vec!["director@example.com".to_owned()])
    );
    assert_eq!(
        workday.hours_in(TableKind::Archive).await.expect("archive"),
        Hours::from_centi(1550)
    );
    assert_eq!(workday.rows_in(TableKind::Weekly).await.expect("weekly"), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn weekly_cycle_before_any_rollover_reports_a_missing_table(workday: Workday) {
    let err = workday
        .app
        .reporting
        .run_weekly()
        .await
        .expect_err("weekly table is created by the first daily rollover");

    assert!(!err.is_retryable());
    assert!(workday.mailer.sent().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_listing_reflects_the_current_day(workday: Workday) {
    let app = router(workday.app.api_state());
    commit(&workday, "Auth", "fix login", 1.0).await;
    commit(&workday, "Billing", "", 0.5).await;

    let request = Request::builder()
        .uri("/?action=getTasks")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json");

    assert_eq!(body["success"], true);
    let names: Vec<&str> = body["tasks"]
        .as_array()
        .expect("task array")
        .iter()
        .filter_map(|task| task["taskName"].as_str())
        .collect();
    assert_eq!(names, ["Auth", "Billing"]);
}
