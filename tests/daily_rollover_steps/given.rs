//! Given steps for daily rollover scenarios.

use super::world::{RolloverWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use worklog::worklog::{domain::TableKind, services::RecordCommitRequest};

#[given("a worklog with a daily threshold of {hours:f64} hours")]
fn worklog_with_threshold(world: &mut RolloverWorld, hours: f64) -> Result<(), eyre::Report> {
    world.start(hours)
}

#[given(r#"a commit for "{task}" logging {hours:f64} hours with message "{message}""#)]
fn commit_logged(
    world: &mut RolloverWorld,
    task: String,
    hours: f64,
    message: String,
) -> Result<(), eyre::Report> {
    let request = RecordCommitRequest::new(task)
        .with_message(message)
        .with_hours(hours);
    run_async(world.app()?.aggregator.record_commit(request)).wrap_err("record commit")?;
    Ok(())
}

#[given("appends to the archive table fail")]
fn archive_appends_fail(world: &mut RolloverWorld) {
    world.store.fail_appends_to(TableKind::Archive);
}
