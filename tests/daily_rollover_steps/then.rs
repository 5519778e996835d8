//! Then steps for daily rollover scenarios.

use super::world::{RolloverWorld, run_async};
use rstest_bdd_macros::then;
use worklog::worklog::{
    domain::{DeliveryOutcome, Hours, TableKind},
    ports::RowStore,
    services::{CycleReport, ReportingError, RolloverError},
};

fn last_cycle(world: &RolloverWorld) -> Result<&Result<CycleReport, ReportingError>, eyre::Report> {
    world
        .last_cycle
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing cycle result in scenario world"))
}

fn table_hours(world: &RolloverWorld, table: &str) -> Result<(usize, Hours), eyre::Report> {
    let kind = TableKind::try_from(table)?;
    let rows = run_async(world.store.read_rows(kind))?;
    let hours = rows.iter().map(|row| row.entry.hours()).sum();
    Ok((rows.len(), hours))
}

#[then(r#"one report is sent with subject "{subject}""#)]
fn one_report_sent(world: &RolloverWorld, subject: String) -> Result<(), eyre::Report> {
    let sent = world.mailer.sent();
    eyre::ensure!(sent.len() == 1, "expected one report, found {}", sent.len());
    let mail = sent
        .first()
        .ok_or_else(|| eyre::eyre!("expected a sent report"))?;
    eyre::ensure!(
        mail.subject() == subject,
        "unexpected subject: {}",
        mail.subject()
    );
    Ok(())
}

#[then("no report is sent")]
fn no_report_sent(world: &RolloverWorld) -> Result<(), eyre::Report> {
    let sent = world.mailer.sent();
    eyre::ensure!(sent.is_empty(), "expected no report, found {}", sent.len());
    Ok(())
}

#[then("the {table} table holds 1 row totalling {hours:f64} hours")]
fn table_holds_one_row(
    world: &RolloverWorld,
    table: String,
    hours: f64,
) -> Result<(), eyre::Report> {
    let (rows, total) = table_hours(world, &table)?;
    eyre::ensure!(rows == 1, "expected one {table} row, found {rows}");
    eyre::ensure!(
        total == Hours::from_f64(hours)?,
        "expected {hours} hours in {table}, found {total}"
    );
    Ok(())
}

#[then("the {table} table holds {count:usize} rows")]
fn table_holds_rows(
    world: &RolloverWorld,
    table: String,
    count: usize,
) -> Result<(), eyre::Report> {
    let (rows, _) = table_hours(world, &table)?;
    eyre::ensure!(rows == count, "expected {count} {table} rows, found {rows}");
    Ok(())
}

#[then("the cycle fails with a partial rollover into the {table} table")]
fn cycle_fails_with_partial_rollover(
    world: &RolloverWorld,
    table: String,
) -> Result<(), eyre::Report> {
    let expected = TableKind::try_from(table.as_str())?;
    match last_cycle(world)? {
        Err(ReportingError::Rollover {
            source: RolloverError::PartialRollover { destination, .. },
            ..
        }) if *destination == expected => Ok(()),
        other => Err(eyre::eyre!("expected a partial rollover, found {other:?}")),
    }
}

#[then("the cycle has nothing to report")]
fn cycle_has_nothing_to_report(world: &RolloverWorld) -> Result<(), eyre::Report> {
    let report = last_cycle(world)?
        .as_ref()
        .map_err(|err| eyre::eyre!("unexpected cycle failure: {err}"))?;
    eyre::ensure!(
        report.outcome == DeliveryOutcome::NothingToReport,
        "unexpected outcome: {:?}",
        report.outcome
    );
    eyre::ensure!(report.rollover.is_none(), "empty day must not roll over");
    Ok(())
}
