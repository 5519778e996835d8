//! When steps for daily rollover scenarios.

use super::world::{RolloverWorld, run_async};
use rstest_bdd_macros::when;
use worklog::worklog::domain::TableKind;

#[when("the daily cycle runs")]
fn daily_cycle_runs(world: &mut RolloverWorld) -> Result<(), eyre::Report> {
    let result = run_async(world.app()?.reporting.run_daily());
    world.last_cycle = Some(result);
    Ok(())
}

#[when("the archive table recovers")]
fn archive_recovers(world: &mut RolloverWorld) {
    world.store.restore_appends_to(TableKind::Archive);
}
