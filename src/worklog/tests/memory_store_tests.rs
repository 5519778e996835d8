//! In-memory row store and registry adapter tests.

use super::support::{day, entry, instant};
use crate::worklog::{
    adapters::memory::{InMemoryRowStore, InMemoryTaskRegistry},
    domain::{ENTRY_COLUMNS, RegistryEntry, TableKind, TaskName},
    ports::{RegistryError, RowId, RowStore, RowStoreError, TaskRegistry},
};
use rstest::{fixture, rstest};

#[fixture]
fn store() -> InMemoryRowStore {
    InMemoryRowStore::with_tables([TableKind::Daily])
}

fn name(value: &str) -> TaskName {
    TaskName::new(value).expect("valid task name")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tables_are_created_with_the_entry_header(store: InMemoryRowStore) {
    assert_eq!(store.header(TableKind::Daily), Some(ENTRY_COLUMNS.to_vec()));
    assert_eq!(store.header(TableKind::Weekly), None);

    assert!(store.ensure_table(TableKind::Weekly).await.expect("create"));
    assert!(!store.ensure_table(TableKind::Weekly).await.expect("no-op"));
    assert_eq!(store.header(TableKind::Weekly), Some(ENTRY_COLUMNS.to_vec()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn append_skips_entries_already_present(store: InMemoryRowStore) {
    let first = entry("Auth", 100, day(2026, 3, 2), "a");
    let second = entry("Billing", 100, day(2026, 3, 2), "b");

    let initial = store
        .append_rows(TableKind::Daily, std::slice::from_ref(&first))
        .await
        .expect("append");
    let repeated = store
        .append_rows(TableKind::Daily, &[first, second])
        .await
        .expect("append");

    assert_eq!((initial, repeated), (1, 1));
    let rows = store.read_rows(TableKind::Daily).await.expect("read");
    let names: Vec<&str> = rows.iter().map(|r| r.entry.task_name().as_str()).collect();
    assert_eq!(names, ["Auth", "Billing"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_and_delete_address_rows_by_handle(store: InMemoryRowStore) {
    let original = entry("Auth", 100, day(2026, 3, 2), "a");
    store
        .append_rows(TableKind::Daily, std::slice::from_ref(&original))
        .await
        .expect("append");
    let handle = store
        .read_rows(TableKind::Daily)
        .await
        .expect("read")
        .first()
        .map(|row| row.id)
        .expect("stored row");
    let replacement = entry("Auth", 300, day(2026, 3, 2), "b");

    store
        .update_row(TableKind::Daily, handle, &replacement)
        .await
        .expect("update");
    let stored = store.read_rows(TableKind::Daily).await.expect("read");
    assert_eq!(stored.first().map(|row| &row.entry), Some(&replacement));

    store
        .delete_row(TableKind::Daily, handle)
        .await
        .expect("delete");
    let missing = store.delete_row(TableKind::Daily, handle).await;
    assert!(matches!(missing, Err(RowStoreError::RowNotFound { .. })));
    let unknown = store
        .update_row(TableKind::Daily, RowId::new(99), &replacement)
        .await;
    assert!(matches!(unknown, Err(RowStoreError::RowNotFound { .. })));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn clear_keeps_the_table_and_reports_the_count(store: InMemoryRowStore) {
    let rows = [
        entry("Auth", 100, day(2026, 3, 2), "a"),
        entry("Billing", 100, day(2026, 3, 2), "b"),
    ];
    store
        .append_rows(TableKind::Daily, &rows)
        .await
        .expect("append");

    assert_eq!(store.clear(TableKind::Daily).await.expect("clear"), 2);
    assert!(store.table_exists(TableKind::Daily).await.expect("exists"));
    assert!(store.read_rows(TableKind::Daily).await.expect("read").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn operations_on_missing_tables_fail(store: InMemoryRowStore) {
    let result = store.read_rows(TableKind::Archive).await;
    assert!(matches!(
        result,
        Err(RowStoreError::TableMissing(TableKind::Archive))
    ));
    let cleared = store.clear(TableKind::Archive).await;
    assert!(matches!(
        cleared,
        Err(RowStoreError::TableMissing(TableKind::Archive))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registry_is_provisioned_on_first_use() {
    let registry = InMemoryTaskRegistry::new();
    assert!(!registry.is_provisioned());

    assert!(registry.list().await.expect("list").is_empty());

    assert!(registry.is_provisioned());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registry_rename_keeps_the_timestamp() {
    let registry = InMemoryTaskRegistry::new();
    let stamped = instant(2026, 3, 1, 9, 0);
    registry
        .create(&RegistryEntry::new(name("Auth"), stamped))
        .await
        .expect("create");
    registry
        .create(&RegistryEntry::new(name("Billing"), stamped))
        .await
        .expect("create");

    let clash = registry.rename(&name("Auth"), &name("Billing")).await;
    assert!(matches!(clash, Err(RegistryError::DuplicateTask(_))));
    registry
        .rename(&name("Auth"), &name("Login"))
        .await
        .expect("rename");

    let entries = registry.list().await.expect("list");
    let login = entries
        .iter()
        .find(|e| e.task_name().as_str() == "Login")
        .expect("renamed entry");
    assert_eq!(login.last_used(), stamped);
    assert!(entries.iter().all(|e| e.task_name().as_str() != "Auth"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn touch_inserts_or_refreshes() {
    let registry = InMemoryTaskRegistry::new();
    registry
        .touch(&name("Auth"), instant(2026, 3, 1, 9, 0))
        .await
        .expect("touch");
    registry
        .touch(&name("Auth"), instant(2026, 3, 2, 9, 0))
        .await
        .expect("touch");

    let entries = registry.list().await.expect("list");
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries.first().map(RegistryEntry::last_used),
        Some(instant(2026, 3, 2, 9, 0))
    );
}
