//! Port contracts for commit aggregation and reporting.
//!
//! Ports define infrastructure-agnostic interfaces used by worklog services.

pub mod mailer;
pub mod registry;
pub mod row_store;

pub use mailer::{Mailer, MailerError, MailerResult, OutgoingMail};
pub use registry::{RegistryError, RegistryResult, TaskRegistry};
pub use row_store::{RowId, RowStore, RowStoreError, RowStoreResult, StoredRow};
