//! In-memory adapters used by tests and the `memory` storage backend.

mod clock;
mod mailer;
mod registry;
mod row_store;

pub use clock::FixedClock;
pub use mailer::RecordingMailer;
pub use registry::InMemoryTaskRegistry;
pub use row_store::InMemoryRowStore;
