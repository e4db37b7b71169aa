//! Chat-session storage
//!
//! Sessions hold ordered conversation history and are persisted as one
//! JSON snapshot of the whole store after every mutation.

pub mod snapshot;
pub mod store;
pub mod types;

pub use snapshot::SnapshotFile;
pub use store::SessionStore;
pub use types::{Feedback, Message, Role, Session, SessionSummary, TableData};
