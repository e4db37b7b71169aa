//! Session store engine for chat conversation history
//!
//! This crate owns session identity, in-memory state, and snapshot
//! durability for a chat backend. It is consumed directly as a library;
//! transport and response generation live elsewhere.

pub mod config;
pub mod error;
pub mod logging;
pub mod session;

pub use error::{Error, Result};
pub use session::{Feedback, Message, Role, Session, SessionStore, SessionSummary, TableData};
