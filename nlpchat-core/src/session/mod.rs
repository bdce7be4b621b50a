//! Conversation session handling
//!
//! A session is the ordered turn history for one run of the chatbot.
//! Saved sessions use JSONL so files stay readable and diffable.

pub mod manager;
pub mod store;

pub use manager::SessionManager;
pub use store::{Role, Session, Turn};
