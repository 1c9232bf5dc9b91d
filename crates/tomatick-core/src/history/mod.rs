//! Bounded per-user history of completed focus sessions.

mod record;
mod store;

pub use record::{CreateSessionRequest, NewSession, SessionId, SessionRecord, MAX_DESCRIPTION_CHARS};
pub use store::{HistoryStore, InMemoryHistory, HISTORY_CAPACITY};
