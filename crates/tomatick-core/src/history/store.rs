use tracing::debug;

use super::record::{CreateSessionRequest, NewSession, SessionId, SessionRecord};
use crate::error::Result;
use crate::keyed::KeyedMutex;
use crate::user::UserId;

/// Maximum number of records kept per user.
pub const HISTORY_CAPACITY: usize = 50;

/// Bounded, newest-first session history.
pub trait HistoryStore: Send + Sync {
    /// Records for `user`, descending by start timestamp. Unknown users have
    /// an empty history.
    fn list(&self, user: UserId) -> Result<Vec<SessionRecord>>;

    /// Insert a record, evicting the oldest one if capacity is exceeded.
    /// The created record is returned even when it is the one evicted.
    fn append(&self, user: UserId, session: NewSession) -> Result<SessionRecord>;

    /// Returns `false` when no record with `id` exists.
    fn remove(&self, user: UserId, id: SessionId) -> Result<bool>;

    /// Validate an external request and append it.
    fn create(&self, user: UserId, request: CreateSessionRequest) -> Result<SessionRecord> {
        let session = NewSession::try_from(request)?;
        self.append(user, session)
    }
}

/// Process-local history, one critical section per user.
pub struct InMemoryHistory {
    histories: KeyedMutex<UserId, Vec<SessionRecord>>,
    capacity: usize,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            histories: KeyedMutex::new(),
            capacity,
        }
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for InMemoryHistory {
    fn list(&self, user: UserId) -> Result<Vec<SessionRecord>> {
        Ok(self
            .histories
            .with_existing(user, |records| records.clone())
            .unwrap_or_default())
    }

    fn append(&self, user: UserId, session: NewSession) -> Result<SessionRecord> {
        let record = session.into_record(user);
        let capacity = self.capacity;

        self.histories.with(user, |records| {
            // Newest insert goes first so the stable sort keeps it ahead of
            // older inserts that share its timestamp.
            records.insert(0, record.clone());
            records.sort_by(|a, b| b.start_timestamp.cmp(&a.start_timestamp));

            while records.len() > capacity {
                if let Some(evicted) = records.pop() {
                    debug!(%user, session_id = %evicted.session_id, "evicted oldest session");
                }
            }
        });

        debug!(%user, session_id = %record.session_id, "session appended");
        Ok(record)
    }

    fn remove(&self, user: UserId, id: SessionId) -> Result<bool> {
        let removed = self
            .histories
            .with_existing(user, |records| {
                let before = records.len();
                records.retain(|record| record.session_id != id);
                records.len() != before
            })
            .unwrap_or(false);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn user(raw: u64) -> UserId {
        UserId::new(raw).unwrap()
    }

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn session(label: &str, minute: i64) -> NewSession {
        NewSession::new(label, at(minute), 25).unwrap()
    }

    #[test]
    fn unknown_user_has_empty_history() {
        let store = InMemoryHistory::new();
        assert!(store.list(user(1)).unwrap().is_empty());
    }

    #[test]
    fn list_is_newest_first_regardless_of_insert_order() {
        let store = InMemoryHistory::new();
        store.append(user(1), session("b", 20)).unwrap();
        store.append(user(1), session("a", 10)).unwrap();
        store.append(user(1), session("c", 30)).unwrap();

        let labels: Vec<_> = store
            .list(user(1))
            .unwrap()
            .into_iter()
            .map(|r| r.description)
            .collect();
        assert_eq!(labels, ["c", "b", "a"]);
    }

    #[test]
    fn equal_timestamps_put_latest_insert_first() {
        let store = InMemoryHistory::new();
        store.append(user(1), session("first", 5)).unwrap();
        store.append(user(1), session("second", 5)).unwrap();

        let records = store.list(user(1)).unwrap();
        assert_eq!(records[0].description, "second");
        assert_eq!(records[1].description, "first");
    }

    #[test]
    fn fifty_first_insert_evicts_the_oldest() {
        let store = InMemoryHistory::new();
        for minute in 1..=50 {
            store.append(user(1), session("s", minute)).unwrap();
        }
        let oldest_id = store.list(user(1)).unwrap().last().unwrap().session_id;

        store.append(user(1), session("new", 100)).unwrap();

        let records = store.list(user(1)).unwrap();
        assert_eq!(records.len(), HISTORY_CAPACITY);
        assert!(records.iter().all(|r| r.session_id != oldest_id));
        assert_eq!(records[0].description, "new");
        assert_eq!(records.last().unwrap().start_timestamp, at(2));
    }

    #[test]
    fn record_older_than_full_history_is_returned_then_evicted() {
        let store = InMemoryHistory::with_capacity(3);
        for minute in [10, 20, 30] {
            store.append(user(1), session("s", minute)).unwrap();
        }

        let ancient = store.append(user(1), session("ancient", 0)).unwrap();
        assert_eq!(ancient.description, "ancient");

        let records = store.list(user(1)).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.session_id != ancient.session_id));
    }

    #[test]
    fn remove_reports_whether_anything_was_deleted() {
        let store = InMemoryHistory::new();
        let record = store.append(user(1), session("x", 1)).unwrap();

        assert!(!store.remove(user(1), Uuid::new_v4()).unwrap());
        assert_eq!(store.list(user(1)).unwrap().len(), 1);

        assert!(store.remove(user(1), record.session_id).unwrap());
        assert!(!store.remove(user(1), record.session_id).unwrap());
        assert!(store.list(user(1)).unwrap().is_empty());
    }

    #[test]
    fn remove_for_unknown_user_is_false() {
        let store = InMemoryHistory::new();
        assert!(!store.remove(user(3), Uuid::new_v4()).unwrap());
    }

    #[test]
    fn create_validates_before_touching_history() {
        let store = InMemoryHistory::new();
        let bad = CreateSessionRequest {
            description: None,
            start_timestamp: "2025-01-01T08:00:00Z".into(),
            duration_minutes: 0,
        };
        assert!(store.create(user(1), bad).is_err());
        assert!(store.list(user(1)).unwrap().is_empty());

        let good = CreateSessionRequest {
            description: Some("review".into()),
            start_timestamp: "2025-01-01T08:00:00Z".into(),
            duration_minutes: 25,
        };
        let record = store.create(user(1), good).unwrap();
        assert_eq!(record.start_timestamp, at(0));
        assert_eq!(store.list(user(1)).unwrap().len(), 1);
    }

    #[test]
    fn users_do_not_share_history() {
        let store = InMemoryHistory::new();
        let record = store.append(user(1), session("mine", 1)).unwrap();
        assert!(store.list(user(2)).unwrap().is_empty());
        assert!(!store.remove(user(2), record.session_id).unwrap());
    }

    #[test]
    fn concurrent_appends_keep_the_newest_fifty_in_order() {
        let store = InMemoryHistory::new();

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let store = &store;
                scope.spawn(move || {
                    for i in 0..20 {
                        let minute = worker * 20 + i;
                        store
                            .append(user(1), session(&format!("w{worker}-{i}"), minute))
                            .unwrap();
                    }
                });
            }
        });

        let records = store.list(user(1)).unwrap();
        assert_eq!(records.len(), HISTORY_CAPACITY);
        assert!(records
            .windows(2)
            .all(|pair| pair[0].start_timestamp > pair[1].start_timestamp));
        assert_eq!(records[0].start_timestamp, at(159));
        assert_eq!(records[HISTORY_CAPACITY - 1].start_timestamp, at(110));
    }
}
