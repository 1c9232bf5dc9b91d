//! Property tests for the bounded session history.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use tomatick_core::{HistoryStore, InMemoryHistory, NewSession, UserId};

fn session(offset_min: i64, label: usize) -> NewSession {
    let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap() + Duration::minutes(offset_min);
    NewSession::new(format!("s{label}"), start, 25).unwrap()
}

proptest! {
    #[test]
    fn history_stays_bounded_and_sorted(offsets in prop::collection::vec(0i64..10_000, 0..120)) {
        let store = InMemoryHistory::new();
        let user = UserId::new(1).unwrap();

        for (i, offset) in offsets.iter().enumerate() {
            store.append(user, session(*offset, i)).unwrap();
            let records = store.list(user).unwrap();
            prop_assert!(records.len() <= 50);
            prop_assert_eq!(records.len(), (i + 1).min(50));
            prop_assert!(records
                .windows(2)
                .all(|w| w[0].start_timestamp >= w[1].start_timestamp));
        }
    }

    #[test]
    fn overflow_keeps_the_newest_fifty(offsets in prop::collection::vec(0i64..10_000, 51..100)) {
        let store = InMemoryHistory::new();
        let user = UserId::new(2).unwrap();
        for (i, offset) in offsets.iter().enumerate() {
            store.append(user, session(*offset, i)).unwrap();
        }

        let mut expected = offsets.clone();
        expected.sort_unstable_by(|a, b| b.cmp(a));
        expected.truncate(50);

        let base = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let kept: Vec<i64> = store
            .list(user)
            .unwrap()
            .iter()
            .map(|r| (r.start_timestamp - base).num_minutes())
            .collect();
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn remove_is_idempotent(count in 1usize..20, pick in 0usize..20) {
        let store = InMemoryHistory::new();
        let user = UserId::new(3).unwrap();
        let mut ids = Vec::new();
        for i in 0..count {
            ids.push(store.append(user, session(i as i64, i)).unwrap().session_id);
        }
        let target = ids[pick % count];

        prop_assert!(store.remove(user, target).unwrap());
        prop_assert!(!store.remove(user, target).unwrap());
        prop_assert_eq!(store.list(user).unwrap().len(), count - 1);
    }
}
