//! Chat history sidebar: the user's sessions, newest activity first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ChatSession, ChatType};
use crate::store::{ChatStore, StoreError};

const SECONDS_PER_HOUR: i64 = 60 * 60;
const HOURS_PER_DAY: i64 = 24;
const RELATIVE_AGE_LIMIT_HOURS: i64 = 7 * HOURS_PER_DAY;

/// One row of the history sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub session_id: Uuid,
    pub chat_type: ChatType,
    pub label: String,
    pub icon: String,
    pub title: String,
    pub age: String,
    pub updated_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_session(session: &ChatSession, now: DateTime<Utc>) -> Self {
        Self {
            session_id: session.id,
            chat_type: session.chat_type,
            label: session.chat_type.label().to_string(),
            icon: session.chat_type.icon().to_string(),
            title: session.title.clone(),
            age: format_age(session.updated_at, now),
            updated_at: session.updated_at,
        }
    }
}

/// All sessions of `user_id`, most recently updated first.
pub async fn list_history(
    store: &dyn ChatStore,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Vec<HistoryEntry>, StoreError> {
    let sessions = store.list_sessions(user_id).await?;
    Ok(sessions
        .iter()
        .map(|s| HistoryEntry::from_session(s, now))
        .collect())
}

/// `"{h}h ago"` under a day, `"{d}d ago"` under a week, else `M/D/YYYY`.
///
/// Whole hours are floored, so a timestamp slightly ahead of `now` (clock
/// skew) reads `"-1h ago"`.
pub fn format_age(updated_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let hours = (now - updated_at).num_seconds().div_euclid(SECONDS_PER_HOUR);
    if hours < HOURS_PER_DAY {
        format!("{hours}h ago")
    } else if hours < RELATIVE_AGE_LIMIT_HOURS {
        format!("{}d ago", hours / HOURS_PER_DAY)
    } else {
        updated_at.format("%-m/%-d/%Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryChatStore;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_format_age_hours() {
        assert_eq!(format_age(now(), now()), "0h ago");
        assert_eq!(format_age(now() - Duration::minutes(59), now()), "0h ago");
        assert_eq!(format_age(now() - Duration::hours(23), now()), "23h ago");
    }

    #[test]
    fn test_format_age_floors_future_timestamps() {
        assert_eq!(format_age(now() + Duration::seconds(30), now()), "-1h ago");
        assert_eq!(format_age(now() + Duration::minutes(30), now()), "-1h ago");
        assert_eq!(format_age(now() + Duration::minutes(90), now()), "-2h ago");
    }

    #[test]
    fn test_format_age_days() {
        assert_eq!(format_age(now() - Duration::hours(24), now()), "1d ago");
        assert_eq!(format_age(now() - Duration::hours(167), now()), "6d ago");
    }

    #[test]
    fn test_format_age_absolute_date_after_a_week() {
        assert_eq!(format_age(now() - Duration::hours(168), now()), "3/7/2026");
        assert_eq!(
            format_age(Utc.with_ymd_and_hms(2025, 11, 2, 8, 30, 0).unwrap(), now()),
            "11/2/2025"
        );
    }

    #[tokio::test]
    async fn test_list_history_only_current_user_newest_first() {
        let store = MemoryChatStore::new();
        let me = Uuid::new_v4();
        let someone_else = Uuid::new_v4();

        let coder = store.insert_session(me, ChatType::Coder, "borrowck").await.unwrap();
        let tutor = store.insert_session(me, ChatType::Tutor, "verbs").await.unwrap();
        store
            .insert_session(someone_else, ChatType::Artist, "hidden")
            .await
            .unwrap();
        store
            .touch_session(coder.id, "borrowck again", Utc::now() + Duration::minutes(1))
            .await
            .unwrap();

        let entries = list_history(&store, me, Utc::now()).await.unwrap();

        let ids: Vec<Uuid> = entries.iter().map(|e| e.session_id).collect();
        assert_eq!(ids, vec![coder.id, tutor.id]);
        assert_eq!(entries[0].label, "Coder");
        assert_eq!(entries[0].icon, "code");
        assert_eq!(entries[0].title, "borrowck again");
        assert_eq!(entries[1].chat_type, ChatType::Tutor);
    }
}
