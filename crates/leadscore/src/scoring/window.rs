use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{ActivityMetadata, ActivityType, ContactId};
use super::store::RecencyCache;

/// Maximum number of entries retained per contact.
pub const WINDOW_CAPACITY: usize = 100;

/// TTL refreshed on every window write.
pub const WINDOW_TTL: std::time::Duration = std::time::Duration::from_secs(24 * 60 * 60);

/// One processed activity as remembered by the sliding window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowEntry {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub timestamp: DateTime<Utc>,
    pub score_impact: u32,
    #[serde(default)]
    pub metadata: ActivityMetadata,
}

/// Per-contact, most-recent-first bounded history of processed activities,
/// stored as JSON-encoded lists in the recency cache with a derived
/// per-type sub-list for fast type-scoped counts. Every cache failure
/// degrades to an empty window rather than failing the activity.
pub struct RecentActivityWindow<C> {
    cache: Arc<C>,
}

impl<C> RecentActivityWindow<C>
where
    C: RecencyCache,
{
    pub fn new(cache: Arc<C>) -> Self {
        Self { cache }
    }

    fn list_key(contact_id: &ContactId) -> String {
        format!("recent_activities:{}", contact_id.0)
    }

    fn typed_key(contact_id: &ContactId, activity_type: ActivityType) -> String {
        format!(
            "recent_activities:{}:{}",
            contact_id.0,
            activity_type.label()
        )
    }

    /// Count of `activity_type` entries whose timestamp falls within
    /// `window` of `now`. Returns 0 on any storage failure.
    pub async fn count_in_window(
        &self,
        contact_id: &ContactId,
        activity_type: ActivityType,
        window: Duration,
        now: DateTime<Utc>,
    ) -> u32 {
        let key = Self::typed_key(contact_id, activity_type);
        self.read_entries(&key)
            .await
            .iter()
            .filter(|entry| now.signed_duration_since(entry.timestamp) <= window)
            .count() as u32
    }

    /// Prepend the entry, trim to capacity, refresh the TTL, and refresh the
    /// per-type sub-list. Failures are logged and swallowed.
    pub async fn record(&self, contact_id: &ContactId, entry: WindowEntry) {
        let entry_type = entry.activity_type;
        let key = Self::list_key(contact_id);

        let mut entries = self.read_entries(&key).await;
        entries.insert(0, entry);
        entries.truncate(WINDOW_CAPACITY);
        self.write_entries(&key, &entries).await;

        let typed: Vec<WindowEntry> = entries
            .iter()
            .filter(|candidate| candidate.activity_type == entry_type)
            .cloned()
            .collect();
        self.write_entries(&Self::typed_key(contact_id, entry_type), &typed)
            .await;
    }

    async fn read_entries(&self, key: &str) -> Vec<WindowEntry> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(%key, error = %err, "discarding undecodable recent-activity list");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(%key, error = %err, "recent-activity read failed, treating window as empty");
                Vec::new()
            }
        }
    }

    async fn write_entries(&self, key: &str, entries: &[WindowEntry]) {
        let encoded = match serde_json::to_string(entries) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(%key, error = %err, "failed to encode recent-activity list");
                return;
            }
        };

        if let Err(err) = self.cache.set(key, encoded, WINDOW_TTL).await {
            warn!(%key, error = %err, "recent-activity write failed");
        }
    }
}
