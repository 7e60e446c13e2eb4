use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::calculator::{ScoreCalculator, WindowCounts};
use super::domain::{
    Activity, ActivityType, Contact, ContactActivityEntry, ContactActivityKind, ContactId,
};
use super::ingest::{ActivityIngestor, IngestError};
use super::store::{ContactStore, RecencyCache, StoreError};
use super::triggers::{TriggerEvaluator, TriggeredAction};
use super::weights::ScoringWeights;
use super::window::{RecentActivityWindow, WindowEntry};

/// Upper bound of the lead-score range.
pub const MAX_LEAD_SCORE: u8 = 100;

/// Failure modes that fail an individual activity's result. Cache outages
/// and unconfigured activity types degrade locally instead.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("no contact resolvable for activity")]
    ContactNotFound,
    #[error("contact persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

impl From<IngestError> for ScoringError {
    fn from(value: IngestError) -> Self {
        match value {
            IngestError::ContactNotFound => Self::ContactNotFound,
            IngestError::Store(err) => Self::Persistence(err),
        }
    }
}

/// Successful scoring of one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringOutcome {
    pub contact_id: ContactId,
    pub score_change: u32,
    pub new_score: u8,
    pub triggered_actions: Vec<TriggeredAction>,
}

/// Per-activity result with the originating activity attached so batch
/// consumers can correlate outcomes.
#[derive(Debug)]
pub struct ActivityResult {
    pub activity: Activity,
    pub outcome: Result<ScoringOutcome, ScoringError>,
}

impl ActivityResult {
    pub fn view(&self) -> ActivityResultView {
        match &self.outcome {
            Ok(outcome) => ActivityResultView {
                success: true,
                activity: self.activity.clone(),
                contact_id: Some(outcome.contact_id.0.clone()),
                score_change: Some(outcome.score_change),
                new_score: Some(outcome.new_score),
                triggered_actions: outcome.triggered_actions.clone(),
                error: None,
            },
            Err(err) => ActivityResultView {
                success: false,
                activity: self.activity.clone(),
                contact_id: None,
                score_change: None,
                new_score: None,
                triggered_actions: Vec::new(),
                error: Some(err.to_string()),
            },
        }
    }
}

/// Wire representation of an activity's scoring result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityResultView {
    pub success: bool,
    pub activity: Activity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_change: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggered_actions: Vec<TriggeredAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Sanitized score snapshot exposed by the read endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactScoreView {
    pub contact_id: String,
    pub lead_score: u8,
    pub lifecycle_stage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_date: Option<DateTime<Utc>>,
    pub activity_count: usize,
}

impl ContactScoreView {
    fn from_contact(contact: &Contact) -> Self {
        Self {
            contact_id: contact.id.0.clone(),
            lead_score: contact.lead_score,
            lifecycle_stage: contact.lifecycle_stage.label().to_string(),
            last_activity_date: contact.last_activity_date,
            activity_count: contact.activities.len(),
        }
    }
}

/// Lazily allocated per-contact mutexes. Holding the lock across the
/// read-modify-write keeps interleaved activities for one contact from
/// losing score updates.
#[derive(Default)]
struct ContactLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ContactLocks {
    async fn acquire(&self, id: &ContactId) -> OwnedMutexGuard<()> {
        let slot = {
            let mut table = self.inner.lock().await;
            table
                .entry(id.0.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        slot.lock_owned().await
    }
}

/// Orchestrator composing ingestion, scoring, the recency window, and the
/// trigger rule book. Constructed once per process with injected
/// collaborators; there is no module-level state.
pub struct ScoringEngine<S, C> {
    store: Arc<S>,
    ingestor: ActivityIngestor<S>,
    calculator: ScoreCalculator,
    window: RecentActivityWindow<C>,
    triggers: TriggerEvaluator,
    locks: ContactLocks,
}

impl<S, C> ScoringEngine<S, C>
where
    S: ContactStore,
    C: RecencyCache,
{
    pub fn new(
        store: Arc<S>,
        cache: Arc<C>,
        weights: ScoringWeights,
        triggers: TriggerEvaluator,
    ) -> Self {
        Self {
            ingestor: ActivityIngestor::new(store.clone()),
            store,
            calculator: ScoreCalculator::new(weights),
            window: RecentActivityWindow::new(cache),
            triggers,
            locks: ContactLocks::default(),
        }
    }

    /// Score one activity end to end. Never panics and never propagates
    /// cache failures; only unresolvable identity and persistence failures
    /// produce a failed result.
    pub async fn process_activity(&self, activity: Activity) -> ActivityResult {
        let outcome = self.score_activity(&activity, Utc::now()).await;
        ActivityResult { activity, outcome }
    }

    /// Sequential, order-preserving batch processing. One failed item never
    /// aborts the remainder.
    pub async fn process_batch(&self, activities: Vec<Activity>) -> Vec<ActivityResult> {
        let mut results = Vec::with_capacity(activities.len());
        for activity in activities {
            results.push(self.process_activity(activity).await);
        }
        results
    }

    /// Score snapshot for the read endpoint.
    pub async fn contact_snapshot(
        &self,
        id: &ContactId,
    ) -> Result<Option<ContactScoreView>, StoreError> {
        let contact = self.store.find_by_id(id).await?;
        Ok(contact.as_ref().map(ContactScoreView::from_contact))
    }

    async fn score_activity(
        &self,
        activity: &Activity,
        now: DateTime<Utc>,
    ) -> Result<ScoringOutcome, ScoringError> {
        let resolved = self.ingestor.resolve(activity).await?;

        let _guard = self.locks.acquire(&resolved.id).await;

        // Re-read under the lock so the read-modify-write starts from the
        // latest persisted score.
        let mut contact = match self.store.find_by_id(&resolved.id).await? {
            Some(current) => current,
            None => resolved,
        };

        let counts = self.window_counts(&contact.id, activity, now).await;
        let delta = self.calculator.delta(activity, &counts, now);

        contact.lead_score =
            (u32::from(contact.lead_score) + delta).min(u32::from(MAX_LEAD_SCORE)) as u8;
        contact.activities.push(ContactActivityEntry {
            kind: ContactActivityKind::categorize(activity.activity_type),
            content: activity.action.clone(),
            created_at: activity.timestamp,
            metadata: activity.metadata.clone(),
        });
        contact.last_activity_date = Some(activity.timestamp);
        self.store.save(&contact).await?;

        self.window
            .record(
                &contact.id,
                WindowEntry {
                    activity_type: activity.activity_type,
                    timestamp: activity.timestamp,
                    score_impact: delta,
                    metadata: activity.metadata.clone(),
                },
            )
            .await;

        let triggered_actions = self.triggers.evaluate(&contact, &self.window, now).await;

        Ok(ScoringOutcome {
            contact_id: contact.id,
            score_change: delta,
            new_score: contact.lead_score,
            triggered_actions,
        })
    }

    /// Frequency and repeat-visit signals, read strictly before the current
    /// activity is recorded into the window.
    async fn window_counts(
        &self,
        contact_id: &ContactId,
        activity: &Activity,
        now: DateTime<Utc>,
    ) -> WindowCounts {
        let same_type_last_hour = self
            .window
            .count_in_window(contact_id, activity.activity_type, Duration::hours(1), now)
            .await;

        let pricing_views_last_day = if activity.activity_type == ActivityType::PricingView {
            self.window
                .count_in_window(contact_id, ActivityType::PricingView, Duration::hours(24), now)
                .await
        } else {
            0
        };

        WindowCounts {
            same_type_last_hour,
            pricing_views_last_day,
        }
    }
}
