//! Behavioral lead-scoring engine.
//!
//! Raw visitor and contact interaction events flow through identity
//! resolution, a weighted time-sensitive score calculation backed by a
//! sliding recent-activity window, and an ordered trigger rule book. The
//! contact store and recency cache are injected seams so the engine can run
//! against any backing transport.

pub mod calculator;
pub mod domain;
pub mod engine;
pub mod ingest;
pub mod router;
pub mod store;
pub mod triggers;
pub mod weights;
pub mod window;

#[cfg(test)]
mod tests;

pub use calculator::{ScoreCalculator, WindowCounts};
pub use domain::{
    Activity, ActivityMetadata, ActivityType, Contact, ContactActivityEntry, ContactActivityKind,
    ContactId, LifecycleStage,
};
pub use engine::{
    ActivityResult, ActivityResultView, ContactScoreView, ScoringEngine, ScoringError,
    ScoringOutcome, MAX_LEAD_SCORE,
};
pub use ingest::{ActivityIngestor, IngestError, TRACKING_COOKIE_FIELD};
pub use router::scoring_router;
pub use store::{CacheError, ContactStore, RecencyCache, StoreError};
pub use triggers::{Trigger, TriggerCondition, TriggerEvaluator, TriggeredAction};
pub use weights::{MultiplierKind, ScoringWeights, TypeWeights};
pub use window::{RecentActivityWindow, WindowEntry, WINDOW_CAPACITY, WINDOW_TTL};
