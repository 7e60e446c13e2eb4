use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for contacts owned by the contact store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContactId(pub String);

/// Raw interaction event delivered by tracking pixels, form handlers, and
/// email providers. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<ContactId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_id: Option<String>,
    #[serde(default)]
    pub metadata: ActivityMetadata,
}

/// The interaction kinds the engine knows how to score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    PageView,
    PricingView,
    Download,
    EmailOpen,
    EmailClick,
    FormSubmit,
    VideoWatch,
    DemoRequest,
    WebinarAttend,
    ChatStarted,
    SocialClick,
}

impl ActivityType {
    pub const fn label(self) -> &'static str {
        match self {
            ActivityType::PageView => "page_view",
            ActivityType::PricingView => "pricing_view",
            ActivityType::Download => "download",
            ActivityType::EmailOpen => "email_open",
            ActivityType::EmailClick => "email_click",
            ActivityType::FormSubmit => "form_submit",
            ActivityType::VideoWatch => "video_watch",
            ActivityType::DemoRequest => "demo_request",
            ActivityType::WebinarAttend => "webinar_attend",
            ActivityType::ChatStarted => "chat_started",
            ActivityType::SocialClick => "social_click",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let parsed = match value.trim() {
            "page_view" => ActivityType::PageView,
            "pricing_view" => ActivityType::PricingView,
            "download" => ActivityType::Download,
            "email_open" => ActivityType::EmailOpen,
            "email_click" => ActivityType::EmailClick,
            "form_submit" => ActivityType::FormSubmit,
            "video_watch" => ActivityType::VideoWatch,
            "demo_request" => ActivityType::DemoRequest,
            "webinar_attend" => ActivityType::WebinarAttend,
            "chat_started" => ActivityType::ChatStarted,
            "social_click" => ActivityType::SocialClick,
            _ => return None,
        };
        Some(parsed)
    }
}

/// Optional context captured alongside an interaction event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_duration_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration_seconds: Option<u32>,
}

/// CRM contact record. Owned by the contact store; the engine mutates the
/// score, activity log, and last-activity marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub lifecycle_stage: LifecycleStage,
    /// Bounded interest score. Never leaves [0, 100].
    pub lead_score: u8,
    /// Append-only interaction log; each processed activity adds one entry.
    #[serde(default)]
    pub activities: Vec<ContactActivityEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, String>,
    #[serde(default)]
    pub archived: bool,
}

/// Entry in the contact's coarse activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactActivityEntry {
    pub kind: ContactActivityKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: ActivityMetadata,
}

/// Coarse categories used by the contact store's activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactActivityKind {
    Email,
    Meeting,
    Note,
}

impl ContactActivityKind {
    /// Map a raw activity type onto the store's coarse log categories.
    pub const fn categorize(activity_type: ActivityType) -> Self {
        match activity_type {
            ActivityType::EmailOpen | ActivityType::EmailClick => ContactActivityKind::Email,
            ActivityType::DemoRequest => ContactActivityKind::Meeting,
            _ => ContactActivityKind::Note,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ContactActivityKind::Email => "email",
            ContactActivityKind::Meeting => "meeting",
            ContactActivityKind::Note => "note",
        }
    }
}

/// Funnel position tracked on the contact record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStage {
    Lead,
    MarketingQualified,
    SalesQualified,
    Customer,
}

impl LifecycleStage {
    pub const fn label(self) -> &'static str {
        match self {
            LifecycleStage::Lead => "lead",
            LifecycleStage::MarketingQualified => "marketing_qualified",
            LifecycleStage::SalesQualified => "sales_qualified",
            LifecycleStage::Customer => "customer",
        }
    }
}
