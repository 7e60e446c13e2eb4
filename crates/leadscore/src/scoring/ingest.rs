use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use super::domain::{Activity, ActivityType, Contact, ContactId, LifecycleStage};
use super::store::{ContactStore, StoreError};

/// Custom-field key correlating anonymous tracking cookies with contacts.
pub const TRACKING_COOKIE_FIELD: &str = "tracking_cookie_id";

/// Activity types that signal enough purchase intent to justify creating a
/// contact record from nothing but an email address.
const HIGH_INTENT_TYPES: [ActivityType; 4] = [
    ActivityType::DemoRequest,
    ActivityType::FormSubmit,
    ActivityType::Download,
    ActivityType::PricingView,
];

/// Error raised when an activity cannot be attached to a contact.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("no contact resolvable for activity")]
    ContactNotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves each incoming activity to exactly one contact, synthesizing a
/// lead for high-intent anonymous visitors that supplied an email.
pub struct ActivityIngestor<S> {
    store: Arc<S>,
}

impl<S> ActivityIngestor<S>
where
    S: ContactStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Resolution order: explicit id, then email, then tracking cookie;
    /// first match wins. An unmatched high-intent activity with an email
    /// creates and persists a new lead before returning it.
    pub async fn resolve(&self, activity: &Activity) -> Result<Contact, IngestError> {
        if let Some(id) = &activity.contact_id {
            if let Some(contact) = self.store.find_by_id(id).await? {
                return Ok(contact);
            }
        }

        if let Some(email) = &activity.email {
            if let Some(contact) = self.store.find_by_email(&email.to_lowercase()).await? {
                return Ok(contact);
            }
        }

        if let Some(cookie) = &activity.cookie_id {
            if let Some(contact) = self
                .store
                .find_by_custom_field(TRACKING_COOKIE_FIELD, cookie)
                .await?
            {
                return Ok(contact);
            }
        }

        match &activity.email {
            Some(email) if HIGH_INTENT_TYPES.contains(&activity.activity_type) => {
                Ok(self.create_lead(email, activity).await?)
            }
            _ => Err(IngestError::ContactNotFound),
        }
    }

    async fn create_lead(&self, email: &str, activity: &Activity) -> Result<Contact, StoreError> {
        let email = email.to_lowercase();
        let (first_name, last_name, company) = derive_identity(&email);

        let mut custom_fields = BTreeMap::new();
        if let Some(cookie) = &activity.cookie_id {
            custom_fields.insert(TRACKING_COOKIE_FIELD.to_string(), cookie.clone());
        }
        custom_fields.insert(
            "source_activity".to_string(),
            activity.activity_type.label().to_string(),
        );
        if let Some(page) = &activity.metadata.page {
            custom_fields.insert("source_page".to_string(), page.clone());
        }

        let contact = Contact {
            id: ContactId(lead_id_for(&email)),
            first_name,
            last_name,
            email: Some(email.clone()),
            company,
            lifecycle_stage: LifecycleStage::Lead,
            lead_score: 0,
            activities: Vec::new(),
            last_activity_date: None,
            custom_fields,
            archived: false,
        };

        let created = self.store.create(contact).await?;
        info!(
            contact = %created.id.0,
            activity_type = activity.activity_type.label(),
            "created lead from high-intent activity"
        );
        Ok(created)
    }
}

/// Heuristic name/company derivation: local-part tokens split on `.` become
/// first/last name, the domain's first label becomes the company.
fn derive_identity(email: &str) -> (String, String, Option<String>) {
    let (local, domain) = email.split_once('@').unwrap_or((email, ""));

    let mut tokens = local.split('.').filter(|token| !token.is_empty());
    let first_name = tokens.next().map(capitalize).unwrap_or_default();
    let last_name = tokens.next().map(capitalize).unwrap_or_default();

    let company = domain
        .split('.')
        .find(|label| !label.is_empty())
        .map(capitalize);

    (first_name, last_name, company)
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn lead_id_for(email: &str) -> String {
    let slug: String = email
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("lead-{slug}")
}
