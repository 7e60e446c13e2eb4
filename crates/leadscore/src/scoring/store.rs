use std::time::Duration;

use async_trait::async_trait;

use super::domain::{Contact, ContactId};

/// Storage abstraction over the CRM contact collection so the engine can be
/// exercised against in-memory fakes. Writes are not retried; a failure
/// surfaces as a failed result for the activity being processed.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn find_by_id(&self, id: &ContactId) -> Result<Option<Contact>, StoreError>;

    /// Case-insensitive lookup among active (non-archived) contacts.
    async fn find_by_email(&self, email: &str) -> Result<Option<Contact>, StoreError>;

    async fn find_by_custom_field(
        &self,
        key: &str,
        value: &str,
    ) -> Result<Option<Contact>, StoreError>;

    async fn create(&self, contact: Contact) -> Result<Contact, StoreError>;

    async fn save(&self, contact: &Contact) -> Result<(), StoreError>;
}

/// Error enumeration for contact store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("contact store unavailable: {0}")]
    Unavailable(String),
}

/// TTL key-value cache backing the recent-activity window. Treated as
/// unreliable: every caller degrades gracefully when an operation fails.
#[async_trait]
pub trait RecencyCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
}

/// Error enumeration for cache failures.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Backend(String),
}
