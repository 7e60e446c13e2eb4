use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::scoring::domain::{
    Activity, ActivityMetadata, ActivityType, Contact, ContactId, LifecycleStage,
};
use crate::scoring::engine::ScoringEngine;
use crate::scoring::store::{CacheError, ContactStore, RecencyCache, StoreError};
use crate::scoring::triggers::TriggerEvaluator;
use crate::scoring::weights::ScoringWeights;

#[derive(Default)]
pub(super) struct TestStore {
    pub(super) contacts: Mutex<HashMap<String, Contact>>,
}

impl TestStore {
    pub(super) fn seed(&self, contact: Contact) {
        self.contacts
            .lock()
            .expect("store mutex poisoned")
            .insert(contact.id.0.clone(), contact);
    }

    pub(super) fn get(&self, id: &str) -> Option<Contact> {
        self.contacts
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned()
    }

    pub(super) fn len(&self) -> usize {
        self.contacts.lock().expect("store mutex poisoned").len()
    }
}

#[async_trait]
impl ContactStore for TestStore {
    async fn find_by_id(&self, id: &ContactId) -> Result<Option<Contact>, StoreError> {
        Ok(self.get(&id.0))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Contact>, StoreError> {
        let contacts = self.contacts.lock().expect("store mutex poisoned");
        Ok(contacts
            .values()
            .find(|contact| {
                !contact.archived
                    && contact
                        .email
                        .as_deref()
                        .is_some_and(|candidate| candidate.eq_ignore_ascii_case(email))
            })
            .cloned())
    }

    async fn find_by_custom_field(
        &self,
        key: &str,
        value: &str,
    ) -> Result<Option<Contact>, StoreError> {
        let contacts = self.contacts.lock().expect("store mutex poisoned");
        Ok(contacts
            .values()
            .find(|contact| contact.custom_fields.get(key).map(String::as_str) == Some(value))
            .cloned())
    }

    async fn create(&self, contact: Contact) -> Result<Contact, StoreError> {
        self.seed(contact.clone());
        Ok(contact)
    }

    async fn save(&self, contact: &Contact) -> Result<(), StoreError> {
        self.seed(contact.clone());
        Ok(())
    }
}

/// Store whose reads succeed but whose writes fail, for persistence-error
/// paths.
#[derive(Default)]
pub(super) struct ReadOnlyStore {
    pub(super) inner: TestStore,
}

#[async_trait]
impl ContactStore for ReadOnlyStore {
    async fn find_by_id(&self, id: &ContactId) -> Result<Option<Contact>, StoreError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Contact>, StoreError> {
        self.inner.find_by_email(email).await
    }

    async fn find_by_custom_field(
        &self,
        key: &str,
        value: &str,
    ) -> Result<Option<Contact>, StoreError> {
        self.inner.find_by_custom_field(key, value).await
    }

    async fn create(&self, _contact: Contact) -> Result<Contact, StoreError> {
        Err(StoreError::Unavailable("store is read only".to_string()))
    }

    async fn save(&self, _contact: &Contact) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store is read only".to_string()))
    }
}

#[derive(Default)]
pub(super) struct TestCache {
    pub(super) entries: Mutex<HashMap<String, String>>,
}

impl TestCache {
    pub(super) fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .get(key)
            .cloned()
    }

    pub(super) fn put(&self, key: &str, value: String) {
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .insert(key.to_string(), value);
    }
}

#[async_trait]
impl RecencyCache for TestCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: String, _ttl: Duration) -> Result<(), CacheError> {
        self.put(key, value);
        Ok(())
    }
}

/// Cache that refuses every operation, for fail-open paths.
pub(super) struct FailingCache;

#[async_trait]
impl RecencyCache for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Backend("cache offline".to_string()))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Backend("cache offline".to_string()))
    }
}

pub(super) fn contact(id: &str, lead_score: u8) -> Contact {
    Contact {
        id: ContactId(id.to_string()),
        first_name: "Avery".to_string(),
        last_name: "Quinn".to_string(),
        email: Some(format!("{id}@example.com")),
        company: Some("Example".to_string()),
        lifecycle_stage: LifecycleStage::Lead,
        lead_score,
        activities: Vec::new(),
        last_activity_date: None,
        custom_fields: BTreeMap::new(),
        archived: false,
    }
}

pub(super) fn activity(activity_type: ActivityType, contact_id: &str) -> Activity {
    activity_at(activity_type, contact_id, Utc::now())
}

pub(super) fn activity_at(
    activity_type: ActivityType,
    contact_id: &str,
    timestamp: DateTime<Utc>,
) -> Activity {
    Activity {
        activity_type,
        action: format!("{} event", activity_type.label()),
        timestamp,
        contact_id: Some(ContactId(contact_id.to_string())),
        email: None,
        cookie_id: None,
        metadata: ActivityMetadata::default(),
    }
}

pub(super) fn build_engine() -> (
    ScoringEngine<TestStore, TestCache>,
    Arc<TestStore>,
    Arc<TestCache>,
) {
    let store = Arc::new(TestStore::default());
    let cache = Arc::new(TestCache::default());
    let engine = ScoringEngine::new(
        store.clone(),
        cache.clone(),
        ScoringWeights::standard(),
        TriggerEvaluator::standard(),
    );
    (engine, store, cache)
}
