use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;

use leadscore::scoring::{
    CacheError, Contact, ContactId, ContactStore, RecencyCache, StoreError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Contact store backed by a process-local map. Stands in for the CRM
/// document store during demos and tests.
#[derive(Default)]
pub(crate) struct InMemoryContactStore {
    contacts: Mutex<HashMap<String, Contact>>,
}

impl InMemoryContactStore {
    pub(crate) fn seed(&self, contact: Contact) {
        self.contacts
            .lock()
            .expect("contact store mutex poisoned")
            .insert(contact.id.0.clone(), contact);
    }

    pub(crate) fn get(&self, id: &str) -> Option<Contact> {
        self.contacts
            .lock()
            .expect("contact store mutex poisoned")
            .get(id)
            .cloned()
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn find_by_id(&self, id: &ContactId) -> Result<Option<Contact>, StoreError> {
        Ok(self.get(&id.0))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Contact>, StoreError> {
        let contacts = self.contacts.lock().expect("contact store mutex poisoned");
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
        let contacts = self.contacts.lock().expect("contact store mutex poisoned");
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

/// TTL key-value cache backed by a process-local map; expiry is enforced on
/// read against the deadline stored alongside each value.
#[derive(Default)]
pub(crate) struct InMemoryRecencyCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

#[async_trait]
impl RecencyCache for InMemoryRecencyCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        let expired = match entries.get(key) {
            Some((value, deadline)) if *deadline > Instant::now() => {
                return Ok(Some(value.clone()));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let deadline = Instant::now() + ttl;
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .insert(key.to_string(), (value, deadline));
        Ok(())
    }
}
