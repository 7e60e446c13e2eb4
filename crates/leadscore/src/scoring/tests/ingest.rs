use std::sync::Arc;

use super::common::{activity, contact, ReadOnlyStore, TestStore};
use crate::scoring::domain::{ActivityType, ContactId, LifecycleStage};
use crate::scoring::ingest::{ActivityIngestor, IngestError, TRACKING_COOKIE_FIELD};

#[tokio::test]
async fn resolves_by_explicit_contact_id_first() {
    let store = Arc::new(TestStore::default());
    store.seed(contact("contact-1", 40));
    let ingestor = ActivityIngestor::new(store);

    let mut event = activity(ActivityType::PageView, "contact-1");
    event.email = Some("someone.else@other.com".to_string());

    let resolved = ingestor.resolve(&event).await.expect("resolves");
    assert_eq!(resolved.id, ContactId("contact-1".to_string()));
}

#[tokio::test]
async fn resolves_by_email_case_insensitively() {
    let store = Arc::new(TestStore::default());
    let mut known = contact("contact-1", 40);
    known.email = Some("avery.quinn@example.com".to_string());
    store.seed(known);
    let ingestor = ActivityIngestor::new(store);

    let mut event = activity(ActivityType::PageView, "contact-1");
    event.contact_id = None;
    event.email = Some("Avery.Quinn@Example.com".to_string());

    let resolved = ingestor.resolve(&event).await.expect("resolves");
    assert_eq!(resolved.id, ContactId("contact-1".to_string()));
}

#[tokio::test]
async fn resolves_by_tracking_cookie_custom_field() {
    let store = Arc::new(TestStore::default());
    let mut known = contact("contact-1", 40);
    known.email = None;
    known
        .custom_fields
        .insert(TRACKING_COOKIE_FIELD.to_string(), "ck-42".to_string());
    store.seed(known);
    let ingestor = ActivityIngestor::new(store);

    let mut event = activity(ActivityType::PageView, "contact-1");
    event.contact_id = None;
    event.cookie_id = Some("ck-42".to_string());

    let resolved = ingestor.resolve(&event).await.expect("resolves");
    assert_eq!(resolved.id, ContactId("contact-1".to_string()));
}

#[tokio::test]
async fn unmatched_low_intent_activity_never_creates_a_contact() {
    let store = Arc::new(TestStore::default());
    let ingestor = ActivityIngestor::new(store.clone());

    let mut event = activity(ActivityType::PageView, "contact-1");
    event.contact_id = None;
    event.email = Some("jane.doe@acme.com".to_string());

    match ingestor.resolve(&event).await {
        Err(IngestError::ContactNotFound) => {}
        other => panic!("expected contact-not-found, got {other:?}"),
    }
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn unmatched_demo_request_creates_exactly_one_lead() {
    let store = Arc::new(TestStore::default());
    let ingestor = ActivityIngestor::new(store.clone());

    let mut event = activity(ActivityType::DemoRequest, "ignored");
    event.contact_id = None;
    event.email = Some("jane.doe@acme.com".to_string());
    event.cookie_id = Some("ck-7".to_string());
    event.metadata.page = Some("/demo".to_string());

    let created = ingestor.resolve(&event).await.expect("lead created");

    assert_eq!(store.len(), 1);
    assert_eq!(created.first_name, "Jane");
    assert_eq!(created.last_name, "Doe");
    assert_eq!(created.company.as_deref(), Some("Acme"));
    assert_eq!(created.email.as_deref(), Some("jane.doe@acme.com"));
    assert_eq!(created.lead_score, 0);
    assert_eq!(created.lifecycle_stage, LifecycleStage::Lead);
    assert_eq!(
        created.custom_fields.get(TRACKING_COOKIE_FIELD).map(String::as_str),
        Some("ck-7")
    );
    assert_eq!(
        created.custom_fields.get("source_activity").map(String::as_str),
        Some("demo_request")
    );
    assert_eq!(
        created.custom_fields.get("source_page").map(String::as_str),
        Some("/demo")
    );
}

#[tokio::test]
async fn created_lead_is_resolvable_by_cookie_afterwards() {
    let store = Arc::new(TestStore::default());
    let ingestor = ActivityIngestor::new(store.clone());

    let mut first = activity(ActivityType::Download, "ignored");
    first.contact_id = None;
    first.email = Some("sam@initech.io".to_string());
    first.cookie_id = Some("ck-9".to_string());
    let created = ingestor.resolve(&first).await.expect("lead created");

    let mut followup = activity(ActivityType::PageView, "ignored");
    followup.contact_id = None;
    followup.cookie_id = Some("ck-9".to_string());
    let resolved = ingestor.resolve(&followup).await.expect("cookie resolves");

    assert_eq!(resolved.id, created.id);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn single_token_local_part_leaves_last_name_empty() {
    let store = Arc::new(TestStore::default());
    let ingestor = ActivityIngestor::new(store);

    let mut event = activity(ActivityType::FormSubmit, "ignored");
    event.contact_id = None;
    event.email = Some("sam@initech.io".to_string());

    let created = ingestor.resolve(&event).await.expect("lead created");
    assert_eq!(created.first_name, "Sam");
    assert_eq!(created.last_name, "");
    assert_eq!(created.company.as_deref(), Some("Initech"));
}

#[tokio::test]
async fn store_failures_propagate_from_creation() {
    let store = Arc::new(ReadOnlyStore::default());
    let ingestor = ActivityIngestor::new(store);

    let mut event = activity(ActivityType::DemoRequest, "ignored");
    event.contact_id = None;
    event.email = Some("jane.doe@acme.com".to_string());

    match ingestor.resolve(&event).await {
        Err(IngestError::Store(_)) => {}
        other => panic!("expected store error, got {other:?}"),
    }
}
