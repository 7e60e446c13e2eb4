use std::sync::Arc;

use chrono::{Duration, Utc};

use super::common::{contact, TestCache};
use crate::scoring::domain::{ActivityMetadata, ActivityType, ContactId};
use crate::scoring::triggers::{Trigger, TriggerCondition, TriggerEvaluator};
use crate::scoring::window::{RecentActivityWindow, WindowEntry};

fn pricing_entry(age: Duration) -> WindowEntry {
    WindowEntry {
        activity_type: ActivityType::PricingView,
        timestamp: Utc::now() - age,
        score_impact: 8,
        metadata: ActivityMetadata::default(),
    }
}

#[tokio::test]
async fn thresholds_gate_unconditional_triggers() {
    let window = RecentActivityWindow::new(Arc::new(TestCache::default()));
    let evaluator = TriggerEvaluator::standard();

    let below = contact("contact-1", 79);
    assert!(evaluator.evaluate(&below, &window, Utc::now()).await.is_empty());

    let above = contact("contact-1", 85);
    let fired = evaluator.evaluate(&above, &window, Utc::now()).await;
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].id, "high-engagement");
    assert_eq!(fired[0].name, "High Engagement Score");
    assert!(fired[0].triggered);
}

#[tokio::test]
async fn all_matching_triggers_fire_in_declared_order() {
    let window = RecentActivityWindow::new(Arc::new(TestCache::default()));
    let contact_id = ContactId("contact-1".to_string());
    window.record(&contact_id, pricing_entry(Duration::minutes(20))).await;
    window.record(&contact_id, pricing_entry(Duration::hours(3))).await;

    let evaluator = TriggerEvaluator::standard();
    let hot = contact("contact-1", 95);

    let fired = evaluator.evaluate(&hot, &window, Utc::now()).await;
    let ids: Vec<&str> = fired.iter().map(|action| action.id.as_str()).collect();
    assert_eq!(ids, vec!["pricing-interest", "high-engagement", "sales-ready"]);
}

#[tokio::test]
async fn window_conditions_suppress_triggers_without_enough_activity() {
    let window = RecentActivityWindow::new(Arc::new(TestCache::default()));
    let contact_id = ContactId("contact-1".to_string());
    window.record(&contact_id, pricing_entry(Duration::minutes(20))).await;

    let evaluator = TriggerEvaluator::standard();
    let engaged = contact("contact-1", 70);

    // One pricing view in 24h is below the min_count of two.
    let fired = evaluator.evaluate(&engaged, &window, Utc::now()).await;
    assert!(fired.is_empty());
}

#[tokio::test]
async fn stale_window_entries_do_not_satisfy_conditions() {
    let window = RecentActivityWindow::new(Arc::new(TestCache::default()));
    let contact_id = ContactId("contact-1".to_string());
    window.record(&contact_id, pricing_entry(Duration::minutes(20))).await;
    window.record(&contact_id, pricing_entry(Duration::days(2))).await;

    let evaluator = TriggerEvaluator::standard();
    let engaged = contact("contact-1", 70);

    let fired = evaluator.evaluate(&engaged, &window, Utc::now()).await;
    assert!(fired.is_empty());
}

#[tokio::test]
async fn custom_rule_books_evaluate_in_declared_order() {
    let window = RecentActivityWindow::new(Arc::new(TestCache::default()));
    let evaluator = TriggerEvaluator::new(vec![
        Trigger {
            id: "warm".to_string(),
            name: "Warm Lead".to_string(),
            threshold_score: 10,
            action: "enroll in nurture track".to_string(),
            condition: None,
        },
        Trigger {
            id: "downloader".to_string(),
            name: "Active Downloader".to_string(),
            threshold_score: 10,
            action: "send content digest".to_string(),
            condition: Some(TriggerCondition {
                activity_type: ActivityType::Download,
                window_hours: 24,
                min_count: 1,
            }),
        },
    ]);

    let lead = contact("contact-1", 30);
    let fired = evaluator.evaluate(&lead, &window, Utc::now()).await;

    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].id, "warm");
    assert_eq!(fired[0].action, "enroll in nurture track");
}
