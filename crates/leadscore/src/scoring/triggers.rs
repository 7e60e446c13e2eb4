use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{ActivityType, Contact};
use super::store::RecencyCache;
use super::window::RecentActivityWindow;

/// Declarative marketing rule mapping a score threshold (plus an optional
/// behavioral gate) to a described downstream action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: String,
    pub name: String,
    pub threshold_score: u8,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<TriggerCondition>,
}

/// Behavioral gate counted against the recent-activity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerCondition {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub window_hours: i64,
    pub min_count: u32,
}

/// Record of a fired rule. The engine only reports the decision; executing
/// the action belongs to the notification layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredAction {
    pub id: String,
    pub name: String,
    pub action: String,
    pub triggered: bool,
}

/// Evaluates the rule book in declared order against the updated contact.
/// All matching rules fire; there is no short-circuit.
pub struct TriggerEvaluator {
    triggers: Vec<Trigger>,
}

impl TriggerEvaluator {
    pub fn new(triggers: Vec<Trigger>) -> Self {
        Self { triggers }
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Default rule book.
    pub fn standard() -> Self {
        Self::new(vec![
            Trigger {
                id: "pricing-interest".to_string(),
                name: "Pricing Interest".to_string(),
                threshold_score: 60,
                action: "notify sales of pricing interest".to_string(),
                condition: Some(TriggerCondition {
                    activity_type: ActivityType::PricingView,
                    window_hours: 24,
                    min_count: 2,
                }),
            },
            Trigger {
                id: "high-engagement".to_string(),
                name: "High Engagement Score".to_string(),
                threshold_score: 80,
                action: "alert account owner".to_string(),
                condition: None,
            },
            Trigger {
                id: "sales-ready".to_string(),
                name: "Sales Ready".to_string(),
                threshold_score: 90,
                action: "create sales follow-up task".to_string(),
                condition: None,
            },
        ])
    }

    pub async fn evaluate<C>(
        &self,
        contact: &Contact,
        window: &RecentActivityWindow<C>,
        now: DateTime<Utc>,
    ) -> Vec<TriggeredAction>
    where
        C: RecencyCache,
    {
        let mut fired = Vec::new();

        for trigger in &self.triggers {
            if contact.lead_score < trigger.threshold_score {
                continue;
            }

            if let Some(condition) = &trigger.condition {
                let count = window
                    .count_in_window(
                        &contact.id,
                        condition.activity_type,
                        Duration::hours(condition.window_hours),
                        now,
                    )
                    .await;
                if count < condition.min_count {
                    continue;
                }
            }

            info!(
                contact = %contact.id.0,
                trigger = %trigger.id,
                score = contact.lead_score,
                "marketing trigger fired"
            );
            fired.push(TriggeredAction {
                id: trigger.id.clone(),
                name: trigger.name.clone(),
                action: trigger.action.clone(),
                triggered: true,
            });
        }

        fired
    }
}
