use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use super::domain::{Activity, ActivityType};
use super::weights::{MultiplierKind, ScoringWeights};

/// Window-derived signals gathered before the activity is recorded, so the
/// activity being scored never counts toward its own frequency checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCounts {
    /// Entries of the same type within the trailing hour, excluding the
    /// activity being scored.
    pub same_type_last_hour: u32,
    /// Prior pricing-view entries within the trailing 24 hours.
    pub pricing_views_last_day: u32,
}

/// Stateless calculator applying the weight table to one activity.
pub struct ScoreCalculator {
    weights: ScoringWeights,
}

impl ScoreCalculator {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Integer score delta for one activity. Pure in
    /// `(activity, counts, now)`; always at least 1.
    pub fn delta(&self, activity: &Activity, counts: &WindowCounts, now: DateTime<Utc>) -> u32 {
        let Some(weights) = self.weights.get(activity.activity_type) else {
            warn!(
                activity_type = activity.activity_type.label(),
                "no scoring weights configured, applying minimum delta"
            );
            return 1;
        };

        let metadata = &activity.metadata;
        let mut score = weights.base;

        match activity.activity_type {
            ActivityType::PageView => {
                if let Some(page) = &metadata.page {
                    if page.contains("pricing") {
                        score *= weights.factor(MultiplierKind::PricingPage);
                    } else if page.contains("demo") {
                        score *= weights.factor(MultiplierKind::DemoPage);
                    } else if page.contains("product") {
                        score *= weights.factor(MultiplierKind::ProductPage);
                    }
                }
                if let Some(seconds) = metadata.duration_seconds {
                    score +=
                        weights.bonus(MultiplierKind::DurationBonus) * (f64::from(seconds) / 60.0);
                }
            }
            ActivityType::Download => {
                if let Some(file_name) = &metadata.file_name {
                    let file_name = file_name.to_lowercase();
                    if file_name.contains("whitepaper") {
                        score *= weights.factor(MultiplierKind::Whitepaper);
                    } else if file_name.contains("case") || file_name.contains("study") {
                        score *= weights.factor(MultiplierKind::CaseStudy);
                    } else if file_name.contains("trial") {
                        score *= weights.factor(MultiplierKind::Trial);
                    }
                }
            }
            ActivityType::EmailClick => {
                if let Some(link_url) = &metadata.link_url {
                    if ["cta", "signup", "demo"]
                        .iter()
                        .any(|needle| link_url.contains(needle))
                    {
                        score *= weights.factor(MultiplierKind::Cta);
                    }
                }
            }
            ActivityType::FormSubmit => {
                if let Some(form_id) = &metadata.form_id {
                    if form_id.contains("demo") {
                        score *= weights.factor(MultiplierKind::DemoRequest);
                    } else if form_id.contains("contact") {
                        score *= weights.factor(MultiplierKind::ContactForm);
                    }
                }
            }
            ActivityType::VideoWatch => {
                if let (Some(watched), Some(total)) = (
                    metadata.watch_duration_seconds,
                    metadata.total_duration_seconds,
                ) {
                    if total > 0 {
                        let completion = f64::from(watched) / f64::from(total) * 100.0;
                        score += weights.bonus(MultiplierKind::CompletionBonus)
                            * (completion / 10.0).floor();
                    }
                }
            }
            ActivityType::PricingView => {
                if counts.pricing_views_last_day >= 1 {
                    score *= weights.factor(MultiplierKind::RepeatVisit);
                }
            }
            _ => {}
        }

        let age = now.signed_duration_since(activity.timestamp);
        if age < Duration::hours(1) {
            score *= 1.5;
        } else if age < Duration::hours(24) {
            score *= 1.2;
        }

        // The dampening threshold counts the activity being scored: two or
        // more prior same-type entries in the hour puts the total above 2.
        if counts.same_type_last_hour + 1 > 2 {
            score *= 0.5;
        }

        score.round().max(1.0) as u32
    }
}
