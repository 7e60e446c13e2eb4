use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::ActivityType;

/// Named multiplier slots referenced by the per-type scoring rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MultiplierKind {
    PricingPage,
    DemoPage,
    ProductPage,
    DurationBonus,
    Whitepaper,
    CaseStudy,
    Trial,
    Cta,
    DemoRequest,
    ContactForm,
    CompletionBonus,
    RepeatVisit,
}

/// Base value and named multipliers configured for one activity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeWeights {
    pub base: f64,
    #[serde(default)]
    pub multipliers: BTreeMap<MultiplierKind, f64>,
}

impl TypeWeights {
    pub fn flat(base: f64) -> Self {
        Self {
            base,
            multipliers: BTreeMap::new(),
        }
    }

    pub fn with(mut self, kind: MultiplierKind, value: f64) -> Self {
        self.multipliers.insert(kind, value);
        self
    }

    /// Configured multiplicative factor, neutral when absent.
    pub fn factor(&self, kind: MultiplierKind) -> f64 {
        self.multipliers.get(&kind).copied().unwrap_or(1.0)
    }

    /// Configured additive bonus rate, zero when absent.
    pub fn bonus(&self, kind: MultiplierKind) -> f64 {
        self.multipliers.get(&kind).copied().unwrap_or(0.0)
    }
}

/// Static scoring table keyed by the activity-type enum. Loaded once at
/// engine startup and immutable during operation; a type missing from the
/// table is the degraded minimum-delta path, never a panic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringWeights {
    pub table: BTreeMap<ActivityType, TypeWeights>,
}

impl ScoringWeights {
    pub fn new(table: BTreeMap<ActivityType, TypeWeights>) -> Self {
        Self { table }
    }

    pub fn get(&self, activity_type: ActivityType) -> Option<&TypeWeights> {
        self.table.get(&activity_type)
    }

    /// Default table covering every activity type.
    pub fn standard() -> Self {
        let mut table = BTreeMap::new();
        table.insert(
            ActivityType::PageView,
            TypeWeights::flat(2.0)
                .with(MultiplierKind::PricingPage, 3.0)
                .with(MultiplierKind::DemoPage, 2.5)
                .with(MultiplierKind::ProductPage, 2.0)
                .with(MultiplierKind::DurationBonus, 1.0),
        );
        table.insert(
            ActivityType::PricingView,
            TypeWeights::flat(8.0).with(MultiplierKind::RepeatVisit, 1.5),
        );
        table.insert(
            ActivityType::Download,
            TypeWeights::flat(10.0)
                .with(MultiplierKind::Whitepaper, 1.2)
                .with(MultiplierKind::CaseStudy, 1.5)
                .with(MultiplierKind::Trial, 2.0),
        );
        table.insert(ActivityType::EmailOpen, TypeWeights::flat(1.0));
        table.insert(
            ActivityType::EmailClick,
            TypeWeights::flat(3.0).with(MultiplierKind::Cta, 1.5),
        );
        table.insert(
            ActivityType::FormSubmit,
            TypeWeights::flat(12.0)
                .with(MultiplierKind::DemoRequest, 1.5)
                .with(MultiplierKind::ContactForm, 1.2),
        );
        table.insert(
            ActivityType::VideoWatch,
            TypeWeights::flat(5.0).with(MultiplierKind::CompletionBonus, 0.5),
        );
        table.insert(ActivityType::DemoRequest, TypeWeights::flat(15.0));
        table.insert(ActivityType::WebinarAttend, TypeWeights::flat(7.0));
        table.insert(ActivityType::ChatStarted, TypeWeights::flat(6.0));
        table.insert(ActivityType::SocialClick, TypeWeights::flat(2.0));
        Self { table }
    }
}
