use crate::infra::{InMemoryContactStore, InMemoryRecencyCache};
use chrono::Utc;
use clap::Args;
use leadscore::error::AppError;
use leadscore::feed::ActivityFeedImporter;
use leadscore::scoring::{
    Activity, ActivityMetadata, ActivityResult, ActivityType, Contact, ContactId, LifecycleStage,
    ScoringEngine, ScoringWeights, TriggerEvaluator,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct BackfillArgs {
    /// Activity feed CSV export to replay through the engine
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Starting score for the pre-seeded contact
    #[arg(long, default_value_t = 70)]
    pub(crate) seed_score: u8,
}

fn build_engine() -> (
    Arc<ScoringEngine<InMemoryContactStore, InMemoryRecencyCache>>,
    Arc<InMemoryContactStore>,
) {
    let store = Arc::new(InMemoryContactStore::default());
    let cache = Arc::new(InMemoryRecencyCache::default());
    let engine = Arc::new(ScoringEngine::new(
        store.clone(),
        cache,
        ScoringWeights::standard(),
        TriggerEvaluator::standard(),
    ));
    (engine, store)
}

pub(crate) async fn run_backfill(args: BackfillArgs) -> Result<(), AppError> {
    let activities = ActivityFeedImporter::from_path(&args.csv)?;
    let total = activities.len();

    let (engine, _) = build_engine();
    let results = engine.process_batch(activities).await;

    println!("Activity feed backfill: {} item(s)", total);
    for (index, result) in results.iter().enumerate() {
        render_result(index, result);
    }

    let failed = results
        .iter()
        .filter(|result| result.outcome.is_err())
        .count();
    println!("\nProcessed {} item(s), {} failed", total, failed);

    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let (engine, store) = build_engine();

    store.seed(Contact {
        id: ContactId("contact-demo".to_string()),
        first_name: "Morgan".to_string(),
        last_name: "Reyes".to_string(),
        email: Some("morgan.reyes@globex.com".to_string()),
        company: Some("Globex".to_string()),
        lifecycle_stage: LifecycleStage::MarketingQualified,
        lead_score: args.seed_score,
        activities: Vec::new(),
        last_activity_date: None,
        custom_fields: BTreeMap::new(),
        archived: false,
    });

    println!("Lead scoring demo");
    println!(
        "Seeded contact-demo (Morgan Reyes) at score {}",
        args.seed_score
    );

    let scripted = vec![
        Activity {
            activity_type: ActivityType::DemoRequest,
            action: "Requested a product demo".to_string(),
            timestamp: Utc::now(),
            contact_id: None,
            email: Some("jane.doe@acme.com".to_string()),
            cookie_id: Some("ck-demo-1".to_string()),
            metadata: ActivityMetadata {
                page: Some("/demo".to_string()),
                ..ActivityMetadata::default()
            },
        },
        Activity {
            activity_type: ActivityType::PricingView,
            action: "Viewed pricing".to_string(),
            timestamp: Utc::now(),
            contact_id: Some(ContactId("contact-demo".to_string())),
            email: None,
            cookie_id: None,
            metadata: ActivityMetadata::default(),
        },
        Activity {
            activity_type: ActivityType::PricingView,
            action: "Viewed pricing again".to_string(),
            timestamp: Utc::now(),
            contact_id: Some(ContactId("contact-demo".to_string())),
            email: None,
            cookie_id: None,
            metadata: ActivityMetadata::default(),
        },
    ];

    let results = engine.process_batch(scripted).await;
    println!("\nActivity results");
    for (index, result) in results.iter().enumerate() {
        render_result(index, result);
    }

    if let Some(created) = results
        .first()
        .and_then(|result| result.outcome.as_ref().ok())
        .and_then(|outcome| store.get(&outcome.contact_id.0))
    {
        println!(
            "\nAuto-created lead: {} {} at {} ({})",
            created.first_name,
            created.last_name,
            created.company.as_deref().unwrap_or("unknown company"),
            created.id.0
        );
    }

    Ok(())
}

fn render_result(index: usize, result: &ActivityResult) {
    match &result.outcome {
        Ok(outcome) => {
            let fired: Vec<&str> = outcome
                .triggered_actions
                .iter()
                .map(|action| action.name.as_str())
                .collect();
            let triggers = if fired.is_empty() {
                "none".to_string()
            } else {
                fired.join(", ")
            };
            println!(
                "- [{}] {} -> {} +{} = {} (triggers: {})",
                index,
                result.activity.activity_type.label(),
                outcome.contact_id.0,
                outcome.score_change,
                outcome.new_score,
                triggers
            );
        }
        Err(err) => {
            println!(
                "- [{}] {} -> failed: {}",
                index,
                result.activity.activity_type.label(),
                err
            );
        }
    }
}
