use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryContactStore, InMemoryRecencyCache};
use crate::routes::with_scoring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use leadscore::config::AppConfig;
use leadscore::error::AppError;
use leadscore::scoring::{ScoringEngine, ScoringWeights, TriggerEvaluator};
use leadscore::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryContactStore::default());
    let cache = Arc::new(InMemoryRecencyCache::default());
    let weights = load_weights(&config)?;
    let engine = Arc::new(ScoringEngine::new(
        store,
        cache,
        weights,
        TriggerEvaluator::standard(),
    ));

    let app = with_scoring_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "lead scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn load_weights(config: &AppConfig) -> Result<ScoringWeights, AppError> {
    match &config.scoring.weights_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let weights: ScoringWeights = serde_json::from_str(&raw).map_err(|err| {
                AppError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("invalid weights file '{path}': {err}"),
                ))
            })?;
            info!(%path, "loaded scoring weight overrides");
            Ok(weights)
        }
        None => Ok(ScoringWeights::standard()),
    }
}
