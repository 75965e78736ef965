use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_income_review_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

use childcare_ops::config::AppConfig;
use childcare_ops::error::AppError;
use childcare_ops::telemetry;
use childcare_ops::workflows::income_review::{
    IncomeReviewScheduler, InMemoryIncomeReviewStore, LoggingEmailClient, NotificationConfig,
};

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

    let store = Arc::new(InMemoryIncomeReviewStore::default());
    let emails = Arc::new(LoggingEmailClient);
    let scheduler = Arc::new(IncomeReviewScheduler::new(
        store,
        emails,
        NotificationConfig::default(),
    ));

    let app = with_income_review_routes(scheduler)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "childcare operations service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
