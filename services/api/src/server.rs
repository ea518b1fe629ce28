use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use realty_catalog::catalog::{CatalogService, UploadPipeline};
use realty_catalog::config::AppConfig;
use realty_catalog::error::AppError;
use realty_catalog::telemetry;
use tracing::{info, warn};

use crate::cli::ServeArgs;
use crate::demo::seed_drafts;
use crate::infra::{AppState, InMemoryObjectStorage, InMemoryRecordStore, LocalSessionStore};
use crate::routes::with_catalog_routes;

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

    let records = Arc::new(InMemoryRecordStore::default());
    if args.seed {
        records.seed(seed_drafts());
    }
    let session = Arc::new(LocalSessionStore::from_env());
    let pipeline = UploadPipeline::new(Arc::new(InMemoryObjectStorage::default()), &config.storage);
    let service = Arc::new(CatalogService::new(records, session, pipeline));

    // Catalog-page entry: fetch once into memory. A failed fetch leaves
    // an empty catalog behind and the service stays up.
    if let Err(err) = service.load_catalog().await {
        warn!(error = %err, "starting with an empty catalog");
    }

    let app = with_catalog_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "listing catalog service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
