//! Dialog News Enricher: binary entrypoint.
//! Boots the Axum HTTP server with tracing, metrics and the enrichment pipeline.
//!
//! See `README.md` for configuration.

use dialog_news_enricher::{app, metrics::Metrics, telemetry};
use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    telemetry::init_tracing();

    let mut router = app()?;

    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => tracing::warn!(error = %e, "metrics disabled"),
    }

    Ok(router.into())
}
