// src/metrics.rs
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("turns_total", "Conversation turns processed.");
        describe_counter!(
            "annotation_errors_total",
            "Annotation calls that failed or timed out."
        );
        describe_counter!(
            "corpus_errors_total",
            "News corpus fetches that failed and were replaced by an empty corpus."
        );
        describe_counter!(
            "articles_matched_total",
            "Articles returned by the relation matcher."
        );
        describe_counter!("news_documents_total", "Documents received from the news service.");
        describe_histogram!("annotation_ms", "Annotation call time in milliseconds.");
        describe_histogram!("news_fetch_ms", "News search call time in milliseconds.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Fails if another recorder is already installed.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
