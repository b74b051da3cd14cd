use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    queries_total: AtomicU64,
    routing_failures_total: AtomicU64,
    tool_failures_total: AtomicU64,
    translation_fallbacks_total: AtomicU64,
    extractor_overlays_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub queries_total: u64,
    pub routing_failures_total: u64,
    pub tool_failures_total: u64,
    pub translation_fallbacks_total: u64,
    pub extractor_overlays_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_query(&self) {
        self.queries_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_routing_failure(&self) {
        self.routing_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_tool_failure(&self) {
        self.tool_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_translation_fallback(&self) {
        self.translation_fallbacks_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_extractor_overlays(&self, hits: usize) {
        self.extractor_overlays_total
            .fetch_add(hits as u64, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let queries = self.queries_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            queries_total: queries,
            routing_failures_total: self.routing_failures_total.load(Ordering::Relaxed),
            tool_failures_total: self.tool_failures_total.load(Ordering::Relaxed),
            translation_fallbacks_total: self.translation_fallbacks_total.load(Ordering::Relaxed),
            extractor_overlays_total: self.extractor_overlays_total.load(Ordering::Relaxed),
            avg_latency_millis: if queries == 0 {
                0.0
            } else {
                latency as f64 / queries as f64
            },
        }
    }
}

/// Installs the JSON subscriber once. `RUST_LOG` overrides the default directives.
pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,studio_agents=info,studio_core=warn,studio_ml=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr)
            .init();
    });
}
