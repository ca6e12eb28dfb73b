use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

// ============================================================================
// Metrics Module - Prometheus metrics for the ingestion pipeline
// ============================================================================
//
// Tracks:
// - Orders received / created / rejected (by error kind)
// - Lookups by outcome
// - Order store latency by operation
//
// Scraped via GET /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub orders_received: IntCounter,
    pub orders_created: IntCounter,
    pub orders_rejected: IntCounterVec,
    pub order_lookups: IntCounterVec,
    pub store_operation_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_received = IntCounter::new(
            "orders_received_total",
            "Total create-order requests received",
        )?;
        registry.register(Box::new(orders_received.clone()))?;

        let orders_created = IntCounter::new("orders_created_total", "Total orders persisted")?;
        registry.register(Box::new(orders_created.clone()))?;

        let orders_rejected = IntCounterVec::new(
            Opts::new("orders_rejected_total", "Create-order requests that failed"),
            &["reason"],
        )?;
        registry.register(Box::new(orders_rejected.clone()))?;

        let order_lookups = IntCounterVec::new(
            Opts::new("order_lookups_total", "Order lookups by id"),
            &["outcome"],
        )?;
        registry.register(Box::new(order_lookups.clone()))?;

        let store_operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "order_store_operation_duration_seconds",
                "Order store operation duration",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(store_operation_duration.clone()))?;

        Ok(Self {
            registry,
            orders_received,
            orders_created,
            orders_rejected,
            order_lookups,
            store_operation_duration,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_rejection(&self, reason: &str) {
        self.orders_rejected.with_label_values(&[reason]).inc();
    }

    pub fn record_lookup(&self, outcome: &str) {
        self.order_lookups.with_label_values(&[outcome]).inc();
    }

    pub fn observe_store(&self, operation: &str, duration_secs: f64) {
        self.store_operation_duration
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    /// Render the registry in the Prometheus text format
    pub fn encode(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
