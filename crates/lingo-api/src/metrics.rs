//! Prometheus metrics for coordination outcomes.
use lingo_core::CoordinationResult;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    coordinations: IntCounterVec,
    degraded: IntCounter,
    rejected: IntCounter,
    latency: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let coordinations = IntCounterVec::new(
            Opts::new("lingo_coordinations_total", "Completed coordinations"),
            &["execution_type"],
        )?;
        let degraded = IntCounter::new(
            "lingo_coordinations_degraded_total",
            "Coordinations answered with a failure explanation",
        )?;
        let rejected = IntCounter::new(
            "lingo_requests_rejected_total",
            "Requests rejected before classification",
        )?;
        let latency = Histogram::with_opts(
            HistogramOpts::new("lingo_coordination_seconds", "End-to-end coordination latency")
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        )?;

        registry.register(Box::new(coordinations.clone()))?;
        registry.register(Box::new(degraded.clone()))?;
        registry.register(Box::new(rejected.clone()))?;
        registry.register(Box::new(latency.clone()))?;

        Ok(Self {
            registry,
            coordinations,
            degraded,
            rejected,
            latency,
        })
    }

    pub fn observe(&self, result: &CoordinationResult) {
        self.coordinations
            .with_label_values(&[result.execution_type.as_str()])
            .inc();
        if result.degraded {
            self.degraded.inc();
        }
        self.latency.observe(result.elapsed_ms as f64 / 1000.0);
    }

    pub fn reject(&self) {
        self.rejected.inc();
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        encode(&self.registry)
    }
}

pub fn encode(registry: &Registry) -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).to_string())
}
