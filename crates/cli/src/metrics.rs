//! Metrics registry of the terminal client.
//!
//! Registers the core coordinator and REST client metrics plus a command
//! counter, and renders them in the Prometheus text format for the `metrics`
//! command.

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Commands entered, by name.
pub static COMMANDS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bdtheque_cli_commands_total", "Total commands entered"),
        &["command"],
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    registry.register(Box::new(COMMANDS_TOTAL.clone())).unwrap();

    for metric in bdtheque_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}
