//! Metrics registry wiring for the server.

use prometheus::{Encoder, Registry, TextEncoder};

/// Build a registry with all core metrics registered.
pub fn build_registry() -> Result<Registry, prometheus::Error> {
    let registry = Registry::new();
    for metric in binder_core::metrics::all_metrics() {
        registry.register(metric)?;
    }
    Ok(registry)
}

/// Render the registry in the Prometheus text format.
pub fn render(registry: &Registry) -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder.encode(&registry.gather(), &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_renders_core_metrics() {
        let registry = build_registry().unwrap();
        binder_core::metrics::SEARCH_QUERIES.inc();

        let text = render(&registry);
        assert!(text.contains("binder_search_queries_total"));
    }
}
