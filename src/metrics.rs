//! Gauges republished from the latest measurement.

use prometheus::{Gauge, Registry, TextEncoder, register_gauge_with_registry};

use crate::ttn::Measurement;

/// Owns the registry served on `/metrics` and the gauges written by the exporter loop.
///
/// Clones share the same underlying gauges.
#[derive(Clone)]
pub struct ExporterMetrics {
    pub temperature: Gauge,
    pub battery: Gauge,
    pub light: Gauge,
    registry: Registry,
}

impl ExporterMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let temperature = register_gauge_with_registry!(
            "ttn_node_temperature_celsius",
            "Current ambient temperature.",
            registry
        )?;

        let battery = register_gauge_with_registry!(
            "ttn_node_battery_level",
            "Current battery level.",
            registry
        )?;

        let light = register_gauge_with_registry!(
            "ttn_node_light_level",
            "Current light level.",
            registry
        )?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            temperature,
            battery,
            light,
            registry,
        })
    }

    pub fn observe(&self, measurement: &Measurement) {
        self.battery.set(measurement.battery as f64);
        self.temperature.set(measurement.temperature);
        self.light.set(measurement.light as f64);
    }

    /// Leaves temperature and light at their previous values.
    pub fn zero_battery(&self) {
        self.battery.set(0.0);
    }

    /// Text exposition of everything in the registry.
    pub fn encode(&self) -> prometheus::Result<String> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gauges_start_at_zero_and_are_exposed_with_help() {
        let metrics = ExporterMetrics::new().unwrap();

        let text = metrics.encode().unwrap();

        assert!(
            text.contains("# HELP ttn_node_temperature_celsius Current ambient temperature.\n")
        );
        assert!(text.contains("# TYPE ttn_node_temperature_celsius gauge\n"));
        assert!(text.contains("# HELP ttn_node_battery_level Current battery level.\n"));
        assert!(text.contains("# HELP ttn_node_light_level Current light level.\n"));
        assert!(text.contains("\nttn_node_battery_level 0\n"));
        assert!(text.contains("\nttn_node_temperature_celsius 0\n"));
        assert!(text.contains("\nttn_node_light_level 0\n"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn process_metrics_are_exposed() {
        let metrics = ExporterMetrics::new().unwrap();

        assert!(metrics.encode().unwrap().contains("process_start_time_seconds"));
    }

    #[test]
    fn observe_overwrites_all_three_gauges() {
        let metrics = ExporterMetrics::new().unwrap();

        metrics.observe(&Measurement {
            battery: 80,
            temperature: 21.5,
            light: 300,
            ..Default::default()
        });
        metrics.observe(&Measurement {
            battery: 77,
            temperature: -3.25,
            light: 12,
            ..Default::default()
        });

        assert_eq!(metrics.battery.get(), 77.0);
        assert_eq!(metrics.temperature.get(), -3.25);
        assert_eq!(metrics.light.get(), 12.0);

        let text = metrics.encode().unwrap();
        assert!(text.contains("\nttn_node_temperature_celsius -3.25\n"));
    }

    #[test]
    fn zero_battery_keeps_other_gauges() {
        let metrics = ExporterMetrics::new().unwrap();
        metrics.observe(&Measurement {
            battery: 80,
            temperature: 21.5,
            light: 300,
            ..Default::default()
        });

        metrics.zero_battery();

        assert_eq!(metrics.battery.get(), 0.0);
        assert_eq!(metrics.temperature.get(), 21.5);
        assert_eq!(metrics.light.get(), 300.0);
    }

    #[test]
    fn clones_share_gauges() {
        let metrics = ExporterMetrics::new().unwrap();
        let reader = metrics.clone();

        metrics.battery.set(42.0);

        assert_eq!(reader.battery.get(), 42.0);
        assert!(reader.encode().unwrap().contains("\nttn_node_battery_level 42\n"));
    }
}
