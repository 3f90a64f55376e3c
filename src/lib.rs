pub mod exporter;
pub mod metrics;
pub mod server;
pub mod ttn;
