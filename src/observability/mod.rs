//! Observability subsystem.
//!
//! Structured logging goes through `tracing` (initialized in `main`);
//! this module holds the optional Prometheus metrics exporter and the
//! per-request recording helpers.

pub mod metrics;
