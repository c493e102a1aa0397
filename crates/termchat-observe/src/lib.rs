//! Observability setup for termchat: structured logging through `tracing`
//! with optional OpenTelemetry span export.

pub mod tracing_setup;
