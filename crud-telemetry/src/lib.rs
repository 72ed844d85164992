//! Logging and metrics setup shared by the web apps and tools.

pub mod metrics;
pub mod tracing;

pub use tracing::{LogFlusher, TracingError, init_test_tracing, init_tracing};
