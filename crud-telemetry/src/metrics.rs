use std::{sync::Mutex, time::Duration};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::trace;

/// Interval between two upkeep runs of the Prometheus recorder.
const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

// A mutex rather than a `OnceLock` because installing the recorder is fallible
// and `OnceLock::get_or_try_init` is unstable. Installing twice fails, and tests
// spawn many servers in the same process.
static PROMETHEUS_HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// Installs the global Prometheus recorder and returns a handle to render it.
///
/// Safe to call more than once: later callers receive a clone of the first
/// handle. Must be called from within a tokio runtime, since a background
/// task runs upkeep on the recorder to keep its memory bounded.
pub fn init_metrics_handle() -> Result<PrometheusHandle, BuildError> {
    let mut prometheus_handle = PROMETHEUS_HANDLE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(handle) = &*prometheus_handle {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    *prometheus_handle = Some(handle.clone());

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(UPKEEP_INTERVAL).await;
            trace!("running metrics upkeep");
            upkeep_handle.run_upkeep();
        }
    });

    Ok(handle)
}
