use std::sync::Once;
use std::time::Duration;

use metrics::{Unit, counter, describe_counter, describe_histogram, histogram};

static REGISTER_METRICS: Once = Once::new();

pub const CRUD_AUTHORIZATION_CHECKS_TOTAL: &str = "crud_authorization_checks_total";
pub const CRUD_K8S_REQUESTS_TOTAL: &str = "crud_k8s_requests_total";
pub const CRUD_K8S_REQUEST_DURATION_SECONDS: &str = "crud_k8s_request_duration_seconds";
pub const DECISION: &str = "decision";
pub const VERB: &str = "verb";
pub const RESOURCE: &str = "resource";
pub const OUTCOME: &str = "outcome";

/// Registers the metrics emitted by the operation layer. Safe to call more
/// than once, the descriptions are only registered the first time.
pub fn register_metrics() {
    REGISTER_METRICS.call_once(|| {
        describe_counter!(
            CRUD_AUTHORIZATION_CHECKS_TOTAL,
            Unit::Count,
            "Total number of authorization checks, by decision (allowed, denied, bypassed)"
        );

        describe_counter!(
            CRUD_K8S_REQUESTS_TOTAL,
            Unit::Count,
            "Total number of calls sent to the kubernetes api, by verb, resource and outcome"
        );

        describe_histogram!(
            CRUD_K8S_REQUEST_DURATION_SECONDS,
            Unit::Seconds,
            "Time taken in seconds by a call to the kubernetes api"
        );
    });
}

pub(crate) fn record_authorization(decision: &'static str) {
    counter!(CRUD_AUTHORIZATION_CHECKS_TOTAL, DECISION => decision).increment(1);
}

pub(crate) fn record_k8s_request(
    verb: &'static str,
    resource: &'static str,
    outcome: &'static str,
    elapsed: Duration,
) {
    counter!(CRUD_K8S_REQUESTS_TOTAL, VERB => verb, RESOURCE => resource, OUTCOME => outcome)
        .increment(1);
    histogram!(CRUD_K8S_REQUEST_DURATION_SECONDS, VERB => verb, RESOURCE => resource)
        .record(elapsed.as_secs_f64());
}
