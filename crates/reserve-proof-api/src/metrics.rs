use std::time::Duration;

use metrics::{
    counter,
    describe_counter,
    describe_gauge,
    describe_histogram,
    gauge,
    histogram,
    Counter,
    Gauge,
    Histogram,
    Unit,
};
use telemetry::metric_name;

pub(crate) struct Metrics {
    committed_accounts: Gauge,
    root_requests: Counter,
    proof_requests: Counter,
    proof_request_rejections: Counter,
    proof_generation_failures: Counter,
    proof_generation_latency: Histogram,
}

impl Metrics {
    #[must_use]
    pub(crate) fn new() -> Self {
        describe_gauge!(
            COMMITTED_ACCOUNTS,
            Unit::Count,
            "The number of accounts committed to by the merkle root"
        );
        let committed_accounts = gauge!(COMMITTED_ACCOUNTS);

        describe_counter!(
            ROOT_REQUESTS,
            Unit::Count,
            "The number of requests for the merkle root"
        );
        let root_requests = counter!(ROOT_REQUESTS);

        describe_counter!(
            PROOF_REQUESTS,
            Unit::Count,
            "The number of requests for a merkle proof"
        );
        let proof_requests = counter!(PROOF_REQUESTS);

        describe_counter!(
            PROOF_REQUEST_REJECTIONS,
            Unit::Count,
            "The number of proof requests for a malformed or unknown user id"
        );
        let proof_request_rejections = counter!(PROOF_REQUEST_REJECTIONS);

        describe_counter!(
            PROOF_GENERATION_FAILURES,
            Unit::Count,
            "The number of times a proof could not be generated for a known user"
        );
        let proof_generation_failures = counter!(PROOF_GENERATION_FAILURES);

        describe_histogram!(
            PROOF_GENERATION_LATENCY,
            Unit::Seconds,
            "The time it takes to rebuild the tree and generate a proof"
        );
        let proof_generation_latency = histogram!(PROOF_GENERATION_LATENCY);

        Self {
            committed_accounts,
            root_requests,
            proof_requests,
            proof_request_rejections,
            proof_generation_failures,
            proof_generation_latency,
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "precision loss is irrelevant for the number of committed accounts"
    )]
    pub(crate) fn set_committed_accounts(&self, count: usize) {
        self.committed_accounts.set(count as f64);
    }

    pub(crate) fn increment_root_requests(&self) {
        self.root_requests.increment(1);
    }

    pub(crate) fn increment_proof_requests(&self) {
        self.proof_requests.increment(1);
    }

    pub(crate) fn increment_proof_request_rejections(&self) {
        self.proof_request_rejections.increment(1);
    }

    pub(crate) fn increment_proof_generation_failures(&self) {
        self.proof_generation_failures.increment(1);
    }

    pub(crate) fn record_proof_generation_latency(&self, latency: Duration) {
        self.proof_generation_latency.record(latency);
    }
}

metric_name!(pub const COMMITTED_ACCOUNTS);
metric_name!(pub const ROOT_REQUESTS);
metric_name!(pub const PROOF_REQUESTS);
metric_name!(pub const PROOF_REQUEST_REJECTIONS);
metric_name!(pub const PROOF_GENERATION_FAILURES);
metric_name!(pub const PROOF_GENERATION_LATENCY);

#[cfg(test)]
mod tests {
    use super::{
        COMMITTED_ACCOUNTS,
        PROOF_GENERATION_FAILURES,
        PROOF_GENERATION_LATENCY,
        PROOF_REQUESTS,
        PROOF_REQUEST_REJECTIONS,
        ROOT_REQUESTS,
    };

    #[track_caller]
    fn assert_const(actual: &'static str, suffix: &str) {
        // XXX: hard-code this so the crate name isn't accidentally changed.
        const CRATE_NAME: &str = "reserve_proof_api";
        let expected = format!("{CRATE_NAME}_{suffix}");
        assert_eq!(expected, actual);
    }

    #[test]
    fn metrics_are_as_expected() {
        assert_const(COMMITTED_ACCOUNTS, "committed_accounts");
        assert_const(ROOT_REQUESTS, "root_requests");
        assert_const(PROOF_REQUESTS, "proof_requests");
        assert_const(PROOF_REQUEST_REJECTIONS, "proof_request_rejections");
        assert_const(PROOF_GENERATION_FAILURES, "proof_generation_failures");
        assert_const(PROOF_GENERATION_LATENCY, "proof_generation_latency");
    }
}
