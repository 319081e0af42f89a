use tracing::trace;

// Counters are emitted as trace events; no recorder is installed.

pub fn inc_requests(route: &'static str) {
    trace!(
        target = "intake.metrics",
        route = route,
        "requests_total_inc"
    );
}

pub fn inc_outcome(outcome: &'static str) {
    trace!(
        target = "intake.metrics",
        outcome = outcome,
        "write_outcomes_total_inc"
    );
}

pub fn upstream_elapsed(call: &'static str, elapsed_ms: u128) {
    trace!(
        target = "intake.metrics",
        call = call,
        elapsed_ms = elapsed_ms as u64,
        "upstream_elapsed"
    );
}
