use biometrics::{Collector, Counter, Moments};

pub(crate) static GATEWAY_REQUESTS: Counter = Counter::new("snoochat.gateway.requests");
pub(crate) static GATEWAY_REQUEST_ERRORS: Counter =
    Counter::new("snoochat.gateway.request_errors");
pub(crate) static GATEWAY_REQUEST_DURATION: Moments =
    Moments::new("snoochat.gateway.request_duration_seconds");
pub(crate) static GATEWAY_DOWNLOADS: Counter = Counter::new("snoochat.gateway.downloads");

pub(crate) static SESSION_SENDS: Counter = Counter::new("snoochat.session.sends");
pub(crate) static SESSION_FAILURES: Counter = Counter::new("snoochat.session.failures");
pub(crate) static SESSION_CANCELLED: Counter = Counter::new("snoochat.session.cancelled");
pub(crate) static SESSION_DRAFTS_RETRACTED: Counter =
    Counter::new("snoochat.session.drafts_retracted");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&GATEWAY_REQUESTS);
    collector.register_counter(&GATEWAY_REQUEST_ERRORS);
    collector.register_moments(&GATEWAY_REQUEST_DURATION);
    collector.register_counter(&GATEWAY_DOWNLOADS);

    collector.register_counter(&SESSION_SENDS);
    collector.register_counter(&SESSION_FAILURES);
    collector.register_counter(&SESSION_CANCELLED);
    collector.register_counter(&SESSION_DRAFTS_RETRACTED);
}
