//! Prometheus metrics for the event bus

use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_int_gauge, CounterVec, IntGauge};

lazy_static! {
    /// Total events published
    pub static ref EVENT_PUBLISH_TOTAL: CounterVec = register_counter_vec!(
        "kindness_events_publish_total",
        "Total events published",
        &["event_kind"]
    )
    .unwrap();

    /// Total handler deliveries
    pub static ref EVENT_DELIVERY_TOTAL: CounterVec = register_counter_vec!(
        "kindness_events_delivery_total",
        "Total handler deliveries by outcome",
        &["event_kind", "status"]
    )
    .unwrap();

    /// Currently registered subscribers
    pub static ref SUBSCRIBERS_ACTIVE: IntGauge = register_int_gauge!(
        "kindness_events_subscribers_active",
        "Currently registered subscribers"
    )
    .unwrap();
}
