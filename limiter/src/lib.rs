use catalog::{Feature, Limit};
use middleware::{
    gate::{EntitlementGate, Gate},
    global::GlobalLimiter,
};

pub mod middleware {
    pub mod gate;
    pub mod global;
}

pub use middleware::gate::check;

pub fn global_middleware(permits_per_second: u32) -> GlobalLimiter {
    GlobalLimiter::new(permits_per_second)
}

/// Lets the request through only while the tenant holds an active paid subscription.
pub fn require_subscription() -> EntitlementGate {
    EntitlementGate::new(Gate::Subscription)
}

/// Same as [`require_subscription`], and the tenant's plan must also include `feature`.
pub fn require_entitlement(feature: Feature) -> EntitlementGate {
    EntitlementGate::new(Gate::Feature(feature))
}

/// Lets the request through only while usage of `limit` is below the plan ceiling.
pub fn require_usage(limit: Limit) -> EntitlementGate {
    EntitlementGate::new(Gate::Usage(limit))
}
