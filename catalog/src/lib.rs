//! Plans, features, limits and the derived entitlements view.
//!
//! Everything in here is plain data: no I/O, no clocks. The server resolves
//! an [`Entitlements`] value per request and the client caches the same type.

pub mod entitlements;
pub mod plan;
pub mod status;

pub use entitlements::{Entitlements, LimitCheck, UsageMeter};
pub use plan::{BillingInterval, Feature, Limit, Plan, SubscriptionPlan};
pub use status::SubscriptionStatus;

/// Error returned when a string does not name a known catalog value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}
