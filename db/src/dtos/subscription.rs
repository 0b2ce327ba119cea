use catalog::{Plan, SubscriptionStatus};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Desired state of a subscription row, applied by external id.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionUpsert {
    pub tenant_id: Uuid,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub external_subscription_id: String,
    pub provider_plan_id: Option<String>,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
}
