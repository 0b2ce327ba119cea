use catalog::{Plan, SubscriptionPlan};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SubscriptionCreateRequest {
    pub plan: Plan,
    /// Billing cycles to charge before the subscription completes.
    #[serde(default = "default_total_count")]
    pub total_count: u32,
}

fn default_total_count() -> u32 {
    12
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub subscription_id: String,
    pub short_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionPlansResponse {
    pub plans: Vec<SubscriptionPlan>,
}
