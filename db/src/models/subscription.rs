use catalog::{Plan, SubscriptionStatus};
use chrono::{DateTime, Utc};
use common::error::AppError;
use serde::Serialize;
use uuid::Uuid;

/// Raw row of `user_subscriptions`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserSubscriptionRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub plan: String,
    pub status: String,
    pub external_subscription_id: String,
    pub provider_plan_id: Option<String>,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tenant's subscription to a plan, keyed by the billing provider's id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSubscription {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub external_subscription_id: String,
    pub provider_plan_id: Option<String>,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserSubscriptionRow> for UserSubscription {
    type Error = AppError;

    fn try_from(row: UserSubscriptionRow) -> Result<Self, Self::Error> {
        let plan = row
            .plan
            .parse()
            .map_err(|e| AppError::Internal(format!("Subscription {}: {}", row.id, e)))?;
        let status = row
            .status
            .parse()
            .map_err(|e| AppError::Internal(format!("Subscription {}: {}", row.id, e)))?;
        Ok(UserSubscription {
            id: row.id,
            tenant_id: row.tenant_id,
            plan,
            status,
            external_subscription_id: row.external_subscription_id,
            provider_plan_id: row.provider_plan_id,
            current_period_start: row.current_period_start,
            current_period_end: row.current_period_end,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
