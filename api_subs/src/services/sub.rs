use catalog::{Plan, SubscriptionPlan, SubscriptionStatus};
use common::{
    env_config::RazorpayConfig,
    error::{AppError, Res},
    razorpay::{self, CreateSubscription, CreatedSubscription, SubscriptionNotes},
};
use db::{Store, dtos::subscription::SubscriptionUpsert};
use uuid::Uuid;

use crate::dtos::sub::SubscriptionCreateRequest;

/// Active catalog entries, cheapest first.
pub fn get_subscription_plans() -> Vec<SubscriptionPlan> {
    Plan::catalog().into_iter().filter(|plan| plan.active).collect()
}

/// Checks the requested tier can be bought and returns its provider plan id.
pub fn provider_plan_for<'a>(config: &'a RazorpayConfig, plan: Plan) -> Res<&'a str> {
    if plan == Plan::Free {
        return Err(AppError::BadRequest(
            "The free plan needs no subscription".to_string(),
        ));
    }
    config.provider_id_for_plan(plan).ok_or_else(|| {
        log::error!("No Razorpay plan configured for {}", plan);
        AppError::Internal(format!("Plan {} is not purchasable", plan))
    })
}

/// Creates the provider subscription and records it as `created` so the
/// webhook deliveries that follow find the row.
pub async fn create_subscription(
    client: &reqwest::Client,
    store: &dyn Store,
    config: &RazorpayConfig,
    tenant_id: Uuid,
    req: &SubscriptionCreateRequest,
) -> Res<CreatedSubscription> {
    let provider_plan_id = provider_plan_for(config, req.plan)?;
    if req.total_count == 0 {
        return Err(AppError::BadRequest(
            "total_count must be at least 1".to_string(),
        ));
    }

    let params = CreateSubscription {
        plan_id: provider_plan_id,
        total_count: req.total_count,
        customer_notify: 1,
        notes: SubscriptionNotes {
            tenant_id: Some(tenant_id.to_string()),
            plan: Some(req.plan.as_str().to_string()),
        },
    };
    let created = razorpay::create_subscription(client, config, &params).await?;

    store
        .upsert_subscription(&SubscriptionUpsert {
            tenant_id,
            plan: req.plan,
            status: SubscriptionStatus::Created,
            external_subscription_id: created.id.clone(),
            provider_plan_id: Some(provider_plan_id.to_string()),
            current_period_start: None,
            current_period_end: None,
        })
        .await?;

    log::info!(
        "Tenant {} started checkout for {} ({})",
        tenant_id,
        req.plan,
        created.id
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_keeps_catalog_order() {
        let plans: Vec<Plan> = get_subscription_plans().iter().map(|p| p.id).collect();
        assert_eq!(plans, vec![Plan::Free, Plan::Professional, Plan::Enterprise]);
    }

    #[test]
    fn free_and_unconfigured_plans_cannot_be_bought() {
        let config = RazorpayConfig {
            professional_plan_id: "plan_pro".into(),
            ..Default::default()
        };
        assert!(matches!(
            provider_plan_for(&config, Plan::Free),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            provider_plan_for(&config, Plan::Enterprise),
            Err(AppError::Internal(_))
        ));
        assert_eq!(provider_plan_for(&config, Plan::Professional).unwrap(), "plan_pro");
    }
}
