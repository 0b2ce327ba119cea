use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::subscription::SubscriptionUpsert,
    models::subscription::{UserSubscription, UserSubscriptionRow},
};

/// Returns the active row if there is one, otherwise the most recently touched row.
pub async fn get_current_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    tenant_id: Uuid,
) -> Res<Option<UserSubscription>> {
    let row = sqlx::query_as::<_, UserSubscriptionRow>(
        r#"
        SELECT * FROM user_subscriptions
        WHERE tenant_id = $1
        ORDER BY (status = 'active') DESC, updated_at DESC
        LIMIT 1
        "#,
    )
    .bind(tenant_id)
    .fetch_optional(executor)
    .await?;

    row.map(UserSubscription::try_from).transpose()
}

/// Cancels every other active row of the tenant so a new one can become active.
pub async fn cancel_other_active<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    tenant_id: Uuid,
    keep_external_id: &str,
) -> Res<u64> {
    sqlx::query(
        r#"
        UPDATE user_subscriptions
        SET status = 'canceled', updated_at = NOW()
        WHERE tenant_id = $1 AND status = 'active' AND external_subscription_id <> $2
        "#,
    )
    .bind(tenant_id)
    .bind(keep_external_id)
    .execute(executor)
    .await
    .map(|res| res.rows_affected())
    .map_err(AppError::from)
}

/// Inserts or updates the row keyed by `external_subscription_id`.
///
/// The owning tenant of an existing row never changes; period bounds missing
/// from `data` keep their stored values.
pub async fn upsert_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: &SubscriptionUpsert,
) -> Res<UserSubscription> {
    let row = sqlx::query_as::<_, UserSubscriptionRow>(
        r#"
        INSERT INTO user_subscriptions
            (tenant_id, plan, status, external_subscription_id, provider_plan_id,
             current_period_start, current_period_end)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (external_subscription_id) DO UPDATE SET
            plan = EXCLUDED.plan,
            status = EXCLUDED.status,
            provider_plan_id = COALESCE(EXCLUDED.provider_plan_id, user_subscriptions.provider_plan_id),
            current_period_start = COALESCE(EXCLUDED.current_period_start, user_subscriptions.current_period_start),
            current_period_end = COALESCE(EXCLUDED.current_period_end, user_subscriptions.current_period_end),
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(data.tenant_id)
    .bind(data.plan.as_str())
    .bind(data.status.as_str())
    .bind(&data.external_subscription_id)
    .bind(&data.provider_plan_id)
    .bind(data.current_period_start)
    .bind(data.current_period_end)
    .fetch_one(executor)
    .await?;

    UserSubscription::try_from(row)
}
