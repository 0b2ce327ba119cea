use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::tenant::Tenant;

pub async fn get_tenant_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    tenant_id: Uuid,
) -> Res<Option<Tenant>> {
    sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
        .bind(tenant_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_tenant_id_by_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<Uuid>> {
    sqlx::query_scalar::<_, Uuid>("SELECT tenant_id FROM tenant_members WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

/// Scopes the surrounding transaction to `tenant_id` for row-level security.
pub async fn set_tenant_context<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    tenant_id: Uuid,
) -> Res<()> {
    sqlx::query("SELECT set_config('app.current_tenant_id', $1, true)")
        .bind(tenant_id.to_string())
        .execute(executor)
        .await?;
    Ok(())
}
