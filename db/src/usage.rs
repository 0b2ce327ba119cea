use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

pub async fn count_appointments_since<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    tenant_id: Uuid,
    since: DateTime<Utc>,
) -> Res<u64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM appointments WHERE tenant_id = $1 AND created_at >= $2",
    )
    .bind(tenant_id)
    .bind(since)
    .fetch_one(executor)
    .await
    .map(|count| count.max(0) as u64)
    .map_err(AppError::from)
}

pub async fn count_staff_members<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    tenant_id: Uuid,
) -> Res<u64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM staff_members WHERE tenant_id = $1")
        .bind(tenant_id)
        .fetch_one(executor)
        .await
        .map(|count| count.max(0) as u64)
        .map_err(AppError::from)
}

pub async fn count_services<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    tenant_id: Uuid,
) -> Res<u64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM services WHERE tenant_id = $1")
        .bind(tenant_id)
        .fetch_one(executor)
        .await
        .map(|count| count.max(0) as u64)
        .map_err(AppError::from)
}
