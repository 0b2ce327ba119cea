use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};

use crate::models::log::RequestLog;

pub async fn insert_log<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    log: &RequestLog,
) -> Res<()> {
    sqlx::query(
        "INSERT INTO request_logs (timestamp, method, path, status_code, tenant_id, user_id, elapsed_ms, ip_address, user_agent)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(log.timestamp)
    .bind(&log.method)
    .bind(&log.path)
    .bind(log.status_code)
    .bind(log.tenant_id)
    .bind(log.user_id)
    .bind(log.elapsed_ms)
    .bind(&log.ip_address)
    .bind(&log.user_agent)
    .execute(executor)
    .await
    .map_err(AppError::from)?;

    Ok(())
}
