use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct RequestLog {
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub path: String,
    pub status_code: i32,
    pub tenant_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub elapsed_ms: i64,
    pub ip_address: String,
    pub user_agent: String,
}
