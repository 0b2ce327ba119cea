use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentCreateRequest {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub service_name: String,
    pub starts_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaffCreateRequest {
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceCreateRequest {
    pub name: String,
    pub duration_minutes: i32,
    #[serde(default)]
    pub price: i64,
}
