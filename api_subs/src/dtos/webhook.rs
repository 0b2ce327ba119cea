use serde::Deserialize;

/// Envelope of a Razorpay webhook delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub payload: WebhookPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub subscription: Option<EntityWrapper<SubscriptionEntity>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntityWrapper<T> {
    pub entity: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionEntity {
    pub id: String,
    #[serde(default)]
    pub plan_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub current_start: Option<i64>,
    #[serde(default)]
    pub current_end: Option<i64>,
    /// Object when notes were set at creation, empty array otherwise.
    #[serde(default)]
    pub notes: serde_json::Value,
}

impl SubscriptionEntity {
    pub fn note(&self, key: &str) -> Option<&str> {
        self.notes.get(key).and_then(|v| v.as_str())
    }
}
