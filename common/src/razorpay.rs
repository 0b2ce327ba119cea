//! Thin Razorpay helpers: webhook signature checks and subscription creation.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{
    env_config::RazorpayConfig,
    error::{AppError, Res},
};

type HmacSha256 = Hmac<Sha256>;

/// Header Razorpay signs webhook deliveries with.
pub const SIGNATURE_HEADER: &str = "X-Razorpay-Signature";

/// Verifies a hex encoded HMAC-SHA256 of `payload` in constant time.
pub fn verify_signature(payload: &[u8], signature: &str, secret: &str) -> Res<()> {
    if secret.is_empty() {
        return Err(AppError::Internal(
            "Webhook secret is not configured".to_string(),
        ));
    }
    let expected = hex::decode(signature.trim())
        .map_err(|_| AppError::BadRequest("Malformed webhook signature".to_string()))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid webhook secret: {}", e)))?;
    mac.update(payload);
    mac.verify_slice(&expected)
        .map_err(|_| AppError::BadRequest("Invalid webhook signature".to_string()))
}

/// Hex HMAC-SHA256 of `payload`, the value Razorpay puts in [`SIGNATURE_HEADER`].
pub fn sign(payload: &[u8], secret: &str) -> Res<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid webhook secret: {}", e)))?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[derive(Debug, Serialize)]
pub struct CreateSubscription<'a> {
    pub plan_id: &'a str,
    pub total_count: u32,
    pub customer_notify: u8,
    pub notes: SubscriptionNotes,
}

/// Free-form notes echoed back on every webhook for the subscription.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriptionNotes {
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatedSubscription {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub short_url: Option<String>,
}

pub fn create_client() -> reqwest::Client {
    reqwest::Client::new()
}

/// Creates a subscription through the Razorpay REST API.
pub async fn create_subscription(
    client: &reqwest::Client,
    config: &RazorpayConfig,
    params: &CreateSubscription<'_>,
) -> Res<CreatedSubscription> {
    let url = format!("{}/subscriptions", config.api_url.trim_end_matches('/'));
    let res = client
        .post(&url)
        .basic_auth(&config.key_id, Some(&config.key_secret))
        .json(params)
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        log::error!("Razorpay rejected subscription creation ({}): {}", status, body);
        return Err(AppError::Internal(format!(
            "Billing provider responded with {}",
            status
        )));
    }

    res.json::<CreatedSubscription>()
        .await
        .map_err(AppError::from)
}
