use std::sync::Arc;

use actix_web::{HttpRequest, Responder, post, web};
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Success,
    razorpay,
};
use db::SharedStore;

use crate::{
    dtos::webhook::WebhookEvent,
    services::{self, webhook::WebhookOutcome},
};

/// Handles Razorpay subscription webhooks.
///
/// # Input
/// - `payload`: raw request body, exactly as signed
/// - `req`: carries the `X-Razorpay-Signature` header
/// - `config`: holds the webhook secret and provider plan ids
///
/// # Output
/// - Success: 200 `{"status":"ok"}`, also for events we don't handle
/// - Error: 400 for a missing or invalid signature or an unmappable payload,
///   404 when the tenant in the notes does not exist
///
/// # Note
/// Called by Razorpay, never by the frontend. Configure
/// `https://<host>/api/pay/webhook` in the Razorpay dashboard and put its
/// secret in `RAZORPAY_WEBHOOK_SECRET`.
#[post("/webhook")]
pub async fn post_webhook(
    payload: web::Bytes,
    req: HttpRequest,
    config: web::Data<Arc<Config>>,
    store: web::Data<SharedStore>,
) -> Res<impl Responder> {
    let signature = req
        .headers()
        .get(razorpay::SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Razorpay signature missing".to_string()))?;

    razorpay::verify_signature(&payload, signature, &config.razorpay.webhook_secret)?;

    let event: WebhookEvent = serde_json::from_slice(&payload)
        .map_err(|e| AppError::BadRequest(format!("Malformed webhook payload: {}", e)))?;

    if let WebhookOutcome::Ignored(name) =
        services::webhook::process_event(store.get_ref().as_ref(), &config.razorpay, event).await?
    {
        log::debug!("Acknowledged unhandled webhook {}", name);
    }

    Success::ok(serde_json::json!({ "status": "ok" }))
}
