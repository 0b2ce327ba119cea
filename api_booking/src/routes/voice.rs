use actix_web::{Responder, post, web};
use common::{
    error::{AppError, Res},
    http::Success,
    tenant::TenantContext,
};

use crate::dtos::voice::{VoiceCommandRequest, VoiceCommandResponse, VoiceIntent};

/// Accepts a voice command for asynchronous handling. Requires `voice_commands`.
///
/// # Input
/// - `req`: `{ "transcript": "book a haircut tomorrow at 5", "locale"?: "en-IN" }`
///
/// # Output
/// - Success: 202 `{ "accepted": true, "intent": "book", "transcript": ... }`
/// - Error: 402 `plan_required` without an active subscription,
///   `feature_not_entitled` on plans without voice commands
#[post("/commands")]
pub async fn post_command(
    ctx: web::ReqData<TenantContext>,
    req: web::Json<VoiceCommandRequest>,
) -> Res<impl Responder> {
    let transcript = req.transcript.trim();
    if transcript.is_empty() {
        return Err(AppError::BadRequest("Transcript is empty".to_string()));
    }

    let intent = VoiceIntent::classify(transcript);
    log::info!(
        "Tenant {} voice command ({}): {:?}",
        ctx.tenant_id,
        req.locale.as_deref().unwrap_or("en"),
        intent
    );

    Success::accepted(VoiceCommandResponse {
        accepted: true,
        intent,
        transcript: transcript.to_string(),
    })
}
