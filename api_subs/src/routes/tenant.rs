use actix_web::{HttpRequest, HttpResponse, get, web};
use chrono::Utc;
use common::{error, tenant::TenantContext};
use db::SharedStore;

use crate::services;

/// Entitlements of the caller's tenant.
///
/// # Output
/// - Success: the `Entitlements` object (plan, status, features, limits, usage)
/// - Error: 402 `{ "reason": "unauthenticated" | "plan_required", "upgrade_url" }`
///
/// # Frontend Example
/// ```javascript
/// const ent = await (await fetch('/api/v1/tenants/current', {
///   headers: { 'Authorization': `Bearer ${session.access_token}` }
/// })).json();
/// if (ent.features.voice_commands) { showMicButton(); }
/// ```
#[get("/current")]
pub async fn get_current(
    req: HttpRequest,
    ctx: web::ReqData<TenantContext>,
    store: web::Data<SharedStore>,
) -> HttpResponse {
    match services::entitlements::resolve(store.get_ref().as_ref(), ctx.tenant_id, Utc::now())
        .await
    {
        Ok(entitlements) => HttpResponse::Ok().json(entitlements),
        Err(err) => error::respond(&req, &err),
    }
}
