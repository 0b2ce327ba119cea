use std::sync::Arc;

use actix_web::{Responder, get, post, web};
use common::{env_config::Config, error::Res, http::Success, razorpay, tenant::TenantContext};
use db::SharedStore;

use crate::{
    dtos::sub::{SubscriptionCreateRequest, SubscriptionPlansResponse, SubscriptionResponse},
    services,
};

/// Lists the plan catalog. Public.
///
/// # Output
/// - Success: `{ "plans": [...] }`, prices in paise, `null` limits are unlimited
///
/// # Frontend Example
/// ```javascript
/// const { plans } = await (await fetch('/api/plans')).json();
/// // plans[1] = { id: "professional", name: "Professional", price: 99900,
/// //              currency: "INR", interval: "month", features: [...], ... }
/// ```
#[get("")]
pub async fn get_plans() -> Res<impl Responder> {
    let plans = services::sub::get_subscription_plans();
    Success::ok(SubscriptionPlansResponse { plans })
}

/// Starts a Razorpay subscription for the caller's tenant.
///
/// # Input
/// - `ctx`: tenant resolved by the auth middleware
/// - `req`: `{ "plan": "professional" | "enterprise", "total_count"?: number }`
///
/// # Output
/// - Success: 201 `{ "subscription_id": "sub_...", "short_url": "https://rzp.io/..." }`
/// - Error: 400 for the free plan, 500 when the tier has no provider plan
///
/// The tenant is entitled only once the `subscription.activated` webhook lands.
#[post("/subscribe")]
pub async fn post_subscribe(
    ctx: web::ReqData<TenantContext>,
    req: web::Json<SubscriptionCreateRequest>,
    config: web::Data<Arc<Config>>,
    store: web::Data<SharedStore>,
) -> Res<impl Responder> {
    let client = razorpay::create_client();
    let created = services::sub::create_subscription(
        &client,
        store.get_ref().as_ref(),
        &config.razorpay,
        ctx.tenant_id,
        &req,
    )
    .await?;

    Success::created(SubscriptionResponse {
        subscription_id: created.id,
        short_url: created.short_url,
    })
}
