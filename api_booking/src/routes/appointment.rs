use actix_web::{Responder, post, web};
use common::{error::Res, http::Success, tenant::TenantContext};
use db::{SharedStore, dtos::booking::AppointmentCreateRequest};

/// Books an appointment. Counts against `appointments_per_month`.
///
/// # Input
/// - `req`: `{ customer_name, customer_phone?, service_name, starts_at }`
///
/// # Output
/// - Success: 201 with the stored appointment
/// - Error: 402 `usage_limit_exceeded` once this month's allowance is used up
#[post("")]
pub async fn post_appointment(
    ctx: web::ReqData<TenantContext>,
    req: web::Json<AppointmentCreateRequest>,
    store: web::Data<SharedStore>,
) -> Res<impl Responder> {
    let appointment = store
        .create_appointment(ctx.tenant_id, req.into_inner())
        .await?;
    log::debug!(
        "Tenant {} booked appointment {}",
        ctx.tenant_id,
        appointment.id
    );
    Success::created(appointment)
}
