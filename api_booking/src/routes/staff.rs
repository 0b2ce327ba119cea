use actix_web::{Responder, post, web};
use common::{error::Res, http::Success, tenant::TenantContext};
use db::{SharedStore, dtos::booking::StaffCreateRequest};

/// Adds a staff member. Counts against `staff_members`.
#[post("")]
pub async fn post_staff(
    ctx: web::ReqData<TenantContext>,
    req: web::Json<StaffCreateRequest>,
    store: web::Data<SharedStore>,
) -> Res<impl Responder> {
    let member = store
        .create_staff_member(ctx.tenant_id, req.into_inner())
        .await?;
    Success::created(member)
}
