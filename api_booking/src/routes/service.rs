use actix_web::{Responder, post, web};
use common::{
    error::{AppError, Res},
    http::Success,
    tenant::TenantContext,
};
use db::{SharedStore, dtos::booking::ServiceCreateRequest};

/// Adds a bookable service to the tenant's menu. Counts against `services`.
#[post("")]
pub async fn post_service(
    ctx: web::ReqData<TenantContext>,
    req: web::Json<ServiceCreateRequest>,
    store: web::Data<SharedStore>,
) -> Res<impl Responder> {
    if req.duration_minutes <= 0 {
        return Err(AppError::BadRequest(
            "duration_minutes must be positive".to_string(),
        ));
    }
    if req.price < 0 {
        return Err(AppError::BadRequest("price cannot be negative".to_string()));
    }
    let service = store.create_service(ctx.tenant_id, req.into_inner()).await?;
    Success::created(service)
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use catalog::Plan;
    use serde_json::json;

    use crate::test_support::{bearer, gated_app, tenant_on};

    #[actix_web::test]
    async fn invalid_duration_is_rejected_before_insert() {
        let (store, tenant) = tenant_on(Plan::Free).await;
        let app = gated_app!(store.clone(), crate::mount_services());

        let req = test::TestRequest::post()
            .uri("/services")
            .insert_header(bearer(tenant))
            .set_json(json!({ "name": "Facial", "duration_minutes": 0 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/services")
            .insert_header(bearer(tenant))
            .set_json(json!({ "name": "Facial", "duration_minutes": 45, "price": 120000 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }
}
