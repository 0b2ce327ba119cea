use std::{future::Future, pin::Pin, sync::Arc};

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use common::{
    error::{self, AppError, Res},
    jwt::{self, JwtClaims},
    tenant::TenantContext,
};
use db::SharedStore;
use futures::future::{Ready, ok};
use uuid::Uuid;

pub struct AuthMiddleware {}

impl AuthMiddleware {
    pub fn new() -> Self {
        AuthMiddleware {}
    }
}

impl Default for AuthMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Arc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Arc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = Arc::clone(&self.service);

        Box::pin(async move {
            let claims = match jwt::get_jwt_claims_or_error(&req) {
                Ok(claims) => claims,
                Err(err) => {
                    let res = error::respond(req.request(), &err);
                    return Ok(req.into_response(res));
                }
            };

            let store = match req.app_data::<web::Data<SharedStore>>() {
                Some(store) => store.get_ref().clone(),
                None => {
                    return Ok(req.error_response(AppError::Internal(
                        "Store is not registered".to_string(),
                    )));
                }
            };

            match resolve_tenant(&store, &claims).await {
                Ok(tenant_id) => {
                    req.extensions_mut().insert(TenantContext {
                        tenant_id,
                        user_id: claims.sub,
                    });
                    srv.call(req).await.map(|res| res.map_into_boxed_body())
                }
                Err(err) => {
                    let res = error::respond(req.request(), &err);
                    Ok(req.into_response(res))
                }
            }
        })
    }
}

/// Tenant claimed by the token, falling back to the user's membership row.
async fn resolve_tenant(store: &SharedStore, claims: &JwtClaims) -> Res<Uuid> {
    if let Some(tenant_id) = claims.tenant_id() {
        return Ok(tenant_id);
    }
    store
        .tenant_for_user(claims.sub)
        .await?
        .ok_or_else(|| {
            log::info!("User {} has no tenant membership", claims.sub);
            AppError::Unauthenticated("No tenant associated with this session".to_string())
        })
}
