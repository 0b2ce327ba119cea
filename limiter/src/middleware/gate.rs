use std::{future::Future, pin::Pin, rc::Rc};

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use catalog::{Entitlements, Feature, Limit, LimitCheck, Plan};
use chrono::Utc;
use common::{
    error::{self, AppError, Res},
    tenant,
};
use db::SharedStore;

/// What a route requires from the caller's entitlements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Subscription,
    Feature(Feature),
    Usage(Limit),
}

/// Decides a gate against already resolved entitlements.
pub fn check(entitlements: &Entitlements, gate: &Gate) -> Res<()> {
    match *gate {
        Gate::Subscription => {
            if entitlements.subscribed {
                return Ok(());
            }
            let detail = match entitlements.status {
                Some(status) => format!("Subscription is {}", status),
                None => "No active subscription".to_string(),
            };
            Err(AppError::PlanRequired(detail))
        }
        Gate::Feature(feature) => {
            check(entitlements, &Gate::Subscription)?;
            if entitlements.has_feature(feature) {
                Ok(())
            } else {
                Err(AppError::FeatureNotEntitled {
                    feature,
                    upgrade_to: Plan::cheapest_with(feature),
                })
            }
        }
        Gate::Usage(limit) => match entitlements.check_limit(limit) {
            LimitCheck::Unlimited | LimitCheck::Within { .. } => Ok(()),
            LimitCheck::Reached { used, max } => {
                Err(AppError::UsageLimitExceeded { limit, used, max })
            }
        },
    }
}

/// Resolves the tenant's entitlements before the handler runs and answers
/// 402 when the gate fails. Passing requests carry the [`Entitlements`] in
/// their extensions.
pub struct EntitlementGate {
    gate: Gate,
}

impl EntitlementGate {
    pub fn new(gate: Gate) -> Self {
        Self { gate }
    }
}

impl<S, B> Transform<S, ServiceRequest> for EntitlementGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = EntitlementGateService<S>;
    type InitError = ();
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(EntitlementGateService {
            service: Rc::new(service),
            gate: self.gate,
        }))
    }
}

pub struct EntitlementGateService<S> {
    service: Rc<S>,
    gate: Gate,
}

impl<S, B> Service<ServiceRequest> for EntitlementGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = Rc::clone(&self.service);
        let gate = self.gate;

        Box::pin(async move {
            let entitlements = match evaluate(&req, &gate).await {
                Ok(entitlements) => entitlements,
                Err(err) => {
                    log::info!("{} {} denied: {}", req.method(), req.path(), err);
                    let res = error::respond(req.request(), &err);
                    return Ok(req.into_response(res));
                }
            };

            req.extensions_mut().insert(entitlements);
            srv.call(req).await.map(|res| res.map_into_boxed_body())
        })
    }
}

async fn evaluate(req: &ServiceRequest, gate: &Gate) -> Res<Entitlements> {
    let ctx = tenant::get_tenant_or_error(req)?;
    let store = req
        .app_data::<web::Data<SharedStore>>()
        .map(|store| store.get_ref().clone())
        .ok_or_else(|| AppError::Internal("Store is not registered".to_string()))?;

    let entitlements =
        api_subs::services::entitlements::resolve(store.as_ref(), ctx.tenant_id, Utc::now())
            .await?;
    check(&entitlements, gate)?;
    log::debug!("Tenant {} passed {:?}", ctx.tenant_id, gate);
    Ok(entitlements)
}
