use std::{rc::Rc, time::Instant};

use actix_web::{
    Error, HttpMessage,
    body::{BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use chrono::Utc;
use colored::Colorize;
use common::tenant::TenantContext;
use db::{SharedStore, models::log::RequestLog};
use futures::future::{LocalBoxFuture, Ready, ready};
use log::info;

pub struct LoggerMiddleware {
    console: bool,
}

impl LoggerMiddleware {
    pub fn new(console: bool) -> Self {
        Self { console }
    }
}

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = LoggerMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggerMiddlewareService {
            service: Rc::new(service),
            console: self.console,
        }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Rc<S>,
    console: bool,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();

        let ip_address = req
            .connection_info()
            .realip_remote_addr()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());

        let user_agent = req
            .headers()
            .get("User-Agent")
            .and_then(|ua| ua.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let store = req
            .app_data::<web::Data<SharedStore>>()
            .map(|store| store.get_ref().clone());
        let console = self.console;
        let srv = Rc::clone(&self.service);

        Box::pin(async move {
            let res = srv.call(req).await?;

            // set by the auth middleware further down the chain
            let tenant = res.request().extensions().get::<TenantContext>().copied();
            let status_code = res.status().as_u16();
            let elapsed_ms = started.elapsed().as_millis() as i64;

            if console {
                let colored_status = match status_code {
                    200..=299 => status_code.to_string().green(),
                    300..=399 => status_code.to_string().yellow(),
                    402 => status_code.to_string().magenta(),
                    400..=499 => status_code.to_string().bright_red(),
                    _ => status_code.to_string().red(),
                };

                let colored_method = match method.as_str() {
                    "GET" => method.blue(),
                    "POST" => method.yellow(),
                    "PUT" => method.purple(),
                    "DELETE" => method.red(),
                    _ => method.normal(),
                };

                info!(
                    "[{}] {} {} {} tenant_id={}",
                    colored_status,
                    colored_method,
                    path.bright_white(),
                    format!("({}ms)", elapsed_ms).bright_black(),
                    tenant
                        .map_or("None".to_string(), |ctx| ctx.tenant_id.to_string())
                        .bright_blue(),
                );
            }

            if let Some(store) = store {
                let entry = RequestLog {
                    timestamp: Utc::now(),
                    method,
                    path,
                    status_code: status_code as i32,
                    tenant_id: tenant.map(|ctx| ctx.tenant_id),
                    user_id: tenant.map(|ctx| ctx.user_id),
                    elapsed_ms,
                    ip_address,
                    user_agent,
                };
                if let Err(err) = store.record_request(&entry).await {
                    log::error!("Failed to persist request log: {}", err);
                }
            }

            Ok(res.map_into_boxed_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, HttpResponse, http::StatusCode, test};
    use db::MemoryStore;
    use uuid::Uuid;

    use super::*;

    #[actix_web::test]
    async fn every_request_is_persisted() {
        let memory = Arc::new(MemoryStore::new());
        let store: SharedStore = memory.clone();
        let tenant = TenantContext {
            tenant_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
        };
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store))
                .wrap(LoggerMiddleware::new(false))
                .route(
                    "/ok",
                    web::get().to(move |req: actix_web::HttpRequest| async move {
                        req.extensions_mut().insert(tenant);
                        HttpResponse::Ok().finish()
                    }),
                )
                .route(
                    "/denied",
                    web::post().to(|| async { HttpResponse::PaymentRequired().finish() }),
                ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/ok")
            .insert_header(("User-Agent", "tests"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        let req = test::TestRequest::post().uri("/denied").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::PAYMENT_REQUIRED
        );

        let logs = memory.request_logs().unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].path, "/ok");
        assert_eq!(logs[0].tenant_id, Some(tenant.tenant_id));
        assert_eq!(logs[0].user_agent, "tests");
        assert_eq!(logs[1].method, "POST");
        assert_eq!(logs[1].status_code, 402);
        assert_eq!(logs[1].tenant_id, None);
    }

    #[actix_web::test]
    async fn missing_store_does_not_fail_requests() {
        let app = test::init_service(
            App::new()
                .wrap(LoggerMiddleware::new(true))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;
        let req = test::TestRequest::get().uri("/").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}
