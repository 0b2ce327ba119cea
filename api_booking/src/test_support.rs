use std::sync::Arc;

use catalog::{Plan, SubscriptionStatus};
use chrono::{Duration, Utc};
use common::{
    env_config::JwtConfig,
    jwt::{ClaimsSpec, generate_jwt},
};
use db::{MemoryStore, Store, dtos::subscription::SubscriptionUpsert};
use uuid::Uuid;

pub const SECRET: &str = "booking-test-secret";

pub fn bearer(tenant_id: Uuid) -> (&'static str, String) {
    let token = generate_jwt(
        ClaimsSpec {
            user_id: Uuid::new_v4(),
            tenant_id: Some(tenant_id),
            email: None,
        },
        &JwtConfig {
            secret: SECRET.into(),
            expiration_hours: 1,
        },
    )
    .unwrap();
    ("Authorization", format!("Bearer {}", token))
}

/// A store holding one tenant on `plan`, active for another month.
pub async fn tenant_on(plan: Plan) -> (Arc<MemoryStore>, Uuid) {
    let store = Arc::new(MemoryStore::new());
    let tenant = store.add_tenant("Salon").unwrap();
    if plan != Plan::Free {
        store
            .upsert_subscription(&SubscriptionUpsert {
                tenant_id: tenant,
                plan,
                status: SubscriptionStatus::Active,
                external_subscription_id: format!("sub_{}", tenant.simple()),
                provider_plan_id: None,
                current_period_start: Some(Utc::now()),
                current_period_end: Some(Utc::now() + Duration::days(30)),
            })
            .await
            .unwrap();
    }
    (store, tenant)
}

/// Builds a test app with the session middleware in front of `$scope`.
macro_rules! gated_app {
    ($store:expr, $scope:expr) => {{
        let store: db::SharedStore = $store;
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(store))
                .service(
                    actix_web::web::scope("")
                        .wrap(api_auth::auth_middleware())
                        .wrap(extractor::middleware(crate::test_support::SECRET))
                        .service($scope),
                ),
        )
        .await
    }};
}
pub(crate) use gated_app;
