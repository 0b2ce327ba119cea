use actix_web::web::{self};

pub mod routes {
    pub mod pay;
    pub mod sub;
    pub mod tenant;
}

pub mod services {
    pub mod entitlements;
    pub(crate) mod sub;
    pub mod webhook;
}

pub mod dtos {
    pub mod sub;
    pub mod webhook;
}

/// Public plan catalog.
pub fn mount_plans() -> actix_web::Scope {
    web::scope("/plans").service(routes::sub::get_plans)
}
/// Billing provider callbacks, authenticated by signature instead of session.
pub fn mount_webhook() -> actix_web::Scope {
    web::scope("/pay").service(routes::pay::post_webhook)
}
/// Session scoped: resolved entitlements of the caller's tenant.
pub fn mount_tenants() -> actix_web::Scope {
    web::scope("/tenants").service(routes::tenant::get_current)
}
/// Session scoped: checkout.
pub fn mount_billing() -> actix_web::Scope {
    web::scope("/billing").service(routes::sub::post_subscribe)
}
