//! Booking routes, each behind the entitlement gate its resource needs.

use actix_web::{dev::HttpServiceFactory, web};
use catalog::{Feature, Limit};

pub mod routes {
    pub mod analytics;
    pub mod appointment;
    pub mod service;
    pub mod staff;
    pub mod voice;
}

pub mod dtos {
    pub mod analytics;
    pub mod voice;
}

#[cfg(test)]
mod test_support;

pub fn mount_appointments() -> impl HttpServiceFactory {
    web::scope("/appointments")
        .wrap(limiter::require_usage(Limit::AppointmentsPerMonth))
        .service(routes::appointment::post_appointment)
}

pub fn mount_staff() -> impl HttpServiceFactory {
    web::scope("/staff")
        .wrap(limiter::require_usage(Limit::StaffMembers))
        .service(routes::staff::post_staff)
}

pub fn mount_services() -> impl HttpServiceFactory {
    web::scope("/services")
        .wrap(limiter::require_usage(Limit::Services))
        .service(routes::service::post_service)
}

pub fn mount_voice() -> impl HttpServiceFactory {
    web::scope("/voice")
        .wrap(limiter::require_entitlement(Feature::VoiceCommands))
        .service(routes::voice::post_command)
}

pub fn mount_analytics() -> impl HttpServiceFactory {
    web::scope("/analytics")
        .wrap(limiter::require_entitlement(Feature::AdvancedAnalytics))
        .service(routes::analytics::get_summary)
}
