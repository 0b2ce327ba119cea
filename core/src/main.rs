mod cors;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use common::env_config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();

    // init logger
    logger::setup(&config.log_file).expect("Failed to set up logger");

    // init db connection
    let pool = db::setup(&config.database_url, config.is_production())
        .await
        .expect("Failed to set up database");
    let store = db::PgStore::shared(pool);

    if config.razorpay.webhook_secret.is_empty() {
        log::warn!("RAZORPAY_WEBHOOK_SECRET is not set; webhooks will be rejected");
    }

    log::info!(
        "Listening on {}:{} ({})",
        config.server_host,
        config.server_port,
        config.environment
    );

    HttpServer::new(move || {
        let origins = config_data.cors_allowed_origins.clone();
        App::new()
            .app_data(web::Data::new(config_data.clone()))
            .app_data(web::Data::new(store.clone()))
            .wrap(limiter::global_middleware(config_data.global_rate_limit)) // 4th
            .wrap(logger::middleware(config_data.console_logging_enabled)) // 3rd
            .wrap(extractor::middleware(&config_data.jwt_config.secret)) // 2nd
            .wrap(cors::middleware(&origins)) // 1st
            .service(
                web::scope("/api")
                    .service(api_subs::mount_plans())
                    .service(api_subs::mount_webhook())
                    .service(
                        web::scope("/v1")
                            .wrap(api_auth::auth_middleware())
                            .service(api_subs::mount_tenants())
                            .service(api_subs::mount_billing())
                            .service(api_booking::mount_appointments())
                            .service(api_booking::mount_staff())
                            .service(api_booking::mount_services())
                            .service(api_booking::mount_voice())
                            .service(api_booking::mount_analytics()),
                    ),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
