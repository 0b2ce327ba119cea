use std::{env, sync::Arc};

use catalog::Plan;

#[derive(Clone, Debug, Default)]
/// Configuration struct for the server.
///
/// Holds everything the server needs to boot: database connection, session
/// token validation, bind address, CORS origins, logging switches and the
/// billing provider credentials used for checkout and webhooks.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The URL of the database to connect to.
    pub database_url: String,
    /// Configuration for validating session JWTs issued by Supabase.
    pub jwt_config: JwtConfig,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// Origins allowed by CORS.
    pub cors_allowed_origins: Vec<String>,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// File the logger appends to.
    pub log_file: String,
    /// Requests per second accepted across the whole process.
    pub global_rate_limit: u32,
    /// Where clients are sent when a gate answers 402.
    pub billing_upgrade_url: String,
    /// Razorpay credentials and plan mapping.
    pub razorpay: RazorpayConfig,
}

#[derive(Clone, Debug, Default)]
/// Configuration for JSON Web Token (JWT) authentication.
///
/// Sessions are signed by Supabase with the project's JWT secret; the
/// expiration is only used when this server mints tokens itself (tests, tooling).
pub struct JwtConfig {
    /// The secret key used to sign and verify JWTs.
    pub secret: String,
    /// The expiration time for JWTs in hours.
    pub expiration_hours: i64,
}

#[derive(Clone, Debug, Default)]
pub struct RazorpayConfig {
    pub api_url: String,
    pub key_id: String,
    pub key_secret: String,
    pub webhook_secret: String,
    /// Provider plan id billed for the professional tier.
    pub professional_plan_id: String,
    /// Provider plan id billed for the enterprise tier.
    pub enterprise_plan_id: String,
}

impl JwtConfig {
    /// Reads `SUPABASE_JWT_SECRET` (required) and `JWT_EXPIRATION_HOURS` (default 24).
    ///
    /// # Panics
    ///
    /// Panics if the secret is missing or the expiration is not a number.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        JwtConfig {
            secret: env::var("SUPABASE_JWT_SECRET").expect("SUPABASE_JWT_SECRET must be set"),
            expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("JWT_EXPIRATION_HOURS must be a valid number"),
        }
    }
}

impl RazorpayConfig {
    pub fn from_env() -> Self {
        RazorpayConfig {
            api_url: env::var("RAZORPAY_API_URL")
                .unwrap_or_else(|_| "https://api.razorpay.com/v1".to_string()),
            key_id: env::var("RAZORPAY_KEY_ID").unwrap_or_default(),
            key_secret: env::var("RAZORPAY_KEY_SECRET").unwrap_or_default(),
            webhook_secret: env::var("RAZORPAY_WEBHOOK_SECRET").unwrap_or_default(),
            professional_plan_id: env::var("RAZORPAY_PLAN_PROFESSIONAL").unwrap_or_default(),
            enterprise_plan_id: env::var("RAZORPAY_PLAN_ENTERPRISE").unwrap_or_default(),
        }
    }

    /// Maps a provider plan id back to our tier.
    pub fn plan_for_provider_id(&self, provider_plan_id: &str) -> Option<Plan> {
        if provider_plan_id.is_empty() {
            None
        } else if provider_plan_id == self.professional_plan_id {
            Some(Plan::Professional)
        } else if provider_plan_id == self.enterprise_plan_id {
            Some(Plan::Enterprise)
        } else {
            None
        }
    }

    pub fn provider_id_for_plan(&self, plan: Plan) -> Option<&str> {
        let id = match plan {
            Plan::Free => return None,
            Plan::Professional => &self.professional_plan_id,
            Plan::Enterprise => &self.enterprise_plan_id,
        };
        (!id.is_empty()).then_some(id.as_str())
    }
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// # Environment Variables
    ///
    /// Required:
    /// - `ENVIRONMENT`: `development` or `production`
    /// - `DATABASE_URL`: Connection string for the database, as a role without
    ///   superuser or `BYPASSRLS`
    /// - `SUPABASE_JWT_SECRET`: Secret used to verify session tokens
    ///
    /// Optional (with defaults):
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 8080)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGINS`: Comma separated origins (default: "http://localhost:3000")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `LOG_FILE`: Log file path (default: "genbook.log")
    /// - `GLOBAL_RATE_LIMIT`: Requests per second (default: 50)
    /// - `BILLING_UPGRADE_URL`: Upgrade page (default: "http://localhost:3000/billing")
    /// - `RAZORPAY_*`: billing provider settings
    ///
    /// # Panics
    ///
    /// This function will panic if required environment variables are missing.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        Arc::new(Config {
            environment: env::var("ENVIRONMENT").expect("ENVIRONMENT must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_config: JwtConfig::from_env(),
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            num_workers: env::var("WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
            cors_allowed_origins: parse_origins(
                &env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            ),
            console_logging_enabled: env::var("ENABLE_CONSOLE_LOGGING")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                == "true",
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "genbook.log".to_string()),
            global_rate_limit: env::var("GLOBAL_RATE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(50),
            billing_upgrade_url: env::var("BILLING_UPGRADE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/billing".to_string()),
            razorpay: RazorpayConfig::from_env(),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| origin.trim_end_matches('/').to_string())
        .collect()
}
