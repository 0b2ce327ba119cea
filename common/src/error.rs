use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use catalog::{Feature, Limit, Plan};
use thiserror::Error;

use crate::env_config::Config;

pub type Res<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    // === CONVERSION ERRORS ===
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JWT error: {0}")]
    JWT(#[from] jsonwebtoken::errors::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === APPLICATION ERRORS ===
    #[error("Authorization error: {0}")]
    Unauthorized(String),

    #[error("Resource conflict: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Too Many Requests: {0}")]
    TooManyRequests(String),

    #[error("{0}")]
    Internal(String),

    // === ENTITLEMENT ERRORS (402) ===
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Active subscription required: {0}")]
    PlanRequired(String),

    #[error("Your plan does not include {feature}. Upgrade to {upgrade_to} to unlock it.")]
    FeatureNotEntitled { feature: Feature, upgrade_to: Plan },

    #[error("Usage limit reached for {limit}: {used} of {max} used")]
    UsageLimitExceeded { limit: Limit, used: u64, max: u64 },
}

impl AppError {
    /// Machine readable reason sent next to the message on 402 responses.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            AppError::Unauthenticated(_) => Some("unauthenticated"),
            AppError::PlanRequired(_) => Some("plan_required"),
            AppError::FeatureNotEntitled { .. } => Some("feature_not_entitled"),
            AppError::UsageLimitExceeded { .. } => Some("usage_limit_exceeded"),
            _ => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_)
            | AppError::JWT(_)
            | AppError::Reqwest(_)
            | AppError::Json(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Unauthenticated(_)
            | AppError::PlanRequired(_)
            | AppError::FeatureNotEntitled { .. }
            | AppError::UsageLimitExceeded { .. } => StatusCode::PAYMENT_REQUIRED,
        }
    }

    pub fn to_http_response(&self) -> HttpResponse {
        self.to_http_response_with(None)
    }

    /// Same as [`AppError::to_http_response`]; 402 bodies also carry `upgrade_url`.
    pub fn to_http_response_with(&self, upgrade_url: Option<&str>) -> HttpResponse {
        let is_dev = cfg!(debug_assertions);
        let status = self.status();

        if status.is_server_error() {
            log::error!("{}", self);
            let body = if is_dev {
                serde_json::json!({ "error": self.to_string() })
            } else {
                serde_json::json!({ "error": "Internal server error" })
            };
            return HttpResponse::build(status).json(body);
        }

        match (self.reason(), upgrade_url) {
            (Some(reason), Some(url)) => HttpResponse::build(status).json(serde_json::json!({
                "error": self.to_string(),
                "reason": reason,
                "upgrade_url": url,
            })),
            (Some(reason), None) => HttpResponse::build(status)
                .json(serde_json::json!({ "error": self.to_string(), "reason": reason })),
            (None, _) => {
                HttpResponse::build(status).json(serde_json::json!({ "error": self.to_string() }))
            }
        }
    }
}

/// Response for `err` using the upgrade page of the registered [`Config`], if any.
pub fn respond(req: &HttpRequest, err: &AppError) -> HttpResponse {
    let upgrade_url = req
        .app_data::<web::Data<Arc<Config>>>()
        .map(|config| config.billing_upgrade_url.as_str());
    err.to_http_response_with(upgrade_url)
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        self.to_http_response()
    }
}
