use actix_web::{HttpMessage, dev::ServiceRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    env_config::JwtConfig,
    error::{AppError, Res},
};

/// Session claims as issued by Supabase auth.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtClaims {
    /// Authenticated user id.
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub app_metadata: AppMetadata,
    pub exp: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AppMetadata {
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
}

impl JwtClaims {
    pub fn tenant_id(&self) -> Option<Uuid> {
        self.app_metadata.tenant_id
    }
}

pub struct ClaimsSpec {
    pub user_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub email: Option<String>,
}

/// Generates a session token in the same shape Supabase issues.
pub fn generate_jwt(spec: ClaimsSpec, config: &JwtConfig) -> Res<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.expiration_hours))
        .ok_or_else(|| AppError::Internal("Token expiration out of range".to_string()))?
        .timestamp();

    let claims = JwtClaims {
        sub: spec.user_id,
        email: spec.email,
        app_metadata: AppMetadata {
            tenant_id: spec.tenant_id,
        },
        exp: expiration as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(AppError::from)
}

/// Extracts claims object from JWT token.
/// Requires JWT secret.
pub fn validate_jwt(token: &str, secret: &str) -> Res<JwtClaims> {
    let mut validation = Validation::default();
    // supabase sets aud = "authenticated"; the signature is what we trust
    validation.validate_aud = false;
    let token_data = jsonwebtoken::decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

/// Claims left in the request by the extractor middleware.
pub fn get_jwt_claims_or_error(req: &ServiceRequest) -> Res<JwtClaims> {
    match req.extensions().get::<Res<JwtClaims>>() {
        Some(Ok(claims)) => Ok(claims.clone()),
        Some(Err(err)) => {
            log::debug!("Rejected session token: {}", err);
            Err(AppError::Unauthenticated("Invalid session token".to_string()))
        }
        None => Err(AppError::Unauthenticated(
            "No authorization token provided".to_string(),
        )),
    }
}
