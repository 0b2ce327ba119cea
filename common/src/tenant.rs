use actix_web::{HttpMessage, dev::ServiceRequest};
use uuid::Uuid;

use crate::error::{AppError, Res};

/// Tenant resolved for the current request by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
}

pub fn get_tenant_or_error(req: &ServiceRequest) -> Res<TenantContext> {
    req.extensions()
        .get::<TenantContext>()
        .copied()
        .ok_or_else(|| AppError::Unauthenticated("No tenant resolved for this session".to_string()))
}
