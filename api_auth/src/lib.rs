use middleware::auth::AuthMiddleware;

pub mod middleware {
    pub mod auth;
}

/// Requires a valid session and resolves the tenant it acts for.
pub fn auth_middleware() -> AuthMiddleware {
    AuthMiddleware::new()
}
