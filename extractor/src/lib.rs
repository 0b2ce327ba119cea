use middleware::extractor::ExtractionMiddleware;

pub mod middleware {
    pub mod extractor;
}

/// Parses bearer session tokens signed with `jwt_secret` into request extensions.
pub fn middleware(jwt_secret: &str) -> ExtractionMiddleware {
    ExtractionMiddleware::new(jwt_secret)
}
