use async_trait::async_trait;
use catalog::Entitlements;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::{config::ClientConfig, error::ClientError};

/// Where entitlements come from. The HTTP implementation is the real one;
/// tests substitute their own.
#[async_trait]
pub trait EntitlementsSource: Send + Sync {
    async fn fetch(&self) -> Result<Entitlements, ClientError>;
}

pub struct HttpEntitlementsSource {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpEntitlementsSource {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn with_client(client: reqwest::Client, config: ClientConfig) -> Self {
        Self { client, config }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    upgrade_url: Option<String>,
}

/// Turns a non-success response body into a [`ClientError`]. A 402 links to
/// the upgrade page the server names, or to `upgrade_url` when it names none.
pub(crate) fn error_from_body(status: StatusCode, body: &[u8], upgrade_url: &str) -> ClientError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    if status == StatusCode::PAYMENT_REQUIRED {
        ClientError::PaymentRequired {
            reason: parsed.reason.unwrap_or_else(|| "plan_required".to_string()),
            message: if parsed.error.is_empty() {
                "Your plan does not allow this".to_string()
            } else {
                parsed.error
            },
            upgrade_url: parsed
                .upgrade_url
                .unwrap_or_else(|| upgrade_url.to_string()),
        }
    } else {
        ClientError::Status {
            status: status.as_u16(),
            message: parsed.error,
        }
    }
}

#[async_trait]
impl EntitlementsSource for HttpEntitlementsSource {
    async fn fetch(&self) -> Result<Entitlements, ClientError> {
        let res = self
            .client
            .get(self.config.entitlements_url())
            .bearer_auth(&self.config.token)
            .send()
            .await?;

        let status = res.status();
        let body = res.bytes().await?;
        if !status.is_success() {
            log::debug!("Entitlements request failed with {}", status);
            return Err(error_from_body(status, &body, &self.config.upgrade_url));
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
    use catalog::{Feature, Plan, SubscriptionStatus};
    use uuid::Uuid;

    use super::*;

    async fn current(req: HttpRequest) -> HttpResponse {
        let authorized = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            == Some("Bearer paid-session");
        if authorized {
            HttpResponse::Ok().json(Entitlements::for_plan(
                Uuid::new_v4(),
                Plan::Professional,
                Some(SubscriptionStatus::Active),
                None,
                BTreeMap::new(),
            ))
        } else {
            HttpResponse::PaymentRequired().json(serde_json::json!({
                "error": "Active subscription required: No active subscription",
                "reason": "plan_required",
                "upgrade_url": "https://app.genbook.ai/billing"
            }))
        }
    }

    #[actix_web::test]
    async fn fetches_from_a_live_server() {
        let server = HttpServer::new(|| {
            App::new().route("/api/v1/tenants/current", web::get().to(current))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        let config = |token: &str| ClientConfig {
            base_url: format!("http://{}", addr),
            token: token.to_string(),
            ..Default::default()
        };

        let ent = HttpEntitlementsSource::new(config("paid-session"))
            .fetch()
            .await
            .unwrap();
        assert_eq!(ent.plan, Plan::Professional);
        assert!(ent.has_feature(Feature::VoiceCommands));

        match HttpEntitlementsSource::new(config("lapsed-session")).fetch().await {
            Err(ClientError::PaymentRequired {
                reason,
                upgrade_url,
                ..
            }) => {
                assert_eq!(reason, "plan_required");
                assert_eq!(upgrade_url, "https://app.genbook.ai/billing");
            }
            other => panic!("unexpected {:?}", other),
        }

        handle.stop(true).await;
    }

    #[test]
    fn payment_required_keeps_reason_and_message() {
        let body = br#"{"error":"Active subscription required: Tenant is suspended","reason":"plan_required"}"#;
        match error_from_body(StatusCode::PAYMENT_REQUIRED, body, "/billing") {
            ClientError::PaymentRequired {
                reason,
                message,
                upgrade_url,
            } => {
                assert_eq!(reason, "plan_required");
                assert!(message.contains("suspended"));
                assert_eq!(upgrade_url, "/billing");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn other_statuses_are_plain_errors() {
        let err = error_from_body(StatusCode::INTERNAL_SERVER_ERROR, b"not json", "/billing");
        assert!(matches!(err, ClientError::Status { status: 500, .. }));
    }
}
