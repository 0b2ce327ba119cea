use std::str::FromStr;

use catalog::{Plan, SubscriptionStatus};
use chrono::{DateTime, Utc};
use common::{
    env_config::RazorpayConfig,
    error::{AppError, Res},
};
use db::{Store, dtos::subscription::SubscriptionUpsert, models::subscription::UserSubscription};
use uuid::Uuid;

use crate::dtos::webhook::{SubscriptionEntity, WebhookEvent};

/// What a delivery did to the subscription table.
#[derive(Debug)]
pub enum WebhookOutcome {
    Applied(UserSubscription),
    Ignored(String),
}

/// Status a lifecycle event implies when the entity status can't be read.
fn status_for_event(event: &str) -> Option<SubscriptionStatus> {
    let status = match event {
        "subscription.authenticated" => SubscriptionStatus::Authenticated,
        "subscription.activated" | "subscription.charged" | "subscription.resumed" => {
            SubscriptionStatus::Active
        }
        "subscription.pending" => SubscriptionStatus::PastDue,
        "subscription.halted" => SubscriptionStatus::Halted,
        "subscription.paused" => SubscriptionStatus::Paused,
        "subscription.cancelled" => SubscriptionStatus::Canceled,
        "subscription.completed" => SubscriptionStatus::Completed,
        _ => return None,
    };
    Some(status)
}

fn is_handled(event: &str) -> bool {
    event == "subscription.updated" || status_for_event(event).is_some()
}

fn timestamp(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
}

/// Maps a subscription entity onto the upsert applied to our table.
pub fn to_upsert(
    event: &str,
    entity: &SubscriptionEntity,
    config: &RazorpayConfig,
) -> Res<SubscriptionUpsert> {
    let tenant_id = entity
        .note("tenant_id")
        .ok_or_else(|| AppError::BadRequest("Subscription notes carry no tenant_id".to_string()))
        .and_then(|raw| {
            Uuid::parse_str(raw)
                .map_err(|_| AppError::BadRequest(format!("Invalid tenant_id note: {}", raw)))
        })?;

    // plan_id follows plan changes, the notes are frozen at checkout
    let plan = entity
        .plan_id
        .as_deref()
        .and_then(|id| config.plan_for_provider_id(id))
        .or_else(|| {
            entity
                .note("plan")
                .and_then(|raw| Plan::from_str(raw).ok())
        })
        .ok_or_else(|| {
            AppError::BadRequest(format!("Cannot map subscription {} to a plan", entity.id))
        })?;

    let status = SubscriptionStatus::from_str(&entity.status)
        .ok()
        .or_else(|| status_for_event(event))
        .ok_or_else(|| {
            AppError::BadRequest(format!("Unknown subscription status: {}", entity.status))
        })?;

    Ok(SubscriptionUpsert {
        tenant_id,
        plan,
        status,
        external_subscription_id: entity.id.clone(),
        provider_plan_id: entity.plan_id.clone(),
        current_period_start: timestamp(entity.current_start),
        current_period_end: timestamp(entity.current_end),
    })
}

/// Applies a verified delivery. Replaying the same event leaves the same state.
pub async fn process_event(
    store: &dyn Store,
    config: &RazorpayConfig,
    event: WebhookEvent,
) -> Res<WebhookOutcome> {
    if !is_handled(&event.event) {
        log::debug!("Ignoring webhook event {}", event.event);
        return Ok(WebhookOutcome::Ignored(event.event));
    }

    let entity = match event.payload.subscription {
        Some(wrapper) => wrapper.entity,
        None => {
            return Err(AppError::BadRequest(format!(
                "Event {} carries no subscription entity",
                event.event
            )));
        }
    };

    let upsert = to_upsert(&event.event, &entity, config)?;

    if store.get_tenant(upsert.tenant_id).await?.is_none() {
        log::info!(
            "Webhook {} for subscription {} names unknown tenant {}",
            event.event,
            entity.id,
            upsert.tenant_id
        );
        return Err(AppError::NotFound(format!("Tenant {}", upsert.tenant_id)));
    }

    let sub = store.upsert_subscription(&upsert).await?;
    log::info!(
        "Webhook {}: tenant {} subscription {} is now {} on {}",
        event.event,
        sub.tenant_id,
        sub.external_subscription_id,
        sub.status,
        sub.plan
    );
    Ok(WebhookOutcome::Applied(sub))
}

#[cfg(test)]
mod tests {
    use db::MemoryStore;
    use serde_json::json;

    use super::*;

    fn config() -> RazorpayConfig {
        RazorpayConfig {
            professional_plan_id: "plan_pro".into(),
            enterprise_plan_id: "plan_ent".into(),
            ..Default::default()
        }
    }

    fn event(name: &str, sub_id: &str, status: &str, tenant: Uuid, plan_id: &str) -> WebhookEvent {
        serde_json::from_value(json!({
            "event": name,
            "payload": {
                "subscription": {
                    "entity": {
                        "id": sub_id,
                        "plan_id": plan_id,
                        "status": status,
                        "current_start": 1_767_225_600,
                        "current_end": 4_102_444_800i64,
                        "notes": { "tenant_id": tenant.to_string() }
                    }
                }
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn replaying_activation_is_idempotent() {
        let store = MemoryStore::new();
        let tenant = store.add_tenant("Salon").unwrap();
        let delivery = event("subscription.activated", "sub_1", "active", tenant, "plan_pro");

        let first = process_event(&store, &config(), delivery.clone()).await.unwrap();
        let after_first = store.subscriptions().unwrap();
        let second = process_event(&store, &config(), delivery).await.unwrap();
        let after_second = store.subscriptions().unwrap();

        assert_eq!(after_second.len(), 1);
        let (WebhookOutcome::Applied(a), WebhookOutcome::Applied(b)) = (first, second) else {
            panic!("both deliveries should apply");
        };
        assert_eq!(a.id, b.id);
        assert_eq!(after_first[0].plan, after_second[0].plan);
        assert_eq!(after_first[0].status, after_second[0].status);
        assert_eq!(
            after_first[0].current_period_end,
            after_second[0].current_period_end
        );
        assert_eq!(b.plan, Plan::Professional);
        assert_eq!(b.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn cancellation_updates_the_same_row() {
        let store = MemoryStore::new();
        let tenant = store.add_tenant("Salon").unwrap();
        process_event(
            &store,
            &config(),
            event("subscription.activated", "sub_1", "active", tenant, "plan_ent"),
        )
        .await
        .unwrap();
        process_event(
            &store,
            &config(),
            event("subscription.cancelled", "sub_1", "cancelled", tenant, "plan_ent"),
        )
        .await
        .unwrap();

        let subs = store.subscriptions().unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].status, SubscriptionStatus::Canceled);
        assert_eq!(subs[0].plan, Plan::Enterprise);
    }

    #[tokio::test]
    async fn pending_maps_to_past_due() {
        let store = MemoryStore::new();
        let tenant = store.add_tenant("Salon").unwrap();
        let outcome = process_event(
            &store,
            &config(),
            event("subscription.pending", "sub_1", "pending", tenant, "plan_pro"),
        )
        .await
        .unwrap();
        let WebhookOutcome::Applied(sub) = outcome else {
            panic!("pending should apply");
        };
        assert_eq!(sub.status, SubscriptionStatus::PastDue);
    }

    #[tokio::test]
    async fn unknown_events_are_ignored() {
        let store = MemoryStore::new();
        let delivery: WebhookEvent =
            serde_json::from_value(json!({ "event": "payment.captured", "payload": {} })).unwrap();
        let outcome = process_event(&store, &config(), delivery).await.unwrap();
        assert!(matches!(outcome, WebhookOutcome::Ignored(name) if name == "payment.captured"));
        assert!(store.subscriptions().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_tenant_or_plan_is_rejected() {
        let store = MemoryStore::new();
        let missing = process_event(
            &store,
            &config(),
            event("subscription.activated", "sub_1", "active", Uuid::new_v4(), "plan_pro"),
        )
        .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        let tenant = store.add_tenant("Salon").unwrap();
        let unmapped = process_event(
            &store,
            &config(),
            event("subscription.activated", "sub_2", "active", tenant, "plan_mystery"),
        )
        .await;
        assert!(matches!(unmapped, Err(AppError::BadRequest(_))));
        assert!(store.subscriptions().unwrap().is_empty());
    }

    #[test]
    fn provider_plan_wins_over_checkout_notes() {
        let tenant = Uuid::new_v4();
        let entity = |plan_id: &str| -> SubscriptionEntity {
            serde_json::from_value(json!({
                "id": "sub_1",
                "plan_id": plan_id,
                "status": "authenticated",
                "notes": { "tenant_id": tenant.to_string(), "plan": "professional" }
            }))
            .unwrap()
        };

        let upsert = to_upsert("subscription.authenticated", &entity("plan_ent"), &config()).unwrap();
        assert_eq!(upsert.plan, Plan::Enterprise);
        assert_eq!(upsert.status, SubscriptionStatus::Authenticated);
        assert_eq!(upsert.current_period_end, None);

        // an id we don't know falls back to what checkout recorded
        let upsert = to_upsert("subscription.authenticated", &entity("plan_old"), &config()).unwrap();
        assert_eq!(upsert.plan, Plan::Professional);
    }

    #[tokio::test]
    async fn plan_change_moves_the_tenant_to_the_new_tier() {
        let store = MemoryStore::new();
        let tenant = store.add_tenant("Salon").unwrap();
        let with_notes = |name: &str, plan_id: &str| -> WebhookEvent {
            serde_json::from_value(json!({
                "event": name,
                "payload": { "subscription": { "entity": {
                    "id": "sub_1",
                    "plan_id": plan_id,
                    "status": "active",
                    "current_end": 4_102_444_800i64,
                    "notes": { "tenant_id": tenant.to_string(), "plan": "professional" }
                }}}
            }))
            .unwrap()
        };

        process_event(&store, &config(), with_notes("subscription.activated", "plan_pro"))
            .await
            .unwrap();
        process_event(&store, &config(), with_notes("subscription.updated", "plan_ent"))
            .await
            .unwrap();

        let subs = store.subscriptions().unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].plan, Plan::Enterprise);
        assert_eq!(subs[0].provider_plan_id.as_deref(), Some("plan_ent"));
    }
}
