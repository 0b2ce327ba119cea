use std::collections::BTreeMap;

use catalog::{Entitlements, Limit, Plan, SubscriptionStatus};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use common::error::{AppError, Res};
use db::{Store, models::subscription::UserSubscription};
use uuid::Uuid;

/// Computes the entitlements of `tenant_id` as of `now`. Read only.
///
/// Unknown tenants fail with `Unauthenticated`, suspended ones with
/// `PlanRequired`. A tenant without a counting subscription gets `free`.
pub async fn resolve(store: &dyn Store, tenant_id: Uuid, now: DateTime<Utc>) -> Res<Entitlements> {
    let tenant = store.get_tenant(tenant_id).await?.ok_or_else(|| {
        log::info!("Session references unknown tenant {}", tenant_id);
        AppError::Unauthenticated("Tenant could not be resolved".to_string())
    })?;

    if tenant.is_suspended() {
        return Err(AppError::PlanRequired("Tenant is suspended".to_string()));
    }

    let subscription = store.current_subscription(tenant_id).await?;
    let usage = store.usage(tenant_id, month_start(now)).await?;

    let entitlements = compose(tenant_id, subscription.as_ref(), usage, now);
    log::debug!(
        "Resolved tenant {} to plan {} (status {:?})",
        tenant_id,
        entitlements.plan,
        entitlements.status
    );
    Ok(entitlements)
}

/// Builds the view from already loaded rows.
pub fn compose(
    tenant_id: Uuid,
    subscription: Option<&UserSubscription>,
    usage: BTreeMap<Limit, u64>,
    now: DateTime<Utc>,
) -> Entitlements {
    match subscription {
        None => Entitlements::for_plan(tenant_id, Plan::Free, None, None, usage),
        Some(sub) => {
            let status = effective_status(sub, now);
            let plan = if status.is_active() { sub.plan } else { Plan::Free };
            Entitlements::for_plan(tenant_id, plan, Some(status), sub.current_period_end, usage)
        }
    }
}

/// An `active` row whose period already ended counts as `expired`.
pub fn effective_status(sub: &UserSubscription, now: DateTime<Utc>) -> SubscriptionStatus {
    match (sub.status, sub.current_period_end) {
        (SubscriptionStatus::Active, Some(end)) if end <= now => SubscriptionStatus::Expired,
        (status, _) => status,
    }
}

/// First instant of the UTC calendar month containing `now`.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|start| start.and_utc())
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use catalog::Feature;
    use chrono::{Duration, TimeZone};
    use db::{MemoryStore, dtos::subscription::SubscriptionUpsert};

    use super::*;

    async fn subscribe(
        store: &MemoryStore,
        tenant_id: Uuid,
        plan: Plan,
        status: SubscriptionStatus,
        period_end: Option<DateTime<Utc>>,
    ) {
        store
            .upsert_subscription(&SubscriptionUpsert {
                tenant_id,
                plan,
                status,
                external_subscription_id: format!("sub_{}", tenant_id.simple()),
                provider_plan_id: None,
                current_period_start: None,
                current_period_end: period_end,
            })
            .await
            .unwrap();
    }

    #[test]
    fn month_start_is_first_of_month_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 3, 17, 15, 4, 5).unwrap();
        assert_eq!(
            month_start(now),
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn no_subscription_means_free() {
        let store = MemoryStore::new();
        let tenant = store.add_tenant("Salon").unwrap();

        let ent = resolve(&store, tenant, Utc::now()).await.unwrap();
        assert_eq!(ent.plan, Plan::Free);
        assert_eq!(ent.status, None);
        assert!(!ent.subscribed);
        assert_eq!(ent.limit(Limit::AppointmentsPerMonth), Plan::Free.limit(Limit::AppointmentsPerMonth));
        for feature in Feature::ALL {
            assert_eq!(ent.has_feature(feature), Plan::Free.includes(feature));
        }
    }

    #[tokio::test]
    async fn inactive_statuses_fall_back_to_free() {
        for status in [
            SubscriptionStatus::Created,
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Halted,
            SubscriptionStatus::Paused,
            SubscriptionStatus::Canceled,
            SubscriptionStatus::Completed,
        ] {
            let store = MemoryStore::new();
            let tenant = store.add_tenant("Salon").unwrap();
            subscribe(&store, tenant, Plan::Enterprise, status, None).await;

            let ent = resolve(&store, tenant, Utc::now()).await.unwrap();
            assert_eq!(ent.plan, Plan::Free, "status {}", status);
            assert_eq!(ent.status, Some(status));
            assert!(!ent.has_feature(Feature::VoiceCommands));
        }
    }

    #[tokio::test]
    async fn active_subscription_unlocks_plan() {
        let store = MemoryStore::new();
        let tenant = store.add_tenant("Salon").unwrap();
        let now = Utc::now();
        subscribe(
            &store,
            tenant,
            Plan::Professional,
            SubscriptionStatus::Active,
            Some(now + Duration::days(10)),
        )
        .await;
        store.seed_appointments(tenant, 3, now).unwrap();

        let ent = resolve(&store, tenant, now).await.unwrap();
        assert_eq!(ent.plan, Plan::Professional);
        assert!(ent.subscribed);
        assert!(ent.has_feature(Feature::VoiceCommands));
        assert_eq!(ent.usage_of(Limit::AppointmentsPerMonth), 3);
    }

    #[tokio::test]
    async fn lapsed_active_row_reports_expired() {
        let store = MemoryStore::new();
        let tenant = store.add_tenant("Salon").unwrap();
        let now = Utc::now();
        subscribe(
            &store,
            tenant,
            Plan::Professional,
            SubscriptionStatus::Active,
            Some(now - Duration::hours(1)),
        )
        .await;

        let ent = resolve(&store, tenant, now).await.unwrap();
        assert_eq!(ent.plan, Plan::Free);
        assert_eq!(ent.status, Some(SubscriptionStatus::Expired));
        assert!(!ent.subscribed);
    }

    #[tokio::test]
    async fn unknown_and_suspended_tenants_are_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(
            resolve(&store, Uuid::new_v4(), Utc::now()).await,
            Err(AppError::Unauthenticated(_))
        ));

        let tenant = store.add_tenant("Salon").unwrap();
        store.suspend_tenant(tenant).unwrap();
        assert!(matches!(
            resolve(&store, tenant, Utc::now()).await,
            Err(AppError::PlanRequired(_))
        ));
    }
}
