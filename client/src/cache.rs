use std::time::Duration;

use catalog::{Entitlements, Feature, Limit, UsageMeter};
use tokio::{
    sync::{Mutex, RwLock},
    time::Instant,
};

use crate::{
    config::{ClientConfig, DEFAULT_TTL},
    error::ClientError,
    source::{EntitlementsSource, HttpEntitlementsSource},
};

struct Cached {
    data: Entitlements,
    fetched_at: Instant,
}

/// Entitlements cache with a fixed TTL. One instance is shared by every
/// consumer in the process; it is passed around rather than global.
///
/// Locks are never held across the network call, so concurrent misses may
/// fetch twice and the last response stored wins.
pub struct EntitlementsCache<S> {
    source: S,
    ttl: Duration,
    state: RwLock<Option<Cached>>,
    denial_notice: Mutex<Option<String>>,
}

impl EntitlementsCache<HttpEntitlementsSource> {
    pub fn from_config(config: ClientConfig) -> Self {
        let ttl = config.ttl;
        Self::with_ttl(HttpEntitlementsSource::new(config), ttl)
    }
}

impl<S: EntitlementsSource> EntitlementsCache<S> {
    pub fn new(source: S) -> Self {
        Self::with_ttl(source, DEFAULT_TTL)
    }

    pub fn with_ttl(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            state: RwLock::new(None),
            denial_notice: Mutex::new(None),
        }
    }

    /// Cached entitlements when younger than the TTL, a fresh fetch otherwise.
    /// `force` always fetches.
    pub async fn fetch_entitlements(&self, force: bool) -> Result<Entitlements, ClientError> {
        if !force {
            if let Some(cached) = self.state.read().await.as_ref() {
                if cached.fetched_at.elapsed() < self.ttl {
                    return Ok(cached.data.clone());
                }
            }
        }

        let data = match self.source.fetch().await {
            Ok(data) => data,
            Err(err) => {
                if let ClientError::PaymentRequired { message, .. } = &err {
                    *self.denial_notice.lock().await = Some(message.clone());
                }
                return Err(err);
            }
        };

        *self.state.write().await = Some(Cached {
            data: data.clone(),
            fetched_at: Instant::now(),
        });
        Ok(data)
    }

    pub async fn is_entitled(&self, feature: Feature) -> Result<bool, ClientError> {
        Ok(self.fetch_entitlements(false).await?.has_feature(feature))
    }

    pub async fn meter(&self, limit: Limit) -> Result<UsageMeter, ClientError> {
        Ok(self.fetch_entitlements(false).await?.meter(limit))
    }

    /// Drops the cached value, e.g. right after checkout completes.
    pub async fn invalidate(&self) {
        *self.state.write().await = None;
    }

    /// Message of the last 402, cleared once read.
    pub async fn take_denial_notice(&self) -> Option<String> {
        self.denial_notice.lock().await.take()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        collections::BTreeMap,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use async_trait::async_trait;
    use catalog::{Plan, SubscriptionStatus};
    use uuid::Uuid;

    use super::*;

    /// Serves a fixed plan (or a fixed failure) and counts calls.
    pub(crate) struct CountingSource {
        pub calls: Arc<AtomicUsize>,
        pub plan: Option<Plan>,
        pub deny: bool,
    }

    impl CountingSource {
        pub(crate) fn serving(plan: Plan) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                plan: Some(plan),
                deny: false,
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                plan: None,
                deny: false,
            }
        }

        pub(crate) fn denying() -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                plan: None,
                deny: true,
            }
        }
    }

    #[async_trait]
    impl EntitlementsSource for CountingSource {
        async fn fetch(&self) -> Result<Entitlements, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.deny {
                return Err(ClientError::PaymentRequired {
                    reason: "plan_required".to_string(),
                    message: "Active subscription required: Tenant is suspended".to_string(),
                    upgrade_url: "/billing".to_string(),
                });
            }
            match self.plan {
                Some(plan) => Ok(Entitlements::for_plan(
                    Uuid::new_v4(),
                    plan,
                    (plan != Plan::Free).then_some(SubscriptionStatus::Active),
                    None,
                    BTreeMap::from([(Limit::AppointmentsPerMonth, 12)]),
                )),
                None => Err(ClientError::Status {
                    status: 503,
                    message: "unavailable".to_string(),
                }),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn serves_from_cache_within_ttl() {
        let source = CountingSource::serving(Plan::Professional);
        let calls = source.calls.clone();
        let cache = EntitlementsCache::new(source);

        cache.fetch_entitlements(false).await.unwrap();
        tokio::time::advance(Duration::from_secs(29)).await;
        cache.fetch_entitlements(false).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        cache.fetch_entitlements(false).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn force_and_invalidate_refetch() {
        let source = CountingSource::serving(Plan::Free);
        let calls = source.calls.clone();
        let cache = EntitlementsCache::new(source);

        cache.fetch_entitlements(false).await.unwrap();
        cache.fetch_entitlements(true).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        cache.invalidate().await;
        cache.fetch_entitlements(false).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn helpers_read_the_cached_view() {
        let cache = EntitlementsCache::new(CountingSource::serving(Plan::Free));
        assert!(!cache.is_entitled(Feature::VoiceCommands).await.unwrap());
        assert!(cache.is_entitled(Feature::EmailNotifications).await.unwrap());

        let meter = cache.meter(Limit::AppointmentsPerMonth).await.unwrap();
        assert_eq!(meter.used, 12);
        assert_eq!(meter.limit, Some(50));
    }

    #[tokio::test]
    async fn failures_propagate_and_are_not_cached() {
        let source = CountingSource::failing();
        let calls = source.calls.clone();
        let cache = EntitlementsCache::new(source);

        assert!(cache.fetch_entitlements(false).await.is_err());
        assert!(cache.fetch_entitlements(false).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.take_denial_notice().await, None);
    }

    #[tokio::test]
    async fn payment_required_leaves_a_notice() {
        let cache = EntitlementsCache::new(CountingSource::denying());
        let err = cache.fetch_entitlements(false).await.unwrap_err();
        assert!(err.is_payment_required());

        let notice = cache.take_denial_notice().await.unwrap();
        assert!(notice.contains("suspended"));
        assert_eq!(cache.take_denial_notice().await, None);
    }
}
