use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Feature, Limit, Plan, SubscriptionStatus};

/// What a tenant may do right now. Derived per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entitlements {
    pub tenant_id: Uuid,
    /// Plan whose catalog entry drives `features` and `limits`.
    pub plan: Plan,
    /// Effective status of the tenant's subscription row, `None` if it never subscribed.
    pub status: Option<SubscriptionStatus>,
    /// True only while a paid subscription is active and inside its period.
    pub subscribed: bool,
    pub current_period_end: Option<DateTime<Utc>>,
    pub features: BTreeMap<Feature, bool>,
    /// `None` is unlimited.
    pub limits: BTreeMap<Limit, Option<u64>>,
    pub usage: BTreeMap<Limit, u64>,
}

/// Numeric usage/limit pair for a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMeter {
    pub used: u64,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitCheck {
    Unlimited,
    Within { used: u64, max: u64 },
    Reached { used: u64, max: u64 },
}

impl Entitlements {
    pub fn for_plan(
        tenant_id: Uuid,
        plan: Plan,
        status: Option<SubscriptionStatus>,
        current_period_end: Option<DateTime<Utc>>,
        usage: BTreeMap<Limit, u64>,
    ) -> Self {
        let subscribed = plan != Plan::Free && status.is_some_and(|s| s.is_active());
        Self {
            tenant_id,
            plan,
            status,
            subscribed,
            current_period_end,
            features: Feature::ALL
                .into_iter()
                .map(|feature| (feature, plan.includes(feature)))
                .collect(),
            limits: Limit::ALL
                .into_iter()
                .map(|limit| (limit, plan.limit(limit)))
                .collect(),
            usage: Limit::ALL
                .into_iter()
                .map(|limit| (limit, usage.get(&limit).copied().unwrap_or(0)))
                .collect(),
        }
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.get(&feature).copied().unwrap_or(false)
    }

    pub fn limit(&self, limit: Limit) -> Option<u64> {
        self.limits.get(&limit).copied().flatten()
    }

    pub fn usage_of(&self, limit: Limit) -> u64 {
        self.usage.get(&limit).copied().unwrap_or(0)
    }

    pub fn meter(&self, limit: Limit) -> UsageMeter {
        UsageMeter {
            used: self.usage_of(limit),
            limit: self.limit(limit),
        }
    }

    pub fn check_limit(&self, limit: Limit) -> LimitCheck {
        let used = self.usage_of(limit);
        match self.limit(limit) {
            None => LimitCheck::Unlimited,
            Some(max) if used < max => LimitCheck::Within { used, max },
            Some(max) => LimitCheck::Reached { used, max },
        }
    }
}

impl UsageMeter {
    pub fn remaining(&self) -> Option<u64> {
        self.limit.map(|max| max.saturating_sub(self.used))
    }

    pub fn is_exhausted(&self) -> bool {
        self.limit.is_some_and(|max| self.used >= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(appointments: u64) -> BTreeMap<Limit, u64> {
        BTreeMap::from([(Limit::AppointmentsPerMonth, appointments)])
    }

    #[test]
    fn limit_is_reached_at_equality() {
        let ent = Entitlements::for_plan(Uuid::nil(), Plan::Free, None, None, usage(50));
        assert_eq!(
            ent.check_limit(Limit::AppointmentsPerMonth),
            LimitCheck::Reached { used: 50, max: 50 }
        );
        assert!(ent.meter(Limit::AppointmentsPerMonth).is_exhausted());

        let ent = Entitlements::for_plan(Uuid::nil(), Plan::Free, None, None, usage(49));
        assert_eq!(
            ent.check_limit(Limit::AppointmentsPerMonth),
            LimitCheck::Within { used: 49, max: 50 }
        );
        assert_eq!(ent.meter(Limit::AppointmentsPerMonth).remaining(), Some(1));
        assert!(!ent.meter(Limit::AppointmentsPerMonth).is_exhausted());
    }

    #[test]
    fn missing_usage_counts_as_zero() {
        let ent = Entitlements::for_plan(Uuid::nil(), Plan::Free, None, None, BTreeMap::new());
        assert_eq!(ent.usage_of(Limit::StaffMembers), 0);
        assert_eq!(ent.usage.len(), Limit::ALL.len());
    }

    #[test]
    fn free_plan_is_never_subscribed() {
        let ent = Entitlements::for_plan(
            Uuid::nil(),
            Plan::Free,
            Some(SubscriptionStatus::Active),
            None,
            BTreeMap::new(),
        );
        assert!(!ent.subscribed);
    }

    #[test]
    fn json_uses_string_keys_and_null_for_unlimited() {
        let ent = Entitlements::for_plan(
            Uuid::nil(),
            Plan::Enterprise,
            Some(SubscriptionStatus::Active),
            None,
            usage(7),
        );
        let json = serde_json::to_value(&ent).unwrap();
        assert_eq!(json["plan"], "enterprise");
        assert_eq!(json["status"], "active");
        assert_eq!(json["features"]["voice_commands"], true);
        assert!(json["limits"]["appointments_per_month"].is_null());
        assert_eq!(json["usage"]["appointments_per_month"], 7);

        let back: Entitlements = serde_json::from_value(json).unwrap();
        assert_eq!(back, ent);
        assert_eq!(back.check_limit(Limit::Services), LimitCheck::Unlimited);
    }
}
