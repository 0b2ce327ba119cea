use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::UnknownValue;

/// A subscription tier. Ordered from cheapest to most expensive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Free,
    Professional,
    Enterprise,
}

/// A gated product capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    VoiceCommands,
    SmsNotifications,
    EmailNotifications,
    CustomBranding,
    AdvancedAnalytics,
    MultiLocation,
    ApiAccess,
}

/// A countable resource with a per-plan ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Limit {
    AppointmentsPerMonth,
    StaffMembers,
    Services,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    Month,
    Year,
}

/// Published catalog entry for a plan, as listed to customers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: Plan,
    pub name: String,
    /// Price in the smallest currency unit (paise).
    pub price: i64,
    pub currency: String,
    pub interval: BillingInterval,
    pub features: Vec<Feature>,
    pub limits: Vec<(Limit, Option<u64>)>,
    pub active: bool,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Free, Plan::Professional, Plan::Enterprise];

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Professional => "professional",
            Plan::Enterprise => "enterprise",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Plan::Free => "Free",
            Plan::Professional => "Professional",
            Plan::Enterprise => "Enterprise",
        }
    }

    pub fn price(&self) -> i64 {
        match self {
            Plan::Free => 0,
            Plan::Professional => 99_900,
            Plan::Enterprise => 299_900,
        }
    }

    pub fn includes(&self, feature: Feature) -> bool {
        match (self, feature) {
            (Plan::Enterprise, _) => true,
            (_, Feature::EmailNotifications) => true,
            (
                Plan::Professional,
                Feature::VoiceCommands
                | Feature::SmsNotifications
                | Feature::CustomBranding
                | Feature::AdvancedAnalytics,
            ) => true,
            (Plan::Professional, Feature::MultiLocation | Feature::ApiAccess) => false,
            (
                Plan::Free,
                Feature::VoiceCommands
                | Feature::SmsNotifications
                | Feature::CustomBranding
                | Feature::AdvancedAnalytics
                | Feature::MultiLocation
                | Feature::ApiAccess,
            ) => false,
        }
    }

    /// Ceiling for `limit` on this plan. `None` means unlimited.
    pub fn limit(&self, limit: Limit) -> Option<u64> {
        match (self, limit) {
            (Plan::Free, Limit::AppointmentsPerMonth) => Some(50),
            (Plan::Free, Limit::StaffMembers) => Some(1),
            (Plan::Free, Limit::Services) => Some(5),
            (Plan::Professional, Limit::AppointmentsPerMonth) => Some(1_000),
            (Plan::Professional, Limit::StaffMembers) => Some(10),
            (Plan::Professional, Limit::Services) => Some(50),
            (Plan::Enterprise, _) => None,
        }
    }

    pub fn features(&self) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|feature| self.includes(*feature))
            .collect()
    }

    /// Cheapest plan that unlocks `feature`, used as the upgrade target.
    pub fn cheapest_with(feature: Feature) -> Plan {
        Plan::ALL
            .into_iter()
            .find(|plan| plan.includes(feature))
            .unwrap_or(Plan::Enterprise)
    }

    pub fn catalog_entry(&self) -> SubscriptionPlan {
        SubscriptionPlan {
            id: *self,
            name: self.display_name().to_string(),
            price: self.price(),
            currency: "INR".to_string(),
            interval: BillingInterval::Month,
            features: self.features(),
            limits: Limit::ALL
                .into_iter()
                .map(|limit| (limit, self.limit(limit)))
                .collect(),
            active: true,
        }
    }

    pub fn catalog() -> Vec<SubscriptionPlan> {
        Plan::ALL.iter().map(Plan::catalog_entry).collect()
    }
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::VoiceCommands,
        Feature::SmsNotifications,
        Feature::EmailNotifications,
        Feature::CustomBranding,
        Feature::AdvancedAnalytics,
        Feature::MultiLocation,
        Feature::ApiAccess,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::VoiceCommands => "voice_commands",
            Feature::SmsNotifications => "sms_notifications",
            Feature::EmailNotifications => "email_notifications",
            Feature::CustomBranding => "custom_branding",
            Feature::AdvancedAnalytics => "advanced_analytics",
            Feature::MultiLocation => "multi_location",
            Feature::ApiAccess => "api_access",
        }
    }
}

impl Limit {
    pub const ALL: [Limit; 3] = [Limit::AppointmentsPerMonth, Limit::StaffMembers, Limit::Services];

    pub fn as_str(&self) -> &'static str {
        match self {
            Limit::AppointmentsPerMonth => "appointments_per_month",
            Limit::StaffMembers => "staff_members",
            Limit::Services => "services",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Plan::ALL
            .into_iter()
            .find(|plan| plan.as_str() == s)
            .ok_or_else(|| UnknownValue {
                kind: "plan",
                value: s.to_string(),
            })
    }
}

impl FromStr for Feature {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|feature| feature.as_str() == s)
            .ok_or_else(|| UnknownValue {
                kind: "feature",
                value: s.to_string(),
            })
    }
}

impl FromStr for Limit {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Limit::ALL
            .into_iter()
            .find(|limit| limit.as_str() == s)
            .ok_or_else(|| UnknownValue {
                kind: "limit",
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_commands_need_a_paid_plan() {
        assert!(!Plan::Free.includes(Feature::VoiceCommands));
        assert!(Plan::Professional.includes(Feature::VoiceCommands));
        assert!(Plan::Enterprise.includes(Feature::VoiceCommands));
        assert_eq!(Plan::cheapest_with(Feature::VoiceCommands), Plan::Professional);
        assert_eq!(Plan::cheapest_with(Feature::ApiAccess), Plan::Enterprise);
        assert_eq!(Plan::cheapest_with(Feature::EmailNotifications), Plan::Free);
    }

    #[test]
    fn enterprise_is_unlimited() {
        for limit in Limit::ALL {
            assert_eq!(Plan::Enterprise.limit(limit), None);
        }
        assert_eq!(Plan::Free.limit(Limit::AppointmentsPerMonth), Some(50));
    }

    #[test]
    fn catalog_lists_every_plan_once() {
        let catalog = Plan::catalog();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog[0].id, Plan::Free);
        assert_eq!(catalog[0].features, vec![Feature::EmailNotifications]);
        assert!(catalog.iter().all(|p| p.active && p.currency == "INR"));
    }

    #[test]
    fn names_parse_back() {
        assert_eq!("voice_commands".parse(), Ok(Feature::VoiceCommands));
        assert_eq!("enterprise".parse(), Ok(Plan::Enterprise));
        assert_eq!("staff_members".parse(), Ok(Limit::StaffMembers));
        let err = "gold".parse::<Plan>().unwrap_err();
        assert_eq!(err.to_string(), "unknown plan: 'gold'");
    }
}
