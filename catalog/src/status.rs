use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::UnknownValue;

/// Lifecycle state of a tenant's subscription row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Created,
    Authenticated,
    Active,
    PastDue,
    Halted,
    Paused,
    Canceled,
    Completed,
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Created => "created",
            SubscriptionStatus::Authenticated => "authenticated",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Halted => "halted",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Completed => "completed",
            SubscriptionStatus::Expired => "expired",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts both the stored names and the billing provider's spellings
/// (`pending`, `cancelled`).
impl FromStr for SubscriptionStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(SubscriptionStatus::Created),
            "authenticated" => Ok(SubscriptionStatus::Authenticated),
            "active" => Ok(SubscriptionStatus::Active),
            "past_due" | "pending" => Ok(SubscriptionStatus::PastDue),
            "halted" => Ok(SubscriptionStatus::Halted),
            "paused" => Ok(SubscriptionStatus::Paused),
            "canceled" | "cancelled" => Ok(SubscriptionStatus::Canceled),
            "completed" => Ok(SubscriptionStatus::Completed),
            "expired" => Ok(SubscriptionStatus::Expired),
            other => Err(UnknownValue {
                kind: "subscription status",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_spellings_map_to_stored_names() {
        assert_eq!("pending".parse(), Ok(SubscriptionStatus::PastDue));
        assert_eq!("cancelled".parse(), Ok(SubscriptionStatus::Canceled));
        assert_eq!(SubscriptionStatus::Canceled.as_str(), "canceled");
        assert!("trialing".parse::<SubscriptionStatus>().is_err());
    }
}
