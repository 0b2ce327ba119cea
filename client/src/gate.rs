use std::sync::Arc;

use catalog::{Feature, Plan};

use crate::{cache::EntitlementsCache, error::ClientError, source::EntitlementsSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Loading,
    Entitled,
    NotEntitled { upgrade_to: Plan },
    Failed(String),
}

/// What to show in place of gated content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradePrompt {
    pub feature: Feature,
    /// `None` when entitlements could not be loaded at all.
    pub upgrade_to: Option<Plan>,
    pub message: String,
}

/// Shows content only when the tenant's plan includes `feature`.
///
/// Starts in [`GateState::Loading`]; [`FeatureGate::mount`] evaluates once,
/// without retrying. Mounting again goes through the cache TTL.
pub struct FeatureGate<S> {
    cache: Arc<EntitlementsCache<S>>,
    feature: Feature,
    state: GateState,
}

impl<S: EntitlementsSource> FeatureGate<S> {
    pub fn new(cache: Arc<EntitlementsCache<S>>, feature: Feature) -> Self {
        Self {
            cache,
            feature,
            state: GateState::Loading,
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub async fn mount(&mut self) -> &GateState {
        self.state = match self.cache.is_entitled(self.feature).await {
            Ok(true) => GateState::Entitled,
            Ok(false) | Err(ClientError::PaymentRequired { .. }) => GateState::NotEntitled {
                upgrade_to: Plan::cheapest_with(self.feature),
            },
            Err(err) => {
                log::warn!("Could not load entitlements for {}: {}", self.feature, err);
                GateState::Failed(err.to_string())
            }
        };
        &self.state
    }

    /// `None` while loading, `children()` when entitled, otherwise the fallback
    /// built from an [`UpgradePrompt`].
    pub fn render<T>(
        &self,
        children: impl FnOnce() -> T,
        fallback: impl FnOnce(UpgradePrompt) -> T,
    ) -> Option<T> {
        match &self.state {
            GateState::Loading => None,
            GateState::Entitled => Some(children()),
            GateState::NotEntitled { upgrade_to } => Some(fallback(UpgradePrompt {
                feature: self.feature,
                upgrade_to: Some(*upgrade_to),
                message: format!(
                    "Upgrade to {} to unlock {}",
                    upgrade_to.display_name(),
                    self.feature
                ),
            })),
            GateState::Failed(_) => Some(fallback(UpgradePrompt {
                feature: self.feature,
                upgrade_to: None,
                message: "Failed to load plan".to_string(),
            })),
        }
    }
}
