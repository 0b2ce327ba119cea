//! Client side of the entitlements API: a short-lived cache over
//! `GET /api/v1/tenants/current` and a feature gate built on it.

pub mod cache;
pub mod config;
pub mod error;
pub mod gate;
pub mod source;

pub use cache::EntitlementsCache;
pub use config::ClientConfig;
pub use error::ClientError;
pub use gate::{FeatureGate, GateState, UpgradePrompt};
pub use source::{EntitlementsSource, HttpEntitlementsSource};
