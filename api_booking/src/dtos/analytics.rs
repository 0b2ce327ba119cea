use std::collections::BTreeMap;

use catalog::{Limit, Plan, UsageMeter};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub plan: Plan,
    pub meters: BTreeMap<Limit, UsageMeter>,
    /// Limits already at their ceiling; creating more of these is refused.
    pub exhausted: Vec<Limit>,
}
