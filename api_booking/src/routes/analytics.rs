use std::collections::BTreeMap;

use actix_web::{Responder, get, web};
use catalog::{Entitlements, Limit, UsageMeter};
use common::{error::Res, http::Success};

use crate::dtos::analytics::AnalyticsSummary;

/// Usage meters for the current month. Reads the entitlements the gate
/// already resolved for this request.
#[get("/summary")]
pub async fn get_summary(entitlements: web::ReqData<Entitlements>) -> Res<impl Responder> {
    let meters: BTreeMap<Limit, UsageMeter> = Limit::ALL
        .into_iter()
        .map(|limit| (limit, entitlements.meter(limit)))
        .collect();
    let exhausted = meters
        .iter()
        .filter(|(_, meter)| meter.is_exhausted())
        .map(|(limit, _)| *limit)
        .collect();

    Success::ok(AnalyticsSummary {
        plan: entitlements.plan,
        meters,
        exhausted,
    })
}
