use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use catalog::Limit;
use chrono::{DateTime, Utc};
use common::error::Res;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::{
        booking::{AppointmentCreateRequest, ServiceCreateRequest, StaffCreateRequest},
        subscription::SubscriptionUpsert,
    },
    models::{
        booking::{Appointment, Service, StaffMember},
        log::RequestLog,
        subscription::UserSubscription,
        tenant::Tenant,
    },
};

/// Shared handle registered as app data.
pub type SharedStore = Arc<dyn Store>;

/// Persistence used by the HTTP layer.
///
/// Every tenant-scoped call runs with the tenant context set so row-level
/// security applies.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_tenant(&self, tenant_id: Uuid) -> Res<Option<Tenant>>;

    async fn tenant_for_user(&self, user_id: Uuid) -> Res<Option<Uuid>>;

    async fn current_subscription(&self, tenant_id: Uuid) -> Res<Option<UserSubscription>>;

    /// Usage per limited resource. Appointments count from `month_start`.
    async fn usage(&self, tenant_id: Uuid, month_start: DateTime<Utc>) -> Res<BTreeMap<Limit, u64>>;

    /// Applies `data` keyed by its external id. An active result cancels the
    /// tenant's other active rows in the same unit of work.
    async fn upsert_subscription(&self, data: &SubscriptionUpsert) -> Res<UserSubscription>;

    async fn create_appointment(
        &self,
        tenant_id: Uuid,
        data: AppointmentCreateRequest,
    ) -> Res<Appointment>;

    async fn create_staff_member(
        &self,
        tenant_id: Uuid,
        data: StaffCreateRequest,
    ) -> Res<StaffMember>;

    async fn create_service(&self, tenant_id: Uuid, data: ServiceCreateRequest) -> Res<Service>;

    async fn record_request(&self, log: &RequestLog) -> Res<()>;
}

pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub fn shared(pool: Arc<PgPool>) -> SharedStore {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_tenant(&self, tenant_id: Uuid) -> Res<Option<Tenant>> {
        crate::tenant::get_tenant_by_id(&*self.pool, tenant_id).await
    }

    async fn tenant_for_user(&self, user_id: Uuid) -> Res<Option<Uuid>> {
        crate::tenant::get_tenant_id_by_user(&*self.pool, user_id).await
    }

    async fn current_subscription(&self, tenant_id: Uuid) -> Res<Option<UserSubscription>> {
        let mut tx = self.pool.begin().await?;
        crate::tenant::set_tenant_context(&mut *tx, tenant_id).await?;
        let sub = crate::subscription::get_current_subscription(&mut *tx, tenant_id).await?;
        tx.commit().await?;
        Ok(sub)
    }

    async fn usage(&self, tenant_id: Uuid, month_start: DateTime<Utc>) -> Res<BTreeMap<Limit, u64>> {
        let mut tx = self.pool.begin().await?;
        crate::tenant::set_tenant_context(&mut *tx, tenant_id).await?;
        let appointments =
            crate::usage::count_appointments_since(&mut *tx, tenant_id, month_start).await?;
        let staff = crate::usage::count_staff_members(&mut *tx, tenant_id).await?;
        let services = crate::usage::count_services(&mut *tx, tenant_id).await?;
        tx.commit().await?;

        Ok(BTreeMap::from([
            (Limit::AppointmentsPerMonth, appointments),
            (Limit::StaffMembers, staff),
            (Limit::Services, services),
        ]))
    }

    async fn upsert_subscription(&self, data: &SubscriptionUpsert) -> Res<UserSubscription> {
        let mut tx = self.pool.begin().await?;
        crate::tenant::set_tenant_context(&mut *tx, data.tenant_id).await?;
        if data.status.is_active() {
            let canceled = crate::subscription::cancel_other_active(
                &mut *tx,
                data.tenant_id,
                &data.external_subscription_id,
            )
            .await?;
            if canceled > 0 {
                log::info!(
                    "Canceled {} superseded subscription(s) for tenant {}",
                    canceled,
                    data.tenant_id
                );
            }
        }
        let sub = crate::subscription::upsert_subscription(&mut *tx, data).await?;
        tx.commit().await?;
        Ok(sub)
    }

    async fn create_appointment(
        &self,
        tenant_id: Uuid,
        data: AppointmentCreateRequest,
    ) -> Res<Appointment> {
        let mut tx = self.pool.begin().await?;
        crate::tenant::set_tenant_context(&mut *tx, tenant_id).await?;
        let appointment = crate::booking::insert_appointment(&mut *tx, tenant_id, data).await?;
        tx.commit().await?;
        Ok(appointment)
    }

    async fn create_staff_member(
        &self,
        tenant_id: Uuid,
        data: StaffCreateRequest,
    ) -> Res<StaffMember> {
        let mut tx = self.pool.begin().await?;
        crate::tenant::set_tenant_context(&mut *tx, tenant_id).await?;
        let member = crate::booking::insert_staff_member(&mut *tx, tenant_id, data).await?;
        tx.commit().await?;
        Ok(member)
    }

    async fn create_service(&self, tenant_id: Uuid, data: ServiceCreateRequest) -> Res<Service> {
        let mut tx = self.pool.begin().await?;
        crate::tenant::set_tenant_context(&mut *tx, tenant_id).await?;
        let service = crate::booking::insert_service(&mut *tx, tenant_id, data).await?;
        tx.commit().await?;
        Ok(service)
    }

    async fn record_request(&self, log: &RequestLog) -> Res<()> {
        crate::log::insert_log(&*self.pool, log).await
    }
}
