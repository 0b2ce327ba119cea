//! In-process [`Store`] with the same upsert and isolation rules as Postgres.
//! Backs the HTTP test suites and local runs without a database.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use catalog::{Limit, SubscriptionStatus};
use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
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
    store::Store,
};

#[derive(Default)]
struct State {
    tenants: HashMap<Uuid, Tenant>,
    members: HashMap<Uuid, Uuid>,
    subscriptions: Vec<UserSubscription>,
    appointments: Vec<Appointment>,
    staff: Vec<StaffMember>,
    services: Vec<Service>,
    logs: Vec<RequestLog>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Res<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("Memory store lock poisoned".to_string()))
    }

    pub fn add_tenant(&self, name: &str) -> Res<Uuid> {
        let now = Utc::now();
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: "active".to_string(),
            created_at: now,
            updated_at: now,
        };
        let id = tenant.id;
        self.state()?.tenants.insert(id, tenant);
        Ok(id)
    }

    pub fn suspend_tenant(&self, tenant_id: Uuid) -> Res<()> {
        let mut state = self.state()?;
        let tenant = state
            .tenants
            .get_mut(&tenant_id)
            .ok_or_else(|| AppError::NotFound(format!("Tenant {}", tenant_id)))?;
        tenant.status = "suspended".to_string();
        tenant.updated_at = Utc::now();
        Ok(())
    }

    pub fn add_member(&self, user_id: Uuid, tenant_id: Uuid) -> Res<()> {
        self.state()?.members.insert(user_id, tenant_id);
        Ok(())
    }

    /// Inserts `count` appointments stamped with `created_at`.
    pub fn seed_appointments(
        &self,
        tenant_id: Uuid,
        count: usize,
        created_at: DateTime<Utc>,
    ) -> Res<()> {
        let mut state = self.state()?;
        for i in 0..count {
            state.appointments.push(Appointment {
                id: Uuid::new_v4(),
                tenant_id,
                customer_name: format!("Seeded customer {}", i),
                customer_phone: None,
                service_name: "Haircut".to_string(),
                starts_at: created_at,
                status: "booked".to_string(),
                created_at,
            });
        }
        Ok(())
    }

    pub fn subscriptions(&self) -> Res<Vec<UserSubscription>> {
        Ok(self.state()?.subscriptions.clone())
    }

    pub fn request_logs(&self) -> Res<Vec<RequestLog>> {
        Ok(self.state()?.logs.clone())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_tenant(&self, tenant_id: Uuid) -> Res<Option<Tenant>> {
        Ok(self.state()?.tenants.get(&tenant_id).cloned())
    }

    async fn tenant_for_user(&self, user_id: Uuid) -> Res<Option<Uuid>> {
        Ok(self.state()?.members.get(&user_id).copied())
    }

    async fn current_subscription(&self, tenant_id: Uuid) -> Res<Option<UserSubscription>> {
        Ok(self
            .state()?
            .subscriptions
            .iter()
            .filter(|sub| sub.tenant_id == tenant_id)
            .max_by_key(|sub| (sub.status.is_active(), sub.updated_at))
            .cloned())
    }

    async fn usage(&self, tenant_id: Uuid, month_start: DateTime<Utc>) -> Res<BTreeMap<Limit, u64>> {
        let state = self.state()?;
        let appointments = state
            .appointments
            .iter()
            .filter(|a| a.tenant_id == tenant_id && a.created_at >= month_start)
            .count();
        let staff = state.staff.iter().filter(|s| s.tenant_id == tenant_id).count();
        let services = state.services.iter().filter(|s| s.tenant_id == tenant_id).count();

        Ok(BTreeMap::from([
            (Limit::AppointmentsPerMonth, appointments as u64),
            (Limit::StaffMembers, staff as u64),
            (Limit::Services, services as u64),
        ]))
    }

    async fn upsert_subscription(&self, data: &SubscriptionUpsert) -> Res<UserSubscription> {
        let mut state = self.state()?;
        let now = Utc::now();

        if data.status.is_active() {
            for sub in state.subscriptions.iter_mut().filter(|sub| {
                sub.tenant_id == data.tenant_id
                    && sub.status.is_active()
                    && sub.external_subscription_id != data.external_subscription_id
            }) {
                sub.status = SubscriptionStatus::Canceled;
                sub.updated_at = now;
            }
        }

        let existing = state
            .subscriptions
            .iter()
            .position(|sub| sub.external_subscription_id == data.external_subscription_id);

        let sub = match existing {
            Some(index) => {
                let sub = &mut state.subscriptions[index];
                sub.plan = data.plan;
                sub.status = data.status;
                if data.provider_plan_id.is_some() {
                    sub.provider_plan_id = data.provider_plan_id.clone();
                }
                if data.current_period_start.is_some() {
                    sub.current_period_start = data.current_period_start;
                }
                if data.current_period_end.is_some() {
                    sub.current_period_end = data.current_period_end;
                }
                sub.updated_at = now;
                sub.clone()
            }
            None => {
                let sub = UserSubscription {
                    id: Uuid::new_v4(),
                    tenant_id: data.tenant_id,
                    plan: data.plan,
                    status: data.status,
                    external_subscription_id: data.external_subscription_id.clone(),
                    provider_plan_id: data.provider_plan_id.clone(),
                    current_period_start: data.current_period_start,
                    current_period_end: data.current_period_end,
                    created_at: now,
                    updated_at: now,
                };
                state.subscriptions.push(sub.clone());
                sub
            }
        };
        Ok(sub)
    }

    async fn create_appointment(
        &self,
        tenant_id: Uuid,
        data: AppointmentCreateRequest,
    ) -> Res<Appointment> {
        let appointment = Appointment {
            id: Uuid::new_v4(),
            tenant_id,
            customer_name: data.customer_name,
            customer_phone: data.customer_phone,
            service_name: data.service_name,
            starts_at: data.starts_at,
            status: "booked".to_string(),
            created_at: Utc::now(),
        };
        self.state()?.appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn create_staff_member(
        &self,
        tenant_id: Uuid,
        data: StaffCreateRequest,
    ) -> Res<StaffMember> {
        let member = StaffMember {
            id: Uuid::new_v4(),
            tenant_id,
            name: data.name,
            email: data.email,
            created_at: Utc::now(),
        };
        self.state()?.staff.push(member.clone());
        Ok(member)
    }

    async fn create_service(&self, tenant_id: Uuid, data: ServiceCreateRequest) -> Res<Service> {
        let service = Service {
            id: Uuid::new_v4(),
            tenant_id,
            name: data.name,
            duration_minutes: data.duration_minutes,
            price: data.price,
            created_at: Utc::now(),
        };
        self.state()?.services.push(service.clone());
        Ok(service)
    }

    async fn record_request(&self, log: &RequestLog) -> Res<()> {
        self.state()?.logs.push(log.clone());
        Ok(())
    }
}
