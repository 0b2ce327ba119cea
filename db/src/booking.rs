use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::booking::{AppointmentCreateRequest, ServiceCreateRequest, StaffCreateRequest},
    models::booking::{Appointment, Service, StaffMember},
};

pub async fn insert_appointment<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    tenant_id: Uuid,
    data: AppointmentCreateRequest,
) -> Res<Appointment> {
    sqlx::query_as::<_, Appointment>(
        r#"
        INSERT INTO appointments (tenant_id, customer_name, customer_phone, service_name, starts_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(tenant_id)
    .bind(data.customer_name)
    .bind(data.customer_phone)
    .bind(data.service_name)
    .bind(data.starts_at)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert_staff_member<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    tenant_id: Uuid,
    data: StaffCreateRequest,
) -> Res<StaffMember> {
    sqlx::query_as::<_, StaffMember>(
        "INSERT INTO staff_members (tenant_id, name, email) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(tenant_id)
    .bind(data.name)
    .bind(data.email)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert_service<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    tenant_id: Uuid,
    data: ServiceCreateRequest,
) -> Res<Service> {
    sqlx::query_as::<_, Service>(
        r#"
        INSERT INTO services (tenant_id, name, duration_minutes, price)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(tenant_id)
    .bind(data.name)
    .bind(data.duration_minutes)
    .bind(data.price)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}
