// src/db/organization_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::tenancy::{Organization, Plan, PlanLimits, Store},
};

const ORGANIZATION_COLUMNS: &str = "id, name, plan, max_stores, max_staff, max_monthly_bookings, created_at, updated_at";
const STORE_COLUMNS: &str = "id, organization_id, name, created_at, updated_at";

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn create_organization(
        &self,
        name: &str,
        plan: Plan,
        limits: PlanLimits,
    ) -> Result<Organization, AppError>;

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>, AppError>;

    async fn find_store(&self, id: Uuid) -> Result<Option<Store>, AppError>;

    /// `None` = modo cross-tenant (super admin): sem filtro de organização.
    async fn list_stores(&self, organization_id: Option<Uuid>) -> Result<Vec<Store>, AppError>;

    async fn count_stores(&self, organization_id: Uuid) -> Result<i64, AppError>;

    async fn create_store(&self, organization_id: Uuid, name: &str) -> Result<Store, AppError>;
}

#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationStore for OrganizationRepository {
    async fn create_organization(
        &self,
        name: &str,
        plan: Plan,
        limits: PlanLimits,
    ) -> Result<Organization, AppError> {
        let sql = format!(
            r#"
            INSERT INTO organizations (name, plan, max_stores, max_staff, max_monthly_bookings)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ORGANIZATION_COLUMNS}
            "#
        );
        let org = sqlx::query_as::<_, Organization>(&sql)
            .bind(name)
            .bind(plan)
            .bind(limits.max_stores)
            .bind(limits.max_staff)
            .bind(limits.max_monthly_bookings)
            .fetch_one(&self.pool)
            .await?;
        Ok(org)
    }

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        let sql = format!("SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE id = $1");
        let org = sqlx::query_as::<_, Organization>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(org)
    }

    async fn find_store(&self, id: Uuid) -> Result<Option<Store>, AppError> {
        let sql = format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = $1");
        let store = sqlx::query_as::<_, Store>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }

    async fn list_stores(&self, organization_id: Option<Uuid>) -> Result<Vec<Store>, AppError> {
        let sql = format!(
            r#"
            SELECT {STORE_COLUMNS}
            FROM stores
            WHERE ($1::uuid IS NULL OR organization_id = $1)
            ORDER BY created_at
            "#
        );
        let stores = sqlx::query_as::<_, Store>(&sql)
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(stores)
    }

    async fn count_stores(&self, organization_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stores WHERE organization_id = $1")
            .bind(organization_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create_store(&self, organization_id: Uuid, name: &str) -> Result<Store, AppError> {
        let sql = format!(
            "INSERT INTO stores (organization_id, name) VALUES ($1, $2) RETURNING {STORE_COLUMNS}"
        );
        let store = sqlx::query_as::<_, Store>(&sql)
            .bind(organization_id)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(store)
    }
}
