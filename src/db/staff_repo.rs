// src/db/staff_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::principal_repo::PRINCIPAL_COLUMNS,
    models::{
        auth::Principal,
        staff::{NewStaffMember, StaffGrant, StaffRole},
    },
};

const GRANT_COLUMNS: &str = "id, organization_id, principal_id, role, job_title, is_active, default_store_id, work_schedule, created_at, updated_at";

#[async_trait]
pub trait StaffStore: Send + Sync {
    async fn find_grant(&self, id: Uuid) -> Result<Option<StaffGrant>, AppError>;

    /// O grant (ativo ou não) de um principal numa organização.
    async fn find_grant_for(
        &self,
        organization_id: Uuid,
        principal_id: Uuid,
    ) -> Result<Option<StaffGrant>, AppError>;

    async fn count_active_grants(&self, organization_id: Uuid) -> Result<i64, AppError>;

    /// Cria principal + grant + vínculos com lojas numa única transação.
    async fn create_staff(&self, member: NewStaffMember) -> Result<(Principal, StaffGrant), AppError>;

    async fn update_grant(
        &self,
        id: Uuid,
        role: StaffRole,
        is_active: bool,
    ) -> Result<StaffGrant, AppError>;
}

#[derive(Clone)]
pub struct StaffRepository {
    pool: PgPool,
}

impl StaffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StaffStore for StaffRepository {
    async fn find_grant(&self, id: Uuid) -> Result<Option<StaffGrant>, AppError> {
        let sql = format!("SELECT {GRANT_COLUMNS} FROM staff_grants WHERE id = $1");
        let grant = sqlx::query_as::<_, StaffGrant>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(grant)
    }

    async fn find_grant_for(
        &self,
        organization_id: Uuid,
        principal_id: Uuid,
    ) -> Result<Option<StaffGrant>, AppError> {
        let sql = format!(
            "SELECT {GRANT_COLUMNS} FROM staff_grants WHERE organization_id = $1 AND principal_id = $2"
        );
        let grant = sqlx::query_as::<_, StaffGrant>(&sql)
            .bind(organization_id)
            .bind(principal_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(grant)
    }

    async fn count_active_grants(&self, organization_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM staff_grants WHERE organization_id = $1 AND is_active = true",
        )
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn create_staff(&self, member: NewStaffMember) -> Result<(Principal, StaffGrant), AppError> {
        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 1. Cria o Principal
        let sql = format!(
            r#"
            INSERT INTO principals (organization_id, email, password_hash, status, global_role)
            VALUES ($1, $2, $3, 'ACTIVE', 'USER')
            RETURNING {PRINCIPAL_COLUMNS}
            "#
        );
        let principal = sqlx::query_as::<_, Principal>(&sql)
            .bind(member.organization_id)
            .bind(&member.email)
            .bind(&member.password_hash)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::EmailAlreadyExists;
                    }
                }
                e.into()
            })?;

        // 2. Cria o Grant
        let sql = format!(
            r#"
            INSERT INTO staff_grants (organization_id, principal_id, role, job_title, is_active, default_store_id, work_schedule)
            VALUES ($1, $2, $3, $4, true, $5, $6)
            RETURNING {GRANT_COLUMNS}
            "#
        );
        let grant = sqlx::query_as::<_, StaffGrant>(&sql)
            .bind(member.organization_id)
            .bind(principal.id)
            .bind(member.role)
            .bind(&member.job_title)
            .bind(member.default_store_id)
            .bind(&member.work_schedule)
            .fetch_one(&mut *tx)
            .await?;

        // 3. Vínculos com lojas, na ordem recebida
        if !member.store_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO store_memberships (staff_grant_id, store_id, position)
                SELECT $1, s.store_id, s.position::int
                FROM unnest($2::uuid[]) WITH ORDINALITY AS s(store_id, position)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(grant.id)
            .bind(&member.store_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        Ok((principal, grant))
    }

    async fn update_grant(
        &self,
        id: Uuid,
        role: StaffRole,
        is_active: bool,
    ) -> Result<StaffGrant, AppError> {
        let sql = format!(
            r#"
            UPDATE staff_grants
            SET role = $2, is_active = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {GRANT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, StaffGrant>(&sql)
            .bind(id)
            .bind(role)
            .bind(is_active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("staff_grant"))
    }
}
