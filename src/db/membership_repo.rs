// src/db/membership_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;

/// Store Membership Index: vínculos explícitos grant <-> loja.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn has_membership(&self, staff_grant_id: Uuid, store_id: Uuid) -> Result<bool, AppError>;

    /// Lojas vinculadas, na ordem gravada.
    async fn list_store_ids(&self, staff_grant_id: Uuid) -> Result<Vec<Uuid>, AppError>;

    /// Substitui o conjunto inteiro (delete + insert). Não é aditivo.
    /// Atômico: leitores concorrentes veem o conjunto antigo ou o novo, nunca o vazio do meio.
    async fn replace_memberships(&self, staff_grant_id: Uuid, store_ids: &[Uuid]) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipStore for MembershipRepository {
    async fn has_membership(&self, staff_grant_id: Uuid, store_id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM store_memberships
                WHERE staff_grant_id = $1 AND store_id = $2
            )
            "#,
        )
        .bind(staff_grant_id)
        .bind(store_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list_store_ids(&self, staff_grant_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT store_id FROM store_memberships WHERE staff_grant_id = $1 ORDER BY position",
        )
        .bind(staff_grant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn replace_memberships(&self, staff_grant_id: Uuid, store_ids: &[Uuid]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM store_memberships WHERE staff_grant_id = $1")
            .bind(staff_grant_id)
            .execute(&mut *tx)
            .await?;

        if !store_ids.is_empty() {
            // Inserção em massa usando UNNEST, preservando a ordem recebida
            sqlx::query(
                r#"
                INSERT INTO store_memberships (staff_grant_id, store_id, position)
                SELECT $1, s.store_id, s.position::int
                FROM unnest($2::uuid[]) WITH ORDINALITY AS s(store_id, position)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(staff_grant_id)
            .bind(store_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
