// src/db/principal_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::Principal};

pub(crate) const PRINCIPAL_COLUMNS: &str = "id, organization_id, email, password_hash, status, global_role, created_at, updated_at, deleted_at";

/// Credential Store: leitura dos logins.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, AppError>;

    /// Sem organização, a busca é global (o e-mail é único no sistema todo).
    async fn find_by_email(
        &self,
        email: &str,
        organization_id: Option<Uuid>,
    ) -> Result<Option<Principal>, AppError>;

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), AppError>;
}

// O repositório de principals, responsável pela tabela 'principals'
#[derive(Clone)]
pub struct PrincipalRepository {
    pool: PgPool,
}

impl PrincipalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalStore for PrincipalRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, AppError> {
        let sql = format!("SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE id = $1");
        let principal = sqlx::query_as::<_, Principal>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(principal)
    }

    async fn find_by_email(
        &self,
        email: &str,
        organization_id: Option<Uuid>,
    ) -> Result<Option<Principal>, AppError> {
        // Soft-deleted não aparece para login
        let sql = format!(
            r#"
            SELECT {PRINCIPAL_COLUMNS}
            FROM principals
            WHERE lower(email) = lower($1)
              AND ($2::uuid IS NULL OR organization_id = $2)
              AND deleted_at IS NULL
            "#
        );
        let principal = sqlx::query_as::<_, Principal>(&sql)
            .bind(email)
            .bind(organization_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(principal)
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE principals SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("principal"));
        }
        Ok(())
    }
}
