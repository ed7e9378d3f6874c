// src/db/revocation_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{common::error::AppError, models::revocation::RevokedToken};

/// Revocation Ledger: append-only, endereçado pelo hash do token.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Idempotente: inserir o mesmo hash duas vezes não é erro.
    async fn insert(&self, record: &RevokedToken) -> Result<(), AppError>;

    async fn exists(&self, token_hash: &str) -> Result<bool, AppError>;

    /// Apaga registros cuja validade natural já passou. Devolve quantos saíram.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

#[derive(Clone)]
pub struct RevocationRepository {
    pool: PgPool,
}

impl RevocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevocationStore for RevocationRepository {
    async fn insert(&self, record: &RevokedToken) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (token_hash, principal_id, expires_at, reason, revoked_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (token_hash) DO NOTHING
            "#,
        )
        .bind(&record.token_hash)
        .bind(record.principal_id)
        .bind(record.expires_at)
        .bind(record.reason)
        .bind(record.revoked_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn exists(&self, token_hash: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE token_hash = $1)",
        )
        .bind(token_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
