// src/db/feature_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::features::{Audience, FeatureDefinition, NewEntitlement, StoreEntitlement},
};

const DEFINITION_COLUMNS: &str = "key, name, category, minimum_plan, default_limits, is_splittable, depends_on";
const ENTITLEMENT_COLUMNS: &str = "store_id, feature_key, audience, is_enabled, limits, updated_at";

/// Catálogo global + ledger por loja. Os módulos de negócio só passam por aqui.
#[async_trait]
pub trait FeatureStore: Send + Sync {
    async fn list_definitions(&self) -> Result<Vec<FeatureDefinition>, AppError>;

    async fn find_definition(&self, key: &str) -> Result<Option<FeatureDefinition>, AppError>;

    async fn find_entitlement(
        &self,
        store_id: Uuid,
        feature_key: &str,
        audience: Audience,
    ) -> Result<Option<StoreEntitlement>, AppError>;

    async fn list_entitlements(&self, store_id: Uuid) -> Result<Vec<StoreEntitlement>, AppError>;

    /// Grava todas as linhas numa transação (upsert por loja+chave+público).
    async fn upsert_entitlements(
        &self,
        rows: &[NewEntitlement],
    ) -> Result<Vec<StoreEntitlement>, AppError>;

    /// Remove as linhas dos dois públicos. Hard delete.
    async fn delete_entitlements(&self, store_id: Uuid, feature_key: &str) -> Result<u64, AppError>;
}

#[derive(Clone)]
pub struct FeatureRepository {
    pool: PgPool,
}

impl FeatureRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeatureStore for FeatureRepository {
    async fn list_definitions(&self) -> Result<Vec<FeatureDefinition>, AppError> {
        let sql = format!("SELECT {DEFINITION_COLUMNS} FROM feature_definitions ORDER BY category, key");
        let definitions = sqlx::query_as::<_, FeatureDefinition>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(definitions)
    }

    async fn find_definition(&self, key: &str) -> Result<Option<FeatureDefinition>, AppError> {
        let sql = format!("SELECT {DEFINITION_COLUMNS} FROM feature_definitions WHERE key = $1");
        let definition = sqlx::query_as::<_, FeatureDefinition>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(definition)
    }

    async fn find_entitlement(
        &self,
        store_id: Uuid,
        feature_key: &str,
        audience: Audience,
    ) -> Result<Option<StoreEntitlement>, AppError> {
        let sql = format!(
            r#"
            SELECT {ENTITLEMENT_COLUMNS}
            FROM store_entitlements
            WHERE store_id = $1 AND feature_key = $2 AND audience = $3
            "#
        );
        let entitlement = sqlx::query_as::<_, StoreEntitlement>(&sql)
            .bind(store_id)
            .bind(feature_key)
            .bind(audience)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entitlement)
    }

    async fn list_entitlements(&self, store_id: Uuid) -> Result<Vec<StoreEntitlement>, AppError> {
        let sql = format!(
            "SELECT {ENTITLEMENT_COLUMNS} FROM store_entitlements WHERE store_id = $1 ORDER BY feature_key, audience"
        );
        let entitlements = sqlx::query_as::<_, StoreEntitlement>(&sql)
            .bind(store_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(entitlements)
    }

    async fn upsert_entitlements(
        &self,
        rows: &[NewEntitlement],
    ) -> Result<Vec<StoreEntitlement>, AppError> {
        let mut tx = self.pool.begin().await?;
        let sql = format!(
            r#"
            INSERT INTO store_entitlements (store_id, feature_key, audience, is_enabled, limits)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (store_id, feature_key, audience)
            DO UPDATE SET
                is_enabled = EXCLUDED.is_enabled,
                limits = EXCLUDED.limits,
                updated_at = NOW()
            RETURNING {ENTITLEMENT_COLUMNS}
            "#
        );

        let mut saved = Vec::with_capacity(rows.len());
        for row in rows {
            let entitlement = sqlx::query_as::<_, StoreEntitlement>(&sql)
                .bind(row.store_id)
                .bind(&row.feature_key)
                .bind(row.audience)
                .bind(row.is_enabled)
                .bind(&row.limits)
                .fetch_one(&mut *tx)
                .await?;
            saved.push(entitlement);
        }

        tx.commit().await?;
        Ok(saved)
    }

    async fn delete_entitlements(&self, store_id: Uuid, feature_key: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM store_entitlements WHERE store_id = $1 AND feature_key = $2")
            .bind(store_id)
            .bind(feature_key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
