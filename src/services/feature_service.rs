// src/services/feature_service.rs

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FeatureStore, OrganizationStore},
    models::features::{Audience, FeatureDefinition, NewEntitlement, StoreEntitlement},
};

/// Feature Entitlement Catalog + Store Entitlement Ledger.
#[derive(Clone)]
pub struct FeatureService {
    features: Arc<dyn FeatureStore>,
    organizations: Arc<dyn OrganizationStore>,
}

impl FeatureService {
    pub fn new(features: Arc<dyn FeatureStore>, organizations: Arc<dyn OrganizationStore>) -> Self {
        Self {
            features,
            organizations,
        }
    }

    pub async fn list_catalog(&self) -> Result<Vec<FeatureDefinition>, AppError> {
        self.features.list_definitions().await
    }

    /// Sem linha = desligado. Fechado por padrão.
    pub async fn is_enabled(
        &self,
        store_id: Uuid,
        feature_key: &str,
        audience: Audience,
    ) -> Result<bool, AppError> {
        Ok(self
            .features
            .find_entitlement(store_id, feature_key, audience)
            .await?
            .is_some_and(|e| e.is_enabled))
    }

    /// Liga a funcionalidade na loja. Sempre grava a linha STAFF; se a definição for
    /// divisível, grava também a linha CUSTOMER. Limites ausentes caem no padrão do catálogo.
    pub async fn enable_for_store(
        &self,
        store_id: Uuid,
        feature_key: &str,
        staff_limits: Option<Value>,
        customer_limits: Option<Value>,
    ) -> Result<Vec<StoreEntitlement>, AppError> {
        let definition = self
            .features
            .find_definition(feature_key)
            .await?
            .ok_or(AppError::NotFound("feature"))?;

        let store = self
            .organizations
            .find_store(store_id)
            .await?
            .ok_or(AppError::NotFound("store"))?;
        let org = self
            .organizations
            .find_organization(store.organization_id)
            .await?
            .ok_or(AppError::NotFound("organization"))?;

        // 1. Plano mínimo
        if org.plan < definition.minimum_plan {
            return Err(AppError::PlanUpgradeRequired {
                feature: definition.key,
                required: definition.minimum_plan,
                current: org.plan,
            });
        }

        // 2. Pré-requisitos declarados: a linha STAFF de cada um precisa estar ligada
        for prerequisite in &definition.depends_on {
            if !self.is_enabled(store_id, prerequisite, Audience::Staff).await? {
                return Err(AppError::FeatureDependencyMissing {
                    feature: definition.key.clone(),
                    requires: prerequisite.clone(),
                });
            }
        }

        // 3. Monta as linhas
        let mut rows = vec![NewEntitlement {
            store_id,
            feature_key: definition.key.clone(),
            audience: Audience::Staff,
            is_enabled: true,
            limits: staff_limits.unwrap_or_else(|| definition.default_limits.clone()),
        }];

        if definition.is_splittable {
            rows.push(NewEntitlement {
                store_id,
                feature_key: definition.key.clone(),
                audience: Audience::Customer,
                is_enabled: true,
                limits: customer_limits.unwrap_or_else(|| definition.default_limits.clone()),
            });
        } else if customer_limits.is_some() {
            tracing::warn!(feature = %definition.key, "Limites de cliente ignorados: funcionalidade não divisível");
        }

        let saved = self.features.upsert_entitlements(&rows).await?;
        tracing::info!(store = %store_id, feature = %definition.key, rows = saved.len(), "Funcionalidade habilitada");
        Ok(saved)
    }

    /// Remove as duas linhas (STAFF e CUSTOMER) da loja.
    pub async fn disable_for_store(&self, store_id: Uuid, feature_key: &str) -> Result<u64, AppError> {
        if self.features.find_definition(feature_key).await?.is_none() {
            return Err(AppError::NotFound("feature"));
        }

        let removed = self.features.delete_entitlements(store_id, feature_key).await?;
        tracing::info!(store = %store_id, feature = %feature_key, removed, "Funcionalidade desabilitada");
        Ok(removed)
    }

    pub async fn list_for_store(&self, store_id: Uuid) -> Result<Vec<StoreEntitlement>, AppError> {
        self.features.list_entitlements(store_id).await
    }
}
