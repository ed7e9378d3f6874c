// src/models/features.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::tenancy::Plan;

/// Para quem a funcionalidade está ligada: uso interno (equipe) ou voltado ao cliente final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "entitlement_audience", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Audience {
    Staff,
    Customer,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Staff => "STAFF",
            Audience::Customer => "CUSTOMER",
        }
    }
}

impl std::fmt::Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---
// Catálogo global (somente leitura para os módulos de negócio)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDefinition {
    #[schema(example = "live_cam")]
    pub key: String,

    #[schema(example = "Câmera ao vivo")]
    pub name: String,

    #[schema(example = "MONITORING")]
    pub category: String,

    pub minimum_plan: Plan,

    #[schema(value_type = Object, example = json!({"maxCameras": 2}))]
    pub default_limits: Value,

    // Pode ser ligada separadamente para equipe e para clientes?
    pub is_splittable: bool,

    // Pré-requisitos declarados (chaves de outras funcionalidades)
    #[schema(example = json!(["bookings"]))]
    pub depends_on: Vec<String>,
}

// ---
// Ledger por loja: (loja, chave, público) é único
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreEntitlement {
    pub store_id: Uuid,
    pub feature_key: String,
    pub audience: Audience,
    pub is_enabled: bool,

    #[schema(value_type = Object)]
    pub limits: Value,

    pub updated_at: DateTime<Utc>,
}

/// Linha a gravar (upsert) no ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntitlement {
    pub store_id: Uuid,
    pub feature_key: String,
    pub audience: Audience,
    pub is_enabled: bool,
    pub limits: Value,
}

// ---
// Payloads
// ---

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnableFeaturePayload {
    #[schema(value_type = Option<Object>)]
    pub staff_limits: Option<Value>,

    #[schema(value_type = Option<Object>)]
    pub customer_limits: Option<Value>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EntitlementQuery {
    /// STAFF quando ausente
    pub audience: Option<Audience>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementCheck {
    pub store_id: Uuid,
    pub feature_key: String,
    pub audience: Audience,
    pub enabled: bool,
}
