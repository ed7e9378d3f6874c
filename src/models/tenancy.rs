// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// 1. Plan (o plano contratado pela organização)
// ---
// Ordem de declaração = ordem crescente, por isso `Ord` serve para "plano mínimo".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "organization_plan", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plan {
    Free,
    Basic,
    Pro,
    Enterprise,
}

impl Plan {
    /// Limites padrão de cada plano. `None` = ilimitado.
    pub fn default_limits(&self) -> PlanLimits {
        match self {
            Plan::Free => PlanLimits { max_stores: Some(1), max_staff: Some(3), max_monthly_bookings: Some(100) },
            Plan::Basic => PlanLimits { max_stores: Some(2), max_staff: Some(10), max_monthly_bookings: Some(1000) },
            Plan::Pro => PlanLimits { max_stores: Some(10), max_staff: Some(50), max_monthly_bookings: None },
            Plan::Enterprise => PlanLimits { max_stores: None, max_staff: None, max_monthly_bookings: None },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "FREE",
            Plan::Basic => "BASIC",
            Plan::Pro => "PRO",
            Plan::Enterprise => "ENTERPRISE",
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub max_stores: Option<i64>,
    pub max_staff: Option<i64>,
    pub max_monthly_bookings: Option<i64>,
}

// ---
// 2. Organization (o Tenant)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,

    #[schema(example = "Pet Feliz")]
    pub name: String,

    pub plan: Plan,

    // Preenchidos com o padrão do plano na criação. NULL = ilimitado.
    pub max_stores: Option<i64>,
    pub max_staff: Option<i64>,
    pub max_monthly_bookings: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Só as colunas da própria organização; o plano não é consultado de novo.
    pub fn limits(&self) -> PlanLimits {
        PlanLimits {
            max_stores: self.max_stores,
            max_staff: self.max_staff,
            max_monthly_bookings: self.max_monthly_bookings,
        }
    }
}

// ---
// 3. Store (a Loja física)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: Uuid,
    pub organization_id: Uuid,

    #[schema(example = "Unidade Centro")]
    pub name: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Recursos com cota por plano.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceKind {
    Stores,
    StaffGrants,
}

impl ResourceKind {
    pub fn limit_in(&self, limits: &PlanLimits) -> Option<i64> {
        match self {
            ResourceKind::Stores => limits.max_stores,
            ResourceKind::StaffGrants => limits.max_staff,
        }
    }
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationPayload {
    #[validate(length(min = 1, max = 120, message = "required"))]
    #[schema(example = "Pet Feliz")]
    pub name: String,

    pub plan: Plan,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStorePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Unidade Centro")]
    pub name: String,
}
