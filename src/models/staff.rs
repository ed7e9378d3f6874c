// src/models/staff.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// 1. StaffRole (cargo operacional dentro da organização)
// ---
// A ordem da declaração é a ordem de privilégio: OWNER no topo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "staff_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Owner,
    Admin,
    Staff,
    Viewer,
}

impl StaffRole {
    pub const ALL: [StaffRole; 4] = [
        StaffRole::Owner,
        StaffRole::Admin,
        StaffRole::Staff,
        StaffRole::Viewer,
    ];

    /// OWNER e ADMIN enxergam todas as lojas da organização sem vínculo explícito.
    pub fn has_store_wide_access(&self) -> bool {
        matches!(self, StaffRole::Owner | StaffRole::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Owner => "OWNER",
            StaffRole::Admin => "ADMIN",
            StaffRole::Staff => "STAFF",
            StaffRole::Viewer => "VIEWER",
        }
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---
// 2. StaffGrant (a "Ponte" Principal-Organização)
// ---
// Exatamente um por (organização, principal). Nunca apagado, apenas desativado.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffGrant {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub principal_id: Uuid,
    pub role: StaffRole,

    // Puramente descritivo ("Tosador", "Recepcionista"), sem peso na autorização
    #[schema(example = "Tosador")]
    pub job_title: Option<String>,

    pub is_active: bool,

    // Loja padrão usada quando a requisição não informa nenhuma
    pub default_store_id: Option<Uuid>,

    #[schema(value_type = Option<Object>)]
    pub work_schedule: Option<Value>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dados já validados para o repositório criar principal + grant + vínculos numa transação.
#[derive(Debug, Clone)]
pub struct NewStaffMember {
    pub organization_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: StaffRole,
    pub job_title: Option<String>,
    pub default_store_id: Option<Uuid>,
    pub work_schedule: Option<Value>,
    pub store_ids: Vec<Uuid>,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "joao@petshop.com")]
    pub email: String,

    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: String,

    pub role: StaffRole,

    #[validate(length(max = 80, message = "too_long"))]
    pub job_title: Option<String>,

    pub default_store_id: Option<Uuid>,

    #[schema(value_type = Option<Object>)]
    pub work_schedule: Option<Value>,

    #[serde(default)]
    pub store_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStaffGrantPayload {
    pub role: Option<StaffRole>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BindStoresPayload {
    pub store_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffMemberResponse {
    pub principal_id: Uuid,
    pub email: String,
    #[serde(flatten)]
    pub grant: StaffGrant,
    pub store_ids: Vec<Uuid>,
}
