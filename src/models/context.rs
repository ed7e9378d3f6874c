// src/models/context.rs

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    auth::GlobalRole,
    staff::{StaffGrant, StaffRole},
};

/// O pedaço do StaffGrant que o pipeline carrega para a requisição.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrantSnapshot {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub role: StaffRole,
    pub active: bool,
    pub default_store_id: Option<Uuid>,
}

impl From<&StaffGrant> for GrantSnapshot {
    fn from(grant: &StaffGrant) -> Self {
        Self {
            id: grant.id,
            organization_id: grant.organization_id,
            role: grant.role,
            active: grant.is_active,
            default_store_id: grant.default_store_id,
        }
    }
}

/// Contexto do principal autenticado. Montado uma vez pelo pipeline e só lido depois.
///
/// `organization_id == None` só acontece para super admin em modo cross-tenant,
/// e significa "sem filtro de organização", não erro.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    pub principal_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub global_role: GlobalRole,
    pub staff_grant: Option<GrantSnapshot>,
}

impl AuthContext {
    pub fn is_super_admin(&self) -> bool {
        self.global_role == GlobalRole::SuperAdmin
    }

    /// Grant desativado conta como ausente.
    pub fn active_grant(&self) -> Option<&GrantSnapshot> {
        self.staff_grant.as_ref().filter(|g| g.active)
    }
}

/// Loja resolvida para a requisição (quando houver).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedStore(pub Uuid);
