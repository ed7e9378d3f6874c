// src/services/membership_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{MembershipStore, OrganizationStore},
    models::{context::AuthContext, staff::StaffGrant, tenancy::Store},
};

/// Loja da requisição: parâmetro de rota, depois corpo, depois a loja padrão do grant.
pub fn resolve_store_id(
    path: Option<Uuid>,
    body: Option<Uuid>,
    grant_default: Option<Uuid>,
) -> Option<Uuid> {
    path.or(body).or(grant_default)
}

#[derive(Clone)]
pub struct MembershipService {
    memberships: Arc<dyn MembershipStore>,
    organizations: Arc<dyn OrganizationStore>,
}

impl MembershipService {
    pub fn new(
        memberships: Arc<dyn MembershipStore>,
        organizations: Arc<dyn OrganizationStore>,
    ) -> Self {
        Self {
            memberships,
            organizations,
        }
    }

    /// OWNER/ADMIN: qualquer loja da própria organização, sem linha de vínculo.
    /// STAFF/VIEWER: só com vínculo explícito. Super admin: sempre.
    pub async fn can_access(&self, ctx: &AuthContext, store: &Store) -> Result<bool, AppError> {
        if ctx.is_super_admin() {
            return Ok(true);
        }

        let Some(grant) = ctx.active_grant() else {
            return Ok(false);
        };

        if store.organization_id != grant.organization_id {
            return Ok(false);
        }

        if grant.role.has_store_wide_access() {
            return Ok(true);
        }

        self.memberships.has_membership(grant.id, store.id).await
    }

    /// Carrega a loja e aplica `can_access`. Loja de outra organização responde "não encontrada"
    /// para não confirmar que ela existe.
    pub async fn authorize_store(&self, ctx: &AuthContext, store_id: Uuid) -> Result<Store, AppError> {
        let store = self
            .organizations
            .find_store(store_id)
            .await?
            .ok_or(AppError::NotFound("store"))?;

        if !ctx.is_super_admin() && ctx.organization_id != Some(store.organization_id) {
            return Err(AppError::NotFound("store"));
        }

        if !self.can_access(ctx, &store).await? {
            tracing::debug!(principal = %ctx.principal_id, store = %store_id, "Acesso à loja negado");
            return Err(AppError::StoreAccessDenied);
        }

        Ok(store)
    }

    /// Substitui o conjunto inteiro de lojas do grant. Quem manda um subconjunto revoga o resto.
    pub async fn bind(&self, grant: &StaffGrant, store_ids: &[Uuid]) -> Result<Vec<Uuid>, AppError> {
        for store_id in store_ids {
            let belongs = self
                .organizations
                .find_store(*store_id)
                .await?
                .is_some_and(|s| s.organization_id == grant.organization_id);
            if !belongs {
                return Err(AppError::NotFound("store"));
            }
        }

        self.memberships.replace_memberships(grant.id, store_ids).await?;
        tracing::info!(grant = %grant.id, stores = store_ids.len(), "Vínculos de loja substituídos");

        self.memberships.list_store_ids(grant.id).await
    }

    pub async fn store_ids_for(&self, staff_grant_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        self.memberships.list_store_ids(staff_grant_id).await
    }
}
