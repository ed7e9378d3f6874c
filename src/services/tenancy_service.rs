// src/services/tenancy_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::OrganizationStore,
    models::{
        context::AuthContext,
        tenancy::{CreateOrganizationPayload, Organization, ResourceKind, Store},
    },
    services::{membership_service::MembershipService, plan_limits::PlanLimitEvaluator},
};

#[derive(Clone)]
pub struct TenancyService {
    organizations: Arc<dyn OrganizationStore>,
    memberships: MembershipService,
    limits: PlanLimitEvaluator,
}

impl TenancyService {
    pub fn new(
        organizations: Arc<dyn OrganizationStore>,
        memberships: MembershipService,
        limits: PlanLimitEvaluator,
    ) -> Self {
        Self {
            organizations,
            memberships,
            limits,
        }
    }

    /// Só super admin cria organizações. Os limites do plano são copiados para a linha;
    /// depois disso a organização pode ter um limite zerado para NULL (ilimitado).
    pub async fn create_organization(
        &self,
        ctx: &AuthContext,
        payload: CreateOrganizationPayload,
    ) -> Result<Organization, AppError> {
        if !ctx.is_super_admin() {
            tracing::warn!(actor = %ctx.principal_id, "Criação de organização sem ser super admin");
            return Err(AppError::RoleNotAllowed);
        }

        let org = self
            .organizations
            .create_organization(payload.name.trim(), payload.plan, payload.plan.default_limits())
            .await?;
        tracing::info!(organization = %org.id, plan = %org.plan, "Organização criada");
        Ok(org)
    }

    /// LÓGICA DE NEGÓCIO: a cota de lojas é checada antes do INSERT.
    pub async fn create_store(&self, ctx: &AuthContext, name: &str) -> Result<Store, AppError> {
        let organization_id = ctx.organization_id.ok_or(AppError::TenantRequired)?;

        self.limits
            .check_resource_quota(organization_id, ResourceKind::Stores)
            .await?;

        let store = self.organizations.create_store(organization_id, name.trim()).await?;
        tracing::info!(organization = %organization_id, store = %store.id, "Loja criada");
        Ok(store)
    }

    /// Lojas visíveis para o contexto. Super admin sem tenant vê todas (sem filtro);
    /// STAFF/VIEWER só as lojas vinculadas.
    pub async fn list_stores(&self, ctx: &AuthContext) -> Result<Vec<Store>, AppError> {
        if ctx.is_super_admin() {
            return self.organizations.list_stores(ctx.organization_id).await;
        }

        let organization_id = ctx.organization_id.ok_or(AppError::TenantRequired)?;
        let stores = self.organizations.list_stores(Some(organization_id)).await?;

        let mut visible = Vec::with_capacity(stores.len());
        for store in stores {
            if self.memberships.can_access(ctx, &store).await? {
                visible.push(store);
            }
        }
        Ok(visible)
    }
}
