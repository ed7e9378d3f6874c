// src/services/plan_limits.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrganizationStore, StaffStore},
    models::tenancy::ResourceKind,
};

/// Plan Limit Evaluator. Roda antes de persistir o recurso; não existe rollback compensatório.
///
/// Duas criações concorrentes podem passar juntas pela checagem antes de qualquer INSERT
/// confirmar. Para limites comerciais isso é aceitável.
#[derive(Clone)]
pub struct PlanLimitEvaluator {
    organizations: Arc<dyn OrganizationStore>,
    staff: Arc<dyn StaffStore>,
}

impl PlanLimitEvaluator {
    pub fn new(organizations: Arc<dyn OrganizationStore>, staff: Arc<dyn StaffStore>) -> Self {
        Self {
            organizations,
            staff,
        }
    }

    pub async fn check_resource_quota(
        &self,
        organization_id: Uuid,
        resource: ResourceKind,
    ) -> Result<(), AppError> {
        let org = self
            .organizations
            .find_organization(organization_id)
            .await?
            .ok_or(AppError::NotFound("organization"))?;

        let Some(limit) = resource.limit_in(&org.limits()) else {
            return Ok(());
        };

        let current = match resource {
            ResourceKind::Stores => self.organizations.count_stores(organization_id).await?,
            ResourceKind::StaffGrants => self.staff.count_active_grants(organization_id).await?,
        };

        if current >= limit {
            tracing::info!(
                organization = %organization_id,
                ?resource,
                plan = %org.plan,
                limit,
                current,
                "Cota do plano atingida"
            );
            return Err(AppError::QuotaExceeded {
                resource,
                plan: org.plan,
                limit,
                current,
            });
        }

        Ok(())
    }
}
