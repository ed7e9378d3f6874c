// src/services/staff_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrganizationStore, StaffStore},
    models::{
        context::AuthContext,
        staff::{
            CreateStaffPayload, NewStaffMember, StaffGrant, StaffMemberResponse,
            UpdateStaffGrantPayload,
        },
        tenancy::ResourceKind,
    },
    services::{
        auth::hash_password,
        membership_service::MembershipService,
        plan_limits::PlanLimitEvaluator,
        role_authority::check_can_provision,
    },
};

#[derive(Clone)]
pub struct StaffService {
    staff: Arc<dyn StaffStore>,
    organizations: Arc<dyn OrganizationStore>,
    memberships: MembershipService,
    limits: PlanLimitEvaluator,
    bcrypt_cost: u32,
}

impl StaffService {
    pub fn new(
        staff: Arc<dyn StaffStore>,
        organizations: Arc<dyn OrganizationStore>,
        memberships: MembershipService,
        limits: PlanLimitEvaluator,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            staff,
            organizations,
            memberships,
            limits,
            bcrypt_cost,
        }
    }

    /// O grant do principal na organização resolvida, ativo ou não.
    pub async fn grant_for(
        &self,
        organization_id: Uuid,
        principal_id: Uuid,
    ) -> Result<Option<StaffGrant>, AppError> {
        self.staff.find_grant_for(organization_id, principal_id).await
    }

    /// Cria principal + grant + vínculos. Ordem: hierarquia, cota, lojas, persistência.
    pub async fn provision(
        &self,
        ctx: &AuthContext,
        payload: CreateStaffPayload,
    ) -> Result<StaffMemberResponse, AppError> {
        check_can_provision(ctx, payload.role)?;

        let organization_id = ctx.organization_id.ok_or(AppError::TenantRequired)?;

        self.limits
            .check_resource_quota(organization_id, ResourceKind::StaffGrants)
            .await?;

        let referenced = payload.store_ids.iter().chain(payload.default_store_id.iter());
        for store_id in referenced {
            self.ensure_store_in_org(*store_id, organization_id).await?;
        }

        let password_hash = hash_password(&payload.password, self.bcrypt_cost).await?;

        let (principal, grant) = self
            .staff
            .create_staff(NewStaffMember {
                organization_id,
                email: payload.email.trim().to_lowercase(),
                password_hash,
                role: payload.role,
                job_title: payload.job_title,
                default_store_id: payload.default_store_id,
                work_schedule: payload.work_schedule,
                store_ids: payload.store_ids,
            })
            .await?;

        tracing::info!(
            actor = %ctx.principal_id,
            principal_id = %principal.id,
            role = %grant.role,
            "Funcionário provisionado"
        );

        let store_ids = self.memberships.store_ids_for(grant.id).await?;
        Ok(StaffMemberResponse {
            principal_id: principal.id,
            email: principal.email,
            grant,
            store_ids,
        })
    }

    /// Troca cargo e/ou ativo. Quem age precisa poder provisionar o cargo atual e o novo.
    pub async fn update_grant(
        &self,
        ctx: &AuthContext,
        grant_id: Uuid,
        payload: UpdateStaffGrantPayload,
    ) -> Result<StaffGrant, AppError> {
        let grant = self.grant_in_scope(ctx, grant_id).await?;

        let role = payload.role.unwrap_or(grant.role);
        let is_active = payload.is_active.unwrap_or(grant.is_active);

        check_can_provision(ctx, grant.role)?;
        check_can_provision(ctx, role)?;

        // Reativar ocupa uma vaga de novo
        if is_active && !grant.is_active {
            self.limits
                .check_resource_quota(grant.organization_id, ResourceKind::StaffGrants)
                .await?;
        }

        let updated = self.staff.update_grant(grant.id, role, is_active).await?;
        tracing::info!(
            actor = %ctx.principal_id,
            grant = %updated.id,
            role = %updated.role,
            active = updated.is_active,
            "Grant atualizado"
        );
        Ok(updated)
    }

    pub async fn bind_stores(
        &self,
        ctx: &AuthContext,
        grant_id: Uuid,
        store_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, AppError> {
        let grant = self.grant_in_scope(ctx, grant_id).await?;
        check_can_provision(ctx, grant.role)?;
        self.memberships.bind(&grant, store_ids).await
    }

    pub async fn list_grant_stores(&self, ctx: &AuthContext, grant_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let grant = self.grant_in_scope(ctx, grant_id).await?;
        self.memberships.store_ids_for(grant.id).await
    }

    /// Grant de outra organização responde "não encontrado".
    async fn grant_in_scope(&self, ctx: &AuthContext, grant_id: Uuid) -> Result<StaffGrant, AppError> {
        let grant = self
            .staff
            .find_grant(grant_id)
            .await?
            .ok_or(AppError::NotFound("staff_grant"))?;

        let visible = match ctx.organization_id {
            Some(org) => grant.organization_id == org,
            None => ctx.is_super_admin(),
        };
        if !visible {
            return Err(AppError::NotFound("staff_grant"));
        }

        Ok(grant)
    }

    async fn ensure_store_in_org(&self, store_id: Uuid, organization_id: Uuid) -> Result<(), AppError> {
        let belongs = self
            .organizations
            .find_store(store_id)
            .await?
            .is_some_and(|s| s.organization_id == organization_id);
        if belongs {
            Ok(())
        } else {
            Err(AppError::NotFound("store"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::memory::MemoryStore,
        models::{
            auth::GlobalRole,
            context::GrantSnapshot,
            staff::StaffRole,
            tenancy::Plan,
        },
    };

    struct Fixture {
        store: Arc<MemoryStore>,
        service: StaffService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let memberships = MembershipService::new(store.clone(), store.clone());
        let limits = PlanLimitEvaluator::new(store.clone(), store.clone());
        let service = StaffService::new(store.clone(), store.clone(), memberships, limits, 4);
        Fixture { store, service }
    }

    fn actor(f: &Fixture, org: Uuid, role: StaffRole) -> AuthContext {
        let p = f.store.add_principal(Some(org), &format!("{}@x.com", Uuid::new_v4()), "", GlobalRole::User);
        let grant = f.store.add_grant(org, p.id, role);
        AuthContext {
            principal_id: p.id,
            organization_id: Some(org),
            global_role: GlobalRole::User,
            staff_grant: Some(GrantSnapshot::from(&grant)),
        }
    }

    fn payload(email: &str, role: StaffRole, store_ids: Vec<Uuid>) -> CreateStaffPayload {
        CreateStaffPayload {
            email: email.to_string(),
            password: "segredo123".to_string(),
            role,
            job_title: Some("Tosador".to_string()),
            default_store_id: None,
            work_schedule: None,
            store_ids,
        }
    }

    #[tokio::test]
    async fn owner_provisions_every_role() {
        let f = fixture();
        let org = f.store.add_organization(Plan::Enterprise);
        let owner = actor(&f, org.id, StaffRole::Owner);

        for (i, role) in StaffRole::ALL.into_iter().enumerate() {
            let created = f
                .service
                .provision(&owner, payload(&format!("n{i}@x.com"), role, vec![]))
                .await
                .unwrap();
            assert_eq!(created.grant.role, role);
            assert_eq!(created.grant.organization_id, org.id);
        }
    }

    #[tokio::test]
    async fn admin_cannot_provision_owner_or_admin() {
        let f = fixture();
        let org = f.store.add_organization(Plan::Enterprise);
        let admin = actor(&f, org.id, StaffRole::Admin);

        for role in [StaffRole::Owner, StaffRole::Admin] {
            let err = f.service.provision(&admin, payload("a@x.com", role, vec![])).await.unwrap_err();
            assert!(matches!(err, AppError::RoleNotProvisionable { target, .. } if target == role));
        }
        assert!(f.service.provision(&admin, payload("b@x.com", StaffRole::Viewer, vec![])).await.is_ok());
    }

    #[tokio::test]
    async fn staff_cannot_provision_anything() {
        let f = fixture();
        let org = f.store.add_organization(Plan::Enterprise);
        let staff = actor(&f, org.id, StaffRole::Staff);

        let err = f
            .service
            .provision(&staff, payload("c@x.com", StaffRole::Viewer, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RoleNotAllowed));
    }

    #[tokio::test]
    async fn provisioning_respects_staff_quota() {
        let f = fixture();
        let org = f.store.add_organization(Plan::Free); // 3 funcionários
        let owner = actor(&f, org.id, StaffRole::Owner);

        f.service.provision(&owner, payload("a@x.com", StaffRole::Staff, vec![])).await.unwrap();
        f.service.provision(&owner, payload("b@x.com", StaffRole::Staff, vec![])).await.unwrap();

        let err = f
            .service
            .provision(&owner, payload("c@x.com", StaffRole::Staff, vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "STAFF_LIMIT_EXCEEDED");
    }

    #[tokio::test]
    async fn provisioning_binds_requested_stores_and_rejects_foreign_ones() {
        let f = fixture();
        let org = f.store.add_organization(Plan::Pro);
        let other = f.store.add_organization(Plan::Pro);
        let mine = f.store.add_store(org.id, "Centro");
        let foreign = f.store.add_store(other.id, "Alheia");
        let owner = actor(&f, org.id, StaffRole::Owner);

        let created = f
            .service
            .provision(&owner, payload("a@x.com", StaffRole::Staff, vec![mine.id]))
            .await
            .unwrap();
        assert_eq!(created.store_ids, vec![mine.id]);

        let err = f
            .service
            .provision(&owner, payload("b@x.com", StaffRole::Staff, vec![foreign.id]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("store")));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let f = fixture();
        let org = f.store.add_organization(Plan::Pro);
        let owner = actor(&f, org.id, StaffRole::Owner);

        f.service.provision(&owner, payload("a@x.com", StaffRole::Staff, vec![])).await.unwrap();
        let err = f
            .service
            .provision(&owner, payload("A@x.com", StaffRole::Staff, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn admin_cannot_touch_owner_grant_or_promote_to_admin() {
        let f = fixture();
        let org = f.store.add_organization(Plan::Pro);
        let admin = actor(&f, org.id, StaffRole::Admin);
        let owner = actor(&f, org.id, StaffRole::Owner);
        let staff = actor(&f, org.id, StaffRole::Staff);

        let owner_grant = owner.staff_grant.unwrap().id;
        let staff_grant = staff.staff_grant.unwrap().id;

        let demote = UpdateStaffGrantPayload { role: Some(StaffRole::Viewer), is_active: None };
        assert!(f.service.update_grant(&admin, owner_grant, demote).await.is_err());

        let promote = UpdateStaffGrantPayload { role: Some(StaffRole::Admin), is_active: None };
        assert!(f.service.update_grant(&admin, staff_grant, promote).await.is_err());

        let deactivate = UpdateStaffGrantPayload { role: None, is_active: Some(false) };
        let updated = f.service.update_grant(&admin, staff_grant, deactivate).await.unwrap();
        assert!(!updated.is_active);
        assert_eq!(updated.role, StaffRole::Staff);
    }

    #[tokio::test]
    async fn grant_of_other_org_is_not_found() {
        let f = fixture();
        let org = f.store.add_organization(Plan::Pro);
        let other = f.store.add_organization(Plan::Pro);
        let owner = actor(&f, org.id, StaffRole::Owner);
        let foreign = actor(&f, other.id, StaffRole::Staff);

        let err = f
            .service
            .list_grant_stores(&owner, foreign.staff_grant.unwrap().id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("staff_grant")));
    }

    #[tokio::test]
    async fn bind_stores_replaces_set() {
        let f = fixture();
        let org = f.store.add_organization(Plan::Pro);
        let s1 = f.store.add_store(org.id, "Centro");
        let s2 = f.store.add_store(org.id, "Norte");
        let owner = actor(&f, org.id, StaffRole::Owner);
        let staff = actor(&f, org.id, StaffRole::Staff);
        let grant_id = staff.staff_grant.unwrap().id;

        f.service.bind_stores(&owner, grant_id, &[s1.id, s2.id]).await.unwrap();
        let now = f.service.bind_stores(&owner, grant_id, &[s2.id]).await.unwrap();
        assert_eq!(now, vec![s2.id]);
        assert_eq!(f.service.list_grant_stores(&owner, grant_id).await.unwrap(), vec![s2.id]);
    }
}
