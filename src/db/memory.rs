// src/db/memory.rs
//
// Implementação em memória de todos os stores, usada só nos testes.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        FeatureStore, MembershipStore, OrganizationStore, PrincipalStore, RevocationStore,
        StaffStore,
    },
    models::{
        auth::{GlobalRole, Principal, PrincipalStatus},
        features::{Audience, FeatureDefinition, NewEntitlement, StoreEntitlement},
        revocation::RevokedToken,
        staff::{NewStaffMember, StaffGrant, StaffRole},
        tenancy::{Organization, Plan, PlanLimits, Store},
    },
};

#[derive(Default)]
struct State {
    principals: HashMap<Uuid, Principal>,
    revoked: HashMap<String, RevokedToken>,
    grants: HashMap<Uuid, StaffGrant>,
    memberships: HashMap<Uuid, Vec<Uuid>>,
    organizations: HashMap<Uuid, Organization>,
    stores: Vec<Store>,
    definitions: HashMap<String, FeatureDefinition>,
    entitlements: HashMap<(Uuid, String, Audience), StoreEntitlement>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Helpers de seed ---

    /// Mesmo caminho da criação real: limites do plano gravados na organização.
    pub fn add_organization(&self, plan: Plan) -> Organization {
        self.insert_organization(&format!("Org {plan}"), plan, plan.default_limits())
    }

    fn insert_organization(&self, name: &str, plan: Plan, limits: PlanLimits) -> Organization {
        let now = Utc::now();
        let org = Organization {
            id: Uuid::new_v4(),
            name: name.to_string(),
            plan,
            max_stores: limits.max_stores,
            max_staff: limits.max_staff,
            max_monthly_bookings: limits.max_monthly_bookings,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().organizations.insert(org.id, org.clone());
        org
    }

    pub fn set_store_limit(&self, organization_id: Uuid, max_stores: Option<i64>) {
        let mut state = self.state.lock().unwrap();
        if let Some(org) = state.organizations.get_mut(&organization_id) {
            org.max_stores = max_stores;
        }
    }

    pub fn add_store(&self, organization_id: Uuid, name: &str) -> Store {
        let now = Utc::now();
        let store = Store {
            id: Uuid::new_v4(),
            organization_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().stores.push(store.clone());
        store
    }

    pub fn add_principal(
        &self,
        organization_id: Option<Uuid>,
        email: &str,
        password_hash: &str,
        global_role: GlobalRole,
    ) -> Principal {
        let now = Utc::now();
        let principal = Principal {
            id: Uuid::new_v4(),
            organization_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            status: PrincipalStatus::Active,
            global_role,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.state.lock().unwrap().principals.insert(principal.id, principal.clone());
        principal
    }

    pub fn set_principal_status(&self, id: Uuid, status: PrincipalStatus) {
        if let Some(p) = self.state.lock().unwrap().principals.get_mut(&id) {
            p.status = status;
        }
    }

    pub fn add_grant(&self, organization_id: Uuid, principal_id: Uuid, role: StaffRole) -> StaffGrant {
        let now = Utc::now();
        let grant = StaffGrant {
            id: Uuid::new_v4(),
            organization_id,
            principal_id,
            role,
            job_title: None,
            is_active: true,
            default_store_id: None,
            work_schedule: None,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().grants.insert(grant.id, grant.clone());
        grant
    }

    pub fn set_default_store(&self, grant_id: Uuid, store_id: Option<Uuid>) {
        if let Some(g) = self.state.lock().unwrap().grants.get_mut(&grant_id) {
            g.default_store_id = store_id;
        }
    }

    pub fn add_definition(&self, key: &str, minimum_plan: Plan, is_splittable: bool, depends_on: &[&str]) {
        let definition = FeatureDefinition {
            key: key.to_string(),
            name: key.to_string(),
            category: "TEST".to_string(),
            minimum_plan,
            default_limits: json!({ "max": 10 }),
            is_splittable,
            depends_on: depends_on.iter().map(|d| d.to_string()).collect(),
        };
        self.state.lock().unwrap().definitions.insert(key.to_string(), definition);
    }

    pub fn revoked_count(&self) -> usize {
        self.state.lock().unwrap().revoked.len()
    }

    pub fn insert_revoked_at(&self, token_hash: &str, principal_id: Uuid, expires_at: DateTime<Utc>) {
        let record = RevokedToken {
            token_hash: token_hash.to_string(),
            principal_id,
            expires_at,
            reason: crate::models::revocation::RevocationReason::Forced,
            revoked_at: Utc::now(),
        };
        self.state.lock().unwrap().revoked.insert(record.token_hash.clone(), record);
    }
}

#[async_trait]
impl PrincipalStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, AppError> {
        Ok(self.state.lock().unwrap().principals.get(&id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &str,
        organization_id: Option<Uuid>,
    ) -> Result<Option<Principal>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .principals
            .values()
            .find(|p| {
                p.email.eq_ignore_ascii_case(email)
                    && p.deleted_at.is_none()
                    && organization_id.is_none_or(|org| p.organization_id == Some(org))
            })
            .cloned())
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let principal = state.principals.get_mut(&id).ok_or(AppError::NotFound("principal"))?;
        principal.password_hash = password_hash.to_string();
        Ok(())
    }
}

#[async_trait]
impl RevocationStore for MemoryStore {
    async fn insert(&self, record: &RevokedToken) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state
            .revoked
            .entry(record.token_hash.clone())
            .or_insert_with(|| record.clone());
        Ok(())
    }

    async fn exists(&self, token_hash: &str) -> Result<bool, AppError> {
        Ok(self.state.lock().unwrap().revoked.contains_key(token_hash))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut state = self.state.lock().unwrap();
        let before = state.revoked.len();
        state.revoked.retain(|_, r| r.expires_at > now);
        Ok((before - state.revoked.len()) as u64)
    }
}

#[async_trait]
impl StaffStore for MemoryStore {
    async fn find_grant(&self, id: Uuid) -> Result<Option<StaffGrant>, AppError> {
        Ok(self.state.lock().unwrap().grants.get(&id).cloned())
    }

    async fn find_grant_for(
        &self,
        organization_id: Uuid,
        principal_id: Uuid,
    ) -> Result<Option<StaffGrant>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .grants
            .values()
            .find(|g| g.organization_id == organization_id && g.principal_id == principal_id)
            .cloned())
    }

    async fn count_active_grants(&self, organization_id: Uuid) -> Result<i64, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .grants
            .values()
            .filter(|g| g.organization_id == organization_id && g.is_active)
            .count() as i64)
    }

    async fn create_staff(&self, member: NewStaffMember) -> Result<(Principal, StaffGrant), AppError> {
        {
            let state = self.state.lock().unwrap();
            if state.principals.values().any(|p| p.email.eq_ignore_ascii_case(&member.email)) {
                return Err(AppError::EmailAlreadyExists);
            }
        }

        let principal = self.add_principal(
            Some(member.organization_id),
            &member.email,
            &member.password_hash,
            GlobalRole::User,
        );

        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let grant = StaffGrant {
            id: Uuid::new_v4(),
            organization_id: member.organization_id,
            principal_id: principal.id,
            role: member.role,
            job_title: member.job_title,
            is_active: true,
            default_store_id: member.default_store_id,
            work_schedule: member.work_schedule,
            created_at: now,
            updated_at: now,
        };
        state.grants.insert(grant.id, grant.clone());
        state.memberships.insert(grant.id, member.store_ids);

        Ok((principal, grant))
    }

    async fn update_grant(
        &self,
        id: Uuid,
        role: StaffRole,
        is_active: bool,
    ) -> Result<StaffGrant, AppError> {
        let mut state = self.state.lock().unwrap();
        let grant = state.grants.get_mut(&id).ok_or(AppError::NotFound("staff_grant"))?;
        grant.role = role;
        grant.is_active = is_active;
        grant.updated_at = Utc::now();
        Ok(grant.clone())
    }
}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn has_membership(&self, staff_grant_id: Uuid, store_id: Uuid) -> Result<bool, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .memberships
            .get(&staff_grant_id)
            .is_some_and(|ids| ids.contains(&store_id)))
    }

    async fn list_store_ids(&self, staff_grant_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.memberships.get(&staff_grant_id).cloned().unwrap_or_default())
    }

    async fn replace_memberships(&self, staff_grant_id: Uuid, store_ids: &[Uuid]) -> Result<(), AppError> {
        let mut deduped: Vec<Uuid> = Vec::with_capacity(store_ids.len());
        for id in store_ids {
            if !deduped.contains(id) {
                deduped.push(*id);
            }
        }
        self.state.lock().unwrap().memberships.insert(staff_grant_id, deduped);
        Ok(())
    }
}

#[async_trait]
impl OrganizationStore for MemoryStore {
    async fn create_organization(
        &self,
        name: &str,
        plan: Plan,
        limits: PlanLimits,
    ) -> Result<Organization, AppError> {
        Ok(self.insert_organization(name, plan, limits))
    }

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        Ok(self.state.lock().unwrap().organizations.get(&id).cloned())
    }

    async fn find_store(&self, id: Uuid) -> Result<Option<Store>, AppError> {
        Ok(self.state.lock().unwrap().stores.iter().find(|s| s.id == id).cloned())
    }

    async fn list_stores(&self, organization_id: Option<Uuid>) -> Result<Vec<Store>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .stores
            .iter()
            .filter(|s| organization_id.is_none_or(|org| s.organization_id == org))
            .cloned()
            .collect())
    }

    async fn count_stores(&self, organization_id: Uuid) -> Result<i64, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.stores.iter().filter(|s| s.organization_id == organization_id).count() as i64)
    }

    async fn create_store(&self, organization_id: Uuid, name: &str) -> Result<Store, AppError> {
        Ok(self.add_store(organization_id, name))
    }
}

#[async_trait]
impl FeatureStore for MemoryStore {
    async fn list_definitions(&self) -> Result<Vec<FeatureDefinition>, AppError> {
        let mut definitions: Vec<_> = self.state.lock().unwrap().definitions.values().cloned().collect();
        definitions.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(definitions)
    }

    async fn find_definition(&self, key: &str) -> Result<Option<FeatureDefinition>, AppError> {
        Ok(self.state.lock().unwrap().definitions.get(key).cloned())
    }

    async fn find_entitlement(
        &self,
        store_id: Uuid,
        feature_key: &str,
        audience: Audience,
    ) -> Result<Option<StoreEntitlement>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .entitlements
            .get(&(store_id, feature_key.to_string(), audience))
            .cloned())
    }

    async fn list_entitlements(&self, store_id: Uuid) -> Result<Vec<StoreEntitlement>, AppError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<_> = state
            .entitlements
            .values()
            .filter(|e| e.store_id == store_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (&a.feature_key, a.audience.as_str()).cmp(&(&b.feature_key, b.audience.as_str())));
        Ok(rows)
    }

    async fn upsert_entitlements(
        &self,
        rows: &[NewEntitlement],
    ) -> Result<Vec<StoreEntitlement>, AppError> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let mut saved = Vec::with_capacity(rows.len());
        for row in rows {
            let entitlement = StoreEntitlement {
                store_id: row.store_id,
                feature_key: row.feature_key.clone(),
                audience: row.audience,
                is_enabled: row.is_enabled,
                limits: row.limits.clone(),
                updated_at: now,
            };
            state
                .entitlements
                .insert((row.store_id, row.feature_key.clone(), row.audience), entitlement.clone());
            saved.push(entitlement);
        }
        Ok(saved)
    }

    async fn delete_entitlements(&self, store_id: Uuid, feature_key: &str) -> Result<u64, AppError> {
        let mut state = self.state.lock().unwrap();
        let before = state.entitlements.len();
        state
            .entitlements
            .retain(|(store, key, _), _| !(*store == store_id && key == feature_key));
        Ok((before - state.entitlements.len()) as u64)
    }
}
