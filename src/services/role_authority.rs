// src/services/role_authority.rs

use crate::{
    common::error::AppError,
    models::{context::AuthContext, staff::StaffRole},
};

/// Cargos que cada cargo pode criar. STAFF e VIEWER não criam ninguém.
pub fn provisionable_by(role: StaffRole) -> &'static [StaffRole] {
    match role {
        StaffRole::Owner => &StaffRole::ALL,
        StaffRole::Admin => &[StaffRole::Staff, StaffRole::Viewer],
        StaffRole::Staff | StaffRole::Viewer => &[],
    }
}

/// Gate de rota: o cargo do grant ativo precisa estar no conjunto aceito.
/// Super admin passa sempre. Sem grant ativo na organização resolvida, falha fechado.
pub fn authorize_roles(ctx: &AuthContext, allowed: &[StaffRole]) -> Result<(), AppError> {
    if ctx.is_super_admin() {
        return Ok(());
    }

    let grant = ctx.active_grant().ok_or(AppError::StaffGrantRequired)?;
    if allowed.contains(&grant.role) {
        Ok(())
    } else {
        tracing::debug!(role = %grant.role, ?allowed, "Cargo recusado pela rota");
        Err(AppError::RoleNotAllowed)
    }
}

/// Gate de provisionamento: quem pode criar (ou promover para) um grant com `target`.
pub fn check_can_provision(ctx: &AuthContext, target: StaffRole) -> Result<(), AppError> {
    if ctx.is_super_admin() {
        return Ok(());
    }

    let grant = ctx.active_grant().ok_or(AppError::StaffGrantRequired)?;
    let allowed = provisionable_by(grant.role);

    // Checagem do criador vem antes da checagem do cargo alvo
    if allowed.is_empty() {
        tracing::warn!(actor = %ctx.principal_id, role = %grant.role, "Tentativa de provisionamento sem permissão");
        return Err(AppError::RoleNotAllowed);
    }

    if !allowed.contains(&target) {
        tracing::warn!(actor = %ctx.principal_id, %target, "Cargo alvo fora do permitido");
        return Err(AppError::RoleNotProvisionable {
            target,
            allowed: allowed.to_vec(),
        });
    }

    Ok(())
}
