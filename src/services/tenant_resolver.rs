// src/services/tenant_resolver.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{AccessClaims, GlobalRole},
};

// O nome do nosso cabeçalho HTTP customizado
pub const TENANT_ID_HEADER: &str = "x-tenant-id";

/// Resolve a organização efetiva da requisição. A primeira regra que casar vence:
///
/// 1. organização embutida no token;
/// 2. cabeçalho `X-Tenant-ID` (só quando o token não traz organização);
/// 3. super admin sem nenhum dos dois: `None`, ou seja, modo cross-tenant (sem filtro);
/// 4. qualquer outro caso falha fechado com `TenantRequired`.
///
/// Roda depois da verificação do token e antes de qualquer checagem de loja ou funcionalidade.
pub fn resolve_tenant(
    claims: &AccessClaims,
    tenant_header: Option<&str>,
) -> Result<Option<Uuid>, AppError> {
    if let Some(org) = claims.org {
        return Ok(Some(org));
    }

    if let Some(raw) = tenant_header {
        // Cabeçalho ilegível não vira "sem tenant": isso ampliaria o escopo do super admin
        let org = Uuid::parse_str(raw.trim()).map_err(|_| AppError::TenantRequired)?;
        return Ok(Some(org));
    }

    if claims.role == GlobalRole::SuperAdmin {
        return Ok(None);
    }

    Err(AppError::TenantRequired)
}
