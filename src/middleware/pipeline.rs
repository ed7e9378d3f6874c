// src/middleware/pipeline.rs
//
// O pipeline de autorização. Cada grupo de rotas declara um `RouteRequirements`
// e registra o middleware com `route_layer`:
//
//   token -> revogação -> principal -> tenant -> grant -> cargo -> loja -> funcionalidade -> handler

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{rejection::RawPathParamsRejection, FromRequestParts, RawPathParams, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AccessToken, i18n::Locale},
    models::{
        context::{AuthContext, GrantSnapshot, ResolvedStore},
        features::Audience,
        staff::StaffRole,
    },
    services::{
        membership_service::resolve_store_id,
        role_authority::authorize_roles,
        tenant_resolver::{resolve_tenant, TENANT_ID_HEADER},
    },
};

const STORE_PATH_PARAM: &str = "store_id";
const STORE_BODY_FIELD: &str = "storeId";
const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// O que fazer quando a rota pede escopo de loja mas nenhuma loja foi resolvida.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreFallback {
    /// Passa como requisição de nível organização (sem filtro de loja). Gera log de aviso.
    #[default]
    OrganizationLevel,
    /// Recusa com `STORE_REQUIRED`.
    Reject,
}

/// Contrato declarativo de uma rota, entregue no registro do router.
#[derive(Debug, Clone, Default)]
pub struct RouteRequirements {
    pub name: &'static str,
    pub required_roles: Option<Vec<StaffRole>>,
    pub required_feature: Option<(String, Audience)>,
    pub requires_store_scope: bool,
    pub store_fallback: StoreFallback,
}

impl RouteRequirements {
    /// Só autenticação + tenant.
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    pub fn roles(mut self, roles: &[StaffRole]) -> Self {
        self.required_roles = Some(roles.to_vec());
        self
    }

    pub fn feature(mut self, key: &str, audience: Audience) -> Self {
        self.required_feature = Some((key.to_string(), audience));
        self
    }

    pub fn store_scoped(mut self) -> Self {
        self.requires_store_scope = true;
        self
    }

    /// Escopo de loja obrigatório: sem loja resolvida a rota recusa.
    pub fn store_required(mut self) -> Self {
        self.requires_store_scope = true;
        self.store_fallback = StoreFallback::Reject;
        self
    }

    fn needs_store(&self) -> bool {
        self.requires_store_scope || self.required_feature.is_some()
    }
}

/// Estado do middleware: o AppState mais o contrato da rota.
#[derive(Clone)]
pub struct RouteGuard {
    pub app: AppState,
    pub requirements: Arc<RouteRequirements>,
}

impl RouteGuard {
    pub fn new(app: &AppState, requirements: RouteRequirements) -> Self {
        Self {
            app: app.clone(),
            requirements: Arc::new(requirements),
        }
    }
}

pub async fn pipeline(
    State(guard): State<RouteGuard>,
    locale: Locale,
    request: Request,
    next: Next,
) -> Response {
    match authorize(&guard, request).await {
        Ok(request) => next.run(request).await,
        Err(e) => e.to_api_error(&locale, &guard.app.i18n_store).into_response(),
    }
}

async fn authorize(guard: &RouteGuard, request: Request) -> Result<Request, AppError> {
    let app = &guard.app;
    let requirements = &guard.requirements;
    let (mut parts, body) = request.into_parts();

    // 1. Token (assinatura + expiração + tipo)
    let TypedHeader(authorization) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(&mut parts, &())
            .await
            .map_err(|_| AppError::Unauthenticated)?;
    let token = authorization.token().to_string();
    let claims = app.auth_service.tokens().verify_access(&token).map_err(|e| {
        tracing::debug!(route = requirements.name, reason = %e, "Access token rejeitado");
        AppError::from(e)
    })?;

    // 2. Revogação: depois da assinatura, nunca no lugar dela
    if app.revocation_service.is_revoked(&token).await? {
        tracing::debug!(route = requirements.name, principal_id = %claims.sub, "Access token revogado");
        return Err(AppError::Unauthenticated);
    }

    // 3. Principal precisa continuar ACTIVE
    let principal = app.auth_service.active_principal(claims.sub).await?;

    // 4. Tenant
    let tenant_header = parts
        .headers
        .get(TENANT_ID_HEADER)
        .map(|v| v.to_str().map_err(|_| AppError::TenantRequired))
        .transpose()?;
    let organization_id = resolve_tenant(&claims, tenant_header)?;

    // 5. Grant na organização resolvida
    let staff_grant = match organization_id {
        Some(org) => app
            .staff_service
            .grant_for(org, principal.id)
            .await?
            .map(|g| GrantSnapshot::from(&g)),
        None => None,
    };

    let ctx = AuthContext {
        principal_id: principal.id,
        organization_id,
        global_role: principal.global_role,
        staff_grant,
    };

    // 6. Cargo
    if let Some(roles) = &requirements.required_roles {
        authorize_roles(&ctx, roles)?;
    }

    // 7. Loja endereçada
    let path_store = path_store_id(&mut parts).await?;

    let (body, store_id) = if requirements.needs_store() {
        let (body, body_store) = match path_store {
            Some(_) => (body, None),
            None => buffered_store_id(&parts, body).await?,
        };
        let default_store = ctx.active_grant().and_then(|g| g.default_store_id);
        (body, resolve_store_id(path_store, body_store, default_store))
    } else {
        (body, path_store)
    };

    match store_id {
        Some(store_id) => {
            app.membership_service.authorize_store(&ctx, store_id).await?;
        }
        None if requirements.needs_store() => match requirements.store_fallback {
            StoreFallback::Reject => return Err(AppError::StoreRequired),
            StoreFallback::OrganizationLevel => {
                tracing::warn!(
                    route = requirements.name,
                    principal_id = %ctx.principal_id,
                    "Nenhuma loja resolvida: seguindo como requisição de nível organização"
                );
            }
        },
        None => {}
    }

    // 8. Funcionalidade (vale inclusive para super admin)
    if let (Some((feature, audience)), Some(store_id)) = (&requirements.required_feature, store_id) {
        if !app.feature_service.is_enabled(store_id, feature, *audience).await? {
            return Err(AppError::FeatureNotEnabled {
                feature: feature.clone(),
                audience: *audience,
            });
        }
    }

    // 9. Contexto pronto: só leitura daqui para frente
    parts.extensions.insert(ctx);
    parts.extensions.insert(AccessToken(token));
    if let Some(store_id) = store_id {
        parts.extensions.insert(ResolvedStore(store_id));
    }

    Ok(Request::from_parts(parts, body))
}

/// `{store_id}` na rota. Parâmetro presente mas ilegível vira 404, como loja inexistente.
async fn path_store_id(parts: &mut Parts) -> Result<Option<Uuid>, AppError> {
    let params = match RawPathParams::from_request_parts(parts, &()).await {
        Ok(params) => params,
        Err(RawPathParamsRejection::MissingPathParams(_)) => return Ok(None),
        Err(e) => {
            tracing::debug!("Parâmetros de rota ilegíveis: {}", e);
            return Err(AppError::NotFound("store"));
        }
    };

    params
        .iter()
        .find(|(name, _)| *name == STORE_PATH_PARAM)
        .map(|(_, raw)| Uuid::parse_str(raw).map_err(|_| AppError::NotFound("store")))
        .transpose()
}

/// Lê `storeId` de um corpo JSON e devolve o corpo intacto para o handler.
async fn buffered_store_id(parts: &Parts, body: Body) -> Result<(Body, Option<Uuid>), AppError> {
    let is_json = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if !is_json {
        return Ok((body, None));
    }

    // Estouro do limite é erro do cliente, não do servidor
    let bytes = to_bytes(body, BODY_LIMIT).await.map_err(|e| {
        tracing::debug!("Corpo da requisição recusado: {}", e);
        AppError::PayloadTooLarge { limit: BODY_LIMIT }
    })?;

    let store_id = serde_json::from_slice::<Value>(&bytes)
        .ok()
        .and_then(|json| {
            json.get(STORE_BODY_FIELD)
                .and_then(Value::as_str)
                .and_then(|raw| Uuid::parse_str(raw).ok())
        });

    Ok((Body::from(bytes), store_id))
}
