// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::i18n::I18nStore,
    middleware::i18n::Locale,
    models::{
        features::Audience,
        staff::StaffRole,
        tenancy::{Plan, ResourceKind},
    },
};

// O erro de domínio. Serviços e repositórios só devolvem isto.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    // Token ausente, malformado, expirado ou revogado. Nunca dizemos qual.
    #[error("Não autenticado")]
    Unauthenticated,

    #[error("Organização não resolvida")]
    TenantRequired,

    #[error("Cargo não permitido nesta rota")]
    RoleNotAllowed,

    #[error("Sem vínculo ativo com a organização")]
    StaffGrantRequired,

    #[error("Sem acesso à loja")]
    StoreAccessDenied,

    #[error("Loja não informada")]
    StoreRequired,

    #[error("Funcionalidade '{feature}' ({audience}) não habilitada")]
    FeatureNotEnabled { feature: String, audience: Audience },

    #[error("Não pode criar cargo {target}")]
    RoleNotProvisionable { target: StaffRole, allowed: Vec<StaffRole> },

    #[error("Cota de {resource:?} excedida ({current}/{limit}, plano {plan})")]
    QuotaExceeded {
        resource: ResourceKind,
        plan: Plan,
        limit: i64,
        current: i64,
    },

    #[error("'{feature}' depende de '{requires}'")]
    FeatureDependencyMissing { feature: String, requires: String },

    #[error("'{feature}' exige o plano {required}")]
    PlanUpgradeRequired {
        feature: String,
        required: Plan,
        current: Plan,
    },

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("Corpo da requisição acima de {limit} bytes")]
    PayloadTooLarge { limit: usize },

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Código estável para o cliente ramificar. Nunca é traduzido.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Unauthenticated => "UNAUTHORIZED",
            AppError::TenantRequired => "TENANT_REQUIRED",
            AppError::RoleNotAllowed => "ROLE_NOT_ALLOWED",
            AppError::StaffGrantRequired => "STAFF_GRANT_REQUIRED",
            AppError::StoreAccessDenied => "STORE_ACCESS_DENIED",
            AppError::StoreRequired => "STORE_REQUIRED",
            AppError::FeatureNotEnabled { .. } => "FEATURE_NOT_ENABLED",
            AppError::RoleNotProvisionable { .. } => "ROLE_NOT_PROVISIONABLE",
            AppError::QuotaExceeded { resource: ResourceKind::Stores, .. } => "STORE_LIMIT_EXCEEDED",
            AppError::QuotaExceeded { resource: ResourceKind::StaffGrants, .. } => "STAFF_LIMIT_EXCEEDED",
            AppError::FeatureDependencyMissing { .. } => "FEATURE_DEPENDENCY_MISSING",
            AppError::PlanUpgradeRequired { .. } => "PLAN_UPGRADE_REQUIRED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthenticated | AppError::TenantRequired => {
                StatusCode::UNAUTHORIZED
            }
            AppError::RoleNotAllowed
            | AppError::StaffGrantRequired
            | AppError::StoreAccessDenied
            | AppError::StoreRequired
            | AppError::FeatureNotEnabled { .. }
            | AppError::RoleNotProvisionable { .. }
            | AppError::QuotaExceeded { .. }
            | AppError::FeatureDependencyMissing { .. }
            | AppError::PlanUpgradeRequired { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Dados estruturados que acompanham o código (sem nada sensível)
    fn details(&self, locale: &Locale, i18n: &I18nStore) -> Option<Value> {
        match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            let key = e.message.as_deref().unwrap_or(e.code.as_ref());
                            i18n.translate(&locale.0, key)
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                Some(Value::Object(details))
            }
            AppError::FeatureNotEnabled { feature, audience } => {
                Some(json!({ "feature": feature, "audience": audience }))
            }
            AppError::RoleNotProvisionable { target, allowed } => {
                Some(json!({ "targetRole": target, "allowedRoles": allowed }))
            }
            AppError::QuotaExceeded { resource, plan, limit, current } => Some(json!({
                "resource": resource,
                "plan": plan,
                "limit": limit,
                "current": current,
            })),
            AppError::FeatureDependencyMissing { feature, requires } => {
                Some(json!({ "feature": feature, "requires": requires }))
            }
            AppError::PlanUpgradeRequired { feature, required, current } => Some(json!({
                "feature": feature,
                "requiredPlan": required,
                "currentPlan": current,
            })),
            AppError::NotFound(resource) => Some(json!({ "resource": resource })),
            AppError::PayloadTooLarge { limit } => Some(json!({ "limitBytes": limit })),
            _ => None,
        }
    }

    /// Converte para a resposta HTTP já no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe fica só no log
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        ApiError {
            status,
            error: i18n.translate(&locale.0, self.code()),
            code: self.code().to_string(),
            details: self.details(locale, i18n),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &I18nStore::default())
            .into_response()
    }
}

// O que o cliente recebe
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}
