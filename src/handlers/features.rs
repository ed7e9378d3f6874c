// src/handlers/features.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::{
        context::ResolvedStore,
        features::{
            Audience, EnableFeaturePayload, EntitlementCheck, EntitlementQuery, FeatureDefinition,
            StoreEntitlement,
        },
    },
};

// Catálogo global, só leitura
#[utoipa::path(
    get,
    path = "/api/features",
    tag = "Features",
    responses((status = 200, description = "Catálogo de funcionalidades", body = Vec<FeatureDefinition>)),
    security(("api_jwt" = []))
)]
pub async fn list_catalog(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<FeatureDefinition>>, ApiError> {
    let catalog = app_state
        .feature_service
        .list_catalog()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(catalog))
}

#[utoipa::path(
    get,
    path = "/api/stores/{store_id}/features",
    tag = "Features",
    params(("store_id" = Uuid, Path, description = "ID da loja")),
    responses(
        (status = 200, description = "Entitlements da loja (STAFF e CUSTOMER)", body = Vec<StoreEntitlement>),
        (status = 404, description = "Loja não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_store_entitlements(
    State(app_state): State<AppState>,
    locale: Locale,
    ResolvedStore(store_id): ResolvedStore,
) -> Result<Json<Vec<StoreEntitlement>>, ApiError> {
    let rows = app_state
        .feature_service
        .list_for_store(store_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/api/stores/{store_id}/features/{feature_key}",
    tag = "Features",
    params(
        ("store_id" = Uuid, Path, description = "ID da loja"),
        ("feature_key" = String, Path, description = "Chave da funcionalidade")
    ),
    request_body = EnableFeaturePayload,
    responses(
        (status = 200, description = "Linhas gravadas", body = Vec<StoreEntitlement>),
        (status = 403, description = "PLAN_UPGRADE_REQUIRED ou FEATURE_DEPENDENCY_MISSING"),
        (status = 404, description = "Loja ou funcionalidade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn enable_feature(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((store_id, feature_key)): Path<(Uuid, String)>,
    payload: Option<Json<EnableFeaturePayload>>,
) -> Result<Json<Vec<StoreEntitlement>>, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let rows = app_state
        .feature_service
        .enable_for_store(store_id, &feature_key, payload.staff_limits, payload.customer_limits)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}

#[utoipa::path(
    delete,
    path = "/api/stores/{store_id}/features/{feature_key}",
    tag = "Features",
    params(
        ("store_id" = Uuid, Path, description = "ID da loja"),
        ("feature_key" = String, Path, description = "Chave da funcionalidade")
    ),
    responses(
        (status = 204, description = "Funcionalidade desligada nas duas audiências"),
        (status = 404, description = "Loja ou funcionalidade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn disable_feature(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((store_id, feature_key)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .feature_service
        .disable_for_store(store_id, &feature_key)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// Sonda usada pelos módulos de negócio
#[utoipa::path(
    get,
    path = "/api/stores/{store_id}/entitlements/{feature_key}",
    tag = "Features",
    params(
        ("store_id" = Uuid, Path, description = "ID da loja"),
        ("feature_key" = String, Path, description = "Chave da funcionalidade"),
        EntitlementQuery
    ),
    responses((status = 200, description = "Resultado da consulta", body = EntitlementCheck)),
    security(("api_jwt" = []))
)]
pub async fn check_entitlement(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((store_id, feature_key)): Path<(Uuid, String)>,
    Query(query): Query<EntitlementQuery>,
) -> Result<Json<EntitlementCheck>, ApiError> {
    let audience = query.audience.unwrap_or(Audience::Staff);

    let enabled = app_state
        .feature_service
        .is_enabled(store_id, &feature_key, audience)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(EntitlementCheck {
        store_id,
        feature_key,
        audience,
        enabled,
    }))
}
