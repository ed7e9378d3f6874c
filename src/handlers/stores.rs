// src/handlers/stores.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        context::AuthContext,
        tenancy::{CreateStorePayload, Store},
    },
};

#[utoipa::path(
    get,
    path = "/api/stores",
    tag = "Stores",
    params(("X-Tenant-ID" = Option<String>, Header, description = "Organização (só sem claim no token)")),
    responses(
        (status = 200, description = "Lojas visíveis para o principal", body = Vec<Store>),
        (status = 401, description = "Não autenticado ou sem organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_stores(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
) -> Result<Json<Vec<Store>>, ApiError> {
    let stores = app_state
        .tenancy_service
        .list_stores(&ctx)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(stores))
}

#[utoipa::path(
    post,
    path = "/api/stores",
    tag = "Stores",
    request_body = CreateStorePayload,
    responses(
        (status = 201, description = "Loja criada", body = Store),
        (status = 403, description = "Cargo sem permissão ou STORE_LIMIT_EXCEEDED")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_store(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Json(payload): Json<CreateStorePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let store = app_state
        .tenancy_service
        .create_store(&ctx, &payload.name)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(store)))
}
