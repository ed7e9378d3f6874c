// src/handlers/staff.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        context::AuthContext,
        staff::{
            BindStoresPayload, CreateStaffPayload, StaffGrant, StaffMemberResponse,
            UpdateStaffGrantPayload,
        },
    },
};

#[utoipa::path(
    post,
    path = "/api/staff",
    tag = "Staff",
    request_body = CreateStaffPayload,
    responses(
        (status = 201, description = "Funcionário provisionado", body = StaffMemberResponse),
        (status = 403, description = "ROLE_NOT_PROVISIONABLE, ROLE_NOT_ALLOWED ou STAFF_LIMIT_EXCEEDED"),
        (status = 409, description = "E-mail já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_staff(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Json(payload): Json<CreateStaffPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let member = app_state
        .staff_service
        .provision(&ctx, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(member)))
}

#[utoipa::path(
    patch,
    path = "/api/staff/{grant_id}",
    tag = "Staff",
    params(("grant_id" = Uuid, Path, description = "ID do grant")),
    request_body = UpdateStaffGrantPayload,
    responses(
        (status = 200, description = "Grant atualizado", body = StaffGrant),
        (status = 403, description = "Cargo atual ou novo fora do permitido"),
        (status = 404, description = "Grant não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_grant(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Path(grant_id): Path<Uuid>,
    Json(payload): Json<UpdateStaffGrantPayload>,
) -> Result<Json<StaffGrant>, ApiError> {
    let grant = app_state
        .staff_service
        .update_grant(&ctx, grant_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(grant))
}

#[utoipa::path(
    put,
    path = "/api/staff/{grant_id}/stores",
    tag = "Staff",
    params(("grant_id" = Uuid, Path, description = "ID do grant")),
    request_body = BindStoresPayload,
    responses(
        (status = 200, description = "Conjunto de lojas substituído", body = Vec<Uuid>),
        (status = 404, description = "Grant ou loja não encontrados")
    ),
    security(("api_jwt" = []))
)]
pub async fn bind_stores(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Path(grant_id): Path<Uuid>,
    Json(payload): Json<BindStoresPayload>,
) -> Result<Json<Vec<Uuid>>, ApiError> {
    let store_ids = app_state
        .staff_service
        .bind_stores(&ctx, grant_id, &payload.store_ids)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(store_ids))
}

#[utoipa::path(
    get,
    path = "/api/staff/{grant_id}/stores",
    tag = "Staff",
    params(("grant_id" = Uuid, Path, description = "ID do grant")),
    responses(
        (status = 200, description = "Lojas vinculadas, na ordem", body = Vec<Uuid>),
        (status = 404, description = "Grant não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_grant_stores(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Path(grant_id): Path<Uuid>,
) -> Result<Json<Vec<Uuid>>, ApiError> {
    let store_ids = app_state
        .staff_service
        .list_grant_stores(&ctx, grant_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(store_ids))
}
