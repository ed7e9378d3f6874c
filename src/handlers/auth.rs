// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AccessToken, i18n::Locale},
    models::{
        auth::{
            AccessTokenResponse, ChangePasswordPayload, LoginPayload, LogoutPayload, MeResponse,
            RefreshPayload, TokenPair,
        },
        context::AuthContext,
    },
};

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Par de tokens emitido", body = TokenPair),
        (status = 400, description = "Payload inválido"),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<TokenPair>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let pair = app_state
        .auth_service
        .login(&payload.email, &payload.password, payload.organization_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(pair))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "Auth",
    request_body = RefreshPayload,
    responses(
        (status = 200, description = "Novo access token", body = AccessTokenResponse),
        (status = 401, description = "Refresh token inválido, expirado ou revogado")
    )
)]
pub async fn refresh(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RefreshPayload>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let renewed = app_state
        .auth_service
        .refresh(&payload.refresh_token)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(renewed))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    request_body = LogoutPayload,
    responses(
        (status = 204, description = "Tokens revogados"),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn logout(
    State(app_state): State<AppState>,
    locale: Locale,
    AccessToken(token): AccessToken,
    payload: Option<Json<LogoutPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    app_state
        .auth_service
        .logout(&token, payload.refresh_token.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/auth/password",
    tag = "Auth",
    request_body = ChangePasswordPayload,
    responses(
        (status = 204, description = "Senha alterada; tokens apresentados revogados"),
        (status = 401, description = "Senha atual inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    AccessToken(token): AccessToken,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .auth_service
        .change_password(
            ctx.principal_id,
            &payload.current_password,
            &payload.new_password,
            &token,
            payload.refresh_token.as_deref(),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Contexto do principal autenticado", body = MeResponse),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
) -> Result<Json<MeResponse>, ApiError> {
    let principal = app_state
        .auth_service
        .active_principal(ctx.principal_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let store_ids = match ctx.active_grant() {
        Some(grant) => app_state
            .membership_service
            .store_ids_for(grant.id)
            .await
            .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?,
        None => Vec::new(),
    };

    Ok(Json(MeResponse {
        principal,
        organization_id: ctx.organization_id,
        staff_role: ctx.active_grant().map(|g| g.role),
        store_ids,
    }))
}
