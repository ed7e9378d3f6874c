// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod tasks;

#[cfg(test)]
mod router_tests;

use crate::{
    config::AppState,
    middleware::pipeline::{pipeline, RouteGuard, RouteRequirements},
    models::staff::StaffRole,
};

const MANAGERS: &[StaffRole] = &[StaffRole::Owner, StaffRole::Admin];

/// Monta o router completo. Cada grupo carrega o seu contrato no `route_layer`.
pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh));

    // Só autenticação + tenant
    let session_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::get_me))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/password", post(handlers::auth::change_password))
        .route("/api/organizations", post(handlers::organizations::create_organization))
        .route("/api/stores", get(handlers::stores::list_stores))
        .route("/api/features", get(handlers::features::list_catalog))
        .route_layer(axum_middleware::from_fn_with_state(
            RouteGuard::new(&app_state, RouteRequirements::named("session")),
            pipeline,
        ));

    // OWNER/ADMIN: lojas e funcionários
    let manager_routes = Router::new()
        .route("/api/stores", post(handlers::stores::create_store))
        .route("/api/staff", post(handlers::staff::create_staff))
        .route("/api/staff/{grant_id}", patch(handlers::staff::update_grant))
        .route(
            "/api/staff/{grant_id}/stores",
            put(handlers::staff::bind_stores).get(handlers::staff::list_grant_stores),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            RouteGuard::new(&app_state, RouteRequirements::named("management").roles(MANAGERS)),
            pipeline,
        ));

    // OWNER/ADMIN sobre uma loja específica: a loja é obrigatória
    let store_feature_routes = Router::new()
        .route(
            "/api/stores/{store_id}/features",
            get(handlers::features::list_store_entitlements),
        )
        .route(
            "/api/stores/{store_id}/features/{feature_key}",
            post(handlers::features::enable_feature).delete(handlers::features::disable_feature),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            RouteGuard::new(
                &app_state,
                RouteRequirements::named("store_features")
                    .roles(MANAGERS)
                    .store_required(),
            ),
            pipeline,
        ));

    // Qualquer cargo com acesso à loja
    let entitlement_routes = Router::new()
        .route(
            "/api/stores/{store_id}/entitlements/{feature_key}",
            get(handlers::features::check_entitlement),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            RouteGuard::new(
                &app_state,
                RouteRequirements::named("entitlement_probe")
                    .roles(&StaffRole::ALL)
                    .store_required(),
            ),
            pipeline,
        ));

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(manager_routes)
        .merge(store_feature_routes)
        .merge(entitlement_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state)
}
