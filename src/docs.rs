// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::auth::change_password,
        handlers::auth::get_me,

        // --- Organizations ---
        handlers::organizations::create_organization,

        // --- Stores ---
        handlers::stores::list_stores,
        handlers::stores::create_store,

        // --- Staff ---
        handlers::staff::create_staff,
        handlers::staff::update_grant,
        handlers::staff::bind_stores,
        handlers::staff::list_grant_stores,

        // --- Features ---
        handlers::features::list_catalog,
        handlers::features::list_store_entitlements,
        handlers::features::enable_feature,
        handlers::features::disable_feature,
        handlers::features::check_entitlement,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::PrincipalStatus,
            models::auth::GlobalRole,
            models::auth::Principal,
            models::auth::TokenPair,
            models::auth::AccessTokenResponse,
            models::auth::LoginPayload,
            models::auth::RefreshPayload,
            models::auth::LogoutPayload,
            models::auth::ChangePasswordPayload,
            models::auth::MeResponse,

            // --- Contexto ---
            models::context::AuthContext,
            models::context::GrantSnapshot,

            // --- Staff ---
            models::staff::StaffRole,
            models::staff::StaffGrant,
            models::staff::CreateStaffPayload,
            models::staff::UpdateStaffGrantPayload,
            models::staff::BindStoresPayload,
            models::staff::StaffMemberResponse,

            // --- Tenancy ---
            models::tenancy::Plan,
            models::tenancy::PlanLimits,
            models::tenancy::Organization,
            models::tenancy::Store,
            models::tenancy::ResourceKind,
            models::tenancy::CreateOrganizationPayload,
            models::tenancy::CreateStorePayload,

            // --- Features ---
            models::features::Audience,
            models::features::FeatureDefinition,
            models::features::StoreEntitlement,
            models::features::EnableFeaturePayload,
            models::features::EntitlementCheck,
        )
    ),
    tags(
        (name = "Auth", description = "Login, refresh, logout e senha"),
        (name = "Organizations", description = "Criação de organizações (super admin)"),
        (name = "Stores", description = "Lojas da organização"),
        (name = "Staff", description = "Provisionamento de funcionários e vínculos com lojas"),
        (name = "Features", description = "Catálogo e entitlements por loja")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
