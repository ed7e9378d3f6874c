// src/router_tests.rs
//
// Fluxos completos pelo router montado, com o armazenamento em memória.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    build_router,
    config::AppState,
    db::memory::MemoryStore,
    models::{
        auth::{GlobalRole, Principal},
        staff::StaffRole,
        tenancy::Plan,
    },
    services::auth::hash_password,
};

const PASSWORD: &str = "senha-forte-123";

struct App {
    store: Arc<MemoryStore>,
    state: AppState,
    router: Router,
}

fn app() -> App {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::in_memory(store.clone());
    let router = build_router(state.clone());
    App { store, state, router }
}

impl App {
    async fn principal(&self, org: Option<Uuid>, email: &str, global_role: GlobalRole) -> Principal {
        let hashed = hash_password(PASSWORD, self.state.auth_service.bcrypt_cost())
            .await
            .unwrap();
        self.store.add_principal(org, email, &hashed, global_role)
    }

    async fn member(&self, org: Uuid, email: &str, role: StaffRole) -> Principal {
        let p = self.principal(Some(org), email, GlobalRole::User).await;
        self.store.add_grant(org, p.id, role);
        p
    }

    fn bearer(&self, principal: &Principal) -> String {
        self.state.auth_service.tokens().issue(principal).unwrap().access_token
    }

    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_me_logout_cycle() {
    let app = app();
    let org = app.store.add_organization(Plan::Pro);
    let owner = app.member(org.id, "dona@petshop.com", StaffRole::Owner).await;

    let (status, tokens) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "DONA@petshop.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let access = tokens["accessToken"].as_str().unwrap().to_string();
    let refresh = tokens["refreshToken"].as_str().unwrap().to_string();

    let (status, me) = app.call(Method::GET, "/api/auth/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["principal"]["id"], json!(owner.id));
    assert_eq!(me["organizationId"], json!(org.id));
    assert_eq!(me["staffRole"], "OWNER");
    assert!(me["principal"].get("passwordHash").is_none());

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/logout",
            Some(&access),
            Some(json!({ "refreshToken": refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.call(Method::GET, "/api/auth/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    // O refresh apresentado no logout também morreu
    let (status, _) = app
        .call(Method::POST, "/api/auth/refresh", None, Some(json!({ "refreshToken": refresh })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let app = app();
    let org = app.store.add_organization(Plan::Free);
    app.member(org.id, "ana@petshop.com", StaffRole::Owner).await;

    let (s1, b1) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@petshop.com", "password": "errada-demais" })),
        )
        .await;
    let (s2, b2) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ninguem@petshop.com", "password": "errada-demais" })),
        )
        .await;

    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!((s1, b1), (s2, b2));
}

#[tokio::test]
async fn basic_plan_refuses_third_store() {
    let app = app();
    let org = app.store.add_organization(Plan::Basic);
    let owner = app.member(org.id, "dono@petshop.com", StaffRole::Owner).await;
    let token = app.bearer(&owner);

    for name in ["Centro", "Norte"] {
        let (status, _) = app
            .call(Method::POST, "/api/stores", Some(&token), Some(json!({ "name": name })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .call(Method::POST, "/api/stores", Some(&token), Some(json!({ "name": "Sul" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "STORE_LIMIT_EXCEEDED");
    assert_eq!(body["details"]["plan"], "BASIC");
    assert_eq!(body["details"]["limit"], 2);
    assert_eq!(body["details"]["current"], 2);
}

#[tokio::test]
async fn staff_cannot_create_stores() {
    let app = app();
    let org = app.store.add_organization(Plan::Enterprise);
    let staff = app.member(org.id, "func@petshop.com", StaffRole::Staff).await;

    let (status, body) = app
        .call(Method::POST, "/api/stores", Some(&app.bearer(&staff)), Some(json!({ "name": "X" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "ROLE_NOT_ALLOWED");
}

#[tokio::test]
async fn super_admin_lists_stores_across_tenants() {
    let app = app();
    let org_a = app.store.add_organization(Plan::Pro);
    let org_b = app.store.add_organization(Plan::Pro);
    app.store.add_store(org_a.id, "A1");
    app.store.add_store(org_b.id, "B1");
    let root = app.principal(None, "root@petshop.com", GlobalRole::SuperAdmin).await;

    let (status, body) = app.call(Method::GET, "/api/stores", Some(&app.bearer(&root)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn admin_cannot_provision_owner() {
    let app = app();
    let org = app.store.add_organization(Plan::Enterprise);
    let admin = app.member(org.id, "admin@petshop.com", StaffRole::Admin).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/staff",
            Some(&app.bearer(&admin)),
            Some(json!({ "email": "novo@petshop.com", "password": PASSWORD, "role": "OWNER" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "ROLE_NOT_PROVISIONABLE");
    assert_eq!(body["details"]["targetRole"], "OWNER");
    assert_eq!(body["details"]["allowedRoles"], json!(["STAFF", "VIEWER"]));

    let (status, member) = app
        .call(
            Method::POST,
            "/api/staff",
            Some(&app.bearer(&admin)),
            Some(json!({ "email": "novo@petshop.com", "password": PASSWORD, "role": "STAFF" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(member["role"], "STAFF");
    assert_eq!(member["email"], "novo@petshop.com");
}

#[tokio::test]
async fn enabled_feature_is_visible_to_the_entitlement_check() {
    let app = app();
    app.store.add_definition("live_cam", Plan::Pro, true, &[]);
    let org = app.store.add_organization(Plan::Pro);
    let shop = app.store.add_store(org.id, "Centro");
    let owner = app.member(org.id, "dona@petshop.com", StaffRole::Owner).await;
    let staff = app.member(org.id, "func@petshop.com", StaffRole::Staff).await;
    let owner_token = app.bearer(&owner);
    let staff_token = app.bearer(&staff);

    let check = format!("/api/stores/{}/entitlements/live_cam?audience=CUSTOMER", shop.id);
    let (status, body) = app.call(Method::GET, &check, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enabled"], false);

    // STAFF não liga funcionalidades
    let enable = format!("/api/stores/{}/features/live_cam", shop.id);
    let (status, body) = app.call(Method::POST, &enable, Some(&staff_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "ROLE_NOT_ALLOWED");

    let (status, rows) = app.call(Method::POST, &enable, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().unwrap().len(), 2);

    let (_, body) = app.call(Method::GET, &check, Some(&owner_token), None).await;
    assert_eq!(body["enabled"], true);
    assert_eq!(body["audience"], "CUSTOMER");

    let (status, _) = app.call(Method::DELETE, &enable, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = app.call(Method::GET, &check, Some(&owner_token), None).await;
    assert_eq!(body["enabled"], false);
}

#[tokio::test]
async fn plan_below_minimum_cannot_enable_feature() {
    let app = app();
    app.store.add_definition("reports", Plan::Enterprise, false, &[]);
    let org = app.store.add_organization(Plan::Basic);
    let shop = app.store.add_store(org.id, "Centro");
    let owner = app.member(org.id, "dona@petshop.com", StaffRole::Owner).await;

    let uri = format!("/api/stores/{}/features/reports", shop.id);
    let (status, body) = app.call(Method::POST, &uri, Some(&app.bearer(&owner)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "PLAN_UPGRADE_REQUIRED");
    assert_eq!(body["details"]["requiredPlan"], "ENTERPRISE");
    assert_eq!(body["details"]["currentPlan"], "BASIC");
}

#[tokio::test]
async fn store_routes_never_fall_back_to_organization_level() {
    let app = app();
    let org = app.store.add_organization(Plan::Pro);
    let owner = app.member(org.id, "dona@petshop.com", StaffRole::Owner).await;
    let token = app.bearer(&owner);

    for (method, uri) in [
        (Method::GET, "/api/stores/nao-e-uuid/features"),
        (Method::POST, "/api/stores/nao-e-uuid/features/live_cam"),
        (Method::DELETE, "/api/stores/nao-e-uuid/features/live_cam"),
        (Method::GET, "/api/stores/nao-e-uuid/entitlements/live_cam"),
    ] {
        let (status, body) = app.call(method, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["details"]["resource"], "store");
    }
}

#[tokio::test]
async fn super_admin_creates_organization_with_plan_limits() {
    let app = app();
    let root = app.principal(None, "root@petshop.com", GlobalRole::SuperAdmin).await;

    let (status, org) = app
        .call(
            Method::POST,
            "/api/organizations",
            Some(&app.bearer(&root)),
            Some(json!({ "name": "Pet Feliz", "plan": "BASIC" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(org["plan"], "BASIC");
    assert_eq!(org["maxStores"], 2);
    assert_eq!(org["maxStaff"], 10);

    let other = app.store.add_organization(Plan::Pro);
    let owner = app.member(other.id, "dona@petshop.com", StaffRole::Owner).await;
    let (status, body) = app
        .call(
            Method::POST,
            "/api/organizations",
            Some(&app.bearer(&owner)),
            Some(json!({ "name": "Minha", "plan": "ENTERPRISE" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "ROLE_NOT_ALLOWED");
}

#[tokio::test]
async fn store_entitlements_listing_uses_the_resolved_store() {
    let app = app();
    app.store.add_definition("live_cam", Plan::Pro, true, &[]);
    let org = app.store.add_organization(Plan::Pro);
    let shop = app.store.add_store(org.id, "Centro");
    let other = app.store.add_store(org.id, "Norte");
    let owner = app.member(org.id, "dona@petshop.com", StaffRole::Owner).await;
    let token = app.bearer(&owner);

    app.state
        .feature_service
        .enable_for_store(shop.id, "live_cam", None, None)
        .await
        .unwrap();

    let (status, rows) = app
        .call(Method::GET, &format!("/api/stores/{}/features", shop.id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["storeId"] == json!(shop.id)));

    let (_, rows) = app
        .call(Method::GET, &format!("/api/stores/{}/features", other.id), Some(&token), None)
        .await;
    assert!(rows.as_array().unwrap().is_empty());
}
