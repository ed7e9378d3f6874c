pub mod auth;
pub mod feature_service;
pub mod membership_service;
pub mod plan_limits;
pub mod revocation_service;
pub mod role_authority;
pub mod staff_service;
pub mod tenancy_service;
pub mod tenant_resolver;
pub mod token_service;
