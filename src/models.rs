pub mod auth;
pub mod context;
pub mod features;
pub mod revocation;
pub mod staff;
pub mod tenancy;
