pub mod auth;
pub mod features;
pub mod organizations;
pub mod staff;
pub mod stores;
