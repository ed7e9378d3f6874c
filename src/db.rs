pub mod feature_repo;
pub mod membership_repo;
pub mod organization_repo;
pub mod principal_repo;
pub mod revocation_repo;
pub mod staff_repo;

#[cfg(test)]
pub mod memory;

pub use feature_repo::{FeatureRepository, FeatureStore};
pub use membership_repo::{MembershipRepository, MembershipStore};
pub use organization_repo::{OrganizationRepository, OrganizationStore};
pub use principal_repo::{PrincipalRepository, PrincipalStore};
pub use revocation_repo::{RevocationRepository, RevocationStore};
pub use staff_repo::{StaffRepository, StaffStore};
