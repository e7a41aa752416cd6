//! Authentication and authorization
//!
//! JWT issuance/validation, the auth middleware that re-resolves the user on
//! every request, and role gates for the admin/manager/staff namespaces.

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::{ADMIN_ONLY, ALL_ROLES, CurrentUser, MANAGERS, require_auth, require_role};
