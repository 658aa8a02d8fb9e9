//! Well-known role name constants.
//!
//! Roles are free-form labels stored on each account; these are the ones the
//! API enforces.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";
