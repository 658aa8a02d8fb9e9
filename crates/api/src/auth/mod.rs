//! Authentication primitives and the two identity operations.
//!
//! - [`jwt`] -- session token generation and validation.
//! - [`password`] -- Argon2id credential hashing and verification.
//! - [`authenticator`] -- login: verify credentials, issue a session token.
//! - [`registrar`] -- registration: uniqueness check, account provisioning.

use std::str::FromStr;

pub mod authenticator;
pub mod jwt;
pub mod password;
pub mod registrar;

pub use authenticator::{AuthFailure, Authenticator, LoginOutcome};
pub use registrar::{Registrar, RegistrationError, RegistrationRequest};

/// How credentials are stored in the `password` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialScheme {
    /// Stored exactly as supplied; login matches username and credential in
    /// one query.
    #[default]
    Plain,
    /// Stored as an Argon2id PHC string; login fetches by username and
    /// verifies the hash.
    Argon2,
}

impl FromStr for CredentialScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "argon2" => Ok(Self::Argon2),
            other => Err(format!("unknown credential scheme '{other}'")),
        }
    }
}
