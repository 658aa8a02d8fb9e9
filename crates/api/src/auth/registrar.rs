//! Registration: username uniqueness and account provisioning.

use serde::Deserialize;
use villa_core::roles::ROLE_USER;
use villa_db::models::user::{CreateLocalUser, LocalUser};
use villa_db::repositories::UserRepo;
use villa_db::store::StoreError;

use super::password::hash_password;
use super::CredentialScheme;

/// Request body for `POST /users/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    ROLE_USER.to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Username already exists")]
    UsernameTaken,

    #[error("Credential hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            // Lost the race between the uniqueness check and the insert.
            StoreError::UniqueViolation(_) => RegistrationError::UsernameTaken,
            other => RegistrationError::Store(other),
        }
    }
}

/// Creates accounts under the configured credential scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct Registrar {
    scheme: CredentialScheme,
}

impl Registrar {
    pub fn new(scheme: CredentialScheme) -> Self {
        Self { scheme }
    }

    /// `true` when no account uses exactly `username`.
    pub async fn is_unique(&self, users: &UserRepo, username: &str) -> Result<bool, StoreError> {
        users.is_unique(username).await
    }

    /// Persist a new account and return it with the credential cleared.
    pub async fn register(
        &self,
        users: &mut UserRepo,
        request: RegistrationRequest,
    ) -> Result<LocalUser, RegistrationError> {
        if !users.is_unique(&request.username).await? {
            return Err(RegistrationError::UsernameTaken);
        }

        let password = match self.scheme {
            CredentialScheme::Plain => request.password,
            CredentialScheme::Argon2 => hash_password(&request.password)
                .map_err(|e| RegistrationError::Hashing(e.to_string()))?,
        };

        let created = users
            .create(LocalUser::new(CreateLocalUser {
                username: request.username,
                password,
                name: request.name,
                role: request.role,
            }))
            .await?;

        tracing::info!(user_id = created.id, username = %created.username, "Account registered");
        Ok(created.scrubbed())
    }
}
