//! Login: verify a username/credential pair and issue a session token.

use villa_db::models::user::LocalUser;
use villa_db::repositories::UserRepo;

use super::jwt::{generate_access_token, JwtConfig};
use super::password::{hash_password, verify_password};
use super::CredentialScheme;

/// The only failure a caller of [`Authenticator::login`] ever sees.
///
/// Unknown username, wrong credential and internal lookup or signing errors
/// all collapse into this one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Username or password is incorrect")]
pub struct AuthFailure;

/// A successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    /// The authenticated account with its credential cleared.
    pub user: LocalUser,
}

/// Issues session tokens. Shared read-only across requests.
#[derive(Debug, Clone)]
pub struct Authenticator {
    jwt: JwtConfig,
    scheme: CredentialScheme,
}

impl Authenticator {
    pub fn new(jwt: JwtConfig, scheme: CredentialScheme) -> Self {
        Self { jwt, scheme }
    }

    pub fn jwt(&self) -> &JwtConfig {
        &self.jwt
    }

    pub fn scheme(&self) -> CredentialScheme {
        self.scheme
    }

    pub async fn login(
        &self,
        users: &mut UserRepo,
        username: &str,
        credential: &str,
    ) -> Result<LoginOutcome, AuthFailure> {
        let user = match self.scheme {
            CredentialScheme::Plain => users
                .find_by_credentials(username, credential)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Credential lookup failed");
                    AuthFailure
                })?,
            CredentialScheme::Argon2 => self.verify_hashed(users, username, credential).await?,
        };

        let Some(user) = user else {
            tracing::info!(username = %username, "Login rejected");
            return Err(AuthFailure);
        };

        let token = generate_access_token(user.id, &user.role, &self.jwt).map_err(|e| {
            tracing::error!(error = %e, user_id = user.id, "Token signing failed");
            AuthFailure
        })?;

        tracing::info!(user_id = user.id, "Login succeeded");
        Ok(LoginOutcome {
            token,
            user: user.scrubbed(),
        })
    }

    async fn verify_hashed(
        &self,
        users: &mut UserRepo,
        username: &str,
        credential: &str,
    ) -> Result<Option<LocalUser>, AuthFailure> {
        let found = users.find_by_username(username).await.map_err(|e| {
            tracing::error!(error = %e, "Credential lookup failed");
            AuthFailure
        })?;

        if found.is_empty() {
            // Keep the unknown-username path as slow as a real verification.
            let _ = hash_password(credential);
            return Ok(None);
        }

        for user in found {
            match verify_password(credential, &user.password) {
                Ok(true) => return Ok(Some(user)),
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(error = %e, user_id = user.id, "Stored credential is not a valid hash");
                    return Err(AuthFailure);
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use villa_db::models::user::CreateLocalUser;
    use villa_db::store::MemoryStore;

    use super::*;
    use crate::auth::jwt::validate_token;

    fn authenticator(scheme: CredentialScheme) -> Authenticator {
        Authenticator::new(JwtConfig::new("authenticator-test-secret"), scheme)
    }

    fn account(username: &str, stored: &str, role: &str) -> LocalUser {
        LocalUser::new(CreateLocalUser {
            username: username.to_string(),
            password: stored.to_string(),
            name: "Alice".to_string(),
            role: role.to_string(),
        })
    }

    async fn users_with(username: &str, stored: &str, role: &str) -> UserRepo {
        let mut users = UserRepo::new(Arc::new(MemoryStore::<LocalUser>::new()));
        users.create(account(username, stored, role)).await.unwrap();
        users
    }

    #[tokio::test]
    async fn test_plain_login_issues_token_and_scrubs_credential() {
        let auth = authenticator(CredentialScheme::Plain);
        let mut users = users_with("alice", "pw1", "admin").await;

        let outcome = auth.login(&mut users, "ALICE", "pw1").await.unwrap();
        assert!(outcome.user.password.is_empty());
        assert_eq!(outcome.user.username, "alice");

        let claims = validate_token(&outcome.token, auth.jwt()).unwrap();
        assert_eq!(claims.user_id(), Some(outcome.user.id));
        assert_eq!(claims.role, "admin");
    }

    #[tokio::test]
    async fn test_wrong_credential_and_unknown_user_fail_identically() {
        let auth = authenticator(CredentialScheme::Plain);
        let mut users = users_with("alice", "pw1", "user").await;

        let wrong = auth.login(&mut users, "alice", "nope").await.unwrap_err();
        let unknown = auth.login(&mut users, "mallory", "pw1").await.unwrap_err();
        assert_eq!(wrong, unknown);
        assert_eq!(wrong.to_string(), "Username or password is incorrect");
    }

    #[tokio::test]
    async fn test_argon2_login_verifies_hash() {
        let auth = authenticator(CredentialScheme::Argon2);
        let hash = hash_password("pw1").unwrap();
        let mut users = users_with("alice", &hash, "user").await;

        let outcome = auth.login(&mut users, "Alice", "pw1").await.unwrap();
        assert!(outcome.user.password.is_empty());

        assert_matches!(auth.login(&mut users, "alice", "pw2").await, Err(AuthFailure));
        assert_matches!(auth.login(&mut users, "bob", "pw1").await, Err(AuthFailure));
    }

    #[tokio::test]
    async fn test_argon2_with_unhashed_credential_is_a_failure() {
        let auth = authenticator(CredentialScheme::Argon2);
        let mut users = users_with("alice", "plaintext", "user").await;

        assert_matches!(auth.login(&mut users, "alice", "plaintext").await, Err(AuthFailure));
    }

    #[tokio::test]
    async fn test_case_variant_accounts_log_in_alike_under_both_schemes() {
        for scheme in [CredentialScheme::Plain, CredentialScheme::Argon2] {
            let auth = authenticator(scheme);
            let stored = |pw: &str| match scheme {
                CredentialScheme::Plain => pw.to_string(),
                CredentialScheme::Argon2 => hash_password(pw).unwrap(),
            };

            let mut users = UserRepo::new(Arc::new(MemoryStore::<LocalUser>::new()));
            let lower = users.create(account("alice", &stored("pw-a"), "user")).await.unwrap();
            let upper = users.create(account("Alice", &stored("pw-b"), "user")).await.unwrap();

            let first = auth.login(&mut users, "alice", "pw-a").await.unwrap();
            assert_eq!(first.user.id, lower.id, "{scheme:?}");

            let second = auth.login(&mut users, "Alice", "pw-b").await.unwrap();
            assert_eq!(second.user.id, upper.id, "{scheme:?}");

            assert_matches!(auth.login(&mut users, "ALICE", "pw-c").await, Err(AuthFailure));
        }
    }
}
