//! Local user account model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, QueryBuilder};
use villa_core::types::DbId;

use crate::store::{Entity, FieldValue, PgEntity};

/// Full row from the `local_users` table.
///
/// Contains the credential -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct LocalUser {
    pub id: DbId,
    pub username: String,
    /// Credential as stored: plaintext or an Argon2id PHC string, depending
    /// on the configured scheme.
    pub password: String,
    /// Display name.
    pub name: String,
    pub role: String,
}

impl LocalUser {
    pub fn new(input: CreateLocalUser) -> Self {
        Self {
            id: 0,
            username: input.username,
            password: input.password,
            name: input.name,
            role: input.role,
        }
    }

    /// Return this account with the credential cleared.
    pub fn scrubbed(mut self) -> Self {
        self.password.clear();
        self
    }
}

impl Entity for LocalUser {
    const NAME: &'static str = "LocalUser";
    const TABLE: &'static str = "local_users";
    const ID_COLUMN: &'static str = "id";

    fn id(&self) -> DbId {
        self.id
    }

    fn set_id(&mut self, id: DbId) {
        self.id = id;
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(self.id.into()),
            "username" => Some(self.username.as_str().into()),
            "password" => Some(self.password.as_str().into()),
            "name" => Some(self.name.as_str().into()),
            "role" => Some(self.role.as_str().into()),
            _ => None,
        }
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("uq_local_users_username", self.username.clone())]
    }
}

impl PgEntity for LocalUser {
    const COLUMNS: &'static str = "id, username, password, name, role";

    fn push_insert(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push("(username, password, name, role) VALUES (");
        let mut values = qb.separated(", ");
        values.push_bind(self.username.clone());
        values.push_bind(self.password.clone());
        values.push_bind(self.name.clone());
        values.push_bind(self.role.clone());
        values.push_unseparated(")");
    }

    fn push_assignments(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        let mut set = qb.separated(", ");
        set.push("username = ").push_bind_unseparated(self.username.clone());
        set.push("password = ").push_bind_unseparated(self.password.clone());
        set.push("name = ").push_bind_unseparated(self.name.clone());
        set.push("role = ").push_bind_unseparated(self.role.clone());
    }
}

/// Safe user representation for API responses (no credential).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub name: String,
    pub role: String,
}

impl From<LocalUser> for UserResponse {
    fn from(user: LocalUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            role: user.role,
        }
    }
}

/// DTO for creating a new account. `password` is already in stored form.
#[derive(Debug, Deserialize)]
pub struct CreateLocalUser {
    pub username: String,
    pub password: String,
    pub name: String,
    pub role: String,
}
