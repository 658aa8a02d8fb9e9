//! Villa number (individual unit) entity model and DTOs.
//!
//! The unit number is the primary key and is chosen by the caller.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, QueryBuilder};
use villa_core::types::{DbId, Timestamp};

use crate::repositories::Timestamped;
use crate::store::{Entity, FieldValue, PgEntity};

/// A row from the `villa_numbers` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct VillaNumber {
    pub villa_no: DbId,
    /// Parent villa. Existence is checked by the caller before every write.
    pub villa_id: DbId,
    pub special_details: String,
    pub created_date: Timestamp,
    pub updated_date: Option<Timestamp>,
}

impl VillaNumber {
    pub fn new(input: CreateVillaNumber) -> Self {
        Self {
            villa_no: input.villa_no,
            villa_id: input.villa_id,
            special_details: input.special_details,
            created_date: Utc::now(),
            updated_date: None,
        }
    }

    pub fn replace(&mut self, input: ReplaceVillaNumber) {
        self.villa_id = input.villa_id;
        self.special_details = input.special_details;
    }

    pub fn apply(&mut self, input: UpdateVillaNumber) {
        if let Some(villa_id) = input.villa_id {
            self.villa_id = villa_id;
        }
        if let Some(special_details) = input.special_details {
            self.special_details = special_details;
        }
    }
}

impl Entity for VillaNumber {
    const NAME: &'static str = "VillaNumber";
    const TABLE: &'static str = "villa_numbers";
    const ID_COLUMN: &'static str = "villa_no";
    const GENERATED_ID: bool = false;

    fn id(&self) -> DbId {
        self.villa_no
    }

    fn set_id(&mut self, id: DbId) {
        self.villa_no = id;
    }

    fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "villa_no" => Some(self.villa_no.into()),
            "villa_id" => Some(self.villa_id.into()),
            "special_details" => Some(self.special_details.as_str().into()),
            _ => None,
        }
    }

    fn on_create(&mut self, now: Timestamp) {
        self.created_date = now;
    }

    fn on_update(&mut self, now: Timestamp) {
        self.touch(now);
    }
}

impl Timestamped for VillaNumber {
    fn updated_date(&self) -> Option<Timestamp> {
        self.updated_date
    }

    fn set_updated_date(&mut self, at: Timestamp) {
        self.updated_date = Some(at);
    }
}

impl PgEntity for VillaNumber {
    const COLUMNS: &'static str = "villa_no, villa_id, special_details, created_date, updated_date";

    fn push_insert(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push("(villa_no, villa_id, special_details, created_date, updated_date) VALUES (");
        let mut values = qb.separated(", ");
        values.push_bind(self.villa_no);
        values.push_bind(self.villa_id);
        values.push_bind(self.special_details.clone());
        values.push_bind(self.created_date);
        values.push_bind(self.updated_date);
        values.push_unseparated(")");
    }

    fn push_assignments(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        let mut set = qb.separated(", ");
        set.push("villa_id = ").push_bind_unseparated(self.villa_id);
        set.push("special_details = ")
            .push_bind_unseparated(self.special_details.clone());
        set.push("updated_date = ").push_bind_unseparated(self.updated_date);
    }
}

/// DTO for creating a new villa number.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVillaNumber {
    pub villa_no: DbId,
    pub villa_id: DbId,
    #[serde(default)]
    pub special_details: String,
}

/// DTO for a full replacement (`PUT`). `villa_no` must match the target.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceVillaNumber {
    pub villa_no: DbId,
    pub villa_id: DbId,
    #[serde(default)]
    pub special_details: String,
}

/// DTO for a partial update (`PATCH`). All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVillaNumber {
    pub villa_id: Option<DbId>,
    pub special_details: Option<String>,
}
