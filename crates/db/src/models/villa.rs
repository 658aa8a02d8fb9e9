//! Villa entity model and DTOs.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, QueryBuilder};
use villa_core::types::{DbId, Timestamp};

use crate::repositories::Timestamped;
use crate::store::{Entity, FieldValue, PgEntity};

/// A row from the `villas` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Villa {
    pub id: DbId,
    pub name: String,
    pub details: String,
    pub rate: f64,
    pub sqft: i32,
    pub occupancy: i32,
    pub image_url: String,
    pub amenity: String,
    pub created_date: Timestamp,
    pub updated_date: Option<Timestamp>,
}

impl Villa {
    /// Build an unsaved villa (`id == 0`) from a create DTO.
    pub fn new(input: CreateVilla) -> Self {
        Self {
            id: 0,
            name: input.name,
            details: input.details,
            rate: input.rate,
            sqft: input.sqft,
            occupancy: input.occupancy,
            image_url: input.image_url,
            amenity: input.amenity,
            created_date: Utc::now(),
            updated_date: None,
        }
    }

    /// Replace every caller-editable field, keeping identity and timestamps.
    pub fn replace(&mut self, input: ReplaceVilla) {
        self.name = input.name;
        self.details = input.details;
        self.rate = input.rate;
        self.sqft = input.sqft;
        self.occupancy = input.occupancy;
        self.image_url = input.image_url;
        self.amenity = input.amenity;
    }

    /// Apply the non-`None` fields of a partial update.
    pub fn apply(&mut self, input: UpdateVilla) {
        if let Some(name) = input.name {
            self.name = name;
        }
        if let Some(details) = input.details {
            self.details = details;
        }
        if let Some(rate) = input.rate {
            self.rate = rate;
        }
        if let Some(sqft) = input.sqft {
            self.sqft = sqft;
        }
        if let Some(occupancy) = input.occupancy {
            self.occupancy = occupancy;
        }
        if let Some(image_url) = input.image_url {
            self.image_url = image_url;
        }
        if let Some(amenity) = input.amenity {
            self.amenity = amenity;
        }
    }
}

impl Entity for Villa {
    const NAME: &'static str = "Villa";
    const TABLE: &'static str = "villas";
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
            "name" => Some(self.name.as_str().into()),
            "details" => Some(self.details.as_str().into()),
            "sqft" => Some(self.sqft.into()),
            "occupancy" => Some(self.occupancy.into()),
            "image_url" => Some(self.image_url.as_str().into()),
            "amenity" => Some(self.amenity.as_str().into()),
            _ => None,
        }
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("uq_villas_name", self.name.to_lowercase())]
    }

    fn on_create(&mut self, now: Timestamp) {
        self.created_date = now;
    }

    fn on_update(&mut self, now: Timestamp) {
        self.touch(now);
    }
}

impl Timestamped for Villa {
    fn updated_date(&self) -> Option<Timestamp> {
        self.updated_date
    }

    fn set_updated_date(&mut self, at: Timestamp) {
        self.updated_date = Some(at);
    }
}

impl PgEntity for Villa {
    const COLUMNS: &'static str = "id, name, details, rate, sqft, occupancy, image_url, amenity, \
                                   created_date, updated_date";

    fn push_insert(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push(
            "(name, details, rate, sqft, occupancy, image_url, amenity, created_date, updated_date) \
             VALUES (",
        );
        let mut values = qb.separated(", ");
        values.push_bind(self.name.clone());
        values.push_bind(self.details.clone());
        values.push_bind(self.rate);
        values.push_bind(self.sqft);
        values.push_bind(self.occupancy);
        values.push_bind(self.image_url.clone());
        values.push_bind(self.amenity.clone());
        values.push_bind(self.created_date);
        values.push_bind(self.updated_date);
        values.push_unseparated(")");
    }

    fn push_assignments(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        let mut set = qb.separated(", ");
        set.push("name = ").push_bind_unseparated(self.name.clone());
        set.push("details = ").push_bind_unseparated(self.details.clone());
        set.push("rate = ").push_bind_unseparated(self.rate);
        set.push("sqft = ").push_bind_unseparated(self.sqft);
        set.push("occupancy = ").push_bind_unseparated(self.occupancy);
        set.push("image_url = ").push_bind_unseparated(self.image_url.clone());
        set.push("amenity = ").push_bind_unseparated(self.amenity.clone());
        set.push("updated_date = ").push_bind_unseparated(self.updated_date);
    }
}

/// DTO for creating a new villa.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVilla {
    pub name: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub sqft: i32,
    #[serde(default)]
    pub occupancy: i32,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub amenity: String,
}

/// DTO for a full replacement (`PUT`). `id` must match the target.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceVilla {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub sqft: i32,
    #[serde(default)]
    pub occupancy: i32,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub amenity: String,
}

/// DTO for a partial update (`PATCH`). All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVilla {
    pub name: Option<String>,
    pub details: Option<String>,
    pub rate: Option<f64>,
    pub sqft: Option<i32>,
    pub occupancy: Option<i32>,
    pub image_url: Option<String>,
    pub amenity: Option<String>,
}
