//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row, with its
//!   [`Entity`](crate::store::Entity) and [`PgEntity`](crate::store::PgEntity) impls
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` replace DTO (every field) and update DTO (all `Option`
//!   fields) where the entity can be modified

pub mod user;
pub mod villa;
pub mod villa_number;
