//! Primitive types, domain errors and role names shared by every villa crate.

pub mod error;
pub mod roles;
pub mod types;
