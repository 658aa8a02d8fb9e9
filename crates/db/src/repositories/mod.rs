//! Repository layer.
//!
//! [`Repository`] is the generic unit of work every entity goes through.
//! Entity repositories wrap it: [`VillaRepo`] and [`VillaNumberRepo`] deref to
//! it and add the timestamping `update`; [`UserRepo`] exposes the narrow
//! credential-store view used by authentication.

mod repository;
pub mod user_repo;
pub mod villa_number_repo;
pub mod villa_repo;

pub use repository::{Committed, Repository, Timestamped};
pub use user_repo::UserRepo;
pub use villa_number_repo::VillaNumberRepo;
pub use villa_repo::VillaRepo;
