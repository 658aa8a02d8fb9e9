use std::sync::Arc;

use villa_db::models::user::LocalUser;
use villa_db::models::villa::{CreateVilla, Villa};
use villa_db::models::villa_number::VillaNumber;
use villa_db::repositories::{UserRepo, VillaNumberRepo, VillaRepo};
use villa_db::store::{EntityStore, MemoryStore, PgStore, StoreError};
use villa_db::DbPool;

use crate::auth::{Authenticator, Registrar};
use crate::config::ServerConfig;

/// Shared store handles, one per entity type.
///
/// Handles are shared across requests; each request builds its own
/// repository (unit of work) on top of them.
#[derive(Clone)]
pub struct Stores {
    pub villas: Arc<dyn EntityStore<Villa>>,
    pub villa_numbers: Arc<dyn EntityStore<VillaNumber>>,
    pub users: Arc<dyn EntityStore<LocalUser>>,
}

impl Stores {
    pub fn postgres(pool: DbPool) -> Self {
        Self {
            villas: Arc::new(PgStore::<Villa>::new(pool.clone())),
            villa_numbers: Arc::new(PgStore::<VillaNumber>::new(pool.clone())),
            users: Arc::new(PgStore::<LocalUser>::new(pool)),
        }
    }

    /// Empty in-memory tables.
    pub fn memory() -> Self {
        Self {
            villas: Arc::new(MemoryStore::<Villa>::new()),
            villa_numbers: Arc::new(MemoryStore::<VillaNumber>::new()),
            users: Arc::new(MemoryStore::<LocalUser>::new()),
        }
    }

    /// In-memory tables with the two sample villas loaded.
    pub fn seeded_memory() -> Result<Self, StoreError> {
        let villas = MemoryStore::seeded(sample_villas())?;
        Ok(Self {
            villas: Arc::new(villas),
            ..Self::memory()
        })
    }
}

fn sample_villas() -> Vec<Villa> {
    let villa = |name: &str, rate: f64, sqft: i32, occupancy: i32| {
        Villa::new(CreateVilla {
            name: name.into(),
            details: String::new(),
            rate,
            sqft,
            occupancy,
            image_url: String::new(),
            amenity: String::new(),
        })
    };
    vec![
        villa("Pool View", 200.0, 100, 4),
        villa("Beach View", 550.0, 300, 3),
    ]
}

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub stores: Stores,
    pub authenticator: Arc<Authenticator>,
    pub registrar: Registrar,
    /// Database connection pool; `None` with the in-memory backend.
    pub pool: Option<DbPool>,
}

impl AppState {
    pub fn new(config: ServerConfig, stores: Stores, pool: Option<DbPool>) -> Self {
        let authenticator = Authenticator::new(config.jwt.clone(), config.credential_scheme);
        let registrar = Registrar::new(config.credential_scheme);
        Self {
            config: Arc::new(config),
            stores,
            authenticator: Arc::new(authenticator),
            registrar,
            pool,
        }
    }

    pub fn villa_repo(&self) -> VillaRepo {
        VillaRepo::new(self.stores.villas.clone())
    }

    pub fn villa_number_repo(&self) -> VillaNumberRepo {
        VillaNumberRepo::new(self.stores.villa_numbers.clone())
    }

    pub fn user_repo(&self) -> UserRepo {
        UserRepo::new(self.stores.users.clone())
    }
}
