//! Persistence capabilities used by the services.
//!
//! Each concern is a trait so services can run against Postgres ([`PgStore`])
//! or the in-memory [`memory::MemoryStore`].

use std::sync::Arc;

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::{
    AsyncPgConnection,
    pooled_connection::bb8::{Pool, PooledConnection},
};

pub mod addons;
pub mod memory;
pub mod orders;
pub mod payments;
pub mod slots;
pub mod theatres;
pub mod users;

pub use addons::AddonsRepository;
pub use orders::OrdersRepository;
pub use payments::PaymentsRepository;
pub use slots::SlotsRepository;
pub use theatres::TheatresRepository;
pub use users::UsersRepository;

/// Storage-level backstop for one booking per (theatre, slot, date).
pub const ORDER_SLOT_UNIQUE: &str = "orders_theatre_slot_date_key";
pub const USER_EMAIL_UNIQUE: &str = "users_email_key";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("referenced record does not exist: {0}")]
    MissingReference(String),

    #[error("failed to obtain a DB connection: {0}")]
    Pool(String),

    #[error(transparent)]
    Database(DieselError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => StoreError::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::UniqueViolation(info.constraint_name().unwrap_or("unknown").into())
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                StoreError::MissingReference(info.constraint_name().unwrap_or("unknown").into())
            }
            other => StoreError::Database(other),
        }
    }
}

impl StoreError {
    pub fn is_unique_violation(&self, constraint: &str) -> bool {
        matches!(self, StoreError::UniqueViolation(name) if name == constraint)
    }
}

pub type DbPool = Pool<AsyncPgConnection>;

/// Postgres-backed implementation of every repository trait.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn conn(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|err| StoreError::Pool(err.to_string()))
    }
}

/// The set of repositories the application state is built from.
#[derive(Clone)]
pub struct Repositories {
    pub orders: Arc<dyn OrdersRepository>,
    pub payments: Arc<dyn PaymentsRepository>,
    pub theatres: Arc<dyn TheatresRepository>,
    pub slots: Arc<dyn SlotsRepository>,
    pub addons: Arc<dyn AddonsRepository>,
    pub users: Arc<dyn UsersRepository>,
}

impl Repositories {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: OrdersRepository
            + PaymentsRepository
            + TheatresRepository
            + SlotsRepository
            + AddonsRepository
            + UsersRepository
            + 'static,
    {
        Self {
            orders: store.clone(),
            payments: store.clone(),
            theatres: store.clone(),
            slots: store.clone(),
            addons: store.clone(),
            users: store,
        }
    }

    pub fn postgres(pool: DbPool) -> Self {
        Self::from_store(Arc::new(PgStore::new(pool)))
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(memory::MemoryStore::default()))
    }
}
