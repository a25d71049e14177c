//! User records and the storage they live in.
//!
//! The signup API writes through [`UsersStore::create`]; the user page reads
//! through [`UsersStore::find_first`]. Two backends exist: PostgreSQL for
//! deployments and an in-memory map for development and tests.

mod factory;
mod memory;
mod postgres;
mod store;

pub use factory::create_users_store;
pub use memory::MemoryUsersStore;
pub use postgres::PostgresUsersStore;
pub use store::{NewUser, StoreError, User, UsersStore};
