//! Users store factory

use std::sync::Arc;

use crate::postgres::PostgresPool;

use super::memory::MemoryUsersStore;
use super::postgres::PostgresUsersStore;
use super::store::{StoreError, UsersStore};

/// Create a users store.
///
/// Returns a `PostgresUsersStore` when a pool is provided (creating the
/// `users` table if needed), otherwise a `MemoryUsersStore`.
pub async fn create_users_store(
    postgres_pool: Option<&PostgresPool>,
) -> Result<Arc<dyn UsersStore>, StoreError> {
    match postgres_pool {
        Some(pool) => {
            let store = PostgresUsersStore::new(pool.pool().clone());
            store.ensure_schema().await?;
            tracing::info!(
                backend = "postgres",
                database = %pool.database_url_masked(),
                "Using PostgreSQL users store"
            );
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("No database configured, users are kept in memory");
            Ok(Arc::new(MemoryUsersStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_fallback() {
        let store = create_users_store(None).await.unwrap();
        assert_eq!(store.backend(), "memory");
    }
}
