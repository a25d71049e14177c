use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::metrics::SignupMetrics;
use crate::password::{self, HashError};
use crate::users::{NewUser, StoreError, UsersStore};

use super::validation::{validate, ValidationError};

#[derive(Debug, Error)]
pub enum SignupError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] HashError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

/// Creates users from raw signup input.
pub struct SignupService {
    store: Arc<dyn UsersStore>,
}

impl SignupService {
    pub fn new(store: Arc<dyn UsersStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn UsersStore> {
        &self.store
    }

    /// Validate and store a new user. Returns the new user's id.
    pub async fn signup(&self, raw_username: &Value, raw_password: &Value) -> Result<i64, SignupError> {
        let credentials = validate(raw_username, raw_password).inspect_err(|e| {
            SignupMetrics::record_invalid();
            tracing::debug!(reason = e.reason(), "Signup input rejected");
        })?;

        let password_digest = password::hash_blocking(credentials.password).await.inspect_err(|e| {
            SignupMetrics::record_failed();
            tracing::error!(error = %e, "Password hashing failed");
        })?;

        let new_user = NewUser {
            username: credentials.username,
            password_digest,
        };

        match self.store.create(new_user).await {
            Ok(user) => {
                SignupMetrics::record_created();
                tracing::info!(user_id = user.id, username = %user.username, "User created");
                Ok(user.id)
            }
            Err(e) => {
                match &e {
                    StoreError::DuplicateUsername(name) => {
                        SignupMetrics::record_duplicate();
                        tracing::warn!(username = %name, "Signup for existing username");
                    }
                    _ => {
                        SignupMetrics::record_failed();
                        tracing::error!(error = %e, backend = self.store.backend(), "Failed to store user");
                    }
                }
                Err(SignupError::Persistence(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::MemoryUsersStore;
    use serde_json::json;

    fn service() -> (SignupService, Arc<MemoryUsersStore>) {
        let store = Arc::new(MemoryUsersStore::new());
        (SignupService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_short_username_rejected() {
        let (service, store) = service();

        let err = service.signup(&json!("ab"), &json!("longenough1")).await.unwrap_err();
        assert!(matches!(err, SignupError::Validation(ValidationError::UsernameLength)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_trimmed_username_and_digest_stored() {
        let (service, store) = service();

        let id = service.signup(&json!("  alice  "), &json!("password123")).await.unwrap();

        let user = store.get("alice").expect("user stored under trimmed name");
        assert_eq!(user.id, id);
        assert_ne!(user.password_digest, "password123");
        assert!(!user.password_digest.contains("password123"));
        assert!(password::verify("password123", &user.password_digest));
    }

    #[tokio::test]
    async fn test_non_string_username_rejected() {
        let (service, _) = service();

        let err = service.signup(&json!(123), &json!("password123")).await.unwrap_err();
        assert!(matches!(err, SignupError::Validation(ValidationError::InvalidType)));
    }

    #[tokio::test]
    async fn test_duplicate_is_persistence_error() {
        let (service, _) = service();

        service.signup(&json!("bob"), &json!("password123")).await.unwrap();
        let err = service.signup(&json!(" bob"), &json!("password456")).await.unwrap_err();
        assert!(matches!(
            err,
            SignupError::Persistence(StoreError::DuplicateUsername(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_same_username() {
        let (service, store) = service();
        let service = Arc::new(service);

        let first = {
            let service = service.clone();
            tokio::spawn(async move { service.signup(&json!("bob"), &json!("password123")).await })
        };
        let second = {
            let service = service.clone();
            tokio::spawn(async move { service.signup(&json!("bob"), &json!("password123")).await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let persistence = results
            .iter()
            .filter(|r| matches!(r, Err(SignupError::Persistence(_))))
            .count();

        assert_eq!(ok, 1);
        assert_eq!(persistence, 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
