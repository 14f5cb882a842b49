//! Back-office accounts: Argon2id password hashing and credential checks.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::{AdminRole, AdminUser, LoginInput};
use crate::store::{CatalogStore, StoreError};
use crate::{CatalogError, Result};

/// Hash a plaintext password into a PHC string with a random salt.
pub fn hash_password(password: &str) -> std::result::Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// `Ok(false)` on mismatch; `Err` only for an unparseable stored hash.
pub fn verify_password(password: &str, hash: &str) -> std::result::Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

#[derive(Clone)]
pub struct AccountService { store: Arc<dyn CatalogStore> }

impl AccountService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self { Self { store } }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, input: &LoginInput) -> Result<AdminUser> {
        input.validate()?;
        let Some(user) = self.store.find_admin_by_email(input.email.trim()).await? else {
            tracing::debug!(email = %input.email, "Login for unknown account");
            return Err(CatalogError::Unauthorized);
        };
        match verify_password(&input.password, &user.password_hash) {
            Ok(true) => Ok(user),
            Ok(false) => {
                tracing::debug!(user_id = %user.id, "Login with wrong password");
                Err(CatalogError::Unauthorized)
            }
            Err(e) => {
                tracing::error!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
                Err(CatalogError::Unauthorized)
            }
        }
    }

    /// Creates the account unless one with this email exists. Returns whether it was created.
    pub async fn ensure_admin(&self, email: &str, password: &str, role: AdminRole) -> Result<bool> {
        if self.store.find_admin_by_email(email).await?.is_some() {
            return Ok(false);
        }
        let password_hash = hash_password(password)
            .map_err(|e| CatalogError::Store(StoreError::Corrupt(format!("password hashing failed: {e}"))))?;
        let user = AdminUser {
            id: Uuid::now_v7(), email: email.to_string(), password_hash, name: Some("Admin".into()),
            role, created_at: Utc::now(),
        };
        self.store.insert_admin(&user).await?;
        tracing::info!(user_id = %user.id, email = %user.email, role = user.role.as_str(), "Admin account created");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCatalogStore;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("admin123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("admin123", &hash).unwrap());
        assert!(!verify_password("admin124", &hash).unwrap());
        assert!(verify_password("admin123", "not-a-phc-string").is_err());
    }

    #[tokio::test]
    async fn test_authenticate() {
        let accounts = AccountService::new(Arc::new(MemoryCatalogStore::new()));
        assert!(accounts.ensure_admin("admin@upstore.ru", "admin123", AdminRole::Superadmin).await.unwrap());
        assert!(!accounts.ensure_admin("admin@upstore.ru", "other-pass", AdminRole::Admin).await.unwrap());

        let ok = LoginInput { email: "admin@upstore.ru".into(), password: "admin123".into() };
        assert_eq!(accounts.authenticate(&ok).await.unwrap().role, AdminRole::Superadmin);

        let wrong = LoginInput { email: "admin@upstore.ru".into(), password: "admin1234".into() };
        assert!(matches!(accounts.authenticate(&wrong).await, Err(CatalogError::Unauthorized)));

        let unknown = LoginInput { email: "nobody@upstore.ru".into(), password: "admin123".into() };
        assert!(matches!(accounts.authenticate(&unknown).await, Err(CatalogError::Unauthorized)));
    }
}
