use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::verify_password;
use crate::auth::repo_types::User;

/// Re-confirms a live credential before an irreversible action is scheduled.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Returns `Ok(true)` only if `password` matches the live identity for
    /// `user_id`. An unknown user is an `Ok(false)`, not an error.
    async fn verify(&self, user_id: Uuid, password: &str) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PasswordIdentityVerifier {
    db: PgPool,
}

impl PasswordIdentityVerifier {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentityVerifier for PasswordIdentityVerifier {
    async fn verify(&self, user_id: Uuid, password: &str) -> anyhow::Result<bool> {
        match User::find_by_id(&self.db, user_id).await? {
            Some(user) => verify_password(password, &user.password_hash),
            None => Ok(false),
        }
    }
}
