use anyhow::Context;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use axum::async_trait;

use crate::core::PasswordService;

/// Argon2id password hashing
///
/// Hashing is CPU-bound, so both operations run on the blocking pool.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Hasher with the argon2 crate's recommended cost
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Hasher with a custom memory (KiB) and iteration cost
    ///
    /// # Errors
    ///
    /// Returns an error if the cost is outside what Argon2 accepts
    pub fn with_cost(memory_kib: u32, iterations: u32) -> anyhow::Result<Self> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| anyhow::anyhow!("invalid Argon2 parameters: {}", e))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PasswordService for Argon2Hasher {
    async fn hash(&self, password: &str) -> anyhow::Result<String> {
        let argon2 = self.argon2();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))
        })
        .await
        .context("password hashing task panicked")?
    }

    async fn verify(&self, password: &str, encrypted_password: &str) -> anyhow::Result<bool> {
        let argon2 = self.argon2();
        let password = password.to_string();
        let encrypted_password = encrypted_password.to_string();

        tokio::task::spawn_blocking(move || -> anyhow::Result<bool> {
            let parsed = PasswordHash::new(&encrypted_password)
                .map_err(|e| anyhow::anyhow!("stored password hash is malformed: {}", e))?;
            // Parameters come from the stored hash, not from `self`
            Ok(argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        })
        .await
        .context("password verification task panicked")?
    }
}
