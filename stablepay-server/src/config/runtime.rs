//! Validated runtime configuration.
//!
//! Built from [`FileConfig`](super::file::FileConfig) by the loader and
//! swapped as a whole on `SIGHUP`.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use std::collections::BTreeSet;
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub client: ClientConfig,
    pub chains: BTreeSet<u64>,
}

impl RuntimeConfig {
    pub fn supports_chain(&self, chain_id: u64) -> bool {
        self.chains.contains(&chain_id)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

/// Admin credentials. Only the argon2 hash is kept in memory.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    secret_hash: String,
}

impl AdminConfig {
    pub fn new(secret_hash: String) -> Self {
        Self { secret_hash }
    }

    /// Check a plaintext secret from the `StablePay-Admin-Authorization` header.
    pub fn verify(&self, plaintext: &str) -> bool {
        match PasswordHash::new(&self.secret_hash) {
            Ok(hash) => Argon2::default()
                .verify_password(plaintext.as_bytes(), &hash)
                .is_ok(),
            Err(e) => {
                tracing::error!(error = %e, "Stored admin secret hash is malformed");
                false
            }
        }
    }
}

/// HMAC key shared with the withdrawal core.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    secret: Box<[u8]>,
}

impl ClientConfig {
    pub fn new(secret: impl Into<Box<[u8]>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn secret_bytes(&self) -> &[u8] {
        &self.secret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{
        PasswordHasher,
        password_hash::{SaltString, rand_core::OsRng},
    };

    #[test]
    fn test_admin_secret_verification() {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"correct horse", &salt)
            .unwrap()
            .to_string();
        let admin = AdminConfig::new(hash);
        assert!(admin.verify("correct horse"));
        assert!(!admin.verify("battery staple"));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let admin = AdminConfig::new("not-a-hash".to_string());
        assert!(!admin.verify("not-a-hash"));
    }
}
