//! TOML file configuration structures.
//!
//! These structs directly map to the `stablepay-ledger.toml` file format.

use serde::{Deserialize, Serialize};
use stablepay_sdk::objects::Blockchain;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub client: ClientConfig,
    /// Chain ids the ledger records withdrawals for. Empty means every
    /// chain in [`Blockchain::ALL`].
    #[serde(default)]
    pub chains: Vec<u64>,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080)
}

/// Admin configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// The admin secret. If this is plaintext (doesn't start with `$argon2`),
    /// it will be hashed and the config file will be rewritten.
    pub secret: String,
}

/// The withdrawal core's credentials for the Service API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Shared HMAC key for `StablePay-Signature`.
    pub secret: String,
}

impl FileConfig {
    /// Check if the admin secret is already hashed (argon2 format).
    pub fn is_admin_secret_hashed(&self) -> bool {
        self.admin.secret.starts_with("$argon2")
    }

    /// The configured chain ids, falling back to every known chain.
    pub fn supported_chains(&self) -> Vec<u64> {
        if self.chains.is_empty() {
            Blockchain::ALL.iter().map(|c| c.chain_id()).collect()
        } else {
            self.chains.clone()
        }
    }
}
