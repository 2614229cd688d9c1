//! Chain Registry.
//!
//! The single place that maps a chain id to its custody wallet, native asset
//! and block explorer. Every other component resolves chain-dependent
//! addresses through a [`ChainProfile`] obtained here.

use std::collections::BTreeMap;
use std::str::FromStr;

use alloy::primitives::{Address, address};
use compact_str::CompactString;
use stablepay_sdk::objects::Blockchain;

use crate::config::ChainEntry;

/// Reserved address meaning "the chain's native asset, not a contract".
///
/// The same value is used on every chain. The zero address is never treated
/// as native.
pub const NATIVE_SENTINEL: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainProfile {
    pub chain_id: u64,
    pub native_symbol: CompactString,
    pub native_sentinel: Address,
    pub custody_address: Address,
    pub explorer_tx_url_template: String,
}

impl ChainProfile {
    pub fn is_native(&self, token: Address) -> bool {
        token == self.native_sentinel
    }

    /// Block explorer link for a transaction hash.
    pub fn explorer_tx_url(&self, hash: impl std::fmt::Display) -> String {
        self.explorer_tx_url_template
            .replace("{hash}", &hash.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("chain {0} is not supported")]
    UnsupportedChain(u64),
    #[error("chain {0} is configured more than once")]
    DuplicateChain(u64),
    #[error("chain {0} has no custody address configured")]
    MissingCustody(u64),
    #[error("chain {chain_id}: invalid custody address {value}")]
    InvalidCustody { chain_id: u64, value: String },
    #[error("chain {0}: custody address must not be the zero address or the native sentinel")]
    ReservedCustody(u64),
    #[error("chain {0} is unknown; native_symbol and explorer_tx_url_template are required")]
    UnknownNetwork(u64),
    #[error("chain {0}: explorer template must contain {{hash}}")]
    InvalidExplorerTemplate(u64),
}

/// Immutable chain id → [`ChainProfile`] mapping, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    profiles: BTreeMap<u64, ChainProfile>,
}

impl ChainRegistry {
    pub fn from_entries(entries: &[ChainEntry]) -> Result<Self, RegistryError> {
        let mut profiles = BTreeMap::new();
        for entry in entries {
            let profile = build_profile(entry)?;
            if profiles.insert(entry.chain_id, profile).is_some() {
                return Err(RegistryError::DuplicateChain(entry.chain_id));
            }
        }
        Ok(Self { profiles })
    }

    pub fn profile(&self, chain_id: u64) -> Result<&ChainProfile, RegistryError> {
        self.profiles
            .get(&chain_id)
            .ok_or(RegistryError::UnsupportedChain(chain_id))
    }

    /// Profiles ordered by chain id.
    pub fn profiles(&self) -> impl Iterator<Item = &ChainProfile> {
        self.profiles.values()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn build_profile(entry: &ChainEntry) -> Result<ChainProfile, RegistryError> {
    let chain_id = entry.chain_id;
    let known = Blockchain::from_chain_id(chain_id);

    let native_symbol = match (&entry.native_symbol, known) {
        (Some(symbol), _) => CompactString::from(symbol.as_str()),
        (None, Some(chain)) => CompactString::from(chain.native_symbol()),
        (None, None) => return Err(RegistryError::UnknownNetwork(chain_id)),
    };
    let explorer_tx_url_template = match (&entry.explorer_tx_url_template, known) {
        (Some(template), _) => template.clone(),
        (None, Some(chain)) => chain.explorer_tx_url_template().to_string(),
        (None, None) => return Err(RegistryError::UnknownNetwork(chain_id)),
    };
    if !explorer_tx_url_template.contains("{hash}") {
        return Err(RegistryError::InvalidExplorerTemplate(chain_id));
    }

    let raw = entry
        .custody_address
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(RegistryError::MissingCustody(chain_id))?;
    let custody_address = parse_address(raw).ok_or_else(|| RegistryError::InvalidCustody {
        chain_id,
        value: raw.to_string(),
    })?;
    if custody_address == Address::ZERO || custody_address == NATIVE_SENTINEL {
        return Err(RegistryError::ReservedCustody(chain_id));
    }

    Ok(ChainProfile {
        chain_id,
        native_symbol,
        native_sentinel: NATIVE_SENTINEL,
        custody_address,
        explorer_tx_url_template,
    })
}

/// Strict `0x` + 40 hex digit address parse.
pub fn parse_address(value: &str) -> Option<Address> {
    let hex = value.strip_prefix("0x")?;
    if hex.len() != 40 {
        return None;
    }
    Address::from_str(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUSTODY: &str = "0x1111111111111111111111111111111111111111";

    fn entry(chain_id: u64) -> ChainEntry {
        ChainEntry {
            chain_id,
            custody_address: Some(CUSTODY.to_string()),
            native_symbol: None,
            explorer_tx_url_template: None,
        }
    }

    fn all_known() -> ChainRegistry {
        let entries: Vec<_> = Blockchain::ALL.iter().map(|c| entry(c.chain_id())).collect();
        ChainRegistry::from_entries(&entries).unwrap()
    }

    #[test]
    fn test_every_supported_chain_has_valid_custody() {
        let registry = all_known();
        for chain in Blockchain::ALL {
            let profile = registry.profile(chain.chain_id()).unwrap();
            assert_eq!(profile.custody_address.to_string().len(), 42);
            assert_ne!(profile.custody_address, Address::ZERO);
            assert_eq!(profile.native_sentinel, NATIVE_SENTINEL);
            assert_eq!(profile.native_symbol, chain.native_symbol());
        }
    }

    #[test]
    fn test_unknown_chain_is_configuration_error() {
        let registry = all_known();
        assert_eq!(
            registry.profile(999_999),
            Err(RegistryError::UnsupportedChain(999_999))
        );
    }

    #[test]
    fn test_rejects_bad_custody() {
        let mut e = entry(1);
        e.custody_address = None;
        assert_eq!(
            ChainRegistry::from_entries(&[e]).unwrap_err(),
            RegistryError::MissingCustody(1)
        );

        let mut e = entry(1);
        e.custody_address = Some("0x0000000000000000000000000000000000000000".to_string());
        assert_eq!(
            ChainRegistry::from_entries(&[e]).unwrap_err(),
            RegistryError::ReservedCustody(1)
        );

        let mut e = entry(1);
        e.custody_address = Some(NATIVE_SENTINEL.to_string());
        assert_eq!(
            ChainRegistry::from_entries(&[e]).unwrap_err(),
            RegistryError::ReservedCustody(1)
        );

        let mut e = entry(1);
        e.custody_address = Some("1111111111111111111111111111111111111111".to_string());
        assert!(matches!(
            ChainRegistry::from_entries(&[e]),
            Err(RegistryError::InvalidCustody { chain_id: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_duplicates_and_unknown_networks() {
        assert_eq!(
            ChainRegistry::from_entries(&[entry(10), entry(10)]).unwrap_err(),
            RegistryError::DuplicateChain(10)
        );
        assert_eq!(
            ChainRegistry::from_entries(&[entry(31337)]).unwrap_err(),
            RegistryError::UnknownNetwork(31337)
        );

        let mut custom = entry(31337);
        custom.native_symbol = Some("ETH".to_string());
        custom.explorer_tx_url_template = Some("http://localhost/tx/".to_string());
        assert_eq!(
            ChainRegistry::from_entries(&[custom.clone()]).unwrap_err(),
            RegistryError::InvalidExplorerTemplate(31337)
        );

        custom.explorer_tx_url_template = Some("http://localhost/tx/{hash}".to_string());
        let registry = ChainRegistry::from_entries(&[custom]).unwrap();
        assert_eq!(
            registry.profile(31337).unwrap().explorer_tx_url("0xabc"),
            "http://localhost/tx/0xabc"
        );
    }

    #[test]
    fn test_zero_address_is_not_native() {
        let registry = all_known();
        let profile = registry.profile(1).unwrap();
        assert!(profile.is_native(NATIVE_SENTINEL));
        assert!(!profile.is_native(Address::ZERO));
    }
}
