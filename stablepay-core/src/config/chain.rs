use serde::{Deserialize, Serialize};

/// One supported chain as written in configuration.
///
/// Networks StablePay ships metadata for only need `chain_id` and
/// `custody_address`; anything else must also set `native_symbol` and
/// `explorer_tx_url_template`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEntry {
    pub chain_id: u64,
    /// Platform-controlled wallet that receives withdrawals on this chain.
    pub custody_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_symbol: Option<String>,
    /// Must contain a `{hash}` placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_tx_url_template: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct File {
        chains: Vec<ChainEntry>,
    }

    #[test]
    fn test_parse_chain_entries() {
        let file: File = toml::from_str(
            r#"
            [[chains]]
            chain_id = 137
            custody_address = "0x1111111111111111111111111111111111111111"

            [[chains]]
            chain_id = 11155111
            custody_address = "0x2222222222222222222222222222222222222222"
            native_symbol = "SepoliaETH"
            explorer_tx_url_template = "https://sepolia.etherscan.io/tx/{hash}"
            "#,
        )
        .unwrap();

        assert_eq!(file.chains.len(), 2);
        assert_eq!(file.chains[0].chain_id, 137);
        assert!(file.chains[0].native_symbol.is_none());
        assert_eq!(file.chains[1].native_symbol.as_deref(), Some("SepoliaETH"));
    }
}
