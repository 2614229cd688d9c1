//! `stablepay.toml`.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use rust_decimal::Decimal;
use serde::Deserialize;
use stablepay_core::chain_registry::ChainRegistry;
use stablepay_core::config::ChainEntry;
use stablepay_sdk::objects::BankDetails;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Upper bound on each confirmation wait, in seconds.
    #[serde(default)]
    pub confirmation_timeout_secs: Option<u64>,
    pub chains: Vec<ChainConfig>,
    #[serde(default)]
    pub ledger: Option<LedgerConfig>,
    #[serde(default)]
    pub rates: Option<RatesConfig>,
    #[serde(default)]
    pub bank: Option<BankDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    #[serde(flatten)]
    pub entry: ChainEntry,
    pub rpc_url: Url,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    pub base_url: Url,
    /// HMAC key for the Service API.
    pub secret: String,
    /// Plaintext admin secret, only needed for `admin` commands.
    #[serde(default)]
    pub admin_secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum RatesConfig {
    /// Fixed INR price per token symbol.
    Static { rates: HashMap<String, Decimal> },
    /// Token symbol → CoinGecko coin id.
    Coingecko {
        ids: HashMap<String, String>,
        #[serde(default)]
        base_url: Option<Url>,
    },
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn registry(&self) -> anyhow::Result<ChainRegistry> {
        let entries: Vec<ChainEntry> = self.chains.iter().map(|c| c.entry.clone()).collect();
        ChainRegistry::from_entries(&entries).context("invalid chain configuration")
    }

    pub fn rpc_url(&self, chain_id: u64) -> Option<&Url> {
        self.chains
            .iter()
            .find(|c| c.entry.chain_id == chain_id)
            .map(|c| &c.rpc_url)
    }

    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout_secs.map(Duration::from_secs)
    }

    pub fn ledger(&self) -> anyhow::Result<&LedgerConfig> {
        self.ledger
            .as_ref()
            .context("no [ledger] section in configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
confirmation_timeout_secs = 300

[[chains]]
chain_id = 137
custody_address = "0x1111111111111111111111111111111111111111"
rpc_url = "https://polygon-rpc.com"

[[chains]]
chain_id = 11155111
custody_address = "0x2222222222222222222222222222222222222222"
native_symbol = "SepoliaETH"
explorer_tx_url_template = "https://sepolia.etherscan.io/tx/{hash}"
rpc_url = "https://rpc.sepolia.org"

[ledger]
base_url = "http://localhost:8080"
secret = "replace-with-at-least-16-bytes"

[rates]
source = "static"
rates = { USDC = "83.25", POL = 41 }

[bank]
account_holder = "Asha Verma"
account_number = "123456789012"
ifsc = "HDFC0001234"
"#;

    #[test]
    fn test_parse_example() {
        let config: CliConfig = toml::from_str(EXAMPLE).unwrap();
        assert_eq!(config.chains.len(), 2);
        assert_eq!(config.confirmation_timeout(), Some(Duration::from_secs(300)));
        assert_eq!(
            config.rpc_url(137).unwrap().as_str(),
            "https://polygon-rpc.com/"
        );
        assert!(config.rpc_url(1).is_none());
        match config.rates.as_ref().unwrap() {
            RatesConfig::Static { rates } => {
                assert_eq!(rates["USDC"], Decimal::new(8325, 2));
                assert_eq!(rates["POL"], Decimal::from(41));
            }
            other => panic!("unexpected rates {other:?}"),
        }
        assert_eq!(config.bank.as_ref().unwrap().ifsc, "HDFC0001234");

        let registry = config.registry().unwrap();
        assert_eq!(registry.profile(11155111).unwrap().native_symbol, "SepoliaETH");
    }

    #[test]
    fn test_parse_coingecko_rates() {
        let config: CliConfig = toml::from_str(
            r#"
[[chains]]
chain_id = 1
custody_address = "0x1111111111111111111111111111111111111111"
rpc_url = "http://127.0.0.1:8545"

[rates]
source = "coingecko"
ids = { USDC = "usd-coin", ETH = "ethereum" }
"#,
        )
        .unwrap();
        assert!(config.ledger().is_err());
        assert!(matches!(
            config.rates,
            Some(RatesConfig::Coingecko { ref ids, base_url: None }) if ids["ETH"] == "ethereum"
        ));
    }
}
