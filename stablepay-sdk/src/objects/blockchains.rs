use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// All EVM networks StablePay ships metadata for.
pub enum Blockchain {
    #[serde(rename = "eth")]
    Ethereum,
    #[serde(rename = "op")]
    Optimism,
    #[serde(rename = "bsc")]
    BnbSmartChain,
    #[serde(rename = "polygon")]
    Polygon,
    #[serde(rename = "base")]
    Base,
    #[serde(rename = "arb")]
    ArbitrumOne,
    #[serde(rename = "avaxc")]
    AvalancheC,
    #[serde(rename = "linea")]
    Linea,
}

impl Blockchain {
    pub const ALL: [Blockchain; 8] = [
        Blockchain::Ethereum,
        Blockchain::Optimism,
        Blockchain::BnbSmartChain,
        Blockchain::Polygon,
        Blockchain::Base,
        Blockchain::ArbitrumOne,
        Blockchain::AvalancheC,
        Blockchain::Linea,
    ];

    /// EIP-155 chain id.
    pub const fn chain_id(self) -> u64 {
        match self {
            Blockchain::Ethereum => 1,
            Blockchain::Optimism => 10,
            Blockchain::BnbSmartChain => 56,
            Blockchain::Polygon => 137,
            Blockchain::Base => 8453,
            Blockchain::ArbitrumOne => 42161,
            Blockchain::AvalancheC => 43114,
            Blockchain::Linea => 59144,
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.chain_id() == chain_id)
    }

    /// Symbol of the asset used to pay fees on this network.
    pub const fn native_symbol(self) -> &'static str {
        match self {
            Blockchain::Ethereum
            | Blockchain::Optimism
            | Blockchain::Base
            | Blockchain::ArbitrumOne
            | Blockchain::Linea => "ETH",
            Blockchain::BnbSmartChain => "BNB",
            Blockchain::Polygon => "POL",
            Blockchain::AvalancheC => "AVAX",
        }
    }

    /// Block explorer transaction URL with a `{hash}` placeholder.
    pub const fn explorer_tx_url_template(self) -> &'static str {
        match self {
            Blockchain::Ethereum => "https://etherscan.io/tx/{hash}",
            Blockchain::Optimism => "https://optimistic.etherscan.io/tx/{hash}",
            Blockchain::BnbSmartChain => "https://bscscan.com/tx/{hash}",
            Blockchain::Polygon => "https://polygonscan.com/tx/{hash}",
            Blockchain::Base => "https://basescan.org/tx/{hash}",
            Blockchain::ArbitrumOne => "https://arbiscan.io/tx/{hash}",
            Blockchain::AvalancheC => "https://snowtrace.io/tx/{hash}",
            Blockchain::Linea => "https://lineascan.build/tx/{hash}",
        }
    }
}

impl std::fmt::Display for Blockchain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Blockchain::Ethereum => "Ethereum",
            Blockchain::Optimism => "Optimism",
            Blockchain::BnbSmartChain => "BNB Smart Chain",
            Blockchain::Polygon => "Polygon",
            Blockchain::Base => "Base",
            Blockchain::ArbitrumOne => "Arbitrum One",
            Blockchain::AvalancheC => "Avalanche C-Chain",
            Blockchain::Linea => "Linea",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_lookup_is_consistent() {
        for chain in Blockchain::ALL {
            assert_eq!(Blockchain::from_chain_id(chain.chain_id()), Some(chain));
            assert!(chain.explorer_tx_url_template().contains("{hash}"));
        }
        assert_eq!(Blockchain::from_chain_id(999), None);
    }
}
