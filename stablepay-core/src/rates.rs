//! Token → INR conversion rates for the ledger hand-off.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("no INR rate configured for {0}")]
    UnknownSymbol(String),
    #[error("rate request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("rate response did not contain an INR price for {0}")]
    MissingPrice(String),
    #[error("invalid rate URL: {0}")]
    Url(#[from] url::ParseError),
}

#[async_trait]
pub trait FiatRateSource: Send + Sync {
    /// Price of one unit of `symbol` in INR.
    async fn inr_rate(&self, symbol: &str) -> Result<Decimal, RateError>;
}

/// INR value of `amount` at `rate`, rounded half-up to paise.
pub fn to_inr(amount: Decimal, rate: Decimal) -> Decimal {
    (amount * rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Fixed, operator-configured rates. Symbols match case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct StaticRates {
    rates: HashMap<String, Decimal>,
}

impl StaticRates {
    pub fn new<I, S>(rates: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: AsRef<str>,
    {
        Self {
            rates: rates
                .into_iter()
                .map(|(symbol, rate)| (symbol.as_ref().to_uppercase(), rate))
                .collect(),
        }
    }
}

#[async_trait]
impl FiatRateSource for StaticRates {
    async fn inr_rate(&self, symbol: &str) -> Result<Decimal, RateError> {
        self.rates
            .get(&symbol.to_uppercase())
            .copied()
            .ok_or_else(|| RateError::UnknownSymbol(symbol.to_string()))
    }
}

pub const COINGECKO_API: &str = "https://api.coingecko.com";

/// Live rates from CoinGecko's simple price endpoint.
#[derive(Debug, Clone)]
pub struct CoinGeckoRates {
    http: reqwest::Client,
    base_url: Url,
    /// Upper-cased token symbol → CoinGecko coin id.
    ids: HashMap<String, String>,
}

impl CoinGeckoRates {
    pub fn new<I, S>(base_url: Url, ids: I) -> Result<Self, RateError>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()?;
        Ok(Self {
            http,
            base_url,
            ids: ids
                .into_iter()
                .map(|(symbol, id)| (symbol.as_ref().to_uppercase(), id.as_ref().to_string()))
                .collect(),
        })
    }
}

#[async_trait]
impl FiatRateSource for CoinGeckoRates {
    async fn inr_rate(&self, symbol: &str) -> Result<Decimal, RateError> {
        let id = self
            .ids
            .get(&symbol.to_uppercase())
            .ok_or_else(|| RateError::UnknownSymbol(symbol.to_string()))?;
        let url = self.base_url.join("/api/v3/simple/price")?;
        let prices: HashMap<String, HashMap<String, Decimal>> = self
            .http
            .get(url)
            .query(&[("ids", id.as_str()), ("vs_currencies", "inr")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let rate = prices
            .get(id)
            .and_then(|p| p.get("inr"))
            .copied()
            .ok_or_else(|| RateError::MissingPrice(symbol.to_string()))?;
        debug!(symbol, id = %id, rate = %rate, "fetched INR rate");
        Ok(rate)
    }
}
