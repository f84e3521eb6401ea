//! Gas price oracle backed by the Etherscan gas tracker.

use crate::error::ProviderError;
use crate::REQUEST_TIMEOUT;
use async_trait::async_trait;
use claim_tracker_domain::value_objects::GasPrices;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

/// Public gas oracle endpoint queried when `GAS_API_URL` is unset.
pub const DEFAULT_GAS_ORACLE_URL: &str =
    "https://api.etherscan.io/api?module=gastracker&action=gasoracle";

/// Source of current gas prices.
#[async_trait]
pub trait GasProvider: Send + Sync {
    /// Current prices in gwei per tier.
    async fn gas_prices(&self) -> Result<GasPrices, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct OracleResponse {
    status: String,
    // A string payload on throttled or failed calls, an object otherwise.
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OracleResult {
    #[serde(rename = "SafeGasPrice")]
    safe_gas_price: String,
    #[serde(rename = "ProposeGasPrice")]
    propose_gas_price: String,
    #[serde(rename = "FastGasPrice")]
    fast_gas_price: String,
}

fn parse_oracle_body(body: &str) -> Result<GasPrices, ProviderError> {
    let response: OracleResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("oracle payload: {e}")))?;
    if response.status != "1" {
        return Err(ProviderError::Malformed(format!(
            "oracle status {}",
            response.status
        )));
    }
    let result: OracleResult = serde_json::from_value(response.result)
        .map_err(|e| ProviderError::Malformed(format!("oracle result: {e}")))?;

    let tier = |name: &str, raw: &str| {
        raw.trim()
            .parse::<u64>()
            .map_err(|_| ProviderError::Malformed(format!("{name} price {raw:?} is not a gwei integer")))
    };
    Ok(GasPrices {
        slow: tier("safe", &result.safe_gas_price)?,
        average: tier("propose", &result.propose_gas_price)?,
        fast: tier("fast", &result.fast_gas_price)?,
    })
}

/// Gas oracle over the Etherscan gas tracker API.
///
/// Any transport, status or parse failure degrades to
/// [`GasPrices::FALLBACK`] with a warning; callers only see `Err` for
/// programming mistakes.
#[derive(Clone)]
pub struct EtherscanGasOracle {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl EtherscanGasOracle {
    /// Builds an oracle against `url`, appending `apikey` when present.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ProviderError::request)?;
        Ok(Self {
            client,
            url: url.into(),
            api_key,
        })
    }

    async fn fetch(&self) -> Result<GasPrices, ProviderError> {
        let url = match &self.api_key {
            Some(key) => format!("{}&apikey={key}", self.url),
            None => self.url.clone(),
        };
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ProviderError::request)?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }
        let body = response.text().await.map_err(ProviderError::request)?;
        parse_oracle_body(&body)
    }
}

#[async_trait]
impl GasProvider for EtherscanGasOracle {
    async fn gas_prices(&self) -> Result<GasPrices, ProviderError> {
        match self.fetch().await {
            Ok(prices) => {
                debug!(
                    slow = prices.slow,
                    average = prices.average,
                    fast = prices.fast,
                    "gas oracle answered"
                );
                Ok(prices)
            }
            Err(e) => {
                warn!(error = %e, "gas oracle unavailable, using fallback prices");
                Ok(GasPrices::FALLBACK)
            }
        }
    }
}
