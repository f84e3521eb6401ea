//! Contract verification checks.

use crate::error::ProviderError;
use crate::REQUEST_TIMEOUT;
use async_trait::async_trait;
use claim_tracker_domain::security::is_eth_address;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Etherscan API base queried for the source verification flag.
pub const DEFAULT_ETHERSCAN_API_URL: &str = "https://api.etherscan.io/api";

/// Usage statistics attached to a contract report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractUsage {
    pub unique_addresses: u64,
    pub transaction_count: u64,
}

/// Outcome of a contract check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractReport {
    /// The input never reached the network.
    Invalid { message: String },
    /// Heuristic risk profile for a plausible contract address.
    Assessed {
        /// Source code verified on the block explorer.
        verified: bool,
        age_days: u32,
        /// 1-10 scale, 10 being highest risk.
        risk_score: u8,
        issues: Vec<String>,
        usage: ContractUsage,
    },
}

/// Security assessment of a deployed contract.
#[async_trait]
pub trait ContractVerifier: Send + Sync {
    /// Assesses the contract behind `address`.
    async fn verify(&self, address: &str) -> Result<ContractReport, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct SourceCodeResponse {
    status: String,
    result: Value,
}

#[derive(Debug, Deserialize)]
struct SourceCodeEntry {
    #[serde(rename = "SourceCode")]
    source_code: String,
}

fn parse_verified(body: &str) -> Result<bool, ProviderError> {
    let response: SourceCodeResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("source code payload: {e}")))?;
    if response.status != "1" {
        return Ok(false);
    }
    let entries: Vec<SourceCodeEntry> = serde_json::from_value(response.result)
        .map_err(|e| ProviderError::Malformed(format!("source code result: {e}")))?;
    Ok(entries.first().is_some_and(|e| !e.source_code.is_empty()))
}

/// Verifier combining local address validation, the Etherscan verified
/// flag, and a placeholder risk profile pending real static analysis.
#[derive(Clone)]
pub struct EtherscanVerifier {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl EtherscanVerifier {
    /// Builds a verifier against `api_url`; without a key the verified
    /// flag is reported as false.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(api_url: impl Into<String>, api_key: Option<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ProviderError::request)?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key,
        })
    }

    async fn source_verified(&self, address: &str, key: &str) -> Result<bool, ProviderError> {
        let url = format!(
            "{}?module=contract&action=getsourcecode&address={address}&apikey={key}",
            self.api_url
        );
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
        parse_verified(&body)
    }
}

#[async_trait]
impl ContractVerifier for EtherscanVerifier {
    async fn verify(&self, address: &str) -> Result<ContractReport, ProviderError> {
        if !is_eth_address(address) {
            return Ok(ContractReport::Invalid {
                message: "Invalid Ethereum address format".to_string(),
            });
        }

        let verified = match &self.api_key {
            Some(key) => match self.source_verified(address, key).await {
                Ok(flag) => flag,
                Err(e) => {
                    warn!(error = %e, address = %address, "verification lookup failed");
                    false
                }
            },
            None => false,
        };

        Ok(ContractReport::Assessed {
            verified,
            age_days: 120,
            risk_score: 7,
            issues: vec![
                "Medium risk: Contract is less than 6 months old".to_string(),
                "Low risk: Uses standard ERC20 implementation".to_string(),
            ],
            usage: ContractUsage {
                unique_addresses: 1500,
                transaction_count: 8500,
            },
        })
    }
}
