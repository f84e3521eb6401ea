use serde::{Deserialize, Serialize};
use std::fmt;

/// Domains known to impersonate popular DeFi frontends.
const SUSPICIOUS_DOMAINS: &[&str] = &[
    "etherdelta.one",
    "myetherwallet.com.ru",
    "metamask.io.ph",
    "uniswap.org.io",
    "aave-app.com",
];

/// Contracts safe to grant allowances to.
const KNOWN_SAFE_SPENDERS: &[&str] = &[
    // Uniswap V2 router
    "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D",
    // Uniswap V3 router
    "0xE592427A0AEce92De3Edee1F18E0157C05861564",
    // Compound comptroller
    "0x3d9819210A31b4961b30EF54bE2aeD79B9c9Cd3B",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a phishing check against the known-bad domain list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhishingVerdict {
    pub is_phishing: bool,
    pub confidence: RiskLevel,
    pub reason: String,
}

/// Risk assessment for granting a token allowance to a spender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRisk {
    pub level: RiskLevel,
    pub recommendation: String,
    pub unlimited_approval_warning: String,
}

/// Checks a URL against the known phishing domain list.
#[must_use]
pub fn check_phishing(url: &str) -> PhishingVerdict {
    for domain in SUSPICIOUS_DOMAINS {
        if url.contains(domain) {
            return PhishingVerdict {
                is_phishing: true,
                confidence: RiskLevel::High,
                reason: format!("Domain {domain} is a known phishing site"),
            };
        }
    }
    PhishingVerdict {
        is_phishing: false,
        confidence: RiskLevel::Medium,
        reason: "No known phishing indicators found".to_string(),
    }
}

/// Assesses the risk of approving a spender contract.
///
/// Well-known router and comptroller contracts rate low, everything else
/// medium with a suggestion to cap the allowance.
#[must_use]
pub fn approval_risk(spender: &str) -> ApprovalRisk {
    let known = KNOWN_SAFE_SPENDERS
        .iter()
        .any(|safe| safe.eq_ignore_ascii_case(spender));
    let (level, recommendation) = if known {
        (RiskLevel::Low, "This is a well-known protocol contract")
    } else {
        (
            RiskLevel::Medium,
            "Consider using a limited approval amount instead of unlimited",
        )
    };
    ApprovalRisk {
        level,
        recommendation: recommendation.to_string(),
        unlimited_approval_warning: "High - allows spender to transfer all tokens at any time"
            .to_string(),
    }
}

/// Returns true for a `0x`-prefixed 40-hex-digit Ethereum address.
#[must_use]
pub fn is_eth_address(s: &str) -> bool {
    s.strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_phishing_domain_flagged() {
        let verdict = check_phishing("https://uniswap.org.io/swap");
        assert!(verdict.is_phishing);
        assert_eq!(verdict.confidence, RiskLevel::High);
        assert!(verdict.reason.contains("uniswap.org.io"));
    }

    #[test]
    fn test_clean_url_passes() {
        let verdict = check_phishing("https://app.uniswap.org/swap");
        assert!(!verdict.is_phishing);
        assert_eq!(verdict.confidence, RiskLevel::Medium);
    }

    #[test]
    fn test_known_spender_rates_low() {
        let risk = approval_risk("0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D");
        assert_eq!(risk.level, RiskLevel::Low);
    }

    #[test]
    fn test_spender_comparison_ignores_case() {
        let risk = approval_risk("0X7A250D5630B4CF539739DF2C5DACB4C659F2488D");
        assert_eq!(risk.level, RiskLevel::Low);
    }

    #[test]
    fn test_unknown_spender_rates_medium() {
        let risk = approval_risk("0x1111111111111111111111111111111111111111");
        assert_eq!(risk.level, RiskLevel::Medium);
        assert!(risk.recommendation.contains("limited approval"));
    }

    #[test]
    fn test_eth_address_validation() {
        assert!(is_eth_address("0x6B175474E89094C44Da98b954EedeAC495271d0F"));
        assert!(!is_eth_address("6B175474E89094C44Da98b954EedeAC495271d0F"));
        assert!(!is_eth_address("0x6B175474E89094C44Da98b954EedeAC495271d0"));
        assert!(!is_eth_address("0x6B175474E89094C44Da98b954EedeAC495271d0G"));
        assert!(!is_eth_address(""));
    }
}
