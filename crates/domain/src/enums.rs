use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionType {
    Supply,
    Lend,
    Liquidity,
    Stake,
    Farm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    Active,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    Gas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YieldCategory {
    Lending,
    Liquidity,
    Staking,
    Farming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    Normal,
    High,
}

impl PositionType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supply => "supply",
            Self::Lend => "lend",
            Self::Liquidity => "liquidity",
            Self::Stake => "stake",
            Self::Farm => "farm",
        }
    }

    /// Yield category this position type earns under.
    #[must_use]
    pub fn category(&self) -> YieldCategory {
        match self {
            Self::Supply | Self::Lend => YieldCategory::Lending,
            Self::Liquidity => YieldCategory::Liquidity,
            Self::Stake => YieldCategory::Staking,
            Self::Farm => YieldCategory::Farming,
        }
    }
}

impl FromStr for PositionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "supply" => Ok(Self::Supply),
            "lend" => Ok(Self::Lend),
            "liquidity" => Ok(Self::Liquidity),
            "stake" => Ok(Self::Stake),
            "farm" => Ok(Self::Farm),
            other => Err(DomainError::validation(format!(
                "unknown position type: {other}"
            ))),
        }
    }
}

impl fmt::Display for PositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PositionStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for PositionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "closed" => Ok(Self::Closed),
            other => Err(DomainError::validation(format!(
                "unknown position status: {other}"
            ))),
        }
    }
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AlertKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gas => "gas",
        }
    }
}

impl FromStr for AlertKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gas" => Ok(Self::Gas),
            other => Err(DomainError::validation(format!(
                "unknown alert kind: {other}"
            ))),
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl YieldCategory {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lending => "lending",
            Self::Liquidity => "liquidity",
            Self::Staking => "staking",
            Self::Farming => "farming",
        }
    }

    /// Position type recorded for an entry sourced from this category.
    #[must_use]
    pub fn position_type(&self) -> PositionType {
        match self {
            Self::Lending => PositionType::Lend,
            Self::Liquidity => PositionType::Liquidity,
            Self::Staking => PositionType::Stake,
            Self::Farming => PositionType::Farm,
        }
    }

    pub const ALL: [Self; 4] = [Self::Lending, Self::Liquidity, Self::Staking, Self::Farming];
}

impl FromStr for YieldCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lending" => Ok(Self::Lending),
            "liquidity" => Ok(Self::Liquidity),
            "staking" => Ok(Self::Staking),
            "farming" => Ok(Self::Farming),
            other => Err(DomainError::validation(format!(
                "unknown yield category: {other}"
            ))),
        }
    }
}

impl fmt::Display for YieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTolerance {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(DomainError::validation(format!(
                "unknown risk tolerance: {other}"
            ))),
        }
    }
}

impl FromStr for Urgency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            other => Err(DomainError::validation(format!("unknown urgency: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_type_round_trip() {
        for ty in [
            PositionType::Supply,
            PositionType::Lend,
            PositionType::Liquidity,
            PositionType::Stake,
            PositionType::Farm,
        ] {
            assert_eq!(ty.as_str().parse::<PositionType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!("open".parse::<PositionStatus>().is_err());
    }

    #[test]
    fn test_category_maps_to_position_type() {
        assert_eq!(
            YieldCategory::Farming.position_type(),
            PositionType::Farm
        );
        assert_eq!(PositionType::Supply.category(), YieldCategory::Lending);
    }
}
