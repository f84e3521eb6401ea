use crate::enums::Urgency;
use crate::value_objects::gas::{GasPrices, GasSample};
use chrono::Timelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sample count at which an estimate is reported with medium confidence.
pub const MEDIUM_CONFIDENCE_SAMPLES: usize = 12;

/// Average-tier price above which a wait warning is attached.
pub const HIGH_GAS_WARNING_GWEI: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
}

/// Cheapest hour of day derived from gas history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GasHourEstimate {
    /// No history to work from.
    InsufficientData,
    Estimate {
        /// Hour of day, UTC, 0-23.
        best_hour: u32,
        /// Human label, e.g. "3 AM".
        best_time: String,
        /// Mean average-tier price for that hour.
        average_price: Decimal,
        confidence: Confidence,
        recommendation: String,
    },
}

/// Groups history by UTC hour of day and picks the hour with the lowest
/// mean average-tier price. Confidence stays low until
/// `MEDIUM_CONFIDENCE_SAMPLES` observations have accumulated.
#[must_use]
pub fn optimal_gas_hour(history: &[GasSample]) -> GasHourEstimate {
    if history.is_empty() {
        return GasHourEstimate::InsufficientData;
    }

    let mut by_hour: [(u64, u64); 24] = [(0, 0); 24];
    for sample in history {
        let hour = sample.at.hour() as usize;
        by_hour[hour].0 += sample.prices.average;
        by_hour[hour].1 += 1;
    }

    let mut best_hour = 0u32;
    let mut best_mean = Decimal::MAX;
    for (hour, (sum, count)) in by_hour.iter().enumerate() {
        if *count == 0 {
            continue;
        }
        let mean = Decimal::from(*sum) / Decimal::from(*count);
        if mean < best_mean {
            best_mean = mean;
            best_hour = hour as u32;
        }
    }

    let best_time = format_hour_12(best_hour);
    let confidence = if history.len() < MEDIUM_CONFIDENCE_SAMPLES {
        Confidence::Low
    } else {
        Confidence::Medium
    };

    GasHourEstimate::Estimate {
        best_hour,
        best_time: best_time.clone(),
        average_price: best_mean,
        confidence,
        recommendation: format!(
            "Based on historical data, gas prices are typically lowest around {best_time} UTC"
        ),
    }
}

/// Gas tier recommendation for a transaction at a given urgency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasRecommendation {
    pub recommended_gwei: u64,
    pub message: String,
    /// Present when current prices are unusually high.
    pub warning: Option<String>,
    /// Cheapest-hour note when history supports one.
    pub optimal_time: Option<String>,
}

/// Maps urgency to a price tier and annotates with the optimal-hour note.
#[must_use]
pub fn recommend_gas_strategy(
    prices: GasPrices,
    urgency: Urgency,
    history: &[GasSample],
) -> GasRecommendation {
    let (recommended_gwei, message) = match urgency {
        Urgency::High => (prices.fast, "Using fast gas price for urgent transaction"),
        Urgency::Low => (prices.slow, "Using slow gas price to minimize costs"),
        Urgency::Normal => (
            prices.average,
            "Using average gas price for standard transaction",
        ),
    };

    let warning = (prices.average > HIGH_GAS_WARNING_GWEI).then(|| {
        "Gas prices are unusually high right now. Consider waiting if possible.".to_string()
    });

    let optimal_time = match optimal_gas_hour(history) {
        GasHourEstimate::Estimate { recommendation, .. } => Some(recommendation),
        GasHourEstimate::InsufficientData => None,
    };

    GasRecommendation {
        recommended_gwei,
        message: message.to_string(),
        warning,
        optimal_time,
    }
}

fn format_hour_12(hour: u32) -> String {
    match hour {
        0 => "12 AM".to_string(),
        h if h < 12 => format!("{h} AM"),
        12 => "12 PM".to_string(),
        h => format!("{} PM", h - 12),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn sample(hour: u32, average: u64) -> GasSample {
        GasSample::new(
            Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0).unwrap(),
            GasPrices::new(average.saturating_sub(10), average, average + 10),
        )
    }

    #[test]
    fn test_empty_history_is_insufficient() {
        assert_eq!(optimal_gas_hour(&[]), GasHourEstimate::InsufficientData);
    }

    #[test]
    fn test_picks_cheapest_hour() {
        let history = vec![sample(3, 20), sample(3, 30), sample(15, 60), sample(15, 80)];
        let estimate = optimal_gas_hour(&history);
        if let GasHourEstimate::Estimate {
            best_hour,
            best_time,
            average_price,
            confidence,
            ..
        } = estimate
        {
            assert_eq!(best_hour, 3);
            assert_eq!(best_time, "3 AM");
            assert_eq!(average_price, dec!(25));
            assert_eq!(confidence, Confidence::Low);
        } else {
            panic!("expected an estimate");
        }
    }

    #[test]
    fn test_confidence_rises_at_twelve_samples() {
        let history: Vec<GasSample> = (0..12).map(|i| sample(i % 24, 40)).collect();
        if let GasHourEstimate::Estimate { confidence, .. } = optimal_gas_hour(&history) {
            assert_eq!(confidence, Confidence::Medium);
        } else {
            panic!("expected an estimate");
        }
    }

    #[test]
    fn test_hour_formatting() {
        assert_eq!(format_hour_12(0), "12 AM");
        assert_eq!(format_hour_12(11), "11 AM");
        assert_eq!(format_hour_12(12), "12 PM");
        assert_eq!(format_hour_12(23), "11 PM");
    }

    #[test]
    fn test_urgency_maps_to_tier() {
        let prices = GasPrices::new(20, 40, 70);
        assert_eq!(
            recommend_gas_strategy(prices, Urgency::High, &[]).recommended_gwei,
            70
        );
        assert_eq!(
            recommend_gas_strategy(prices, Urgency::Low, &[]).recommended_gwei,
            20
        );
        let normal = recommend_gas_strategy(prices, Urgency::Normal, &[]);
        assert_eq!(normal.recommended_gwei, 40);
        assert!(normal.warning.is_none());
        assert!(normal.optimal_time.is_none());
    }

    #[test]
    fn test_high_prices_carry_warning() {
        let prices = GasPrices::new(90, 120, 150);
        let rec = recommend_gas_strategy(prices, Urgency::Normal, &[]);
        assert!(rec.warning.is_some());
    }
}
