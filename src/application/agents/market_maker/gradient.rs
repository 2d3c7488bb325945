//! Short-term trend signal from a market's price history.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Estimate the price trend from the rolling history: the difference of
/// the last two points, halved.
///
/// A cheap proxy for trend direction and magnitude, not a true
/// moving-average slope. With fewer than two points there is no signal
/// and the caller must not act.
pub fn price_gradient(price_data: &[Decimal]) -> Option<Decimal> {
    if price_data.len() < 2 {
        return None;
    }
    let last = price_data[price_data.len() - 1];
    let previous = price_data[price_data.len() - 2];
    Some((last - previous) / dec!(2))
}
