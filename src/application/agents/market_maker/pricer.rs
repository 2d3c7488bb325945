//! Bid/ask price schedules for a bet.
//!
//! A bet opens with one quote anchored on each side of the current price.
//! One side then stays at its anchor for the whole bet while the other
//! walks toward it at the captured gradient, so the spread shrinks as the
//! bet ages. Note the two sign tests are deliberately different: anchor
//! selection branches on the open threshold, the per-tick schedule
//! branches on zero.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Gradients exactly on this threshold open no bet.
pub const OPEN_THRESHOLD: Decimal = dec!(0.0025);

/// Anchor prices chosen once, when a bet opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchors {
    pub bid: Decimal,
    pub ask: Decimal,
}

/// Compute the opening anchors from the current trade price and the
/// captured gradient.
///
/// Above the threshold the ask anchors on the projected end-of-bet price;
/// below it the bid does, while the ask anchors on the start price alone.
/// Returns `None` when the gradient sits exactly on the threshold.
pub fn opening_anchors(
    start_price: Decimal,
    gradient: Decimal,
    bet_length: i64,
    margin: Decimal,
) -> Option<Anchors> {
    let reach = gradient * Decimal::from(bet_length);
    if gradient > OPEN_THRESHOLD {
        Some(Anchors {
            bid: start_price * margin,
            ask: (start_price + reach) * (dec!(2) - margin),
        })
    } else if gradient < OPEN_THRESHOLD {
        Some(Anchors {
            bid: (start_price + reach) * margin,
            ask: start_price * (dec!(2) - margin),
        })
    } else {
        None
    }
}

/// Bid price `ticks_in_bet` ticks after the cooldown ended. A falling bet
/// walks its bid down from the anchor; otherwise the bid holds.
pub fn bid_price(anchor: Decimal, gradient: Decimal, ticks_in_bet: i64) -> Decimal {
    if gradient < Decimal::ZERO {
        anchor + gradient * Decimal::from(ticks_in_bet)
    } else {
        anchor
    }
}

/// Ask price `ticks_in_bet` ticks after the cooldown ended. A rising (or
/// flat) bet walks its ask up from the anchor; a falling bet holds it.
pub fn ask_price(anchor: Decimal, gradient: Decimal, ticks_in_bet: i64) -> Decimal {
    if gradient < Decimal::ZERO {
        anchor
    } else {
        anchor + gradient * Decimal::from(ticks_in_bet)
    }
}
