//! Order identifiers and handles shared between the books and the agents.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TradeMarket;

/// Unique identifier for an order.
pub type OrderId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

/// Handle to an order its owner may later cancel through the exchange.
///
/// The handle stays valid after the order fills or is cancelled; further
/// cancels through it are no-ops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHandle {
    pub id: OrderId,
    pub market: TradeMarket,
    pub side: Side,
}
