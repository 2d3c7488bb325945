//! Continuous double-auction book for one market.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::application::agents::AgentId;
use crate::domain::{OrderId, Side, TradeMarket};

/// A limit order resting on a book.
#[derive(Debug, Clone)]
pub struct LimitOrder {
    pub id: OrderId,
    pub owner: AgentId,
    pub side: Side,
    pub price: Decimal,
    /// Remaining (unfilled) quantity in base asset units.
    pub quantity: Decimal,
    /// Arrival sequence, for time priority within a price level.
    pub seq: u64,
}

/// One trade produced by matching an incoming order.
#[derive(Debug, Clone)]
pub struct Execution {
    /// Owner of the resting order that was hit.
    pub maker: AgentId,
    pub maker_order: OrderId,
    pub maker_side: Side,
    /// Execution price (the resting order's price).
    pub price: Decimal,
    pub quantity: Decimal,
}

/// Price-time order book.
///
/// An incoming order trades through the best opposite prices first, at the
/// resting order's price; any remainder rests. Settlement is the exchange's
/// concern, the book only tracks orders and the trade price.
#[derive(Debug)]
pub struct OrderBook {
    market: TradeMarket,
    /// Current trade price: the last execution, or the opening price.
    price: Decimal,
    /// Rolling history, one point per tick, most-recent last.
    price_data: Vec<Decimal>,
    bids: Vec<LimitOrder>,
    asks: Vec<LimitOrder>,
    next_seq: u64,
}

impl OrderBook {
    pub fn new(market: TradeMarket, opening_price: Decimal) -> Self {
        Self {
            market,
            price: opening_price,
            price_data: Vec::new(),
            bids: Vec::new(),
            asks: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn market(&self) -> TradeMarket {
        self.market
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn price_data(&self) -> &[Decimal] {
        &self.price_data
    }

    /// Append the current trade price to the rolling history.
    pub fn record_price(&mut self) {
        self.price_data.push(self.price);
    }

    pub fn set_price(&mut self, price: Decimal) {
        self.price = price;
    }

    pub fn best_bid(&self) -> Option<&LimitOrder> {
        best_index(&self.bids, Side::Bid).map(|i| &self.bids[i])
    }

    pub fn best_ask(&self) -> Option<&LimitOrder> {
        best_index(&self.asks, Side::Ask).map(|i| &self.asks[i])
    }

    /// Insert an order, matching it against the opposite side first.
    ///
    /// Returns the order id (valid as a cancellation target while any
    /// remainder rests) and the executions produced.
    pub fn submit(
        &mut self,
        owner: AgentId,
        side: Side,
        quantity: Decimal,
        price: Decimal,
    ) -> (OrderId, Vec<Execution>) {
        let id = Uuid::new_v4();
        let mut remaining = quantity;
        let mut executions = Vec::new();

        while remaining > Decimal::ZERO {
            let opposite = match side {
                Side::Bid => &mut self.asks,
                Side::Ask => &mut self.bids,
            };
            let Some(index) = best_index(opposite, side.opposite()) else {
                break;
            };
            let crosses = match side {
                Side::Bid => opposite[index].price <= price,
                Side::Ask => opposite[index].price >= price,
            };
            if !crosses {
                break;
            }

            let fill = remaining.min(opposite[index].quantity);
            let resting = &mut opposite[index];
            resting.quantity -= fill;
            remaining -= fill;
            self.price = resting.price;
            executions.push(Execution {
                maker: resting.owner.clone(),
                maker_order: resting.id,
                maker_side: resting.side,
                price: resting.price,
                quantity: fill,
            });
            if resting.quantity == Decimal::ZERO {
                opposite.swap_remove(index);
            }
        }

        if remaining > Decimal::ZERO {
            let seq = self.next_seq;
            self.next_seq += 1;
            let order = LimitOrder {
                id,
                owner,
                side,
                price,
                quantity: remaining,
                seq,
            };
            match side {
                Side::Bid => self.bids.push(order),
                Side::Ask => self.asks.push(order),
            }
        }

        (id, executions)
    }

    /// Remove a resting order, returning it so the caller can release its
    /// escrow. `None` if the order is no longer on the book.
    pub fn remove(&mut self, id: OrderId) -> Option<LimitOrder> {
        for orders in [&mut self.bids, &mut self.asks] {
            if let Some(index) = orders.iter().position(|o| o.id == id) {
                return Some(orders.swap_remove(index));
            }
        }
        None
    }

    /// Resting orders owned by `owner` on `side`.
    pub fn resting(&self, owner: &AgentId, side: Side) -> Vec<&LimitOrder> {
        let orders = match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        };
        orders.iter().filter(|o| &o.owner == owner).collect()
    }
}

/// Best order on one side: highest bid / lowest ask, earliest arrival
/// within a price level.
fn best_index(orders: &[LimitOrder], side: Side) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, order) in orders.iter().enumerate() {
        let better = match best {
            None => true,
            Some(b) => {
                let current = &orders[b];
                let improves = match side {
                    Side::Bid => order.price > current.price,
                    Side::Ask => order.price < current.price,
                };
                improves || (order.price == current.price && order.seq < current.seq)
            }
        };
        if better {
            best = Some(index);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn book() -> OrderBook {
        OrderBook::new(TradeMarket::TokenFiat, dec!(1))
    }

    fn agent(name: &str) -> AgentId {
        AgentId::new(name)
    }

    #[test]
    fn test_non_crossing_orders_rest() {
        let mut book = book();
        let (bid_id, execs) = book.submit(agent("a"), Side::Bid, dec!(10), dec!(0.9));
        assert!(execs.is_empty());
        let (_, execs) = book.submit(agent("b"), Side::Ask, dec!(10), dec!(1.1));
        assert!(execs.is_empty());

        assert_eq!(book.best_bid().unwrap().id, bid_id);
        assert_eq!(book.best_bid().unwrap().price, dec!(0.9));
        assert_eq!(book.best_ask().unwrap().price, dec!(1.1));
        // No trade yet: price unchanged
        assert_eq!(book.price(), dec!(1));
    }

    #[test]
    fn test_crossing_order_trades_at_resting_price() {
        let mut book = book();
        book.submit(agent("a"), Side::Ask, dec!(10), dec!(1.05));

        let (_, execs) = book.submit(agent("b"), Side::Bid, dec!(4), dec!(1.2));
        assert_eq!(execs.len(), 1);
        assert_eq!(execs[0].price, dec!(1.05));
        assert_eq!(execs[0].quantity, dec!(4));
        assert_eq!(execs[0].maker, agent("a"));
        assert_eq!(book.price(), dec!(1.05));

        // Remainder of the resting ask survives
        assert_eq!(book.best_ask().unwrap().quantity, dec!(6));
        // Taker fully filled, nothing rests on the bid side
        assert!(book.best_bid().is_none());
    }

    #[test]
    fn test_partial_fill_rests_remainder() {
        let mut book = book();
        book.submit(agent("a"), Side::Ask, dec!(3), dec!(1.0));

        let (bid_id, execs) = book.submit(agent("b"), Side::Bid, dec!(10), dec!(1.0));
        assert_eq!(execs.len(), 1);
        assert_eq!(execs[0].quantity, dec!(3));

        let resting = book.best_bid().unwrap();
        assert_eq!(resting.id, bid_id);
        assert_eq!(resting.quantity, dec!(7));
    }

    #[test]
    fn test_price_priority_then_time() {
        let mut book = book();
        book.submit(agent("a"), Side::Ask, dec!(1), dec!(1.10));
        book.submit(agent("b"), Side::Ask, dec!(1), dec!(1.05));
        book.submit(agent("c"), Side::Ask, dec!(1), dec!(1.05));

        let (_, execs) = book.submit(agent("d"), Side::Bid, dec!(2), dec!(1.10));
        let makers: Vec<_> = execs.iter().map(|e| e.maker.clone()).collect();
        // Best price first; earliest arrival within the level
        assert_eq!(makers, vec![agent("b"), agent("c")]);
    }

    #[test]
    fn test_remove_is_single_shot() {
        let mut book = book();
        let (id, _) = book.submit(agent("a"), Side::Bid, dec!(5), dec!(0.9));

        let removed = book.remove(id).unwrap();
        assert_eq!(removed.quantity, dec!(5));
        assert!(book.remove(id).is_none());
    }

    #[test]
    fn test_record_price_appends() {
        let mut book = book();
        book.record_price();
        book.set_price(dec!(1.2));
        book.record_price();
        assert_eq!(book.price_data(), &[dec!(1), dec!(1.2)]);
    }
}
