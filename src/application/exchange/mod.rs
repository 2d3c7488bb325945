//! The exchange: order books, accounts, and fee-inclusive order operations.
//!
//! Agents interact with the exchange through a narrow surface: price and
//! price-history queries, balance queries, fee-inclusive bid/ask placement
//! returning cancellable handles, and immediate market conversions.

mod book;
mod error;
mod wallet;

pub use book::{Execution, LimitOrder, OrderBook};
pub use error::{ExchangeError, Result};
pub use wallet::Wallet;

use std::collections::HashMap;

use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::application::agents::AgentId;
use crate::domain::{Asset, OrderHandle, Side, TradeMarket};

/// Exchange-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Flat fee rate skimmed from every placement and conversion.
    pub fee_rate: Decimal,
    /// Opening trade price per book.
    pub token_fiat_price: Decimal,
    pub stable_fiat_price: Decimal,
    pub token_stable_price: Decimal,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            fee_rate: dec!(0.002),
            token_fiat_price: dec!(1),
            stable_fiat_price: dec!(1),
            token_stable_price: dec!(1),
        }
    }
}

impl ExchangeConfig {
    /// Disable fees (mostly for tests).
    pub fn without_fees(mut self) -> Self {
        self.fee_rate = Decimal::ZERO;
        self
    }

    fn opening_price(&self, market: TradeMarket) -> Decimal {
        match market {
            TradeMarket::TokenFiat => self.token_fiat_price,
            TradeMarket::StableFiat => self.stable_fiat_price,
            TradeMarket::TokenStable => self.token_stable_price,
        }
    }
}

/// The simulated exchange: three books plus per-agent wallets.
///
/// Every operation is synchronous and completes before it returns; the
/// simulation steps agents one at a time, so no locking is involved.
pub struct Exchange {
    fee_rate: Decimal,
    books: HashMap<TradeMarket, OrderBook>,
    wallets: HashMap<AgentId, Wallet>,
    total_trades: u64,
    volume: HashMap<TradeMarket, Decimal>,
}

impl Exchange {
    pub fn new(config: ExchangeConfig) -> Self {
        let books = TradeMarket::ALL
            .into_iter()
            .map(|market| (market, OrderBook::new(market, config.opening_price(market))))
            .collect();
        Self {
            fee_rate: config.fee_rate,
            books,
            wallets: HashMap::new(),
            total_trades: 0,
            volume: HashMap::new(),
        }
    }

    /// Register an account with its starting balances.
    pub fn open_account(&mut self, id: AgentId, wallet: Wallet) {
        self.wallets.insert(id, wallet);
    }

    /// Current trade price of a market.
    pub fn price(&self, market: TradeMarket) -> Decimal {
        self.book(market).price()
    }

    /// Rolling price history of a market, most-recent last.
    pub fn price_history(&self, market: TradeMarket) -> &[Decimal] {
        self.book(market).price_data()
    }

    /// Spendable balance of `asset` for `agent` (zero for unknown accounts).
    pub fn available(&self, agent: &AgentId, asset: Asset) -> Decimal {
        self.wallets
            .get(agent)
            .map(|w| w.available(asset))
            .unwrap_or(Decimal::ZERO)
    }

    pub fn total_trades(&self) -> u64 {
        self.total_trades
    }

    /// Base-asset quantity traded on a market so far.
    pub fn traded_volume(&self, market: TradeMarket) -> Decimal {
        self.volume.get(&market).copied().unwrap_or(Decimal::ZERO)
    }

    /// Resting orders owned by `agent` on `market`, bids then asks.
    pub fn resting_orders(
        &self,
        agent: &AgentId,
        market: TradeMarket,
    ) -> (Vec<&LimitOrder>, Vec<&LimitOrder>) {
        let book = self.book(market);
        (book.resting(agent, Side::Bid), book.resting(agent, Side::Ask))
    }

    /// Overwrite a book's current trade price (simulation drivers only).
    pub fn set_price(&mut self, market: TradeMarket, price: Decimal) {
        self.book_mut(market).set_price(price);
    }

    /// Append each book's closing price to its history. Called by the
    /// runner once per tick.
    pub fn record_prices(&mut self) {
        for market in TradeMarket::ALL {
            self.book_mut(market).record_price();
        }
    }

    /// Place a buy order. The full cost (`quantity * price`) is escrowed
    /// up front and the fee is skimmed from it, so the resting quantity is
    /// slightly below the requested one.
    pub fn place_bid_with_fee(
        &mut self,
        agent: &AgentId,
        market: TradeMarket,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<OrderHandle> {
        self.place_order(agent, market, Side::Bid, quantity, price)
    }

    /// Place a sell order. The quantity is escrowed up front and the fee
    /// is skimmed from it.
    pub fn place_ask_with_fee(
        &mut self,
        agent: &AgentId,
        market: TradeMarket,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<OrderHandle> {
        self.place_order(agent, market, Side::Ask, quantity, price)
    }

    /// Cancel a resting order and refund its remaining escrow. Idempotent:
    /// cancelling an already-gone order returns `false` with no effect.
    pub fn cancel(&mut self, handle: &OrderHandle) -> bool {
        let Some(order) = self.book_mut(handle.market).remove(handle.id) else {
            return false;
        };
        let refund_asset = match handle.side {
            Side::Bid => handle.market.quote(),
            Side::Ask => handle.market.base(),
        };
        let refund = match handle.side {
            Side::Bid => order.quantity * order.price,
            Side::Ask => order.quantity,
        };
        self.credit(&order.owner, refund_asset, refund);
        debug!(
            "cancelled {:?} {} on {} (refund {refund} {refund_asset})",
            handle.side, handle.id, handle.market
        );
        true
    }

    /// Immediately convert `quantity` of `from` into `into` at the linking
    /// market's current price, fee skimmed from the proceeds. Returns the
    /// net proceeds.
    pub fn market_sell_with_fee(
        &mut self,
        agent: &AgentId,
        from: Asset,
        into: Asset,
        quantity: Decimal,
    ) -> Result<Decimal> {
        if quantity <= Decimal::ZERO {
            return Err(ExchangeError::InvalidOrder(format!(
                "non-positive quantity {quantity}"
            )));
        }
        let (market, from_is_base) = TradeMarket::linking(from, into)
            .ok_or(ExchangeError::NoLinkingMarket(from, into))?;
        let price = self.price(market);
        if price <= Decimal::ZERO {
            return Err(ExchangeError::InvalidOrder(format!(
                "no usable price on {market}"
            )));
        }

        let wallet = self
            .wallets
            .get_mut(agent)
            .ok_or_else(|| ExchangeError::UnknownAccount(agent.to_string()))?;
        wallet.withdraw(from, quantity)?;

        let gross = if from_is_base {
            quantity * price
        } else {
            quantity / price
        };
        let proceeds = gross * (Decimal::ONE - self.fee_rate);
        self.credit(agent, into, proceeds);
        debug!("{agent}: converted {quantity} {from} into {proceeds} {into}");
        Ok(proceeds)
    }

    fn place_order(
        &mut self,
        agent: &AgentId,
        market: TradeMarket,
        side: Side,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<OrderHandle> {
        if price <= Decimal::ZERO {
            return Err(ExchangeError::InvalidOrder(format!(
                "non-positive price {price}"
            )));
        }
        if quantity <= Decimal::ZERO {
            return Err(ExchangeError::InvalidOrder(format!(
                "non-positive quantity {quantity}"
            )));
        }
        if !self.wallets.contains_key(agent) {
            return Err(ExchangeError::UnknownAccount(agent.to_string()));
        }

        // Escrow the committed amount, fee included.
        let net_quantity = match side {
            Side::Bid => {
                let cost = quantity * price;
                self.debit(agent, market.quote(), cost)?;
                let fee = cost * self.fee_rate;
                (cost - fee) / price
            }
            Side::Ask => {
                self.debit(agent, market.base(), quantity)?;
                quantity * (Decimal::ONE - self.fee_rate)
            }
        };

        let (id, executions) = self
            .book_mut(market)
            .submit(agent.clone(), side, net_quantity, price);
        debug!(
            "{agent}: placed {side:?} {net_quantity} @ {price} on {market} ({} fills)",
            executions.len()
        );
        for execution in &executions {
            self.settle(market, execution, agent, side, price);
        }

        Ok(OrderHandle { id, market, side })
    }

    /// Settle one execution: the taker trades at the resting order's
    /// price, so an aggressing bid gets its price improvement back.
    fn settle(
        &mut self,
        market: TradeMarket,
        execution: &Execution,
        taker: &AgentId,
        taker_side: Side,
        taker_limit: Decimal,
    ) {
        let quantity = execution.quantity;
        let notional = quantity * execution.price;
        match taker_side {
            Side::Bid => {
                self.credit(taker, market.base(), quantity);
                self.credit(
                    taker,
                    market.quote(),
                    quantity * (taker_limit - execution.price),
                );
                self.credit(&execution.maker, market.quote(), notional);
            }
            Side::Ask => {
                self.credit(taker, market.quote(), notional);
                self.credit(&execution.maker, market.base(), quantity);
            }
        }
        self.total_trades += 1;
        *self.volume.entry(market).or_insert(Decimal::ZERO) += quantity;
    }

    fn credit(&mut self, agent: &AgentId, asset: Asset, amount: Decimal) {
        match self.wallets.get_mut(agent) {
            Some(wallet) => wallet.deposit(asset, amount),
            None => warn!("credit of {amount} {asset} to unknown account {agent}"),
        }
    }

    fn debit(&mut self, agent: &AgentId, asset: Asset, amount: Decimal) -> Result<()> {
        let wallet = self
            .wallets
            .get_mut(agent)
            .ok_or_else(|| ExchangeError::UnknownAccount(agent.to_string()))?;
        wallet.withdraw(asset, amount)
    }

    fn book(&self, market: TradeMarket) -> &OrderBook {
        &self.books[&market]
    }

    fn book_mut(&mut self, market: TradeMarket) -> &mut OrderBook {
        self.books.get_mut(&market).expect("book exists per market")
    }
}
