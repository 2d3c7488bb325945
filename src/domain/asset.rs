//! Assets and markets of the simulated exchange.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three balances an account can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    /// Outside currency.
    Fiat,
    /// The volatile collateral asset.
    Token,
    /// The pegged asset.
    Stable,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Asset::Fiat => "fiat",
            Asset::Token => "token",
            Asset::Stable => "stable",
        };
        write!(f, "{name}")
    }
}

/// The three order books of the simulated exchange.
///
/// Each market trades its base asset against its quote asset; the third
/// asset is the leftover a market maker sweeps back into quote every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeMarket {
    /// Token priced in fiat.
    TokenFiat,
    /// Stable priced in fiat.
    StableFiat,
    /// Token priced in stable.
    TokenStable,
}

impl TradeMarket {
    pub const ALL: [TradeMarket; 3] = [
        TradeMarket::TokenFiat,
        TradeMarket::StableFiat,
        TradeMarket::TokenStable,
    ];

    /// Asset sold by asks on this market.
    pub fn base(self) -> Asset {
        match self {
            TradeMarket::TokenFiat => Asset::Token,
            TradeMarket::StableFiat => Asset::Stable,
            TradeMarket::TokenStable => Asset::Token,
        }
    }

    /// Asset spent by bids on this market.
    pub fn quote(self) -> Asset {
        match self {
            TradeMarket::TokenFiat => Asset::Fiat,
            TradeMarket::StableFiat => Asset::Fiat,
            TradeMarket::TokenStable => Asset::Stable,
        }
    }

    /// The asset this market does not trade.
    pub fn leftover(self) -> Asset {
        match self {
            TradeMarket::TokenFiat => Asset::Stable,
            TradeMarket::StableFiat => Asset::Token,
            TradeMarket::TokenStable => Asset::Fiat,
        }
    }

    /// Find the market that converts `from` into `into`, and whether
    /// `from` is that market's base asset.
    pub fn linking(from: Asset, into: Asset) -> Option<(TradeMarket, bool)> {
        Self::ALL.iter().find_map(|&market| {
            if market.base() == from && market.quote() == into {
                Some((market, true))
            } else if market.quote() == from && market.base() == into {
                Some((market, false))
            } else {
                None
            }
        })
    }
}

impl fmt::Display for TradeMarket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TradeMarket::TokenFiat => "token/fiat",
            TradeMarket::StableFiat => "stable/fiat",
            TradeMarket::TokenStable => "token/stable",
        };
        write!(f, "{name}")
    }
}
