use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::Asset;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    #[error("insufficient {asset} balance: need {needed}, have {available}")]
    InsufficientBalance {
        asset: Asset,
        needed: Decimal,
        available: Decimal,
    },

    #[error("unknown account: {0}")]
    UnknownAccount(String),

    #[error("no market converts {0} into {1}")]
    NoLinkingMarket(Asset, Asset),
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
