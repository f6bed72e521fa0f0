pub mod admin;
pub mod market;
pub mod matching;
pub mod portfolio;
pub mod settlement;
pub mod trading;

use rust_decimal::Decimal;

use crate::models::OrderStatus;

/// Domain errors of the matching and settlement core. Every variant maps to
/// a well-defined HTTP class in `api::error`.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    #[error("Order '{0}' not found")]
    UnknownOrder(String),

    #[error("Account '{0}' not found")]
    UnknownAccount(String),

    #[error("Quantity must be a positive integer")]
    InvalidQuantity,

    #[error("LIMIT orders require a positive price with at most 2 decimal places")]
    InvalidPrice,

    #[error("Cash amounts must be non-negative with at most 2 decimal places")]
    InvalidCash,

    #[error("total_shares must be positive and float_shares must be between 0 and total_shares")]
    InvalidShares,

    #[error("Insufficient shares: have {available} available, need {required}")]
    InsufficientShares { available: i64, required: i64 },

    #[error("Insufficient funds: have {available} available, need {required}")]
    InsufficientFunds {
        available: Decimal,
        required: Decimal,
    },

    #[error("Cannot cancel order with status {0}")]
    NotCancellable(OrderStatus),

    #[error("Company with ticker '{0}' already exists")]
    DuplicateTicker(String),

    #[error("Account with id '{0}' already exists")]
    DuplicateAccount(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
