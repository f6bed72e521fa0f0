use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::money;

/// A trader account. The API key itself is never stored, only its SHA-256
/// digest; cash cannot go negative.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: String,
    pub api_key_hash: String,
    pub cash_balance_cents: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountCreate {
    pub account_id: String,
    pub initial_cash: Option<Decimal>,
}

/// Returned exactly once, at creation: the only time the API key is visible.
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub account_id: String,
    pub cash_balance: Decimal,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
}

/// Authenticated self-view; identical shape to the admin listing entry.
#[derive(Debug, Clone, Serialize)]
pub struct AccountInfoResponse {
    pub account_id: String,
    pub cash_balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountInfoResponse {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.id,
            cash_balance: money::decimal_from_cents(account.cash_balance_cents),
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountListItem {
    pub account_id: String,
    pub cash_balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountListItem {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.id,
            cash_balance: money::decimal_from_cents(account.cash_balance_cents),
            created_at: account.created_at,
        }
    }
}
