//! Admin flows: company and account creation, listings, full reset.
//!
//! Accounts are credentialed with a one-time API key; only its SHA-256 hex
//! digest is stored. Companies may optionally be IPO-seeded: the float goes
//! to the reserved treasury account, which rests a single SELL LIMIT order
//! at the IPO price.

use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{trading, ExchangeError};
use crate::db::{is_unique_violation, Database};
use crate::models::{
    Account, AccountCreate, AccountResponse, Company, CompanyCreate, Order, OrderSide, OrderStatus,
    OrderType,
};
use crate::money;

/// Reserved account backing IPO issuance. It has no usable API key.
pub const TREASURY_ACCOUNT_ID: &str = "treasury";

pub fn generate_api_key() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    format!("sk_{}", hex::encode(bytes))
}

pub fn hash_api_key(api_key: &str) -> String {
    hex::encode(Sha256::digest(api_key.as_bytes()))
}

pub async fn create_company(
    db: &Database,
    data: CompanyCreate,
) -> Result<Company, ExchangeError> {
    if data.total_shares <= 0 || data.float_shares < 0 || data.float_shares > data.total_shares {
        return Err(ExchangeError::InvalidShares);
    }
    let ipo_price_cents = match data.ipo_price {
        Some(price) => Some(
            money::cents_from_decimal(price)
                .filter(|cents| *cents > 0)
                .ok_or(ExchangeError::InvalidPrice)?,
        ),
        None => None,
    };

    let company = Company {
        ticker: data.ticker.to_uppercase(),
        name: data.name,
        total_shares: data.total_shares,
        float_shares: data.float_shares,
    };

    let _guard = db.lock_writes().await;
    let mut tx = db.pool().begin().await?;

    sqlx::query("INSERT INTO companies (ticker, name, total_shares, float_shares) VALUES (?, ?, ?, ?)")
        .bind(&company.ticker)
        .bind(&company.name)
        .bind(company.total_shares)
        .bind(company.float_shares)
        .execute(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ExchangeError::DuplicateTicker(company.ticker.clone())
            } else {
                err.into()
            }
        })?;

    if let Some(ipo_price_cents) = ipo_price_cents {
        if company.float_shares > 0 {
            seed_ipo(&mut tx, &company, ipo_price_cents).await?;
        }
    }

    tx.commit().await?;

    tracing::info!(ticker = %company.ticker, name = %company.name, "company created");
    Ok(company)
}

/// Grant the float to the treasury and rest it as one ask at the IPO price.
async fn seed_ipo(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    company: &Company,
    ipo_price_cents: i64,
) -> Result<(), ExchangeError> {
    // The treasury credential is minted and immediately discarded.
    sqlx::query(
        "INSERT OR IGNORE INTO accounts (id, api_key_hash, cash_balance_cents, created_at) VALUES (?, ?, 0, ?)",
    )
    .bind(TREASURY_ACCOUNT_ID)
    .bind(hash_api_key(&generate_api_key()))
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        "INSERT INTO holdings (account_id, ticker, quantity, cost_basis_cents) VALUES (?, ?, ?, 0)",
    )
    .bind(TREASURY_ACCOUNT_ID)
    .bind(&company.ticker)
    .bind(company.float_shares)
    .execute(&mut **tx)
    .await?;

    let ask = Order {
        id: Uuid::new_v4().to_string(),
        account_id: TREASURY_ACCOUNT_ID.to_string(),
        ticker: company.ticker.clone(),
        side: OrderSide::Sell,
        order_type: OrderType::Limit,
        price_cents: Some(ipo_price_cents),
        quantity: company.float_shares,
        remaining_quantity: company.float_shares,
        status: OrderStatus::Open,
        timestamp: Utc::now(),
    };
    trading::insert_order(tx, &ask).await?;

    tracing::info!(
        ticker = %company.ticker,
        float_shares = company.float_shares,
        ipo_price = %money::decimal_from_cents(ipo_price_cents),
        "ipo float issued to treasury"
    );
    Ok(())
}

pub async fn list_companies(db: &Database) -> Result<Vec<Company>, ExchangeError> {
    let companies = sqlx::query_as("SELECT * FROM companies ORDER BY ticker")
        .fetch_all(db.pool())
        .await?;
    Ok(companies)
}

/// Create a trader account. The returned response is the only time the API
/// key is ever visible.
pub async fn create_account(
    db: &Database,
    data: AccountCreate,
) -> Result<AccountResponse, ExchangeError> {
    let initial_cash_cents = match data.initial_cash {
        Some(cash) => money::cents_from_decimal(cash)
            .filter(|cents| *cents >= 0)
            .ok_or(ExchangeError::InvalidCash)?,
        None => 0,
    };

    let api_key = generate_api_key();
    let account = Account {
        id: data.account_id,
        api_key_hash: hash_api_key(&api_key),
        cash_balance_cents: initial_cash_cents,
        created_at: Utc::now(),
    };

    let _guard = db.lock_writes().await;
    sqlx::query(
        "INSERT INTO accounts (id, api_key_hash, cash_balance_cents, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&account.id)
    .bind(&account.api_key_hash)
    .bind(account.cash_balance_cents)
    .bind(account.created_at)
    .execute(db.pool())
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            ExchangeError::DuplicateAccount(account.id.clone())
        } else {
            err.into()
        }
    })?;

    tracing::info!(account_id = %account.id, "account created");

    Ok(AccountResponse {
        account_id: account.id,
        cash_balance: money::decimal_from_cents(account.cash_balance_cents),
        api_key,
        created_at: account.created_at,
    })
}

pub async fn list_accounts(db: &Database) -> Result<Vec<Account>, ExchangeError> {
    let accounts = sqlx::query_as("SELECT * FROM accounts ORDER BY created_at")
        .fetch_all(db.pool())
        .await?;
    Ok(accounts)
}

/// Clear and recreate every table.
pub async fn reset(db: &Database) -> Result<(), ExchangeError> {
    db.reset().await?;
    tracing::warn!("exchange state reset");
    Ok(())
}
