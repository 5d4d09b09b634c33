// SQLite data layer - customers and transactions
//
// The core never mutates these records: they are loaded from seed CSVs,
// inserted once, and read back for reward computation.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Retail customer as supplied by the source system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: i64,
    pub customer_name: String,
}

/// A single purchase transaction
///
/// Immutable once read. `transaction_date` is a fixed unambiguous instant
/// (stored as RFC 3339 UTC text); `amount` is a non-negative currency value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: i64,
    pub customer_id: i64,
    pub transaction_date: DateTime<Utc>,
    pub amount: f64,
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS customers (
            customer_id INTEGER PRIMARY KEY,
            customer_name TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            transaction_id INTEGER PRIMARY KEY,
            customer_id INTEGER NOT NULL,
            transaction_date TEXT NOT NULL,
            amount REAL NOT NULL,
            FOREIGN KEY (customer_id) REFERENCES customers(customer_id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tx_customer_date
         ON transactions(customer_id, transaction_date)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// CSV IMPORT
// ============================================================================

pub fn load_customers_csv(csv_path: &Path) -> Result<Vec<Customer>> {
    let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open customers CSV")?;

    let mut customers = Vec::new();
    for result in rdr.deserialize() {
        let customer: Customer = result.context("Failed to deserialize customer row")?;
        customers.push(customer);
    }

    Ok(customers)
}

pub fn load_transactions_csv(csv_path: &Path) -> Result<Vec<Transaction>> {
    let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open transactions CSV")?;

    let mut transactions = Vec::new();
    for result in rdr.deserialize() {
        let transaction: Transaction = result.context("Failed to deserialize transaction row")?;
        transactions.push(transaction);
    }

    Ok(transactions)
}

/// Insert customers, skipping rows whose primary key already exists.
/// Returns the number actually inserted.
pub fn insert_customers(conn: &Connection, customers: &[Customer]) -> Result<usize> {
    let mut inserted = 0;
    let mut duplicates = 0;

    for customer in customers {
        let result = conn.execute(
            "INSERT INTO customers (customer_id, customer_name) VALUES (?1, ?2)",
            params![customer.customer_id, customer.customer_name],
        );

        match result {
            Ok(_) => inserted += 1,
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if duplicates > 0 {
        log::warn!("Skipped {} duplicate customers", duplicates);
    }

    Ok(inserted)
}

/// Insert transactions, skipping duplicate primary keys.
/// Returns the number actually inserted.
pub fn insert_transactions(conn: &Connection, transactions: &[Transaction]) -> Result<usize> {
    let mut inserted = 0;
    let mut duplicates = 0;

    for tx in transactions {
        let result = conn.execute(
            "INSERT INTO transactions (transaction_id, customer_id, transaction_date, amount)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                tx.transaction_id,
                tx.customer_id,
                tx.transaction_date.to_rfc3339(),
                tx.amount,
            ],
        );

        match result {
            Ok(_) => inserted += 1,
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if duplicates > 0 {
        log::warn!("Skipped {} duplicate transactions", duplicates);
    }

    Ok(inserted)
}

// ============================================================================
// QUERIES
// ============================================================================

/// Look up a customer by identifier. `None` when no row matches.
pub fn find_customer(conn: &Connection, customer_id: i64) -> rusqlite::Result<Option<Customer>> {
    let mut stmt =
        conn.prepare("SELECT customer_id, customer_name FROM customers WHERE customer_id = ?1")?;

    let mut rows = stmt.query_map(params![customer_id], |row| {
        Ok(Customer {
            customer_id: row.get(0)?,
            customer_name: row.get(1)?,
        })
    })?;

    rows.next().transpose()
}

/// All transactions for one customer dated at or after the cutoff instant.
///
/// RFC 3339 UTC text compares lexicographically in date order, so the
/// restriction happens in SQL; chronological sorting is the aggregator's job.
pub fn transactions_since(
    conn: &Connection,
    customer_id: i64,
    cutoff: DateTime<Utc>,
) -> rusqlite::Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT transaction_id, customer_id, transaction_date, amount
         FROM transactions
         WHERE customer_id = ?1 AND transaction_date >= ?2",
    )?;

    let transactions = stmt
        .query_map(params![customer_id, cutoff.to_rfc3339()], |row| {
            let date_str: String = row.get(2)?;
            let transaction_date = DateTime::parse_from_rfc3339(&date_str)
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        2,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?
                .with_timezone(&Utc);

            Ok(Transaction {
                transaction_id: row.get(0)?,
                customer_id: row.get(1)?,
                transaction_date,
                amount: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(transactions)
}

pub fn count_customers(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;

    Ok(count)
}

pub fn count_transactions(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;

    Ok(count)
}

// ============================================================================
// TESTS
// ============================================================================
