// Retail Rewards - CLI
//
// Two modes, mirroring the service's two jobs:
//   import               seed customers/transactions CSVs into SQLite
//   rewards <customer>   print the 90-day reward summary as JSON

use anyhow::{bail, Result};
use chrono::Utc;
use retail_rewards::{
    count_customers, count_transactions, insert_customers, insert_transactions,
    load_customers_csv, load_transactions_csv, setup_database, RewardPolicy, RewardsError,
    RewardsService, SqliteStore,
};
use rusqlite::Connection;
use std::env;
use std::path::Path;

const DEFAULT_DB: &str = "rewards.db";
const DEFAULT_CUSTOMERS_CSV: &str = "data/customers.csv";
const DEFAULT_TRANSACTIONS_CSV: &str = "data/transactions.csv";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("import") => run_import(),
        Some("rewards") => {
            let customer_id: i64 = match args.get(2) {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid customer id: {}", raw))?,
                None => bail!("Usage: retail-rewards rewards <customer-id>"),
            };
            run_rewards(customer_id)
        }
        _ => {
            eprintln!("Usage: retail-rewards <import | rewards <customer-id>>");
            std::process::exit(2);
        }
    }
}

fn run_import() -> Result<()> {
    println!("🗄️  Retail Rewards - Seed Import (CSV → SQLite)");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let customers_path = Path::new(DEFAULT_CUSTOMERS_CSV);
    let transactions_path = Path::new(DEFAULT_TRANSACTIONS_CSV);
    let db_path = Path::new(DEFAULT_DB);

    // 1. Load CSVs
    println!("\n📂 Loading CSVs...");
    let customers = load_customers_csv(customers_path)?;
    let transactions = load_transactions_csv(transactions_path)?;
    println!(
        "✓ Loaded {} customers, {} transactions",
        customers.len(),
        transactions.len()
    );

    // 2. Setup database
    println!("\n🔧 Setting up database...");
    let conn = Connection::open(db_path)?;
    setup_database(&conn)?;
    println!("✓ Database initialized with WAL mode");

    // 3. Insert records
    println!("\n💾 Inserting records...");
    let inserted_customers = insert_customers(&conn, &customers)?;
    let inserted_transactions = insert_transactions(&conn, &transactions)?;
    println!(
        "✓ Inserted {} customers, {} transactions",
        inserted_customers, inserted_transactions
    );

    // 4. Verify counts
    println!("\n🔍 Verifying database...");
    println!("✓ Database contains {} customers", count_customers(&conn)?);
    println!(
        "✓ Database contains {} transactions",
        count_transactions(&conn)?
    );

    Ok(())
}

fn run_rewards(customer_id: i64) -> Result<()> {
    let db_path = Path::new(DEFAULT_DB);

    if !db_path.exists() {
        eprintln!("❌ Database not found at {:?}", db_path);
        eprintln!("   Run: cargo run import");
        eprintln!("   to seed customers and transactions first.");
        std::process::exit(1);
    }

    let conn = Connection::open(db_path)?;
    let service = RewardsService::new(SqliteStore::new(&conn), RewardPolicy::default());

    match service.rewards_for_customer(customer_id, Utc::now()) {
        Ok(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Err(e @ RewardsError::CustomerNotFound { .. })
        | Err(e @ RewardsError::NoRecentTransactions) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
