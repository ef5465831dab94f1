use clap::{Parser, Subcommand};

use crate::config::{mask_password, Config};
use crate::AppState;

#[derive(Parser)]
#[command(name = "wager-core")]
#[command(about = "Wager Core - balance ledger for a wagering platform", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Account inspection commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Configuration validation
    Config,
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Print an account with its recent transactions and wagers
    Show {
        #[arg(value_name = "ACCOUNT_ID")]
        account_id: String,

        /// Number of audit records of each kind to print
        #[arg(short, long, default_value_t = 10)]
        limit: i64,
    },
}

pub async fn handle_db_migrate(config: &Config) -> anyhow::Result<()> {
    let Some(database_url) = &config.database_url else {
        anyhow::bail!("DATABASE_URL must be set to run migrations");
    };

    let pool = crate::db::create_pool(database_url).await?;
    tracing::info!("Running database migrations...");
    crate::db::run_migrations(&pool).await?;

    println!("✓ Database migrations completed");
    Ok(())
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  Server Port: {}", config.server_port);
    match &config.database_url {
        Some(url) => println!("  Database URL: {}", mask_password(url)),
        None => println!("  Database URL: (unset, in-memory ledger)"),
    }
    match &config.redis_url {
        Some(url) => println!("  Redis URL: {}", mask_password(url)),
        None => println!("  Redis URL: (unset, in-memory idempotency cache)"),
    }
    match &config.cors_allowed_origins {
        Some(origins) => println!("  CORS Origins: {}", origins.join(", ")),
        None => println!("  CORS Origins: *"),
    }
    println!("  Log Request Body: {}", config.log_request_body);
    println!("  ID Generation Attempts: {}", config.id_generation_attempts);
    println!("  Balance Retry Attempts: {}", config.balance_retry_attempts);

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");

    Ok(())
}

/// Reads from the configured database; an in-memory ledger would always be
/// empty here.
pub async fn handle_account_show(config: &Config, account_id: &str, limit: i64) -> anyhow::Result<()> {
    if config.database_url.is_none() {
        anyhow::bail!("DATABASE_URL must be set to inspect accounts");
    }

    let state = crate::build_state(config).await?;
    print_account_report(&state, account_id, limit).await
}

pub async fn print_account_report(state: &AppState, account_id: &str, limit: i64) -> anyhow::Result<()> {
    let account = state.registry.lookup(account_id).await?;
    let transactions = state
        .store
        .list_transactions(account_id, limit, 0)
        .await?;
    let wagers = state.store.list_wagers(account_id, limit, 0).await?;

    println!("Account {}", account.account_id);
    println!("  Name:    {}", account.display_name);
    println!("  Contact: {}", account.contact_number);
    println!("  Balance: {}", account.balance);
    println!("  Created: {}", account.created_at.format("%Y-%m-%d %H:%M:%S"));

    println!("\nTransactions:");
    println!("{:<12} {:<10} {:<10} {:<10} {:<20}", "Kind", "Requested", "Net", "Status", "Timestamp");
    println!("{}", "-".repeat(66));
    for tx in transactions {
        println!(
            "{:<12} {:<10} {:<10} {:<10} {:<20}",
            tx.kind.as_str(),
            tx.requested_amount,
            tx.net_amount,
            tx.status.as_str(),
            tx.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    println!("\nWagers:");
    println!("{:<16} {:<8} {:<8} {:<8} {:<20}", "Game", "Bet", "Outcome", "Payout", "Timestamp");
    println!("{}", "-".repeat(64));
    for wager in wagers {
        println!(
            "{:<16} {:<8} {:<8} {:<8} {:<20}",
            wager.game_label,
            wager.bet_amount,
            wager.outcome.as_str(),
            wager.payout,
            wager.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    Ok(())
}
