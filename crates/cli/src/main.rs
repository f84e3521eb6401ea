//! Command Line Interface for the DeFi Claim Tracker.
use anyhow::{Context, Result};
use claim_tracker_api::ApiServer;
use claim_tracker_data::Database;
use claim_tracker_domain::entities::{PositionId, User};
use claim_tracker_domain::enums::{AlertKind, Urgency, YieldCategory};
use claim_tracker_domain::metrics::tx_cost::REFERENCE_ETH_PRICE_USD;
use claim_tracker_domain::metrics::{estimate_transaction_cost, recommend_gas_strategy};
use claim_tracker_execution::{
    register_wallet, AppContext, Engine, IntakeReply, PositionIntake, SchedulerConfig,
};
use claim_tracker_protocols::{
    ContractReport, ContractVerifier, EtherscanGasOracle, EtherscanVerifier, GasProvider, LogSink,
    NotificationSink, RestCalendar, StaticYieldCatalog, TelegramSink, DEFAULT_CALENDAR_API_URL,
    DEFAULT_ETHERSCAN_API_URL, DEFAULT_GAS_ORACLE_URL,
};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use prettytable::{row, Table};
use rust_decimal::Decimal;
use std::env;
use std::sync::Arc;

/// Gas limit of a plain ETH transfer, the reference transaction for cost
/// estimates.
const TRANSFER_GAS_LIMIT: u64 = 21_000;

#[derive(Parser)]
#[command(name = "claim-tracker")]
#[command(about = "Yield claim tracking, calendar sync and gas alerting CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server and the background scheduler
    Run,
    /// Show current gas prices with transfer cost estimates
    Gas {
        /// Transaction urgency: low, normal or high
        #[arg(short, long, default_value = "normal")]
        urgency: String,
    },
    /// Register a user by chat platform id
    AddUser {
        /// Numeric platform id the chat layer would supply
        #[arg(long)]
        platform_id: i64,

        /// Display name
        #[arg(short, long)]
        name: String,
    },
    /// Attach a wallet address to a user
    AddWallet {
        /// Platform id of the owning user
        #[arg(long)]
        user: i64,

        /// Ethereum address (0x...)
        #[arg(short, long)]
        address: String,
    },
    /// Record a yield position and schedule its claim reminder
    AddPosition {
        /// Platform id of the owning user
        #[arg(long)]
        user: i64,

        /// Protocol name (e.g., Aave)
        #[arg(short, long)]
        protocol: String,

        /// Amount and asset (e.g., "100 USDC")
        #[arg(long)]
        amount: String,
    },
    /// Close a position and remove its calendar event
    ClosePosition {
        /// Position id
        #[arg(long)]
        id: i64,
    },
    /// Show active positions, totals and the next claim for a user
    Portfolio {
        /// Platform id of the user
        #[arg(long)]
        user: i64,
    },
    /// List claims due within a window
    UpcomingClaims {
        /// Platform id of the user
        #[arg(long)]
        user: i64,

        /// Days ahead to include
        #[arg(short, long, default_value_t = 30)]
        days: i64,
    },
    /// Reconcile calendar events for all active positions of a user
    SyncCalendar {
        /// Platform id of the user
        #[arg(long)]
        user: i64,
    },
    /// Subscribe a user to an alert
    SetAlert {
        /// Platform id of the user
        #[arg(long)]
        user: i64,

        /// Alert kind (gas)
        #[arg(default_value = "gas")]
        kind: String,
    },
    /// Remove an alert subscription
    ClearAlert {
        /// Platform id of the user
        #[arg(long)]
        user: i64,

        /// Alert kind (gas)
        #[arg(default_value = "gas")]
        kind: String,
    },
    /// Assess a contract address before interacting with it
    Security {
        /// Contract address (0x...)
        #[arg(short, long)]
        address: String,
    },
    /// List yield opportunities from the catalog
    Yields {
        /// Filter: lending, liquidity, staking or farming
        #[arg(short, long)]
        category: Option<String>,
    },
}

/// Environment-backed settings, read once at startup.
struct Config {
    database_path: String,
    gas_api_url: String,
    etherscan_api_key: Option<String>,
    calendar_api_url: String,
    calendar_api_token: Option<String>,
    telegram_token: Option<String>,
    port: u16,
    bind_address: String,
}

impl Config {
    fn from_env() -> Self {
        Self {
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "claim_tracker.db".to_string()),
            gas_api_url: env::var("GAS_API_URL")
                .unwrap_or_else(|_| DEFAULT_GAS_ORACLE_URL.to_string()),
            etherscan_api_key: env::var("ETHERSCAN_API_KEY").ok(),
            calendar_api_url: env::var("CALENDAR_API_URL")
                .unwrap_or_else(|_| DEFAULT_CALENDAR_API_URL.to_string()),
            calendar_api_token: env::var("CALENDAR_API_TOKEN").ok(),
            telegram_token: env::var("TELEGRAM_TOKEN").ok(),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string()),
        }
    }
}

/// Wires providers from the config. The contract verifier is only attached
/// when an Etherscan key is present; the other providers degrade internally.
fn build_context(cfg: &Config, db: Database) -> Result<AppContext> {
    let gas = Arc::new(EtherscanGasOracle::new(
        &cfg.gas_api_url,
        cfg.etherscan_api_key.clone(),
    )?);
    let calendar = Arc::new(RestCalendar::new(
        &cfg.calendar_api_url,
        cfg.calendar_api_token.clone(),
    )?);
    let notifier: Arc<dyn NotificationSink> = match &cfg.telegram_token {
        Some(token) => Arc::new(TelegramSink::new(token)?),
        None => Arc::new(LogSink),
    };
    let verifier: Option<Arc<dyn ContractVerifier>> = match &cfg.etherscan_api_key {
        Some(_) => Some(Arc::new(EtherscanVerifier::new(
            DEFAULT_ETHERSCAN_API_URL,
            cfg.etherscan_api_key.clone(),
        )?)),
        None => None,
    };

    Ok(AppContext {
        db,
        gas,
        calendar,
        notifier,
        verifier,
        config: SchedulerConfig::default(),
    })
}

async fn resolve_user(db: &Database, platform_id: i64) -> Result<User> {
    db.users()
        .find_by_platform_id(platform_id)
        .await?
        .with_context(|| format!("no user with platform id {platform_id}; run add-user first"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::from_env();

    match &cli.command {
        Commands::Run => {
            println!("🚀 Starting DeFi Claim Tracker...");
            let db = Database::connect(&cfg.database_path).await?;
            let ctx = build_context(&cfg, db)?;

            let engine = Engine::new(ctx);
            let server = ApiServer::new(cfg.bind_address.clone(), cfg.port);

            // The server resolves on Ctrl-C; the engine runs until dropped.
            tokio::select! {
                () = engine.run() => {}
                result = server.serve() => result?,
            }
            println!("👋 Shutdown complete");
        }
        Commands::Gas { urgency } => {
            let urgency: Urgency = urgency.parse()?;

            println!("📡 Fetching gas prices...");
            let oracle =
                EtherscanGasOracle::new(&cfg.gas_api_url, cfg.etherscan_api_key.clone())?;
            let prices = oracle.gas_prices().await?;

            let eth_price = Decimal::from(REFERENCE_ETH_PRICE_USD);
            let mut table = Table::new();
            table.set_titles(row!["Tier", "Gwei", "Transfer (ETH)", "Transfer (USD)"]);
            for (label, gwei) in [
                ("🐢 Slow (~10 min)", prices.slow),
                ("🚶 Average (~3 min)", prices.average),
                ("🏎️ Fast (~30 sec)", prices.fast),
            ] {
                let cost = estimate_transaction_cost(TRANSFER_GAS_LIMIT, gwei, eth_price);
                table.add_row(row![
                    label,
                    gwei,
                    format!("{:.6}", cost.eth),
                    format!("${:.2}", cost.usd),
                ]);
            }
            table.printstd();

            // One-shot invocation has no price history, so no optimal-hour
            // note; history accumulates only inside the running engine.
            let rec = recommend_gas_strategy(prices, urgency, &[]);
            println!("✅ {} ({} gwei)", rec.message, rec.recommended_gwei);
            if let Some(warning) = rec.warning {
                println!("⚠️ {warning}");
            }
            if let Some(note) = rec.optimal_time {
                println!("💡 {note}");
            }
        }
        Commands::AddUser { platform_id, name } => {
            let db = Database::connect(&cfg.database_path).await?;
            let user = db.users().upsert_by_platform_id(*platform_id, name).await?;
            println!("✅ User {} registered (id {})", user.display_name, user.id.0);
        }
        Commands::AddWallet { user, address } => {
            let db = Database::connect(&cfg.database_path).await?;
            let account = resolve_user(&db, *user).await?;
            let wallet = register_wallet(&db.wallets(), account.id, address).await?;
            println!(
                "✅ Wallet {} saved for {}",
                wallet.address, account.display_name
            );
        }
        Commands::AddPosition {
            user,
            protocol,
            amount,
        } => {
            let db = Database::connect(&cfg.database_path).await?;
            let ctx = build_context(&cfg, db.clone())?;
            let account = resolve_user(&db, *user).await?;

            let mut intake = PositionIntake::new(
                account.id,
                db.positions(),
                ctx.reconciler(),
                StaticYieldCatalog::entries(),
            );
            for input in [protocol.as_str(), amount.as_str(), "yes"] {
                match intake.step(input).await {
                    IntakeReply::Prompt(_) => {}
                    IntakeReply::Retry(message) => anyhow::bail!(message),
                    IntakeReply::Created {
                        position,
                        calendar_synced,
                    } => {
                        println!(
                            "✅ Position {} recorded: {} {} on {}",
                            position.id.0, position.amount, position.asset, position.protocol
                        );
                        if calendar_synced {
                            println!("📅 Claim reminder added to the calendar");
                        } else {
                            println!("⚠️ Calendar sync failed; the scheduler will retry");
                        }
                    }
                    IntakeReply::Cancelled => println!("❌ Cancelled"),
                    IntakeReply::Failed(message) => anyhow::bail!(message),
                }
            }
        }
        Commands::ClosePosition { id } => {
            let db = Database::connect(&cfg.database_path).await?;
            let ctx = build_context(&cfg, db.clone())?;

            let position_id = PositionId(*id);
            let Some(position) = db.positions().find(position_id).await? else {
                anyhow::bail!("position {id} not found");
            };

            // Release first: if the calendar is unreachable the position
            // stays active and the command can be retried.
            ctx.reconciler().release(&position).await?;
            db.positions().close(position_id).await?;
            println!("✅ Position {id} closed and its reminder removed");
        }
        Commands::Portfolio { user } => {
            let db = Database::connect(&cfg.database_path).await?;
            let ctx = build_context(&cfg, db.clone())?;
            let account = resolve_user(&db, *user).await?;

            let positions = db.positions().list_active(account.id).await?;
            if positions.is_empty() {
                println!("No active positions. Use add-position to record one.");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_titles(row!["Id", "Protocol", "Asset", "Amount", "Type", "APY", "Opened"]);
            let mut total = Decimal::ZERO;
            for position in &positions {
                total += position.amount;
                table.add_row(row![
                    position.id.0,
                    position.protocol,
                    position.asset,
                    position.amount,
                    position.position_type,
                    position
                        .apy
                        .map_or_else(|| "-".to_string(), |apy| format!("{apy}%")),
                    position.start_date.format("%Y-%m-%d"),
                ]);
            }
            table.printstd();
            println!(
                "📊 {} active positions, {} total deposited",
                positions.len(),
                total
            );

            let claims = ctx.reconciler().upcoming_claims(account.id, 7).await?;
            match claims.iter().min_by_key(|c| c.days_until) {
                Some(claim) => println!(
                    "⏰ Next claim: {} {} on {} (in {} days)",
                    claim.protocol, claim.asset, claim.claim_date, claim.days_until
                ),
                None => println!("⏰ No claims scheduled within 7 days."),
            }
        }
        Commands::UpcomingClaims { user, days } => {
            let db = Database::connect(&cfg.database_path).await?;
            let ctx = build_context(&cfg, db.clone())?;
            let account = resolve_user(&db, *user).await?;

            let mut claims = ctx.reconciler().upcoming_claims(account.id, *days).await?;
            if claims.is_empty() {
                println!("No claims within the next {days} days.");
                return Ok(());
            }
            claims.sort_by_key(|c| c.days_until);

            let mut table = Table::new();
            table.set_titles(row!["Position", "Protocol", "Asset", "Amount", "Claim date", "In"]);
            for claim in &claims {
                table.add_row(row![
                    claim.position_id.0,
                    claim.protocol,
                    claim.asset,
                    claim.amount,
                    claim.claim_date,
                    format!("{} days", claim.days_until),
                ]);
            }
            table.printstd();
        }
        Commands::SyncCalendar { user } => {
            let db = Database::connect(&cfg.database_path).await?;
            let ctx = build_context(&cfg, db.clone())?;
            let account = resolve_user(&db, *user).await?;

            println!("🔄 Reconciling calendar events...");
            let report = ctx.reconciler().reconcile_all(account.id).await?;
            println!("✅ {} events in sync", report.synced);
            for (position_id, error) in &report.failed {
                println!("❌ Position {}: {}", position_id.0, error);
            }
        }
        Commands::SetAlert { user, kind } => {
            let kind: AlertKind = kind.parse()?;
            let db = Database::connect(&cfg.database_path).await?;
            let account = resolve_user(&db, *user).await?;

            db.alerts().upsert(account.id, kind, "{}").await?;
            println!("✅ {} alerts enabled for {}", kind, account.display_name);
        }
        Commands::ClearAlert { user, kind } => {
            let kind: AlertKind = kind.parse()?;
            let db = Database::connect(&cfg.database_path).await?;
            let account = resolve_user(&db, *user).await?;

            db.alerts().deactivate(account.id, kind).await?;
            println!("✅ {} alerts disabled for {}", kind, account.display_name);
        }
        Commands::Security { address } => {
            println!("🔍 Assessing {address}...");
            let verifier =
                EtherscanVerifier::new(DEFAULT_ETHERSCAN_API_URL, cfg.etherscan_api_key.clone())?;
            match verifier.verify(address).await? {
                ContractReport::Invalid { message } => println!("❌ {message}"),
                ContractReport::Assessed {
                    verified,
                    age_days,
                    risk_score,
                    issues,
                    usage,
                } => {
                    println!("Verified source: {}", if verified { "yes" } else { "no" });
                    println!("Estimated age:   {age_days} days");
                    println!("Risk score:      {risk_score}/10");
                    println!("Unique users:    {}", usage.unique_addresses);
                    println!("Transactions:    {}", usage.transaction_count);
                    if issues.is_empty() {
                        println!("✅ No issues flagged");
                    } else {
                        for issue in &issues {
                            println!("⚠️ {issue}");
                        }
                    }
                }
            }
        }
        Commands::Yields { category } => {
            let filter: Option<YieldCategory> = category.as_deref().map(str::parse).transpose()?;

            let mut table = Table::new();
            table.set_titles(row!["Protocol", "Asset", "APY", "Category"]);
            for entry in StaticYieldCatalog::entries() {
                if let Some(wanted) = &filter
                    && entry.category != *wanted
                {
                    continue;
                }
                table.add_row(row![
                    entry.protocol,
                    entry.asset,
                    format!("{}%", entry.apy),
                    entry.category,
                ]);
            }
            table.printstd();
        }
    }

    Ok(())
}
