use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use crate::application::{DEFAULT_RECENT_LIMIT, LedgerConfig, LedgerService};
use crate::domain::{
    Balance, Category, Cents, Profile, ProfileUpdate, Transaction, TransactionType,
    builtin_categories, find_category, format_cents, parse_cents,
};
use crate::storage::SqliteBackend;

type Service = LedgerService<SqliteBackend>;

/// Pennywise - Income & Expense Tracker
#[derive(Parser)]
#[command(name = "pennywise")]
#[command(about = "A local-first income and expense tracker with a running balance")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "pennywise.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Start new ledgers from a zero balance instead of the demo balance
    #[arg(long, global = true)]
    pub no_seed: bool,

    /// Number of entries shown by `recent` when no count is given
    #[arg(long, global = true, default_value_t = DEFAULT_RECENT_LIMIT)]
    pub recent_limit: usize,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the ledger database
    Init,

    /// Record a new income or expense
    Add {
        /// Short label, e.g. "Groceries"
        title: String,

        /// Amount (e.g., "50.00" or "$50")
        amount: String,

        /// Transaction type: income, expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: String,

        /// Category name or id (see `categories`)
        #[arg(short, long)]
        category: Option<String>,

        /// Effective date (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// Change an existing transaction
    Update {
        /// Transaction ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        amount: Option<String>,

        /// Transaction type: income, expense
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// Category name or id; "none" clears it
        #[arg(short, long)]
        category: Option<String>,

        /// Effective date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },

    /// List all transactions, newest first
    List {
        /// Maximum number of transactions to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show the most recent transactions
    Recent {
        /// Number of transactions (defaults to --recent-limit)
        count: Option<usize>,
    },

    /// Show detailed transaction information
    Show {
        /// Transaction ID
        id: String,
    },

    /// Show the current balance
    Balance,

    /// Delete all transactions and restore the starting balance
    Reset {
        /// Required to actually reset
        #[arg(long)]
        yes: bool,
    },

    /// Verify that the balance matches the transactions
    Check,

    /// Recompute the balance from the transaction list
    Rebuild,

    /// List the built-in expense categories
    Categories,

    /// Generate reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Manage the ledger owner's profile
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Export data to CSV or JSON
    Export {
        /// Format: csv, json
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import data from CSV or JSON
    Import {
        /// Format: csv, json
        format: String,

        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Preview without importing
        #[arg(long)]
        dry_run: bool,

        /// Skip transactions whose id already exists
        #[arg(long)]
        skip_duplicates: bool,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Income against expenses
    Summary {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Expense breakdown by category
    Categories {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the stored profile
    Show,

    /// Create or replace the profile
    Set {
        name: String,
        email: String,

        /// Path or URI of a profile picture
        #[arg(long)]
        avatar: Option<String>,
    },

    /// Change some fields of the existing profile
    Update {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// New picture, or "none" to clear it
        #[arg(long)]
        avatar: Option<String>,
    },

    /// Delete the profile
    Remove,
}

impl Cli {
    fn config(&self) -> LedgerConfig {
        let config = LedgerConfig::default().with_recent_limit(self.recent_limit);
        if self.no_seed {
            config.with_seed(Balance::zero())
        } else {
            config
        }
    }

    pub async fn run(self) -> Result<()> {
        let service = LedgerService::open(&self.database, self.config())
            .await
            .with_context(|| format!("Failed to open ledger database: {}", self.database))?;

        let result = self.execute(&service).await;
        service.store().backend().close().await;
        result
    }

    async fn execute(self, service: &Service) -> Result<()> {
        service.initialize().await?;

        match self.command {
            Commands::Init => {
                println!("Ledger initialized: {}", self.database);
            }

            Commands::Add {
                title,
                amount,
                kind,
                category,
                date,
            } => {
                let title = require_title(&title)?;
                let amount = parse_amount(&amount)?;
                let kind = parse_kind(&kind)?;

                let mut txn = Transaction::new(title, amount, kind);
                if let Some(name) = category {
                    txn = txn.with_category(lookup_category(&name)?);
                }
                if let Some(date_str) = date {
                    txn = txn.with_date(parse_date(&date_str)?);
                }

                let txn = service.add(txn).await?;
                println!(
                    "Recorded {}: {} {} ({})",
                    txn.kind,
                    format_cents(txn.amount),
                    txn.title,
                    txn.id
                );
            }

            Commands::Update {
                id,
                title,
                amount,
                kind,
                category,
                date,
            } => {
                let mut txn = service.get(&id).await?;

                if let Some(title) = title {
                    txn.title = require_title(&title)?.to_string();
                }
                if let Some(amount) = amount {
                    txn.amount = parse_amount(&amount)?;
                }
                if let Some(kind) = kind {
                    txn.kind = parse_kind(&kind)?;
                }
                if let Some(name) = category {
                    txn.category = if name.eq_ignore_ascii_case("none") {
                        None
                    } else {
                        Some(lookup_category(&name)?)
                    };
                }
                if let Some(date_str) = date {
                    txn.date = parse_date(&date_str)?;
                }

                service.update(txn).await?;
                println!("Updated transaction: {}", id);
            }

            Commands::Delete { id } => {
                let removed = service.delete(&id).await?;
                println!(
                    "Deleted {}: {} {}",
                    removed.kind,
                    format_cents(removed.amount),
                    removed.title
                );
            }

            Commands::List { limit } => {
                let transactions = match limit {
                    Some(n) => service.recent(n).await,
                    None => service.list().await,
                };
                print_transactions(&transactions);
            }

            Commands::Recent { count } => {
                let transactions = match count {
                    Some(n) => service.recent(n).await,
                    None => service.recent_default().await,
                };
                print_transactions(&transactions);
            }

            Commands::Show { id } => {
                let txn = service.get(&id).await?;
                print_transaction_details(&txn);
            }

            Commands::Balance => {
                print_balance(&service.balance().await);
            }

            Commands::Reset { yes } => {
                if !yes {
                    bail!("Refusing to reset without --yes");
                }
                service.reset().await?;
                println!("Ledger reset.");
                print_balance(&service.balance().await);
            }

            Commands::Check => run_check_command(service).await?,

            Commands::Rebuild => {
                let balance = service.rebuild_balance().await?;
                println!("Balance rebuilt from transactions.");
                print_balance(&balance);
            }

            Commands::Categories => {
                println!("{:<4} {:<16} ICON", "ID", "NAME");
                println!("{}", "-".repeat(44));
                for category in builtin_categories() {
                    println!("{:<4} {:<16} {}", category.id, category.name, category.icon);
                }
            }

            Commands::Report(cmd) => run_report_command(service, cmd).await?,

            Commands::Profile(cmd) => run_profile_command(service, cmd).await?,

            Commands::Export { format, output } => {
                run_export_command(service, &format, output.as_deref()).await?
            }

            Commands::Import {
                format,
                input,
                dry_run,
                skip_duplicates,
            } => {
                run_import_command(service, &format, input.as_deref(), dry_run, skip_duplicates)
                    .await?
            }
        }

        Ok(())
    }
}

fn print_transactions(transactions: &[Transaction]) {
    if transactions.is_empty() {
        println!("No transactions found.");
        return;
    }

    println!(
        "{:<12} {:<8} {:>12} {:<15} {:<36} TITLE",
        "DATE", "TYPE", "AMOUNT", "CATEGORY", "ID"
    );
    println!("{}", "-".repeat(110));
    for txn in transactions {
        let category = txn.category.as_ref().map(|c| c.name.as_str()).unwrap_or("");
        println!(
            "{:<12} {:<8} {:>12} {:<15} {:<36} {}",
            txn.date.format("%Y-%m-%d"),
            txn.kind,
            format_cents(txn.signed_amount()),
            truncate(category, 15),
            txn.id,
            truncate(&txn.title, 30)
        );
    }
}

fn print_transaction_details(txn: &Transaction) {
    println!("Transaction: {}", txn.id);
    println!("  Title:    {}", txn.title);
    println!("  Type:     {}", txn.kind);
    println!("  Amount:   {}", format_cents(txn.amount));
    if let Some(category) = &txn.category {
        println!("  Category: {} ({})", category.name, category.id);
    }
    println!("  Date:     {}", txn.date.format("%Y-%m-%d"));
    println!(
        "  Created:  {}",
        txn.created_at.format("%Y-%m-%d %H:%M:%S")
    );
}

fn print_balance(balance: &Balance) {
    println!("{:<10} {:>14}", "Income", format_cents(balance.income));
    println!("{:<10} {:>14}", "Expense", format_cents(balance.expense));
    println!("{}", "-".repeat(25));
    println!("{:<10} {:>14}", "Total", format_cents(balance.total));
}

async fn run_check_command(service: &Service) -> Result<()> {
    println!("Checking ledger integrity...\n");

    let report = service.check_integrity().await?;

    println!(
        "Transactions: {} ({} income, {} expense)",
        report.transaction_count, report.income_count, report.expense_count
    );
    println!();
    println!("{:<10} {:>14} {:>14}", "", "CACHED", "EXPECTED");
    for (label, cached, expected) in [
        ("Income", report.cached.income, report.expected.income),
        ("Expense", report.cached.expense, report.expected.expense),
        ("Total", report.cached.total, report.expected.total),
    ] {
        let marker = if cached == expected { "" } else { "  <- mismatch" };
        println!(
            "{:<10} {:>14} {:>14}{}",
            label,
            format_cents(cached),
            format_cents(expected),
            marker
        );
    }

    if !report.duplicate_ids.is_empty() {
        println!("\nDuplicate ids: {}", report.duplicate_ids.join(", "));
    }
    if !report.negative_amounts.is_empty() {
        println!("Negative amounts: {}", report.negative_amounts.join(", "));
    }

    println!();
    if report.is_healthy() {
        println!("Ledger is consistent.");
    } else {
        println!("Ledger has problems. Run `pennywise rebuild` to recompute the balance.");
    }
    Ok(())
}

async fn run_profile_command(service: &Service, cmd: ProfileCommands) -> Result<()> {
    let profiles = service.profiles();

    match cmd {
        ProfileCommands::Show => match profiles.get().await? {
            Some(profile) => print_profile(&profile),
            None => println!("No profile set. Use `pennywise profile set <name> <email>`."),
        },

        ProfileCommands::Set {
            name,
            email,
            avatar,
        } => {
            let mut profile = Profile::new(require_name(&name)?, require_email(&email)?);
            if let Some(avatar) = avatar {
                profile = profile.with_avatar(avatar);
            }
            let profile = profiles.save(profile).await?;
            println!("Profile saved: {}", profile.id);
        }

        ProfileCommands::Update {
            name,
            email,
            avatar,
        } => {
            let mut update = ProfileUpdate::new();
            if let Some(name) = name {
                update = update.name(require_name(&name)?);
            }
            if let Some(email) = email {
                update = update.email(require_email(&email)?);
            }
            if let Some(avatar) = avatar {
                let avatar = (!avatar.eq_ignore_ascii_case("none")).then_some(avatar);
                update = update.avatar(avatar);
            }
            if update.is_empty() {
                bail!("Nothing to update. Pass --name, --email or --avatar");
            }

            let profile = profiles.update(update).await?;
            print_profile(&profile);
        }

        ProfileCommands::Remove => {
            profiles.remove().await?;
            println!("Profile removed.");
        }
    }
    Ok(())
}

fn print_profile(profile: &Profile) {
    println!("Profile: {}", profile.id);
    println!("  Name:   {}", profile.name);
    println!("  Email:  {}", profile.email);
    if let Some(avatar) = &profile.avatar {
        println!("  Avatar: {}", avatar);
    }
}

async fn run_report_command(service: &Service, cmd: ReportCommands) -> Result<()> {
    match cmd {
        ReportCommands::Summary { format } => {
            let summary = service.income_expense_summary().await;
            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
                _ => {
                    println!("Income vs Expenses ({} transactions)", summary.transaction_count);
                    println!();
                    println!("{:<10} {:>14}", "Income", format_cents(summary.income));
                    println!("{:<10} {:>14}", "Expenses", format_cents(summary.expense));
                    println!("{}", "-".repeat(25));
                    println!("{:<10} {:>14}", "Net", format_cents(summary.net));
                }
            }
        }

        ReportCommands::Categories { format } => {
            let report = service.category_breakdown().await;
            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&report)?),
                "csv" => {
                    println!("category,total,count,percentage");
                    for cat in &report.categories {
                        println!(
                            "{},{},{},{:.2}",
                            cat.category, cat.total, cat.count, cat.percentage
                        );
                    }
                }
                _ => {
                    if report.categories.is_empty() {
                        println!("No expenses recorded.");
                        return Ok(());
                    }
                    println!("{:<20} {:>12} {:>8} {:>8}", "CATEGORY", "TOTAL", "COUNT", "PERCENT");
                    println!("{}", "-".repeat(51));
                    for cat in &report.categories {
                        println!(
                            "{:<20} {:>12} {:>8} {:>7.1}%",
                            truncate(&cat.category, 20),
                            format_cents(cat.total),
                            cat.count,
                            cat.percentage
                        );
                    }
                    println!("{}", "-".repeat(51));
                    println!("{:<20} {:>12}", "TOTAL", format_cents(report.total));
                }
            }
        }
    }
    Ok(())
}

async fn run_export_command(service: &Service, format: &str, output: Option<&str>) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match format {
        "csv" => {
            let count = exporter.export_transactions_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} transactions", count);
            }
        }
        "json" => {
            let snapshot = exporter.export_json(writer).await?;
            if output.is_some() {
                eprintln!(
                    "Exported ledger: {} transactions, total {}",
                    snapshot.transactions.len(),
                    format_cents(snapshot.balance.total)
                );
            }
        }
        _ => bail!("Invalid export format '{}'. Valid formats: csv, json", format),
    }

    Ok(())
}

async fn run_import_command(
    service: &Service,
    format: &str,
    input: Option<&str>,
    dry_run: bool,
    skip_duplicates: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;
    use std::io::{Read, stdin};

    let importer = Importer::new(service);

    // Determine input reader
    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let options = ImportOptions {
        dry_run,
        skip_duplicates,
    };

    let result = match format {
        "csv" => importer.import_transactions_csv(reader, options).await?,
        "json" => importer.import_json(reader, options).await?,
        _ => bail!("Invalid import format '{}'. Valid formats: csv, json", format),
    };

    if dry_run {
        println!("Dry run complete");
    } else {
        println!("Import complete");
    }
    println!("  Imported: {}", result.imported);
    println!("  Skipped:  {}", result.skipped);
    println!("  Errors:   {}", result.errors.len());

    if !result.errors.is_empty() {
        println!("\nErrors:");
        for error in result.errors.iter().take(10) {
            println!(
                "  Line {}: {}",
                error.line,
                error
                    .field
                    .as_ref()
                    .map(|f| format!("{}: ", f))
                    .unwrap_or_default()
                    + &error.error
            );
        }
        if result.errors.len() > 10 {
            println!("  ... and {} more errors", result.errors.len() - 10);
        }
    }

    Ok(())
}

fn require_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        bail!("Title must not be empty");
    }
    Ok(title)
}

fn require_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Name must not be empty");
    }
    Ok(name)
}

fn require_email(email: &str) -> Result<&str> {
    let email = email.trim();
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && !domain.is_empty() => Ok(email),
        _ => bail!("Invalid email '{}'", email),
    }
}

fn parse_amount(input: &str) -> Result<Cents> {
    parse_cents(input).with_context(|| format!("Invalid amount '{}'. Use '50.00' or '50'", input))
}

fn parse_kind(input: &str) -> Result<TransactionType> {
    TransactionType::from_str(input).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid transaction type '{}'. Valid types: income, expense",
            input
        )
    })
}

fn lookup_category(key: &str) -> Result<Category> {
    find_category(key).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown category '{}'. Run `pennywise categories` for the list",
            key
        )
    })
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn parse_date(date_str: &str) -> Result<DateTime<Utc>> {
    // Parse YYYY-MM-DD format
    let naive_date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}'. Use YYYY-MM-DD", date_str))?;

    // Convert to UTC datetime at midnight
    let naive_datetime = naive_date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("Invalid date"))?;

    Ok(naive_datetime.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::try_parse_from([
            "pennywise", "add", "Lunch", "12.50", "--type", "expense", "--category", "food",
        ])
        .unwrap();

        match cli.command {
            Commands::Add {
                title,
                amount,
                kind,
                category,
                date,
            } => {
                assert_eq!(title, "Lunch");
                assert_eq!(amount, "12.50");
                assert_eq!(kind, "expense");
                assert_eq!(category.as_deref(), Some("food"));
                assert!(date.is_none());
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn test_config_from_flags() {
        let cli = Cli::try_parse_from(["pennywise", "--no-seed", "--recent-limit", "3", "balance"])
            .unwrap();
        let config = cli.config();

        assert_eq!(config.seed, Balance::zero());
        assert_eq!(config.recent_limit, 3);
    }

    #[test]
    fn test_input_validation() {
        assert!(require_title("   ").is_err());
        assert_eq!(require_title(" Rent ").unwrap(), "Rent");
        assert_eq!(parse_amount("$12.50").unwrap(), 1250);
        assert!(parse_amount("-3").is_err());
        assert_eq!(parse_kind("Income").unwrap(), TransactionType::Income);
        assert!(parse_kind("loan").is_err());
        assert!(lookup_category("spaceships").is_err());
    }

    #[test]
    fn test_cli_parses_profile_update() {
        let cli = Cli::try_parse_from([
            "pennywise", "profile", "update", "--email", "ada@example.com", "--avatar", "none",
        ])
        .unwrap();

        match cli.command {
            Commands::Profile(ProfileCommands::Update {
                name,
                email,
                avatar,
            }) => {
                assert!(name.is_none());
                assert_eq!(email.as_deref(), Some("ada@example.com"));
                assert_eq!(avatar.as_deref(), Some("none"));
            }
            _ => panic!("expected profile update command"),
        }
    }

    #[tokio::test]
    async fn test_failed_command_still_releases_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = dir.path().join("cli.db");
        let db = db.to_str().unwrap();

        let failing = Cli::try_parse_from(["pennywise", "--database", db, "delete", "missing"]).unwrap();
        let err = failing.run().await.unwrap_err();
        assert!(err.to_string().contains("missing"));

        let ok = Cli::try_parse_from(["pennywise", "--database", db, "add", "Tea", "3.50"]).unwrap();
        ok.run().await.unwrap();

        let service = LedgerService::open(db, LedgerConfig::default()).await.unwrap();
        assert_eq!(service.list().await.len(), 1);
    }

    #[test]
    fn test_profile_input_validation() {
        assert!(require_name("  ").is_err());
        assert_eq!(require_email(" ada@example.com ").unwrap(), "ada@example.com");
        assert!(require_email("ada").is_err());
        assert!(require_email("@example.com").is_err());
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-01-15").unwrap();
        assert_eq!(date.to_rfc3339(), "2024-01-15T00:00:00+00:00");
        assert!(parse_date("15/01/2024").is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title here", 10), "a longe...");
        assert_eq!(truncate("ééééééé", 5), "éé...");
    }
}
