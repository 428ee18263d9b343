use std::{error::Error, io::Write, path::PathBuf, sync::Arc};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{
    DatabasePersistence, EngineError, LocalObjectStorage, RecordStore, Transaction,
    TransactionDraft,
    accounts::{Accounts, Registration},
    ledger,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "karadmin_admin")]
#[command(about = "Admin utilities for KarAdmin (accounts, ledger, stored files)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./karadmin.db?mode=rwc"
    )]
    database_url: String,

    /// Directory holding the attachment buckets.
    #[arg(long, env = "KARADMIN_STORAGE_ROOT", default_value = "storage")]
    storage_root: PathBuf,

    /// Base of public attachment URLs.
    #[arg(
        long,
        env = "KARADMIN_PUBLIC_BASE_URL",
        default_value = "http://127.0.0.1:3000"
    )]
    public_base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Ledger(Ledger),
    Storage(Storage),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct Ledger {
    #[command(subcommand)]
    command: LedgerCommand,
}

#[derive(Subcommand, Debug)]
enum LedgerCommand {
    /// Print income, expense and balance.
    Summary(MonthArgs),
    /// Write transactions as CSV.
    Export(ExportArgs),
    /// Record a transaction.
    Add(LedgerAddArgs),
}

#[derive(Args, Debug)]
struct MonthArgs {
    /// `YYYY-MM`; every month when omitted.
    #[arg(long)]
    month: Option<String>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    month: MonthArgs,
    /// Output file; standard output when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct LedgerAddArgs {
    /// `YYYY-MM-DD`
    #[arg(long)]
    date: String,
    /// `income` or `expense`
    #[arg(long)]
    category: String,
    /// Decimal amount, e.g. `150000,50`
    #[arg(long)]
    amount: String,
    #[arg(long)]
    description: String,
}

#[derive(Args, Debug)]
struct Storage {
    #[command(subcommand)]
    command: StorageCommand,
}

#[derive(Subcommand, Debug)]
enum StorageCommand {
    /// List stored files no record points at.
    Orphans(OrphansArgs),
}

#[derive(Args, Debug)]
struct OrphansArgs {
    /// Delete the files instead of only listing them.
    #[arg(long)]
    prune: bool,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

/// Asks for a password and its confirmation until they form a valid
/// registration.
fn prompt_registration(email: &str) -> Result<Registration, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let registration = Registration {
            email: email.to_string(),
            password: prompt_password("Password: ")?,
            confirm_password: prompt_password("Confirm password: ")?,
        };

        match registration.validate() {
            Ok(()) => return Ok(registration),
            Err(EngineError::Validation(reason)) => {
                execute!(
                    out,
                    cursor::MoveToColumn(0),
                    terminal::Clear(ClearType::CurrentLine),
                    Print(format!("{reason}. Try again.\r\n"))
                )?;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn record_store(
    cli: &Cli,
    db: DatabaseConnection,
) -> Result<RecordStore, Box<dyn Error + Send + Sync>> {
    Ok(RecordStore::builder()
        .persistence(Arc::new(DatabasePersistence::new(db)))
        .storage(Arc::new(LocalObjectStorage::new(
            &cli.storage_root,
            cli.public_base_url.clone(),
        )))
        .build()?)
}

async fn month_transactions(
    store: &RecordStore,
    month: Option<&str>,
) -> Result<Vec<Transaction>, Box<dyn Error + Send + Sync>> {
    let month = ledger::parse_month(month.unwrap_or_default())?;
    let transactions: Vec<Transaction> = store.list(None).await?;
    Ok(
        ledger::filter_by_month(&transactions, month.as_deref().unwrap_or_default())
            .into_iter()
            .cloned()
            .collect(),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match &cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let registration = prompt_registration(&args.email)?;

            match Accounts::new(db).register(&registration).await {
                Ok(()) => println!("created user: {}", args.email),
                Err(EngineError::Conflict(_)) => {
                    eprintln!("user already exists: {}", args.email);
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Ledger(Ledger { command }) => {
            let store = record_store(&cli, db)?;
            match command {
                LedgerCommand::Summary(args) => {
                    let transactions = month_transactions(&store, args.month.as_deref()).await?;
                    let summary = ledger::summarize(&transactions);
                    println!("period:  {}", args.month.as_deref().unwrap_or("all"));
                    println!("income:  {}", summary.income);
                    println!("expense: {}", summary.expense);
                    println!("balance: {}", summary.balance);
                }
                LedgerCommand::Export(args) => {
                    let transactions =
                        month_transactions(&store, args.month.month.as_deref()).await?;
                    match &args.output {
                        Some(path) => {
                            let file = std::fs::File::create(path)?;
                            ledger::write_csv(&transactions, file)?;
                            eprintln!(
                                "exported {} transactions to {}",
                                transactions.len(),
                                path.display()
                            );
                        }
                        None => ledger::write_csv(&transactions, std::io::stdout().lock())?,
                    }
                }
                LedgerCommand::Add(args) => {
                    let draft = TransactionDraft::parse(
                        &args.date,
                        &args.category,
                        &args.amount,
                        &args.description,
                    )?;
                    let created: Transaction = store.create(draft, None).await?;
                    println!(
                        "recorded {} {} on {} ({})",
                        created.category, created.amount_minor, created.date, created.id
                    );
                }
            }
        }
        Command::Storage(Storage {
            command: StorageCommand::Orphans(args),
        }) => {
            let store = record_store(&cli, db)?;
            let orphans = if args.prune {
                store.prune_orphans().await?
            } else {
                store.orphaned_objects().await?
            };

            for orphan in &orphans {
                println!("{}/{}", orphan.bucket, orphan.path);
            }
            let verb = if args.prune { "removed" } else { "found" };
            eprintln!("{verb} {} orphaned files", orphans.len());
        }
    }

    Ok(())
}
