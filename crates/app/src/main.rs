use std::{
    error::Error,
    path::{Path, PathBuf},
};

use chrono::{Datelike, Utc};
use clap::{Args, Parser, Subcommand};
use ledger::{Engine, MemoryStore, MoneyCents, PaymentType, SettlementCmd, Snapshot};
use serde::Serialize;
use uuid::Uuid;

mod settings;

#[derive(Parser, Debug)]
#[command(name = "smartsplit")]
#[command(about = "Who owes whom, computed from a JSON snapshot of shared expenses")]
struct Cli {
    /// Settings file (also read from `SMARTSPLIT_CONFIG`).
    #[arg(long, env = "SMARTSPLIT_CONFIG")]
    config: Option<String>,

    /// JSON snapshot; overrides `ledger.snapshot` from the settings.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// One-to-one balance between two users.
    Balance {
        #[arg(long)]
        me: String,
        #[arg(long)]
        other: String,
    },
    /// What a user owes and is owed across one-to-one balances.
    Summary {
        #[arg(long)]
        me: String,
    },
    /// Who owes whom inside a group.
    Group {
        #[arg(long)]
        group_id: Uuid,
        #[arg(long)]
        me: String,
    },
    CanDeleteGroup {
        #[arg(long)]
        group_id: Uuid,
    },
    /// Check a settlement and print payer, receiver and amount.
    ResolveSettlement(SettleArgs),
    /// Record a settlement and save the snapshot.
    Settle(SettleArgs),
    UserGroups {
        #[arg(long)]
        me: String,
    },
    Contacts {
        #[arg(long)]
        me: String,
    },
    Spending {
        #[arg(long)]
        me: String,
        /// Defaults to the current year.
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        monthly: bool,
    },
    /// Users with outstanding debts.
    Reminders,
}

#[derive(Args, Debug)]
struct SettleArgs {
    #[arg(long)]
    me: String,
    #[arg(long)]
    counterpart: String,
    /// Settle inside a group instead of the one-to-one balance.
    #[arg(long)]
    group_id: Option<Uuid>,
    /// `you-paid` or `they-paid`.
    #[arg(long, value_parser = parse_payment_type)]
    payment_type: PaymentType,
    #[arg(long)]
    amount: MoneyCents,
    #[arg(long)]
    note: Option<String>,
    /// Lower the amount to the outstanding balance instead of failing.
    #[arg(long)]
    allow_clamp: bool,
}

impl SettleArgs {
    fn into_cmd(self) -> SettlementCmd {
        let mut cmd = SettlementCmd::new(
            self.me,
            self.counterpart,
            self.payment_type,
            self.amount,
            Utc::now(),
        )
        .allow_clamp(self.allow_clamp);
        if let Some(group_id) = self.group_id {
            cmd = cmd.group_id(group_id);
        }
        if let Some(note) = self.note {
            cmd = cmd.note(note);
        }
        cmd
    }
}

fn parse_payment_type(raw: &str) -> Result<PaymentType, String> {
    PaymentType::try_from(raw).map_err(|err| err.reason().to_string())
}

fn load_snapshot(path: &Path) -> Result<Snapshot, Box<dyn Error + Send + Sync>> {
    let raw = std::fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&raw)?;
    tracing::info!(
        path = %path.display(),
        users = snapshot.users.len(),
        groups = snapshot.groups.len(),
        expenses = snapshot.expenses.len(),
        settlements = snapshot.settlements.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}

fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), Box<dyn Error + Send + Sync>> {
    std::fs::write(path, serde_json::to_string_pretty(snapshot)?)?;
    tracing::info!(path = %path.display(), "snapshot saved");
    Ok(())
}

fn print<T: Serialize>(value: &T) -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "smartsplit={level},ledger={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let snapshot_path = cli
        .snapshot
        .or_else(|| settings.ledger.snapshot.as_ref().map(PathBuf::from))
        .ok_or("no snapshot given: pass --snapshot or set ledger.snapshot")?;

    let engine = Engine::builder()
        .store(MemoryStore::new(load_snapshot(&snapshot_path)?))
        .threshold(settings.threshold())
        .build()?;

    match cli.command {
        Command::Balance { me, other } => print(&engine.pairwise_balance(&me, &other)?)?,
        Command::Summary { me } => print(&engine.user_balance_summary(&me)?)?,
        Command::Group { group_id, me } => print(&engine.group_ledger(group_id, &me)?)?,
        Command::CanDeleteGroup { group_id } => print(&engine.can_delete_group(group_id)?)?,
        Command::ResolveSettlement(args) => {
            print(&engine.resolve_settlement(&args.into_cmd())?)?;
        }
        Command::Settle(args) => {
            let notice = engine.create_settlement(args.into_cmd())?;
            save_snapshot(&snapshot_path, &engine.store().snapshot()?)?;
            print(&notice)?;
        }
        Command::UserGroups { me } => print(&engine.user_groups(&me)?)?,
        Command::Contacts { me } => print(&engine.contacts(&me)?)?,
        Command::Spending { me, year, monthly } => {
            let year = year.unwrap_or_else(|| Utc::now().year());
            if monthly {
                print(&engine.monthly_spending(&me, year)?)?;
            } else {
                print(&engine.total_spent(&me, year)?)?;
            }
        }
        Command::Reminders => print(&engine.outstanding_debts()?)?,
    }

    Ok(())
}
