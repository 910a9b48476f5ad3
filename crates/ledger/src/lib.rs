//! Debt ledger engine.
//!
//! Given the expenses and settlements recorded between users, computes who
//! owes whom: one-to-one balances, per-group debtor × creditor matrices and
//! the direction a settlement must take. Balances are never stored; every
//! query folds them from a consistent [`Snapshot`] read through a
//! [`LedgerStore`].

pub use commands::{ExpenseCmd, GroupCmd, SettlementCmd, SplitsInput};
pub use error::LedgerError;
pub use expenses::{DEFAULT_CATEGORY, Expense, Split, SplitType};
pub use group_ledger::GroupLedger;
pub use groups::{Group, GroupMember, GroupRole};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use pairwise::{PairwiseBalance, pairwise_balance};
pub use reports::{
    BalanceRow, ContactGroup, ContactUser, Contacts, DebtReminder, DebtRow, GroupLedgerReport,
    GroupMemberInfo, MemberBalance, OwedByEntry, OwesEntry, PairwiseReport, SettlementNotice,
    UserBalanceSummary, UserGroupBalance,
};
pub use resolver::{
    EntityType, PaymentType, ResolvedSettlement, SettlementRequest, resolve_settlement,
};
pub use settlements::Settlement;
pub use spending::MonthlyTotal;
pub use splits::SplitPlan;
pub use store::{LedgerStore, MemoryStore, Snapshot};
pub use threshold::Threshold;
pub use users::{User, UserId};
pub use validation::{SPLIT_TOLERANCE, validate_expense, validate_splits};

mod commands;
mod error;
mod expenses;
mod group_ledger;
mod groups;
mod money;
mod ops;
mod pairwise;
mod reports;
mod resolver;
mod settlements;
mod spending;
mod splits;
mod store;
mod threshold;
mod users;
mod validation;

pub type ResultLedger<T> = Result<T, LedgerError>;
