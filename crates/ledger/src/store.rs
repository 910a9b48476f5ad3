//! Persistence port.
//!
//! The ledger never stores balances. It reads a consistent [`Snapshot`] of the
//! records, computes, and (on the write path) hands back a mutated snapshot to
//! commit. Atomicity and isolation are the store's job: a `read` sees one point
//! in time, a `write` commits all of its changes or none.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Expense, Group, LedgerError, ResultLedger, Settlement, User};

/// Every record the ledger works from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub groups: Vec<Group>,
    pub expenses: Vec<Expense>,
    pub settlements: Vec<Settlement>,
}

impl Snapshot {
    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|user| user.id == user_id)
    }

    pub fn require_user(&self, user_id: &str) -> ResultLedger<&User> {
        self.user(user_id)
            .ok_or_else(|| LedgerError::NotFound(format!("user {user_id}")))
    }

    pub fn group(&self, group_id: Uuid) -> ResultLedger<&Group> {
        self.groups
            .iter()
            .find(|group| group.id == group_id)
            .ok_or_else(|| LedgerError::NotFound(format!("group {group_id}")))
    }

    pub fn expense(&self, expense_id: Uuid) -> ResultLedger<&Expense> {
        self.expenses
            .iter()
            .find(|expense| expense.id == expense_id)
            .ok_or_else(|| LedgerError::NotFound(format!("expense {expense_id}")))
    }

    /// Groups `user_id` belongs to, in storage order.
    pub fn groups_of<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a Group> + 'a {
        self.groups.iter().filter(move |group| group.is_member(user_id))
    }

    /// Display name of a user, `"Unknown"` when the record is missing.
    pub fn display_name(&self, user_id: &str) -> String {
        self.user(user_id)
            .map_or_else(|| "Unknown".to_string(), |user| user.name.clone())
    }
}

/// Access to the records, provided by the persistence layer.
pub trait LedgerStore {
    /// Runs `f` against one consistent snapshot.
    fn read<T>(&self, f: impl FnOnce(&Snapshot) -> ResultLedger<T>) -> ResultLedger<T>;

    /// Runs `f` against a mutable snapshot and commits its changes only if it
    /// returns `Ok`.
    fn write<T>(&self, f: impl FnOnce(&mut Snapshot) -> ResultLedger<T>) -> ResultLedger<T>;
}

/// In-memory [`LedgerStore`]; writes are applied to a copy and swapped in on
/// success.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: RwLock<Snapshot>,
}

impl MemoryStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }

    /// Copy of the current records.
    pub fn snapshot(&self) -> ResultLedger<Snapshot> {
        self.read(|snapshot| Ok(snapshot.clone()))
    }
}

fn poisoned<E>(_: E) -> LedgerError {
    LedgerError::Consistency("record store lock poisoned".to_string())
}

impl LedgerStore for MemoryStore {
    fn read<T>(&self, f: impl FnOnce(&Snapshot) -> ResultLedger<T>) -> ResultLedger<T> {
        let guard = self.snapshot.read().map_err(poisoned)?;
        f(&guard)
    }

    fn write<T>(&self, f: impl FnOnce(&mut Snapshot) -> ResultLedger<T>) -> ResultLedger<T> {
        let mut guard = self.snapshot.write().map_err(poisoned)?;
        let mut draft = guard.clone();
        let value = f(&mut draft)?;
        *guard = draft;
        Ok(value)
    }
}
