//! Command structs for ledger write operations.
//!
//! These types group the parameters of expense, settlement and group creation,
//! keeping call sites readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{EntityType, MoneyCents, PaymentType, Split, SplitPlan, SplitType, users::UserId};

/// How the splits of a new expense are given.
#[derive(Clone, Debug, PartialEq)]
pub enum SplitsInput {
    /// Splits already computed by the caller, checked as-is.
    Given(SplitType, Vec<Split>),
    /// Splits computed from a plan at creation time.
    Plan(SplitPlan),
}

/// Create an expense.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseCmd {
    pub actor: UserId,
    pub payer_id: UserId,
    pub amount: MoneyCents,
    pub description: String,
    pub category: Option<String>,
    pub date: DateTime<Utc>,
    pub group_id: Option<Uuid>,
    pub splits: SplitsInput,
}

impl ExpenseCmd {
    /// Expense paid by `actor`, split equally between `participants`.
    #[must_use]
    pub fn new(
        actor: impl Into<UserId>,
        amount: MoneyCents,
        description: impl Into<String>,
        date: DateTime<Utc>,
        participants: Vec<UserId>,
    ) -> Self {
        let actor = actor.into();
        Self {
            payer_id: actor.clone(),
            actor,
            amount,
            description: description.into(),
            category: None,
            date,
            group_id: None,
            splits: SplitsInput::Plan(SplitPlan::Equal(participants)),
        }
    }

    #[must_use]
    pub fn payer(mut self, payer_id: impl Into<UserId>) -> Self {
        self.payer_id = payer_id.into();
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn group_id(mut self, group_id: Uuid) -> Self {
        self.group_id = Some(group_id);
        self
    }

    #[must_use]
    pub fn plan(mut self, plan: SplitPlan) -> Self {
        self.splits = SplitsInput::Plan(plan);
        self
    }

    #[must_use]
    pub fn splits(mut self, split_type: SplitType, splits: Vec<Split>) -> Self {
        self.splits = SplitsInput::Given(split_type, splits);
        self
    }
}

/// Record a payment between the actor and a counterpart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementCmd {
    pub actor: UserId,
    pub counterpart: UserId,
    pub group_id: Option<Uuid>,
    pub payment_type: PaymentType,
    pub amount: MoneyCents,
    pub note: Option<String>,
    pub related_expense_ids: Vec<Uuid>,
    pub date: DateTime<Utc>,
    pub allow_clamp: bool,
}

impl SettlementCmd {
    #[must_use]
    pub fn new(
        actor: impl Into<UserId>,
        counterpart: impl Into<UserId>,
        payment_type: PaymentType,
        amount: MoneyCents,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            actor: actor.into(),
            counterpart: counterpart.into(),
            group_id: None,
            payment_type,
            amount,
            note: None,
            related_expense_ids: Vec::new(),
            date,
            allow_clamp: false,
        }
    }

    #[must_use]
    pub fn group_id(mut self, group_id: Uuid) -> Self {
        self.group_id = Some(group_id);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn related_expenses(mut self, expense_ids: Vec<Uuid>) -> Self {
        self.related_expense_ids = expense_ids;
        self
    }

    /// Accept lowering the amount to the outstanding balance.
    #[must_use]
    pub fn allow_clamp(mut self, allow: bool) -> Self {
        self.allow_clamp = allow;
        self
    }

    pub fn entity_type(&self) -> EntityType {
        if self.group_id.is_some() {
            EntityType::Group
        } else {
            EntityType::User
        }
    }
}

/// Create a group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupCmd {
    pub actor: UserId,
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

impl GroupCmd {
    #[must_use]
    pub fn new(
        actor: impl Into<UserId>,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            actor: actor.into(),
            name: name.into(),
            description: None,
            members: Vec::new(),
            created_at,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn members(mut self, members: Vec<UserId>) -> Self {
        self.members = members;
        self
    }
}
