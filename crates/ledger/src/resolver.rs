//! Settlement direction resolver.
//!
//! Given the current balance with a counterpart, decides who pays whom and
//! how much may be recorded. Nothing is persisted here.

use serde::{Deserialize, Serialize};

use crate::{LedgerError, MoneyCents, ResultLedger, users::UserId};

/// What the settlement is recorded against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    User,
    Group,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityType::User => "user",
            EntityType::Group => "group",
        }
    }
}

/// Direction chosen by the current user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentType {
    /// The current user paid the counterpart.
    YouPaid,
    /// The counterpart paid the current user.
    TheyPaid,
}

impl PaymentType {
    /// The only direction that reduces `net_balance` towards zero, if any.
    ///
    /// `net_balance > 0` means the counterpart owes the current user, so they
    /// are the one paying.
    #[must_use]
    pub fn for_balance(net_balance: MoneyCents) -> Option<Self> {
        if net_balance.is_positive() {
            Some(PaymentType::TheyPaid)
        } else if net_balance.is_negative() {
            Some(PaymentType::YouPaid)
        } else {
            None
        }
    }
}

impl TryFrom<&str> for PaymentType {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "youPaid" | "you-paid" => Ok(PaymentType::YouPaid),
            "theyPaid" | "they-paid" => Ok(PaymentType::TheyPaid),
            other => Err(LedgerError::Validation(format!(
                "invalid payment type: {other}"
            ))),
        }
    }
}

/// Input of [`resolve_settlement`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementRequest {
    pub entity_type: EntityType,
    pub me: UserId,
    pub counterpart: UserId,
    /// Current balance with the counterpart, positive when they owe `me`.
    pub net_balance: MoneyCents,
    pub payment_type: PaymentType,
    pub amount: MoneyCents,
    /// Accept lowering `amount` to the outstanding balance instead of failing.
    pub allow_clamp: bool,
}

/// Payer/receiver assignment ready for settlement creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSettlement {
    pub payer_id: UserId,
    pub receiver_id: UserId,
    pub amount: MoneyCents,
    /// `true` when `amount` was lowered to the outstanding balance.
    pub clamped: bool,
}

/// Checks the request against the current balance and derives the payer,
/// receiver and amount.
///
/// Rules:
/// - the direction must reduce the debt: `theyPaid` only when
///   `net_balance > 0`, `youPaid` only when `net_balance < 0`;
/// - `0 < amount <= |net_balance|`; a larger amount is lowered to
///   `|net_balance|` when `allow_clamp` is set, rejected otherwise.
pub fn resolve_settlement(request: &SettlementRequest) -> ResultLedger<ResolvedSettlement> {
    if request.counterpart.trim().is_empty() {
        return Err(LedgerError::Validation(format!(
            "select a {} counterpart to settle with",
            request.entity_type.as_str()
        )));
    }
    if request.me == request.counterpart {
        return Err(LedgerError::Validation(
            "cannot settle with yourself".to_string(),
        ));
    }
    if !request.amount.is_positive() {
        return Err(LedgerError::Validation(format!(
            "settlement amount must be > 0, got {}",
            request.amount
        )));
    }

    let Some(expected) = PaymentType::for_balance(request.net_balance) else {
        return Err(LedgerError::Validation(format!(
            "already settled up with {}",
            request.counterpart
        )));
    };
    if request.payment_type != expected {
        let reason = match expected {
            PaymentType::TheyPaid => format!("{} owes you, only they can pay", request.counterpart),
            PaymentType::YouPaid => format!("you owe {}, only you can pay", request.counterpart),
        };
        return Err(LedgerError::Validation(reason));
    }

    let outstanding = request.net_balance.abs();
    let (amount, clamped) = if request.amount > outstanding {
        if !request.allow_clamp {
            return Err(LedgerError::Validation(format!(
                "amount {} exceeds the outstanding balance of {outstanding}",
                request.amount
            )));
        }
        (outstanding, true)
    } else {
        (request.amount, false)
    };

    let (payer_id, receiver_id) = match request.payment_type {
        PaymentType::YouPaid => (request.me.clone(), request.counterpart.clone()),
        PaymentType::TheyPaid => (request.counterpart.clone(), request.me.clone()),
    };

    Ok(ResolvedSettlement {
        payer_id,
        receiver_id,
        amount,
        clamped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(net: i64, payment_type: PaymentType, amount: i64) -> SettlementRequest {
        SettlementRequest {
            entity_type: EntityType::User,
            me: "alice".to_string(),
            counterpart: "bob".to_string(),
            net_balance: MoneyCents::new(net),
            payment_type,
            amount: MoneyCents::new(amount),
            allow_clamp: false,
        }
    }

    #[test]
    fn they_pay_when_they_owe() {
        let resolved = resolve_settlement(&request(4000, PaymentType::TheyPaid, 1500)).unwrap();
        assert_eq!(resolved.payer_id, "bob");
        assert_eq!(resolved.receiver_id, "alice");
        assert_eq!(resolved.amount, MoneyCents::new(1500));
        assert!(!resolved.clamped);
    }

    #[test]
    fn you_pay_when_you_owe() {
        let resolved = resolve_settlement(&request(-4000, PaymentType::YouPaid, 4000)).unwrap();
        assert_eq!(resolved.payer_id, "alice");
        assert_eq!(resolved.receiver_id, "bob");
        assert_eq!(resolved.amount, MoneyCents::new(4000));
    }

    #[test]
    fn wrong_direction_is_rejected() {
        assert_eq!(
            resolve_settlement(&request(4000, PaymentType::YouPaid, 100)),
            Err(LedgerError::Validation(
                "bob owes you, only they can pay".to_string()
            ))
        );
        assert!(resolve_settlement(&request(-4000, PaymentType::TheyPaid, 100)).is_err());
    }

    #[test]
    fn overshoot_is_rejected_without_consent() {
        assert_eq!(
            resolve_settlement(&request(4000, PaymentType::TheyPaid, 99_900)),
            Err(LedgerError::Validation(
                "amount 999.00 exceeds the outstanding balance of 40.00".to_string()
            ))
        );
    }

    #[test]
    fn overshoot_is_clamped_with_consent() {
        let mut req = request(4000, PaymentType::TheyPaid, 99_900);
        req.allow_clamp = true;
        let resolved = resolve_settlement(&req).unwrap();
        assert_eq!(resolved.amount, MoneyCents::new(4000));
        assert!(resolved.clamped);
    }

    #[test]
    fn zero_balance_and_bad_amounts_are_rejected() {
        assert!(resolve_settlement(&request(0, PaymentType::TheyPaid, 100)).is_err());
        assert!(resolve_settlement(&request(4000, PaymentType::TheyPaid, 0)).is_err());
        assert!(resolve_settlement(&request(4000, PaymentType::TheyPaid, -5)).is_err());

        let mut req = request(4000, PaymentType::TheyPaid, 100);
        req.counterpart = "alice".to_string();
        assert!(resolve_settlement(&req).is_err());
    }

    #[test]
    fn payment_type_suggestion_follows_sign() {
        assert_eq!(PaymentType::for_balance(MoneyCents::new(1)), Some(PaymentType::TheyPaid));
        assert_eq!(PaymentType::for_balance(MoneyCents::new(-1)), Some(PaymentType::YouPaid));
        assert_eq!(PaymentType::for_balance(MoneyCents::ZERO), None);
    }
}
