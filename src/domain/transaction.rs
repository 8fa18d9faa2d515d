//! Ledger entries that move money into or out of a goal.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub date: NaiveDate,
    /// Signed amount: positive credits the goal, negative debits it.
    pub amount: f64,
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

impl Transaction {
    pub fn new(goal_id: Uuid, date: NaiveDate, amount: f64, kind: TransactionKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            goal_id,
            date,
            amount,
            kind,
            payment_method: None,
        }
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    pub fn is_credit(&self) -> bool {
        self.amount > 0.0
    }

    /// Short month/day label such as `Sep 15`.
    pub fn date_label(&self) -> String {
        self.date.format("%b %-d").to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Describes how a ledger entry came to be.
pub enum TransactionKind {
    ManualAdd,
    ManualWithdraw,
    AutoSave,
    BonusAdd,
    /// Posted when a goal's balance is edited directly.
    BalanceAdjustment,
    /// Free-text description, typically a withdrawal reason.
    Other(String),
}

impl TransactionKind {
    /// Maps a user supplied withdrawal reason to a kind.
    pub fn withdrawal(reason: Option<&str>) -> Self {
        match reason.map(str::trim) {
            Some(text) if !text.is_empty() => TransactionKind::Other(text.to_string()),
            _ => TransactionKind::ManualWithdraw,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::ManualAdd => f.write_str("Manual Add"),
            TransactionKind::ManualWithdraw => f.write_str("Manual Withdraw"),
            TransactionKind::AutoSave => f.write_str("Monthly Auto-Save"),
            TransactionKind::BonusAdd => f.write_str("Bonus Add"),
            TransactionKind::BalanceAdjustment => f.write_str("Balance Adjustment"),
            TransactionKind::Other(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_label_uses_short_month_and_day() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 5).unwrap();
        let txn = Transaction::new(Uuid::new_v4(), date, 50.0, TransactionKind::ManualAdd);
        assert_eq!(txn.date_label(), "Sep 5");
        assert!(txn.is_credit());
    }

    #[test]
    fn blank_withdrawal_reason_falls_back_to_manual_withdraw() {
        assert_eq!(TransactionKind::withdrawal(None), TransactionKind::ManualWithdraw);
        assert_eq!(TransactionKind::withdrawal(Some("  ")), TransactionKind::ManualWithdraw);
        assert_eq!(
            TransactionKind::withdrawal(Some("Car repair")).to_string(),
            "Car repair"
        );
    }
}
