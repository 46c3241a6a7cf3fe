//! Ledger transactions and their classification.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;
use crate::money::Milliunits;

/// A dated money movement. Negative amounts are spending, positive amounts inflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: UserId,
    pub category_id: Option<Uuid>,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<String>,
    pub amount: Milliunits,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        user_id: UserId,
        category_id: Option<Uuid>,
        date: NaiveDate,
        amount: Milliunits,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            category_id,
            date,
            payee: None,
            amount,
            memo: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_payee(mut self, payee: impl Into<String>) -> Self {
        self.payee = Some(payee.into());
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// How the transaction participates in a budget month.
    ///
    /// Any transaction carrying a category counts against that category,
    /// whatever its sign.
    pub fn class(&self) -> TransactionClass {
        match self.category_id {
            Some(category_id) => TransactionClass::Categorized(category_id),
            None if self.amount.is_positive() => TransactionClass::Income,
            None => TransactionClass::UncategorizedOutflow,
        }
    }

    /// Case-insensitive substring match against payee and memo.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [self.payee.as_deref(), self.memo.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl OwnedByUser for Transaction {
    fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionClass {
    Categorized(Uuid),
    Income,
    UncategorizedOutflow,
}

/// The kind a user picks when entering a transaction; determines the stored sign.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    /// Applies the sign convention to a positive magnitude.
    pub fn signed(self, magnitude: Milliunits) -> Milliunits {
        match self {
            TransactionKind::Expense => -magnitude,
            TransactionKind::Income => magnitude,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        };
        f.write_str(label)
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expense" => Ok(TransactionKind::Expense),
            "income" => Ok(TransactionKind::Income),
            other => Err(format!("unknown transaction type `{other}`")),
        }
    }
}

/// A transaction joined with the name of its category, for listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionWithCategory {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(category: Option<Uuid>, amount: i64) -> Transaction {
        Transaction::new(
            UserId::new("u1"),
            category,
            NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            Milliunits::new(amount),
        )
    }

    #[test]
    fn classification_follows_category_then_sign() {
        let category = Uuid::new_v4();
        assert_eq!(
            txn(Some(category), 5_000).class(),
            TransactionClass::Categorized(category)
        );
        assert_eq!(txn(None, 5_000).class(), TransactionClass::Income);
        assert_eq!(txn(None, 0).class(), TransactionClass::UncategorizedOutflow);
        assert_eq!(
            txn(None, -5_000).class(),
            TransactionClass::UncategorizedOutflow
        );
    }

    #[test]
    fn search_checks_payee_and_memo() {
        let record = txn(None, 10).with_payee("Corner Market").with_memo("Weekly shop");
        assert!(record.matches_search("market"));
        assert!(record.matches_search("WEEKLY"));
        assert!(!record.matches_search("fuel"));
    }

    #[test]
    fn kind_applies_sign_convention() {
        let magnitude = Milliunits::new(10_500);
        assert_eq!(TransactionKind::Expense.signed(magnitude).value(), -10_500);
        assert_eq!(TransactionKind::Income.signed(magnitude).value(), 10_500);
        assert_eq!("Expense".parse::<TransactionKind>(), Ok(TransactionKind::Expense));
        assert!("transfer".parse::<TransactionKind>().is_err());
    }
}
