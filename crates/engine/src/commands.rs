//! Command structs for engine operations.
//!
//! Create commands carry every writable field (optional ones fall back to the
//! column default). Patch structs carry only the fields to change; `None`
//! leaves the stored value untouched. Nullable columns use `Option<Option<T>>`
//! so a patch can clear them.
//!
//! A create command converted into a patch is a full replacement: omitted
//! optional fields become their create-time defaults. The only exception is
//! a wallet balance, which stays as-is when omitted.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{Currency, Periodicity, TransactionKind, TransactionStatus, WalletKind};

pub(crate) const DEFAULT_WALLET_COLOR: &str = "blue";
pub(crate) const DEFAULT_WALLET_ICON: &str = "account_balance";
pub(crate) const DEFAULT_GOAL_COLOR: &str = "blue";
pub(crate) const DEFAULT_TRANSACTION_ICON: &str = "attach_money";

/// Register a new user.
#[derive(Clone, Debug)]
pub struct RegisterUserCmd {
    pub email: String,
    pub username: String,
    pub name: String,
    pub password: String,
    pub password_confirm: String,
    pub currency: Option<String>,
    pub language: Option<String>,
    pub is_superuser: bool,
}

impl RegisterUserCmd {
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let password = password.into();
        Self {
            email: email.into(),
            username: username.into(),
            name: name.into(),
            password_confirm: password.clone(),
            password,
            currency: None,
            language: None,
            is_superuser: false,
        }
    }

    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    #[must_use]
    pub fn superuser(mut self) -> Self {
        self.is_superuser = true;
        self
    }
}

/// Profile fields a user may change about themselves.
#[derive(Clone, Debug, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub avatar_url: Option<Option<String>>,
    pub currency: Option<String>,
    pub language: Option<String>,
    pub monthly_income_minor: Option<i64>,
    pub income_frequency: Option<Periodicity>,
}

/// Create a wallet.
///
/// `balance_minor` becomes the opening balance.
#[derive(Clone, Debug)]
pub struct NewWalletCmd {
    pub name: String,
    pub kind: WalletKind,
    pub balance_minor: Option<i64>,
    pub currency: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl NewWalletCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: WalletKind) -> Self {
        Self {
            name: name.into(),
            kind,
            balance_minor: None,
            currency: None,
            color: None,
            icon: None,
        }
    }

    #[must_use]
    pub fn balance_minor(mut self, balance_minor: i64) -> Self {
        self.balance_minor = Some(balance_minor);
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }
}

/// Change a wallet.
///
/// Setting `balance_minor` overrides the cached balance and shifts the
/// opening balance by the same delta.
#[derive(Clone, Debug, Default)]
pub struct WalletPatch {
    pub name: Option<String>,
    pub kind: Option<WalletKind>,
    pub balance_minor: Option<i64>,
    pub currency: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl From<NewWalletCmd> for WalletPatch {
    fn from(cmd: NewWalletCmd) -> Self {
        Self {
            name: Some(cmd.name),
            kind: Some(cmd.kind),
            balance_minor: cmd.balance_minor,
            currency: Some(cmd.currency.unwrap_or_else(|| Currency::default().to_string())),
            color: Some(cmd.color.unwrap_or_else(|| DEFAULT_WALLET_COLOR.to_string())),
            icon: Some(cmd.icon.unwrap_or_else(|| DEFAULT_WALLET_ICON.to_string())),
        }
    }
}

/// Record a transaction.
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub wallet_id: Uuid,
    pub receiver_wallet_id: Option<Uuid>,
    pub name: String,
    pub amount_minor: i64,
    pub category: String,
    pub kind: TransactionKind,
    pub status: Option<TransactionStatus>,
    pub date: DateTime<Utc>,
    pub icon: Option<String>,
}

impl NewTransactionCmd {
    #[must_use]
    pub fn new(
        kind: TransactionKind,
        wallet_id: Uuid,
        amount_minor: i64,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            wallet_id,
            receiver_wallet_id: None,
            name: kind.as_str().to_string(),
            amount_minor,
            category: "general".to_string(),
            kind,
            status: None,
            date,
            icon: None,
        }
    }

    #[must_use]
    pub fn income(wallet_id: Uuid, amount_minor: i64, date: DateTime<Utc>) -> Self {
        Self::new(TransactionKind::Income, wallet_id, amount_minor, date)
    }

    #[must_use]
    pub fn expense(wallet_id: Uuid, amount_minor: i64, date: DateTime<Utc>) -> Self {
        Self::new(TransactionKind::Expense, wallet_id, amount_minor, date)
    }

    #[must_use]
    pub fn transfer(
        from_wallet_id: Uuid,
        to_wallet_id: Uuid,
        amount_minor: i64,
        date: DateTime<Utc>,
    ) -> Self {
        let mut cmd = Self::new(TransactionKind::Transfer, from_wallet_id, amount_minor, date);
        cmd.receiver_wallet_id = Some(to_wallet_id);
        cmd
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Change a transaction.
///
/// When the resulting kind is not a transfer and `receiver_wallet_id` is not
/// mentioned, the receiver is cleared.
#[derive(Clone, Debug, Default)]
pub struct TransactionPatch {
    pub wallet_id: Option<Uuid>,
    pub receiver_wallet_id: Option<Option<Uuid>>,
    pub name: Option<String>,
    pub amount_minor: Option<i64>,
    pub category: Option<String>,
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
    pub date: Option<DateTime<Utc>>,
    pub icon: Option<String>,
}

impl From<NewTransactionCmd> for TransactionPatch {
    fn from(cmd: NewTransactionCmd) -> Self {
        Self {
            wallet_id: Some(cmd.wallet_id),
            receiver_wallet_id: Some(cmd.receiver_wallet_id),
            name: Some(cmd.name),
            amount_minor: Some(cmd.amount_minor),
            category: Some(cmd.category),
            kind: Some(cmd.kind),
            status: Some(cmd.status.unwrap_or_default()),
            date: Some(cmd.date),
            icon: Some(cmd.icon.unwrap_or_else(|| DEFAULT_TRANSACTION_ICON.to_string())),
        }
    }
}

/// Create a saving goal.
#[derive(Clone, Debug)]
pub struct NewSavingGoalCmd {
    pub name: String,
    pub target_amount_minor: i64,
    pub current_amount_minor: Option<i64>,
    pub deadline: NaiveDate,
    pub color: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct SavingGoalPatch {
    pub name: Option<String>,
    pub target_amount_minor: Option<i64>,
    pub current_amount_minor: Option<i64>,
    pub deadline: Option<NaiveDate>,
    pub color: Option<String>,
}

impl From<NewSavingGoalCmd> for SavingGoalPatch {
    fn from(cmd: NewSavingGoalCmd) -> Self {
        Self {
            name: Some(cmd.name),
            target_amount_minor: Some(cmd.target_amount_minor),
            current_amount_minor: Some(cmd.current_amount_minor.unwrap_or(0)),
            deadline: Some(cmd.deadline),
            color: Some(cmd.color.unwrap_or_else(|| DEFAULT_GOAL_COLOR.to_string())),
        }
    }
}

/// Create a fixed expense.
#[derive(Clone, Debug)]
pub struct NewFixedExpenseCmd {
    pub name: String,
    pub amount_minor: i64,
    pub currency: Option<String>,
    pub periodicity: Option<Periodicity>,
    pub start_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, Default)]
pub struct FixedExpensePatch {
    pub name: Option<String>,
    pub amount_minor: Option<i64>,
    pub currency: Option<String>,
    pub periodicity: Option<Periodicity>,
    pub start_date: Option<Option<NaiveDate>>,
}

impl From<NewFixedExpenseCmd> for FixedExpensePatch {
    fn from(cmd: NewFixedExpenseCmd) -> Self {
        Self {
            name: Some(cmd.name),
            amount_minor: Some(cmd.amount_minor),
            currency: Some(cmd.currency.unwrap_or_else(|| Currency::default().to_string())),
            periodicity: Some(cmd.periodicity.unwrap_or_default()),
            start_date: Some(cmd.start_date),
        }
    }
}
