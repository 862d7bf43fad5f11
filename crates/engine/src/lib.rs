//! Monely engine.
//!
//! Owns the domain types, the sea-orm entities and every operation on them.
//! Every operation is scoped to a user id: rows owned by someone else are
//! reported as [`EngineError::KeyNotFound`].

pub use commands::{
    FixedExpensePatch, NewFixedExpenseCmd, NewSavingGoalCmd, NewTransactionCmd, NewWalletCmd,
    ProfilePatch, RegisterUserCmd, SavingGoalPatch, TransactionPatch, WalletPatch,
};
pub use currency::Currency;
pub use error::EngineError;
pub use fixed_expenses::FixedExpense;
pub use ledger::{Effect, Posting};
pub use ops::{CategoryTotal, Engine, EngineBuilder, MonthSummary};
pub use periodicity::Periodicity;
pub use query::{
    FixedExpenseListFilter, FixedExpenseOrderField, SortKey, TransactionListFilter,
    TransactionOrderField, parse_ordering,
};
pub use saving_goals::{SavingGoal, progress_percentage};
pub use transactions::{Transaction, TransactionKind, TransactionStatus};
pub use users::User;
pub use wallets::{Wallet, WalletKind};

mod commands;
mod currency;
mod error;
pub mod fixed_expenses;
pub mod ledger;
mod ops;
mod periodicity;
mod query;
pub mod saving_goals;
pub mod transactions;
pub mod users;
mod util;
pub mod wallets;

type ResultEngine<T> = Result<T, EngineError>;
