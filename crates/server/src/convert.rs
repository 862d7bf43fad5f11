//! Mapping between wire types and engine types.

use std::collections::HashMap;

use api_types::{
    Periodicity as ApiPeriodicity,
    fixed_expense::FixedExpenseView,
    goal::GoalView,
    transaction::{TransactionStatus as ApiStatus, TransactionType, TransactionView},
    user::UserView,
    wallet::{WalletType, WalletView},
};
use engine::{
    FixedExpense, Periodicity, SavingGoal, Transaction, TransactionKind, TransactionStatus, User,
    Wallet, WalletKind,
};
use uuid::Uuid;

pub fn periodicity(value: ApiPeriodicity) -> Periodicity {
    match value {
        ApiPeriodicity::Weekly => Periodicity::Weekly,
        ApiPeriodicity::Monthly => Periodicity::Monthly,
        ApiPeriodicity::Yearly => Periodicity::Yearly,
    }
}

fn api_periodicity(value: Periodicity) -> ApiPeriodicity {
    match value {
        Periodicity::Weekly => ApiPeriodicity::Weekly,
        Periodicity::Monthly => ApiPeriodicity::Monthly,
        Periodicity::Yearly => ApiPeriodicity::Yearly,
    }
}

pub fn wallet_kind(value: WalletType) -> WalletKind {
    match value {
        WalletType::Checking => WalletKind::Checking,
        WalletType::Savings => WalletKind::Savings,
        WalletType::Credit => WalletKind::Credit,
        WalletType::Investment => WalletKind::Investment,
        WalletType::Cash => WalletKind::Cash,
    }
}

fn wallet_type(value: WalletKind) -> WalletType {
    match value {
        WalletKind::Checking => WalletType::Checking,
        WalletKind::Savings => WalletType::Savings,
        WalletKind::Credit => WalletType::Credit,
        WalletKind::Investment => WalletType::Investment,
        WalletKind::Cash => WalletType::Cash,
    }
}

pub fn transaction_kind(value: TransactionType) -> TransactionKind {
    match value {
        TransactionType::Income => TransactionKind::Income,
        TransactionType::Expense => TransactionKind::Expense,
        TransactionType::Transfer => TransactionKind::Transfer,
    }
}

fn transaction_type(value: TransactionKind) -> TransactionType {
    match value {
        TransactionKind::Income => TransactionType::Income,
        TransactionKind::Expense => TransactionType::Expense,
        TransactionKind::Transfer => TransactionType::Transfer,
    }
}

pub fn transaction_status(value: ApiStatus) -> TransactionStatus {
    match value {
        ApiStatus::Pending => TransactionStatus::Pending,
        ApiStatus::Completed => TransactionStatus::Completed,
    }
}

fn api_status(value: TransactionStatus) -> ApiStatus {
    match value {
        TransactionStatus::Pending => ApiStatus::Pending,
        TransactionStatus::Completed => ApiStatus::Completed,
    }
}

pub fn user_view(user: User) -> UserView {
    UserView {
        id: user.id,
        email: user.email,
        username: user.username,
        name: user.name,
        avatar_url: user.avatar_url,
        currency: user.currency.to_string(),
        language: user.language,
        monthly_income_minor: user.monthly_income_minor,
        income_frequency: api_periodicity(user.income_frequency),
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

pub fn wallet_view(wallet: Wallet) -> WalletView {
    WalletView {
        id: wallet.id,
        name: wallet.name,
        kind: wallet_type(wallet.kind),
        balance_minor: wallet.balance_minor,
        opening_balance_minor: wallet.opening_balance_minor,
        currency: wallet.currency.to_string(),
        color: wallet.color,
        icon: wallet.icon,
        created_at: wallet.created_at,
        updated_at: wallet.updated_at,
    }
}

/// `names` maps wallet ids to wallet names for the `*_name` fields.
pub fn transaction_view(tx: Transaction, names: &HashMap<Uuid, String>) -> TransactionView {
    let name_of = |id: &Uuid| names.get(id).cloned();
    TransactionView {
        id: tx.id,
        wallet: tx.wallet_id,
        wallet_name: name_of(&tx.wallet_id).unwrap_or_default(),
        receiver_wallet: tx.receiver_wallet_id,
        receiver_wallet_name: tx.receiver_wallet_id.as_ref().and_then(name_of),
        name: tx.name,
        amount_minor: tx.amount_minor,
        category: tx.category,
        kind: transaction_type(tx.kind),
        status: api_status(tx.status),
        date: tx.date,
        icon: tx.icon,
        created_at: tx.created_at,
        updated_at: tx.updated_at,
    }
}

pub fn goal_view(goal: SavingGoal) -> GoalView {
    GoalView {
        progress: goal.progress_percentage(),
        id: goal.id,
        name: goal.name,
        target_amount_minor: goal.target_amount_minor,
        current_amount_minor: goal.current_amount_minor,
        deadline: goal.deadline,
        color: goal.color,
        created_at: goal.created_at,
        updated_at: goal.updated_at,
    }
}

pub fn fixed_expense_view(expense: FixedExpense) -> FixedExpenseView {
    FixedExpenseView {
        id: expense.id,
        name: expense.name,
        amount_minor: expense.amount_minor,
        currency: expense.currency.to_string(),
        periodicity: api_periodicity(expense.periodicity),
        start_date: expense.start_date,
        created_at: expense.created_at,
        updated_at: expense.updated_at,
    }
}
