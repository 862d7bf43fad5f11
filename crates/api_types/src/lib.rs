//! JSON bodies exchanged with the Monely HTTP API.
//!
//! Amounts are integer minor units (cents). Write payloads never carry `id`,
//! the owning user or timestamps.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in PATCH bodies.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Periodicity {
    Weekly,
    Monthly,
    Yearly,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Register {
        pub email: String,
        pub username: String,
        pub name: String,
        pub password: String,
        pub password_confirm: String,
        pub currency: Option<String>,
        pub language: Option<String>,
    }

    /// Fields a user may change on their own profile.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProfilePatch {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub avatar_url: Option<Option<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub currency: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub language: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub monthly_income_minor: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub income_frequency: Option<Periodicity>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub email: String,
        pub username: String,
        pub name: String,
        pub avatar_url: Option<String>,
        pub currency: String,
        pub language: String,
        pub monthly_income_minor: i64,
        pub income_frequency: Periodicity,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod wallet {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum WalletType {
        Checking,
        Savings,
        Credit,
        Investment,
        Cash,
    }

    /// Create (POST) or full update (PUT) body.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletNew {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: WalletType,
        /// On create: the opening balance. On PUT: overrides the balance.
        pub balance_minor: Option<i64>,
        pub currency: Option<String>,
        pub color: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct WalletPatch {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        pub kind: Option<WalletType>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub balance_minor: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub currency: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub color: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub icon: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletView {
        pub id: Uuid,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: WalletType,
        pub balance_minor: i64,
        pub opening_balance_minor: i64,
        pub currency: String,
        pub color: String,
        pub icon: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionType {
        Income,
        Expense,
        Transfer,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionStatus {
        Pending,
        Completed,
    }

    /// Create (POST) or full update (PUT) body.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub wallet: Uuid,
        /// Required for transfers, rejected otherwise.
        pub receiver_wallet: Option<Uuid>,
        pub name: String,
        pub amount_minor: i64,
        pub category: String,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub status: Option<TransactionStatus>,
        pub date: DateTime<Utc>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionPatch {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub wallet: Option<Uuid>,
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub receiver_wallet: Option<Option<Uuid>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amount_minor: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub category: Option<String>,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        pub kind: Option<TransactionType>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub status: Option<TransactionStatus>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub date: Option<DateTime<Utc>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub icon: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub wallet: Uuid,
        pub wallet_name: String,
        pub receiver_wallet: Option<Uuid>,
        pub receiver_wallet_name: Option<String>,
        pub name: String,
        pub amount_minor: i64,
        pub category: String,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub status: TransactionStatus,
        pub date: DateTime<Utc>,
        pub icon: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Query string for `GET /transactions`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionQuery {
        /// Matches the source or the receiver wallet.
        pub wallet: Option<Uuid>,
        #[serde(rename = "type")]
        pub kind: Option<TransactionType>,
        pub category: Option<String>,
        pub status: Option<TransactionStatus>,
        pub search: Option<String>,
        /// Comma separated, `-` prefix for descending. Fields: `date`,
        /// `amount`, `created_at`.
        pub ordering: Option<String>,
    }
}

pub mod goal {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalNew {
        pub name: String,
        pub target_amount_minor: i64,
        pub current_amount_minor: Option<i64>,
        pub deadline: NaiveDate,
        pub color: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct GoalPatch {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub target_amount_minor: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub current_amount_minor: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub deadline: Option<NaiveDate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub color: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalView {
        pub id: Uuid,
        pub name: String,
        pub target_amount_minor: i64,
        pub current_amount_minor: i64,
        pub deadline: NaiveDate,
        pub color: String,
        /// Percentage of the target reached; not capped at 100.
        pub progress: f64,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod fixed_expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FixedExpenseNew {
        pub name: String,
        pub amount_minor: i64,
        pub currency: Option<String>,
        pub periodicity: Option<Periodicity>,
        pub start_date: Option<NaiveDate>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct FixedExpensePatch {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amount_minor: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub currency: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub periodicity: Option<Periodicity>,
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub start_date: Option<Option<NaiveDate>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FixedExpenseView {
        pub id: Uuid,
        pub name: String,
        pub amount_minor: i64,
        pub currency: String,
        pub periodicity: Periodicity,
        pub start_date: Option<NaiveDate>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Query string for `GET /fixed-expenses`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct FixedExpenseQuery {
        pub periodicity: Option<Periodicity>,
        pub currency: Option<String>,
        pub search: Option<String>,
        /// Fields: `amount`, `start_date`, `created_at`.
        pub ordering: Option<String>,
    }
}

pub mod summary {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SummaryQuery {
        /// `YYYY-MM`; the current UTC month when absent.
        pub month: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTotal {
        pub category: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryView {
        /// `YYYY-MM`.
        pub month: String,
        pub total_balance_minor: i64,
        pub monthly_income_minor: i64,
        pub month_income_minor: i64,
        pub month_expenses_minor: i64,
        pub budget_left_minor: i64,
        pub budget_percentage: i64,
        pub fixed_expenses_monthly_minor: i64,
        pub expenses_by_category: Vec<CategoryTotal>,
    }
}
