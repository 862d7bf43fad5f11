use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{QueryFilter, prelude::*};

use crate::{
    EngineError, FixedExpense, Periodicity, ResultEngine, TransactionKind, fixed_expenses,
    transactions, users, wallets,
};

use super::Engine;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount_minor: i64,
}

/// Dashboard figures for one calendar month.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub year: i32,
    pub month: u32,
    pub total_balance_minor: i64,
    /// Profile income normalized to one month.
    pub monthly_income_minor: i64,
    pub month_income_minor: i64,
    pub month_expenses_minor: i64,
    pub budget_left_minor: i64,
    pub budget_percentage: i64,
    pub fixed_expenses_monthly_minor: i64,
    /// Largest category first.
    pub expenses_by_category: Vec<CategoryTotal>,
}

fn month_bounds(year: i32, month: u32) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
    let invalid = || EngineError::validation("month", format!("invalid month: {year}-{month:02}"));
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    let start = start.and_hms_opt(0, 0, 0).ok_or_else(invalid)?.and_utc();
    let end = end.and_hms_opt(0, 0, 0).ok_or_else(invalid)?.and_utc();
    Ok((start, end))
}

fn budget_percentage(budget_left: i64, monthly_income: i64) -> i64 {
    if monthly_income == 0 {
        return 0;
    }
    (budget_left as f64 / monthly_income as f64 * 100.0).round() as i64
}

impl Engine {
    /// Builds the dashboard summary for `year`/`month`.
    pub async fn month_summary(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> ResultEngine<MonthSummary> {
        let (start, end) = month_bounds(year, month)?;

        let user = users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        let frequency = Periodicity::try_from(user.income_frequency.as_str())?;
        let monthly_income = frequency.monthly_equivalent(user.monthly_income_minor);

        let total_balance = wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?
            .iter()
            .map(|wallet| wallet.balance_minor)
            .sum::<i64>();

        let month_txs = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Date.gte(start))
            .filter(transactions::Column::Date.lt(end))
            .all(&self.database)
            .await?;

        let mut month_income = 0i64;
        let mut month_expenses = 0i64;
        let mut by_category: HashMap<String, i64> = HashMap::new();
        for tx in month_txs {
            match TransactionKind::try_from(tx.kind.as_str())? {
                TransactionKind::Income => month_income += tx.amount_minor,
                TransactionKind::Expense => {
                    month_expenses += tx.amount_minor;
                    *by_category.entry(tx.category).or_default() += tx.amount_minor;
                }
                TransactionKind::Transfer => {}
            }
        }

        let mut expenses_by_category: Vec<CategoryTotal> = by_category
            .into_iter()
            .map(|(category, amount_minor)| CategoryTotal {
                category,
                amount_minor,
            })
            .collect();
        expenses_by_category.sort_by(|a, b| {
            b.amount_minor
                .cmp(&a.amount_minor)
                .then_with(|| a.category.cmp(&b.category))
        });

        let mut fixed_monthly = 0i64;
        for model in fixed_expenses::Entity::find()
            .filter(fixed_expenses::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?
        {
            fixed_monthly += FixedExpense::try_from(model)?.monthly_amount_minor();
        }

        let budget_left = monthly_income - month_expenses;
        Ok(MonthSummary {
            year,
            month,
            total_balance_minor: total_balance,
            monthly_income_minor: monthly_income,
            month_income_minor: month_income,
            month_expenses_minor: month_expenses,
            budget_left_minor: budget_left,
            budget_percentage: budget_percentage(budget_left, monthly_income),
            fixed_expenses_monthly_minor: fixed_monthly,
            expenses_by_category,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn december_rolls_into_next_year() {
        let (start, end) = month_bounds(2025, 12).unwrap();
        assert_eq!(start.to_rfc3339(), "2025-12-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn month_thirteen_is_invalid() {
        assert!(matches!(
            month_bounds(2026, 13),
            Err(EngineError::Validation { .. })
        ));
    }

    #[test]
    fn budget_percentage_rounds_and_handles_zero_income() {
        assert_eq!(budget_percentage(500, 0), 0);
        assert_eq!(budget_percentage(1_000, 3_000), 33);
        assert_eq!(budget_percentage(2_000, 3_000), 67);
        assert_eq!(budget_percentage(-1_500, 3_000), -50);
    }
}
