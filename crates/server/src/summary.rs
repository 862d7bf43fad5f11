use api_types::summary::{CategoryTotal, SummaryQuery, SummaryView};
use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
};
use chrono::{Datelike, Utc};
use engine::{EngineError, User};

use crate::{ServerError, server::ServerState};

/// Parses `YYYY-MM`.
fn parse_month(raw: &str) -> Result<(i32, u32), EngineError> {
    let invalid = || EngineError::validation("month", "expected YYYY-MM");
    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    Ok((year, month))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<SummaryView>, ServerError> {
    let Query(query) = query?;
    let (year, month) = match query.month.as_deref() {
        Some(raw) => parse_month(raw)?,
        None => {
            let now = Utc::now();
            (now.year(), now.month())
        }
    };

    let summary = state.engine.month_summary(user.id, year, month).await?;
    Ok(Json(SummaryView {
        month: format!("{:04}-{:02}", summary.year, summary.month),
        total_balance_minor: summary.total_balance_minor,
        monthly_income_minor: summary.monthly_income_minor,
        month_income_minor: summary.month_income_minor,
        month_expenses_minor: summary.month_expenses_minor,
        budget_left_minor: summary.budget_left_minor,
        budget_percentage: summary.budget_percentage,
        fixed_expenses_monthly_minor: summary.fixed_expenses_monthly_minor,
        expenses_by_category: summary
            .expenses_by_category
            .into_iter()
            .map(|total| CategoryTotal {
                category: total.category,
                amount_minor: total.amount_minor,
            })
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_year_and_month() {
        assert_eq!(parse_month("2026-03").unwrap(), (2026, 3));
        assert!(parse_month("2026").is_err());
        assert!(parse_month("march").is_err());
    }
}
