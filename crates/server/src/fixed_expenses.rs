//! Fixed expenses API endpoints.

use api_types::fixed_expense::{
    FixedExpenseNew, FixedExpensePatch, FixedExpenseQuery, FixedExpenseView,
};
use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use engine::{
    FixedExpenseListFilter, FixedExpenseOrderField, NewFixedExpenseCmd, User, parse_ordering,
};
use uuid::Uuid;

use crate::{ServerError, convert, server::ServerState};

fn new_cmd(payload: FixedExpenseNew) -> NewFixedExpenseCmd {
    NewFixedExpenseCmd {
        name: payload.name,
        amount_minor: payload.amount_minor,
        currency: payload.currency,
        periodicity: payload.periodicity.map(convert::periodicity),
        start_date: payload.start_date,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    query: Result<Query<FixedExpenseQuery>, QueryRejection>,
) -> Result<Json<Vec<FixedExpenseView>>, ServerError> {
    let Query(query) = query?;
    let filter = FixedExpenseListFilter {
        periodicity: query.periodicity.map(convert::periodicity),
        currency: query.currency,
        search: query.search,
        ordering: parse_ordering::<FixedExpenseOrderField>(
            query.ordering.as_deref().unwrap_or(""),
        )?,
    };
    let expenses = state.engine.list_fixed_expenses(user.id, &filter).await?;
    Ok(Json(
        expenses
            .into_iter()
            .map(convert::fixed_expense_view)
            .collect(),
    ))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    payload: Result<Json<FixedExpenseNew>, JsonRejection>,
) -> Result<(StatusCode, Json<FixedExpenseView>), ServerError> {
    let Json(payload) = payload?;
    let expense = state
        .engine
        .create_fixed_expense(user.id, new_cmd(payload))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(convert::fixed_expense_view(expense)),
    ))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    expense_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<FixedExpenseView>, ServerError> {
    let Path(expense_id) = expense_id?;
    let expense = state.engine.fixed_expense(user.id, expense_id).await?;
    Ok(Json(convert::fixed_expense_view(expense)))
}

pub async fn replace(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    expense_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<FixedExpenseNew>, JsonRejection>,
) -> Result<Json<FixedExpenseView>, ServerError> {
    let Path(expense_id) = expense_id?;
    let Json(payload) = payload?;
    let expense = state
        .engine
        .update_fixed_expense(user.id, expense_id, new_cmd(payload).into())
        .await?;
    Ok(Json(convert::fixed_expense_view(expense)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    expense_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<FixedExpensePatch>, JsonRejection>,
) -> Result<Json<FixedExpenseView>, ServerError> {
    let Path(expense_id) = expense_id?;
    let Json(payload) = payload?;
    let patch = engine::FixedExpensePatch {
        name: payload.name,
        amount_minor: payload.amount_minor,
        currency: payload.currency,
        periodicity: payload.periodicity.map(convert::periodicity),
        start_date: payload.start_date,
    };
    let expense = state
        .engine
        .update_fixed_expense(user.id, expense_id, patch)
        .await?;
    Ok(Json(convert::fixed_expense_view(expense)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    expense_id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ServerError> {
    let Path(expense_id) = expense_id?;
    state.engine.delete_fixed_expense(user.id, expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
