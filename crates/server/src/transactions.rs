//! Transactions API endpoints.
//!
//! Every write goes through the engine, which keeps wallet balances in step
//! with the stored transactions.

use std::collections::HashMap;

use api_types::transaction::{TransactionNew, TransactionPatch, TransactionQuery, TransactionView};
use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use engine::{
    NewTransactionCmd, Transaction, TransactionListFilter, TransactionOrderField, User,
    parse_ordering,
};
use uuid::Uuid;

use crate::{ServerError, convert, server::ServerState};

fn new_cmd(payload: TransactionNew) -> NewTransactionCmd {
    NewTransactionCmd {
        wallet_id: payload.wallet,
        receiver_wallet_id: payload.receiver_wallet,
        name: payload.name,
        amount_minor: payload.amount_minor,
        category: payload.category,
        kind: convert::transaction_kind(payload.kind),
        status: payload.status.map(convert::transaction_status),
        date: payload.date,
        icon: payload.icon,
    }
}

async fn wallet_names(state: &ServerState, user: &User) -> Result<HashMap<Uuid, String>, ServerError> {
    Ok(state
        .engine
        .list_wallets(user.id)
        .await?
        .into_iter()
        .map(|wallet| (wallet.id, wallet.name))
        .collect())
}

async fn view(
    state: &ServerState,
    user: &User,
    tx: Transaction,
) -> Result<Json<TransactionView>, ServerError> {
    let names = wallet_names(state, user).await?;
    Ok(Json(convert::transaction_view(tx, &names)))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    query: Result<Query<TransactionQuery>, QueryRejection>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let Query(query) = query?;
    let filter = TransactionListFilter {
        wallet_id: query.wallet,
        kind: query.kind.map(convert::transaction_kind),
        category: query.category,
        status: query.status.map(convert::transaction_status),
        search: query.search,
        ordering: parse_ordering::<TransactionOrderField>(query.ordering.as_deref().unwrap_or(""))?,
    };

    let transactions = state.engine.list_transactions(user.id, &filter).await?;
    let names = wallet_names(&state, &user).await?;
    Ok(Json(
        transactions
            .into_iter()
            .map(|tx| convert::transaction_view(tx, &names))
            .collect(),
    ))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let Json(payload) = payload?;
    let tx = state
        .engine
        .create_transaction(user.id, new_cmd(payload))
        .await?;
    Ok((StatusCode::CREATED, view(&state, &user, tx).await?))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    transaction_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<TransactionView>, ServerError> {
    let Path(transaction_id) = transaction_id?;
    let tx = state.engine.transaction(user.id, transaction_id).await?;
    view(&state, &user, tx).await
}

/// PUT: every create field is required.
pub async fn replace(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    transaction_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Result<Json<TransactionView>, ServerError> {
    let Path(transaction_id) = transaction_id?;
    let Json(payload) = payload?;
    let tx = state
        .engine
        .update_transaction(user.id, transaction_id, new_cmd(payload).into())
        .await?;
    view(&state, &user, tx).await
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    transaction_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<TransactionPatch>, JsonRejection>,
) -> Result<Json<TransactionView>, ServerError> {
    let Path(transaction_id) = transaction_id?;
    let Json(payload) = payload?;
    let patch = engine::TransactionPatch {
        wallet_id: payload.wallet,
        receiver_wallet_id: payload.receiver_wallet,
        name: payload.name,
        amount_minor: payload.amount_minor,
        category: payload.category,
        kind: payload.kind.map(convert::transaction_kind),
        status: payload.status.map(convert::transaction_status),
        date: payload.date,
        icon: payload.icon,
    };
    let tx = state
        .engine
        .update_transaction(user.id, transaction_id, patch)
        .await?;
    view(&state, &user, tx).await
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    transaction_id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ServerError> {
    let Path(transaction_id) = transaction_id?;
    state
        .engine
        .delete_transaction(user.id, transaction_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
