//! Wallets API endpoints.

use api_types::wallet::{WalletNew, WalletPatch, WalletView};
use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use engine::{NewWalletCmd, User};
use uuid::Uuid;

use crate::{ServerError, convert, server::ServerState};

fn new_cmd(payload: WalletNew) -> NewWalletCmd {
    NewWalletCmd {
        name: payload.name,
        kind: convert::wallet_kind(payload.kind),
        balance_minor: payload.balance_minor,
        currency: payload.currency,
        color: payload.color,
        icon: payload.icon,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<WalletView>>, ServerError> {
    let wallets = state.engine.list_wallets(user.id).await?;
    Ok(Json(wallets.into_iter().map(convert::wallet_view).collect()))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    payload: Result<Json<WalletNew>, JsonRejection>,
) -> Result<(StatusCode, Json<WalletView>), ServerError> {
    let Json(payload) = payload?;
    let wallet = state.engine.create_wallet(user.id, new_cmd(payload)).await?;
    Ok((StatusCode::CREATED, Json(convert::wallet_view(wallet))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    wallet_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<WalletView>, ServerError> {
    let Path(wallet_id) = wallet_id?;
    let wallet = state.engine.wallet(user.id, wallet_id).await?;
    Ok(Json(convert::wallet_view(wallet)))
}

/// PUT: every create field is required.
pub async fn replace(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    wallet_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<WalletNew>, JsonRejection>,
) -> Result<Json<WalletView>, ServerError> {
    let Path(wallet_id) = wallet_id?;
    let Json(payload) = payload?;
    let wallet = state
        .engine
        .update_wallet(user.id, wallet_id, new_cmd(payload).into())
        .await?;
    Ok(Json(convert::wallet_view(wallet)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    wallet_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<WalletPatch>, JsonRejection>,
) -> Result<Json<WalletView>, ServerError> {
    let Path(wallet_id) = wallet_id?;
    let Json(payload) = payload?;
    let patch = engine::WalletPatch {
        name: payload.name,
        kind: payload.kind.map(convert::wallet_kind),
        balance_minor: payload.balance_minor,
        currency: payload.currency,
        color: payload.color,
        icon: payload.icon,
    };
    let wallet = state.engine.update_wallet(user.id, wallet_id, patch).await?;
    Ok(Json(convert::wallet_view(wallet)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    wallet_id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ServerError> {
    let Path(wallet_id) = wallet_id?;
    state.engine.delete_wallet(user.id, wallet_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Rebuilds cached balances from the ledger and returns the wallets.
pub async fn recompute(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<WalletView>>, ServerError> {
    let wallets = state.engine.recompute_balances(user.id).await?;
    Ok(Json(wallets.into_iter().map(convert::wallet_view).collect()))
}
