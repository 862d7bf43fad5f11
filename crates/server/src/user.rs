//! Registration and the authenticated user's own profile.

use api_types::user::{ProfilePatch, Register, UserView};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::{RegisterUserCmd, User};

use crate::{ServerError, convert, server::ServerState};

pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<Register>, JsonRejection>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let Json(payload) = payload?;
    let cmd = RegisterUserCmd {
        email: payload.email,
        username: payload.username,
        name: payload.name,
        password: payload.password,
        password_confirm: payload.password_confirm,
        currency: payload.currency,
        language: payload.language,
        is_superuser: false,
    };
    let user = state.engine.register_user(cmd).await?;
    Ok((StatusCode::CREATED, Json(convert::user_view(user))))
}

pub async fn me(Extension(user): Extension<User>) -> Json<UserView> {
    Json(convert::user_view(user))
}

pub async fn update_me(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    payload: Result<Json<ProfilePatch>, JsonRejection>,
) -> Result<Json<UserView>, ServerError> {
    let Json(payload) = payload?;
    let patch = engine::ProfilePatch {
        name: payload.name,
        avatar_url: payload.avatar_url,
        currency: payload.currency,
        language: payload.language,
        monthly_income_minor: payload.monthly_income_minor,
        income_frequency: payload.income_frequency.map(convert::periodicity),
    };
    let user = state.engine.update_profile(user.id, patch).await?;
    Ok(Json(convert::user_view(user)))
}

pub async fn delete_me(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
