//! Saving goals API endpoints.

use api_types::goal::{GoalNew, GoalPatch, GoalView};
use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use engine::{NewSavingGoalCmd, User};
use uuid::Uuid;

use crate::{ServerError, convert, server::ServerState};

fn new_cmd(payload: GoalNew) -> NewSavingGoalCmd {
    NewSavingGoalCmd {
        name: payload.name,
        target_amount_minor: payload.target_amount_minor,
        current_amount_minor: payload.current_amount_minor,
        deadline: payload.deadline,
        color: payload.color,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<GoalView>>, ServerError> {
    let goals = state.engine.list_saving_goals(user.id).await?;
    Ok(Json(goals.into_iter().map(convert::goal_view).collect()))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    payload: Result<Json<GoalNew>, JsonRejection>,
) -> Result<(StatusCode, Json<GoalView>), ServerError> {
    let Json(payload) = payload?;
    let goal = state
        .engine
        .create_saving_goal(user.id, new_cmd(payload))
        .await?;
    Ok((StatusCode::CREATED, Json(convert::goal_view(goal))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    goal_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<GoalView>, ServerError> {
    let Path(goal_id) = goal_id?;
    let goal = state.engine.saving_goal(user.id, goal_id).await?;
    Ok(Json(convert::goal_view(goal)))
}

pub async fn replace(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    goal_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<GoalNew>, JsonRejection>,
) -> Result<Json<GoalView>, ServerError> {
    let Path(goal_id) = goal_id?;
    let Json(payload) = payload?;
    let goal = state
        .engine
        .update_saving_goal(user.id, goal_id, new_cmd(payload).into())
        .await?;
    Ok(Json(convert::goal_view(goal)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    goal_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<GoalPatch>, JsonRejection>,
) -> Result<Json<GoalView>, ServerError> {
    let Path(goal_id) = goal_id?;
    let Json(payload) = payload?;
    let patch = engine::SavingGoalPatch {
        name: payload.name,
        target_amount_minor: payload.target_amount_minor,
        current_amount_minor: payload.current_amount_minor,
        deadline: payload.deadline,
        color: payload.color,
    };
    let goal = state
        .engine
        .update_saving_goal(user.id, goal_id, patch)
        .await?;
    Ok(Json(convert::goal_view(goal)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    goal_id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ServerError> {
    let Path(goal_id) = goal_id?;
    state.engine.delete_saving_goal(user.id, goal_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
