use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod convert;
mod fixed_expenses;
mod goals;
mod server;
mod summary;
mod transactions;
mod user;
mod wallets;

pub mod types {
    pub mod user {
        pub use api_types::user::{ProfilePatch, Register, UserView};
    }

    pub mod wallet {
        pub use api_types::wallet::{WalletNew, WalletPatch, WalletType, WalletView};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionNew, TransactionPatch, TransactionQuery, TransactionStatus,
            TransactionType, TransactionView,
        };
    }

    pub mod goal {
        pub use api_types::goal::{GoalNew, GoalPatch, GoalView};
    }

    pub mod fixed_expense {
        pub use api_types::fixed_expense::{
            FixedExpenseNew, FixedExpensePatch, FixedExpenseQuery, FixedExpenseView,
        };
    }

    pub mod summary {
        pub use api_types::summary::{CategoryTotal, SummaryQuery, SummaryView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    /// Malformed request (unparsable body, query or path).
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation { .. } => StatusCode::BAD_REQUEST,
        EngineError::Unauthorized => StatusCode::UNAUTHORIZED,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidAmount(_) | EngineError::CurrencyMismatch(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EngineError::Database(_) | EngineError::PasswordHash(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn body_for_engine_error(err: EngineError) -> Error {
    match err {
        EngineError::Validation { field, message } => Error {
            error: message,
            field: Some(field),
        },
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            Error {
                error: "internal server error".to_string(),
                field: None,
            }
        }
        EngineError::PasswordHash(msg) => {
            tracing::error!("password hashing error: {msg}");
            Error {
                error: "internal server error".to_string(),
                field: None,
            }
        }
        other => Error {
            error: other.to_string(),
            field: None,
        },
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic(error) => (StatusCode::BAD_REQUEST, Error { error, field: None }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_validation_maps_to_400() {
        let res = ServerError::from(EngineError::validation("amount", "must be positive"))
            .into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_unauthorized_maps_to_401() {
        let res = ServerError::from(EngineError::Unauthorized).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_amount_and_currency_map_to_422() {
        let res = ServerError::from(EngineError::InvalidAmount("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let res =
            ServerError::from(EngineError::CurrencyMismatch("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn password_hash_failure_maps_to_500() {
        let res = ServerError::from(EngineError::PasswordHash("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
