//! The module contains `Wallet` struct and its persistence model.

use chrono::{DateTime, Utc};

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError};

/// What kind of account a wallet represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    Checking,
    Savings,
    Credit,
    Investment,
    Cash,
}

impl WalletKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::Credit => "credit",
            Self::Investment => "investment",
            Self::Cash => "cash",
        }
    }
}

impl TryFrom<&str> for WalletKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "credit" => Ok(Self::Credit),
            "investment" => Ok(Self::Investment),
            "cash" => Ok(Self::Cash),
            other => Err(EngineError::validation(
                "type",
                format!("invalid wallet type: {other}"),
            )),
        }
    }
}

/// A wallet.
///
/// A wallet is a bank account, a card, a pile of cash: anywhere money is
/// kept. `balance_minor` is a cached value; the authoritative balance is
/// `opening_balance_minor` plus the effects of every transaction that
/// references the wallet (see [`crate::ledger`]).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub kind: WalletKind,
    pub balance_minor: i64,
    pub opening_balance_minor: i64,
    pub currency: Currency,
    pub color: String,
    pub icon: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub kind: String,
    pub balance_minor: i64,
    pub opening_balance_minor: i64,
    pub currency: String,
    pub color: String,
    pub icon: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Wallet {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            kind: WalletKind::try_from(model.kind.as_str())?,
            balance_minor: model.balance_minor,
            opening_balance_minor: model.opening_balance_minor,
            currency: Currency::try_from(model.currency.as_str())?,
            color: model.color,
            icon: model.icon,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_storage_string() {
        for kind in [
            WalletKind::Checking,
            WalletKind::Savings,
            WalletKind::Credit,
            WalletKind::Investment,
            WalletKind::Cash,
        ] {
            assert_eq!(WalletKind::try_from(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_a_validation_error() {
        assert_eq!(
            WalletKind::try_from("piggy_bank").unwrap_err(),
            EngineError::validation("type", "invalid wallet type: piggy_bank")
        );
    }
}
