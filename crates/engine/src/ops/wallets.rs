use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};

use crate::{
    Currency, EngineError, NewWalletCmd, ResultEngine, Transaction, TransactionKind, Wallet,
    WalletPatch, ledger,
    transactions,
    util::{normalize_optional_text, normalize_required_text, require_balance_in_range},
    wallets,
};

use crate::commands::{DEFAULT_WALLET_COLOR, DEFAULT_WALLET_ICON};

use super::{Engine, with_tx};

impl Engine {
    /// Loads a wallet owned by `user_id` inside an open DB transaction.
    pub(super) async fn require_wallet(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        wallet_id: Uuid,
    ) -> ResultEngine<wallets::Model> {
        wallets::Entity::find_by_id(wallet_id)
            .filter(wallets::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("wallet not exists".to_string()))
    }

    /// Lists the user's wallets, newest first.
    pub async fn list_wallets(&self, user_id: Uuid) -> ResultEngine<Vec<Wallet>> {
        wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user_id))
            .order_by_desc(wallets::Column::CreatedAt)
            .order_by_desc(wallets::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Wallet::try_from)
            .collect()
    }

    /// Return a wallet snapshot from DB.
    pub async fn wallet(&self, user_id: Uuid, wallet_id: Uuid) -> ResultEngine<Wallet> {
        let model = wallets::Entity::find_by_id(wallet_id)
            .filter(wallets::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("wallet not exists".to_string()))?;
        Wallet::try_from(model)
    }

    /// Adds a new wallet.
    ///
    /// `balance_minor` becomes both the cached and the opening balance.
    pub async fn create_wallet(&self, user_id: Uuid, cmd: NewWalletCmd) -> ResultEngine<Wallet> {
        let name = normalize_required_text(&cmd.name, "name", 150)?;
        let balance = require_balance_in_range("balance", cmd.balance_minor.unwrap_or(0))?;
        let currency = match cmd.currency.as_deref() {
            Some(raw) => Currency::try_from(raw)?,
            None => Currency::default(),
        };
        let color = normalize_optional_text(cmd.color.as_deref())
            .unwrap_or_else(|| DEFAULT_WALLET_COLOR.into());
        let icon = normalize_optional_text(cmd.icon.as_deref())
            .unwrap_or_else(|| DEFAULT_WALLET_ICON.into());

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let now = Utc::now();
            let model = wallets::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(user_id),
                name: ActiveValue::Set(name),
                kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
                balance_minor: ActiveValue::Set(balance),
                opening_balance_minor: ActiveValue::Set(balance),
                currency: ActiveValue::Set(currency.code().to_string()),
                color: ActiveValue::Set(color),
                icon: ActiveValue::Set(icon),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            Wallet::try_from(model)
        })
    }

    /// Changes a wallet.
    ///
    /// An explicit `balance_minor` overrides the cached balance; the opening
    /// balance moves by the same delta so a later recompute reproduces it.
    pub async fn update_wallet(
        &self,
        user_id: Uuid,
        wallet_id: Uuid,
        patch: WalletPatch,
    ) -> ResultEngine<Wallet> {
        let mut active = wallets::ActiveModel {
            id: ActiveValue::Unchanged(wallet_id),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        if let Some(name) = patch.name.as_deref() {
            active.name = ActiveValue::Set(normalize_required_text(name, "name", 150)?);
        }
        if let Some(kind) = patch.kind {
            active.kind = ActiveValue::Set(kind.as_str().to_string());
        }
        let new_currency = patch
            .currency
            .as_deref()
            .map(Currency::try_from)
            .transpose()?;
        if let Some(color) = patch.color.as_deref() {
            active.color = ActiveValue::Set(normalize_required_text(color, "color", 50)?);
        }
        if let Some(icon) = patch.icon.as_deref() {
            active.icon = ActiveValue::Set(normalize_required_text(icon, "icon", 50)?);
        }
        let new_balance = patch
            .balance_minor
            .map(|balance| require_balance_in_range("balance", balance))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let current = self.require_wallet(&db_tx, user_id, wallet_id).await?;
            if let Some(currency) = new_currency
                && currency.code() != current.currency
            {
                // Both sides of a transfer share a currency.
                let transfer = transactions::Entity::find()
                    .filter(transactions::Column::Kind.eq(TransactionKind::Transfer.as_str()))
                    .filter(
                        Condition::any()
                            .add(transactions::Column::WalletId.eq(wallet_id))
                            .add(transactions::Column::ReceiverWalletId.eq(wallet_id)),
                    )
                    .one(&db_tx)
                    .await?;
                if transfer.is_some() {
                    return Err(EngineError::CurrencyMismatch(format!(
                        "wallet has transfers in {}, cannot switch to {}",
                        current.currency,
                        currency.code()
                    )));
                }
                active.currency = ActiveValue::Set(currency.code().to_string());
            }
            if let Some(balance) = new_balance {
                let delta = balance - current.balance_minor;
                active.balance_minor = ActiveValue::Set(balance);
                active.opening_balance_minor =
                    ActiveValue::Set(current.opening_balance_minor.saturating_add(delta));
            }
            let model = active.update(&db_tx).await?;
            Wallet::try_from(model)
        })
    }

    /// Deletes a wallet and every transaction that references it.
    ///
    /// Transfers between this wallet and another one are reversed on the
    /// other wallet before being removed.
    pub async fn delete_wallet(&self, user_id: Uuid, wallet_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_wallet(&db_tx, user_id, wallet_id).await?;

            let tx_models = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .filter(
                    Condition::any()
                        .add(transactions::Column::WalletId.eq(wallet_id))
                        .add(transactions::Column::ReceiverWalletId.eq(wallet_id)),
                )
                .all(&db_tx)
                .await?;

            let mut reversal = Vec::new();
            let mut ids = Vec::with_capacity(tx_models.len());
            for model in tx_models {
                let tx = Transaction::try_from(model)?;
                ids.push(tx.id);
                reversal.extend(
                    posting_of(&tx)
                        .reversal()?
                        .into_iter()
                        .filter(|effect| effect.wallet_id != wallet_id),
                );
            }

            self.apply_effects(&db_tx, user_id, &ledger::merge(reversal))
                .await?;

            if !ids.is_empty() {
                transactions::Entity::delete_many()
                    .filter(transactions::Column::Id.is_in(ids))
                    .exec(&db_tx)
                    .await?;
            }
            wallets::Entity::delete_by_id(wallet_id).exec(&db_tx).await?;
            Ok(())
        })
    }
}

pub(super) fn posting_of(tx: &Transaction) -> ledger::Posting {
    ledger::Posting {
        kind: tx.kind,
        amount_minor: tx.amount_minor,
        wallet_id: tx.wallet_id,
        receiver_wallet_id: tx.receiver_wallet_id,
    }
}
