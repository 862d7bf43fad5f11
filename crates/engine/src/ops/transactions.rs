use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, Order, QueryFilter, QueryOrder, Select,
    TransactionTrait, prelude::*,
};

use crate::{
    EngineError, NewTransactionCmd, ResultEngine, SortKey, Transaction, TransactionKind,
    TransactionListFilter, TransactionOrderField, TransactionPatch, ledger,
    ledger::Posting,
    transactions,
    util::{normalize_optional_text, normalize_required_text, require_positive_amount},
};

use super::{Engine, wallets::posting_of, with_tx};

use crate::commands::DEFAULT_TRANSACTION_ICON as DEFAULT_ICON;

trait ApplyTxFilters {
    fn apply_filters(self, filter: &TransactionListFilter) -> Self;
    fn apply_ordering(self, ordering: &[SortKey<TransactionOrderField>]) -> Self;
}

impl ApplyTxFilters for Select<transactions::Entity> {
    fn apply_filters(mut self, filter: &TransactionListFilter) -> Self {
        if let Some(wallet_id) = filter.wallet_id {
            self = self.filter(
                Condition::any()
                    .add(transactions::Column::WalletId.eq(wallet_id))
                    .add(transactions::Column::ReceiverWalletId.eq(wallet_id)),
            );
        }
        if let Some(kind) = filter.kind {
            self = self.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(category) = filter.category.as_deref() {
            self = self.filter(transactions::Column::Category.eq(category));
        }
        if let Some(status) = filter.status {
            self = self.filter(transactions::Column::Status.eq(status.as_str()));
        }
        if let Some(search) = normalize_optional_text(filter.search.as_deref()) {
            // SQLite LIKE is case-insensitive for ASCII.
            self = self.filter(
                Condition::any()
                    .add(transactions::Column::Name.contains(search.as_str()))
                    .add(transactions::Column::Category.contains(search.as_str())),
            );
        }
        self
    }

    fn apply_ordering(mut self, ordering: &[SortKey<TransactionOrderField>]) -> Self {
        let default = [
            SortKey::desc(TransactionOrderField::Date),
            SortKey::desc(TransactionOrderField::CreatedAt),
        ];
        let keys = if ordering.is_empty() {
            &default[..]
        } else {
            ordering
        };
        for key in keys {
            let column = match key.field {
                TransactionOrderField::Date => transactions::Column::Date,
                TransactionOrderField::Amount => transactions::Column::AmountMinor,
                TransactionOrderField::CreatedAt => transactions::Column::CreatedAt,
            };
            let order = if key.descending {
                Order::Desc
            } else {
                Order::Asc
            };
            self = self.order_by(column, order);
        }
        self.order_by_asc(transactions::Column::Id)
    }
}

/// Normalized writable fields of a transaction.
struct TxFields {
    posting: Posting,
    name: String,
    category: String,
    status: String,
    date: chrono::DateTime<Utc>,
    icon: String,
}

fn validate_fields(cmd: NewTransactionCmd) -> ResultEngine<TxFields> {
    let posting = Posting {
        kind: cmd.kind,
        amount_minor: require_positive_amount("amount", cmd.amount_minor)?,
        wallet_id: cmd.wallet_id,
        receiver_wallet_id: cmd.receiver_wallet_id,
    };
    posting.validate()?;
    Ok(TxFields {
        posting,
        name: normalize_required_text(&cmd.name, "name", 255)?,
        category: normalize_required_text(&cmd.category, "category", 100)?,
        status: cmd.status.unwrap_or_default().as_str().to_string(),
        date: cmd.date,
        icon: normalize_optional_text(cmd.icon.as_deref())
            .unwrap_or_else(|| DEFAULT_ICON.to_string()),
    })
}

/// Overlays a patch on the stored transaction, producing a full command.
fn merge_patch(current: &Transaction, patch: TransactionPatch) -> NewTransactionCmd {
    let kind = patch.kind.unwrap_or(current.kind);
    let receiver_wallet_id = match patch.receiver_wallet_id {
        Some(receiver) => receiver,
        None if kind != TransactionKind::Transfer => None,
        None => current.receiver_wallet_id,
    };
    NewTransactionCmd {
        wallet_id: patch.wallet_id.unwrap_or(current.wallet_id),
        receiver_wallet_id,
        name: patch.name.unwrap_or_else(|| current.name.clone()),
        amount_minor: patch.amount_minor.unwrap_or(current.amount_minor),
        category: patch.category.unwrap_or_else(|| current.category.clone()),
        kind,
        status: Some(patch.status.unwrap_or(current.status)),
        date: patch.date.unwrap_or(current.date),
        icon: Some(patch.icon.unwrap_or_else(|| current.icon.clone())),
    }
}

impl Engine {
    /// Checks the posting's wallets belong to the user and share a currency.
    async fn check_posting_wallets(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        posting: &Posting,
    ) -> ResultEngine<()> {
        let source = self.require_wallet(db, user_id, posting.wallet_id).await?;
        if let Some(receiver_id) = posting.receiver_wallet_id {
            let receiver = self.require_wallet(db, user_id, receiver_id).await?;
            if receiver.currency != source.currency {
                return Err(EngineError::CurrencyMismatch(format!(
                    "cannot transfer from {} to {}",
                    source.currency, receiver.currency
                )));
            }
        }
        Ok(())
    }

    async fn require_transaction(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        let model = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        Transaction::try_from(model)
    }

    /// Lists transactions matching `filter`.
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .apply_filters(filter)
            .apply_ordering(&filter.ordering)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    pub async fn transaction(&self, user_id: Uuid, transaction_id: Uuid) -> ResultEngine<Transaction> {
        let model = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        Transaction::try_from(model)
    }

    /// Records a transaction and applies its effects to the wallet balances.
    pub async fn create_transaction(
        &self,
        user_id: Uuid,
        cmd: NewTransactionCmd,
    ) -> ResultEngine<Transaction> {
        let fields = validate_fields(cmd)?;

        with_tx!(self, |db_tx| {
            self.check_posting_wallets(&db_tx, user_id, &fields.posting)
                .await?;

            let now = Utc::now();
            let model = transactions::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(user_id),
                wallet_id: ActiveValue::Set(fields.posting.wallet_id),
                receiver_wallet_id: ActiveValue::Set(fields.posting.receiver_wallet_id),
                name: ActiveValue::Set(fields.name),
                amount_minor: ActiveValue::Set(fields.posting.amount_minor),
                category: ActiveValue::Set(fields.category),
                kind: ActiveValue::Set(fields.posting.kind.as_str().to_string()),
                status: ActiveValue::Set(fields.status),
                date: ActiveValue::Set(fields.date),
                icon: ActiveValue::Set(fields.icon),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            let effects = ledger::merge(fields.posting.effects()?);
            tracing::debug!(transaction_id = %model.id, ?effects, "applying effects");
            self.apply_effects(&db_tx, user_id, &effects).await?;

            Transaction::try_from(model)
        })
    }

    /// Changes a transaction.
    ///
    /// The stored effects are reversed and the new ones applied as a single
    /// net delta per wallet.
    pub async fn update_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
        patch: TransactionPatch,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let current = self
                .require_transaction(&db_tx, user_id, transaction_id)
                .await?;
            let fields = validate_fields(merge_patch(&current, patch))?;
            self.check_posting_wallets(&db_tx, user_id, &fields.posting)
                .await?;

            let effects = ledger::net_change(&posting_of(&current), &fields.posting)?;
            tracing::debug!(transaction_id = %transaction_id, ?effects, "applying net change");
            self.apply_effects(&db_tx, user_id, &effects).await?;

            let model = transactions::ActiveModel {
                id: ActiveValue::Unchanged(transaction_id),
                wallet_id: ActiveValue::Set(fields.posting.wallet_id),
                receiver_wallet_id: ActiveValue::Set(fields.posting.receiver_wallet_id),
                name: ActiveValue::Set(fields.name),
                amount_minor: ActiveValue::Set(fields.posting.amount_minor),
                category: ActiveValue::Set(fields.category),
                kind: ActiveValue::Set(fields.posting.kind.as_str().to_string()),
                status: ActiveValue::Set(fields.status),
                date: ActiveValue::Set(fields.date),
                icon: ActiveValue::Set(fields.icon),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Transaction::try_from(model)
        })
    }

    /// Deletes a transaction, reversing its effects on every wallet it touched.
    pub async fn delete_transaction(&self, user_id: Uuid, transaction_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let current = self
                .require_transaction(&db_tx, user_id, transaction_id)
                .await?;

            let effects = ledger::merge(posting_of(&current).reversal()?);
            self.apply_effects(&db_tx, user_id, &effects).await?;

            transactions::Entity::delete_by_id(transaction_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
