use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    Effect, EngineError, ResultEngine, Transaction, Wallet, transactions,
    util::require_balance_in_range, wallets,
};

use super::{Engine, wallets::posting_of, with_tx};

impl Engine {
    /// Applies balance effects to the user's wallets.
    ///
    /// Each effect is a single `balance = balance + delta` statement, so
    /// concurrent writers never overwrite each other's changes. A wallet
    /// pushed out of range aborts the surrounding DB transaction.
    pub(super) async fn apply_effects(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        effects: &[Effect],
    ) -> ResultEngine<()> {
        let now = Utc::now();
        for effect in effects {
            let result = wallets::Entity::update_many()
                .col_expr(
                    wallets::Column::BalanceMinor,
                    Expr::col(wallets::Column::BalanceMinor).add(effect.delta_minor),
                )
                .col_expr(wallets::Column::UpdatedAt, Expr::value(now))
                .filter(wallets::Column::Id.eq(effect.wallet_id))
                .filter(wallets::Column::UserId.eq(user_id))
                .exec(db)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::KeyNotFound("wallet not exists".to_string()));
            }

            let wallet = self.require_wallet(db, user_id, effect.wallet_id).await?;
            require_balance_in_range("balance", wallet.balance_minor)?;
        }
        Ok(())
    }

    /// Rebuilds every cached wallet balance of a user from the ledger.
    ///
    /// A wallet balance is its opening balance plus the effects of every
    /// transaction that references it. Wallets whose cached value drifted
    /// are rewritten.
    pub async fn recompute_balances(&self, user_id: Uuid) -> ResultEngine<Vec<Wallet>> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let wallet_models = wallets::Entity::find()
                .filter(wallets::Column::UserId.eq(user_id))
                .order_by_desc(wallets::Column::CreatedAt)
                .order_by_desc(wallets::Column::Id)
                .all(&db_tx)
                .await?;
            let mut expected: HashMap<Uuid, i64> = wallet_models
                .iter()
                .map(|model| (model.id, model.opening_balance_minor))
                .collect();

            let tx_models = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .all(&db_tx)
                .await?;
            for model in tx_models {
                let tx = Transaction::try_from(model)?;
                for effect in posting_of(&tx).effects()? {
                    let balance = expected.get_mut(&effect.wallet_id).ok_or_else(|| {
                        EngineError::KeyNotFound("wallet not exists".to_string())
                    })?;
                    *balance += effect.delta_minor;
                }
            }

            let now = Utc::now();
            let mut wallets_out = Vec::with_capacity(wallet_models.len());
            for model in wallet_models {
                let balance = expected.get(&model.id).copied().unwrap_or_default();
                if balance == model.balance_minor {
                    wallets_out.push(Wallet::try_from(model)?);
                    continue;
                }
                require_balance_in_range("balance", balance)?;
                tracing::warn!(
                    wallet_id = %model.id,
                    cached = model.balance_minor,
                    recomputed = balance,
                    "wallet balance drifted, rewriting"
                );
                let mut active: wallets::ActiveModel = model.into();
                active.balance_minor = sea_orm::ActiveValue::Set(balance);
                active.updated_at = sea_orm::ActiveValue::Set(now);
                wallets_out.push(Wallet::try_from(active.update(&db_tx).await?)?);
            }

            Ok(wallets_out)
        })
    }
}
