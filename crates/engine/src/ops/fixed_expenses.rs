use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveValue, Order, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Currency, EngineError, FixedExpense, FixedExpenseListFilter, FixedExpenseOrderField,
    FixedExpensePatch, NewFixedExpenseCmd, ResultEngine, fixed_expenses,
    util::{normalize_optional_text, normalize_required_text, require_positive_amount},
};

use super::{Engine, with_tx};

impl Engine {
    /// Lists fixed expenses matching `filter`, newest first by default.
    pub async fn list_fixed_expenses(
        &self,
        user_id: Uuid,
        filter: &FixedExpenseListFilter,
    ) -> ResultEngine<Vec<FixedExpense>> {
        let mut query =
            fixed_expenses::Entity::find().filter(fixed_expenses::Column::UserId.eq(user_id));
        if let Some(periodicity) = filter.periodicity {
            query = query.filter(fixed_expenses::Column::Periodicity.eq(periodicity.as_str()));
        }
        if let Some(currency) = filter.currency.as_deref() {
            let currency = Currency::try_from(currency)?;
            query = query.filter(fixed_expenses::Column::Currency.eq(currency.code()));
        }
        if let Some(search) = normalize_optional_text(filter.search.as_deref()) {
            query = query.filter(fixed_expenses::Column::Name.contains(search.as_str()));
        }

        if filter.ordering.is_empty() {
            query = query.order_by_desc(fixed_expenses::Column::CreatedAt);
        }
        for key in &filter.ordering {
            let column = match key.field {
                FixedExpenseOrderField::Amount => fixed_expenses::Column::AmountMinor,
                FixedExpenseOrderField::StartDate => fixed_expenses::Column::StartDate,
                FixedExpenseOrderField::CreatedAt => fixed_expenses::Column::CreatedAt,
            };
            let order = if key.descending {
                Order::Desc
            } else {
                Order::Asc
            };
            query = query.order_by(column, order);
        }

        query
            .order_by_asc(fixed_expenses::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(FixedExpense::try_from)
            .collect()
    }

    pub async fn fixed_expense(
        &self,
        user_id: Uuid,
        expense_id: Uuid,
    ) -> ResultEngine<FixedExpense> {
        let model = fixed_expenses::Entity::find_by_id(expense_id)
            .filter(fixed_expenses::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("fixed expense not exists".to_string()))?;
        FixedExpense::try_from(model)
    }

    pub async fn create_fixed_expense(
        &self,
        user_id: Uuid,
        cmd: NewFixedExpenseCmd,
    ) -> ResultEngine<FixedExpense> {
        let name = normalize_required_text(&cmd.name, "name", 150)?;
        let amount = require_positive_amount("amount", cmd.amount_minor)?;
        let currency = match cmd.currency.as_deref() {
            Some(raw) => Currency::try_from(raw)?,
            None => Currency::default(),
        };

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let now = Utc::now();
            let model = fixed_expenses::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(user_id),
                name: ActiveValue::Set(name),
                amount_minor: ActiveValue::Set(amount),
                currency: ActiveValue::Set(currency.code().to_string()),
                periodicity: ActiveValue::Set(
                    cmd.periodicity.unwrap_or_default().as_str().to_string(),
                ),
                start_date: ActiveValue::Set(cmd.start_date),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            FixedExpense::try_from(model)
        })
    }

    pub async fn update_fixed_expense(
        &self,
        user_id: Uuid,
        expense_id: Uuid,
        patch: FixedExpensePatch,
    ) -> ResultEngine<FixedExpense> {
        let mut active = fixed_expenses::ActiveModel {
            id: ActiveValue::Unchanged(expense_id),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        if let Some(name) = patch.name.as_deref() {
            active.name = ActiveValue::Set(normalize_required_text(name, "name", 150)?);
        }
        if let Some(amount) = patch.amount_minor {
            active.amount_minor = ActiveValue::Set(require_positive_amount("amount", amount)?);
        }
        if let Some(currency) = patch.currency.as_deref() {
            active.currency = ActiveValue::Set(Currency::try_from(currency)?.code().to_string());
        }
        if let Some(periodicity) = patch.periodicity {
            active.periodicity = ActiveValue::Set(periodicity.as_str().to_string());
        }
        if let Some(start_date) = patch.start_date {
            active.start_date = ActiveValue::Set(start_date);
        }

        with_tx!(self, |db_tx| {
            fixed_expenses::Entity::find_by_id(expense_id)
                .filter(fixed_expenses::Column::UserId.eq(user_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("fixed expense not exists".to_string()))?;
            FixedExpense::try_from(active.update(&db_tx).await?)
        })
    }

    pub async fn delete_fixed_expense(&self, user_id: Uuid, expense_id: Uuid) -> ResultEngine<()> {
        let result = fixed_expenses::Entity::delete_many()
            .filter(fixed_expenses::Column::Id.eq(expense_id))
            .filter(fixed_expenses::Column::UserId.eq(user_id))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(
                "fixed expense not exists".to_string(),
            ));
        }
        Ok(())
    }
}
