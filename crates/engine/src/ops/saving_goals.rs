use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, NewSavingGoalCmd, ResultEngine, SavingGoal, SavingGoalPatch, saving_goals,
    util::{normalize_optional_text, normalize_required_text, require_non_negative_amount},
};

use crate::commands::DEFAULT_GOAL_COLOR;

use super::{Engine, with_tx};

impl Engine {
    /// Lists saving goals, nearest deadline first.
    pub async fn list_saving_goals(&self, user_id: Uuid) -> ResultEngine<Vec<SavingGoal>> {
        saving_goals::Entity::find()
            .filter(saving_goals::Column::UserId.eq(user_id))
            .order_by_asc(saving_goals::Column::Deadline)
            .order_by_asc(saving_goals::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(SavingGoal::try_from)
            .collect()
    }

    pub async fn saving_goal(&self, user_id: Uuid, goal_id: Uuid) -> ResultEngine<SavingGoal> {
        let model = saving_goals::Entity::find_by_id(goal_id)
            .filter(saving_goals::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("saving goal not exists".to_string()))?;
        SavingGoal::try_from(model)
    }

    pub async fn create_saving_goal(
        &self,
        user_id: Uuid,
        cmd: NewSavingGoalCmd,
    ) -> ResultEngine<SavingGoal> {
        let name = normalize_required_text(&cmd.name, "name", 150)?;
        let target = require_non_negative_amount("target_amount", cmd.target_amount_minor)?;
        let current = require_non_negative_amount(
            "current_amount",
            cmd.current_amount_minor.unwrap_or(0),
        )?;
        let color = normalize_optional_text(cmd.color.as_deref())
            .unwrap_or_else(|| DEFAULT_GOAL_COLOR.into());

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let now = Utc::now();
            let model = saving_goals::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(user_id),
                name: ActiveValue::Set(name),
                target_amount_minor: ActiveValue::Set(target),
                current_amount_minor: ActiveValue::Set(current),
                deadline: ActiveValue::Set(cmd.deadline),
                color: ActiveValue::Set(color),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            SavingGoal::try_from(model)
        })
    }

    pub async fn update_saving_goal(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        patch: SavingGoalPatch,
    ) -> ResultEngine<SavingGoal> {
        let mut active = saving_goals::ActiveModel {
            id: ActiveValue::Unchanged(goal_id),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        if let Some(name) = patch.name.as_deref() {
            active.name = ActiveValue::Set(normalize_required_text(name, "name", 150)?);
        }
        if let Some(target) = patch.target_amount_minor {
            active.target_amount_minor =
                ActiveValue::Set(require_non_negative_amount("target_amount", target)?);
        }
        if let Some(current) = patch.current_amount_minor {
            active.current_amount_minor =
                ActiveValue::Set(require_non_negative_amount("current_amount", current)?);
        }
        if let Some(deadline) = patch.deadline {
            active.deadline = ActiveValue::Set(deadline);
        }
        if let Some(color) = patch.color.as_deref() {
            active.color = ActiveValue::Set(normalize_required_text(color, "color", 50)?);
        }

        with_tx!(self, |db_tx| {
            saving_goals::Entity::find_by_id(goal_id)
                .filter(saving_goals::Column::UserId.eq(user_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("saving goal not exists".to_string()))?;
            SavingGoal::try_from(active.update(&db_tx).await?)
        })
    }

    pub async fn delete_saving_goal(&self, user_id: Uuid, goal_id: Uuid) -> ResultEngine<()> {
        let result = saving_goals::Entity::delete_many()
            .filter(saving_goals::Column::Id.eq(goal_id))
            .filter(saving_goals::Column::UserId.eq(user_id))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(
                "saving goal not exists".to_string(),
            ));
        }
        Ok(())
    }
}
