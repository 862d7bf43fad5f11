//! Saving goals: a target amount to reach before a deadline.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingGoal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub target_amount_minor: i64,
    pub current_amount_minor: i64,
    pub deadline: NaiveDate,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavingGoal {
    /// Progress toward the target, in percent.
    ///
    /// Returns 0 when the target is not positive. Not clamped: a goal past
    /// its target reports more than 100.
    pub fn progress_percentage(&self) -> f64 {
        progress_percentage(self.current_amount_minor, self.target_amount_minor)
    }
}

pub fn progress_percentage(current_minor: i64, target_minor: i64) -> f64 {
    if target_minor <= 0 {
        return 0.0;
    }
    current_minor as f64 / target_minor as f64 * 100.0
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "saving_goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub target_amount_minor: i64,
    pub current_amount_minor: i64,
    pub deadline: Date,
    pub color: String,
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

impl TryFrom<Model> for SavingGoal {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            target_amount_minor: model.target_amount_minor,
            current_amount_minor: model.current_amount_minor,
            deadline: model.deadline,
            color: model.color,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_target_has_zero_progress() {
        assert_eq!(progress_percentage(0, 0), 0.0);
        assert_eq!(progress_percentage(5_000, 0), 0.0);
    }

    #[test]
    fn quarter_of_target() {
        assert_eq!(progress_percentage(5_000, 20_000), 25.0);
    }

    #[test]
    fn over_target_is_not_clamped() {
        assert_eq!(progress_percentage(300, 200), 150.0);
    }
}
