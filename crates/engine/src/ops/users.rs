use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, SqlErr, TransactionTrait, prelude::*,
};

use crate::{
    Currency, EngineError, ProfilePatch, RegisterUserCmd, ResultEngine, User, fixed_expenses,
    saving_goals, transactions, users,
    util::{
        normalize_avatar_url, normalize_email, normalize_language, normalize_required_text,
        require_balance_in_range,
    },
    wallets,
};

use super::{Engine, with_tx};

fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::PasswordHash(err.to_string()))
}

fn verify_password(password: &str, stored: &str) -> ResultEngine<bool> {
    let parsed =
        PasswordHash::new(stored).map_err(|err| EngineError::PasswordHash(err.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Runs CPU-heavy password work on the blocking pool, off the async workers.
async fn run_blocking<T, F>(work: F) -> ResultEngine<T>
where
    T: Send + 'static,
    F: FnOnce() -> ResultEngine<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| EngineError::PasswordHash(err.to_string()))?
}

/// Turns a unique index violation into [`EngineError::ExistingKey`].
///
/// Covers the window between the uniqueness lookup and the insert.
fn existing_key_on_conflict(err: DbErr, key: &str) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => EngineError::ExistingKey(key.to_string()),
        _ => EngineError::Database(err),
    }
}

impl Engine {
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Registers a new user.
    ///
    /// The email is the login key and must be unique (case-insensitive), as
    /// must the username.
    pub async fn register_user(&self, cmd: RegisterUserCmd) -> ResultEngine<User> {
        let email = normalize_email(&cmd.email)?;
        let username = normalize_required_text(&cmd.username, "username", 150)?;
        let name = normalize_required_text(&cmd.name, "name", 150)?;
        if cmd.password.is_empty() {
            return Err(EngineError::validation("password", "must not be empty"));
        }
        if cmd.password != cmd.password_confirm {
            return Err(EngineError::validation("password", "passwords do not match"));
        }
        let currency = match cmd.currency.as_deref() {
            Some(raw) => Currency::try_from(raw)?,
            None => Currency::default(),
        };
        let language = match cmd.language.as_deref() {
            Some(raw) => normalize_language(raw)?,
            None => "fr".to_string(),
        };
        let password = cmd.password;
        let password_hash = run_blocking(move || hash_password(&password)).await?;

        with_tx!(self, |db_tx| {
            let email_taken = users::Entity::find()
                .filter(users::Column::Email.eq(email.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if email_taken {
                return Err(EngineError::ExistingKey(email));
            }
            let username_taken = users::Entity::find()
                .filter(users::Column::Username.eq(username.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if username_taken {
                return Err(EngineError::ExistingKey(username));
            }

            let now = Utc::now();
            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                email: ActiveValue::Set(email.clone()),
                username: ActiveValue::Set(username),
                name: ActiveValue::Set(name),
                password_hash: ActiveValue::Set(password_hash),
                avatar_url: ActiveValue::Set(None),
                currency: ActiveValue::Set(currency.code().to_string()),
                language: ActiveValue::Set(language),
                monthly_income_minor: ActiveValue::Set(0),
                income_frequency: ActiveValue::Set(crate::Periodicity::Monthly.as_str().to_string()),
                is_staff: ActiveValue::Set(cmd.is_superuser),
                is_superuser: ActiveValue::Set(cmd.is_superuser),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| existing_key_on_conflict(err, &email))?;

            tracing::info!(user_id = %model.id, "registered user");
            User::try_from(model)
        })
    }

    /// Checks an email/password pair and returns the matching user.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the
    /// caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<User> {
        let email = email.trim().to_lowercase();
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .ok_or(EngineError::Unauthorized)?;

        let password = password.to_string();
        let stored = model.password_hash.clone();
        if !run_blocking(move || verify_password(&password, &stored)).await? {
            return Err(EngineError::Unauthorized);
        }
        User::try_from(model)
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        User::try_from(model)
    }

    pub async fn user_by_email(&self, email: &str) -> ResultEngine<Option<User>> {
        let email = email.trim().to_lowercase();
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .map(User::try_from)
            .transpose()
    }

    /// Applies a profile patch. Email, username and timestamps are read-only.
    pub async fn update_profile(&self, user_id: Uuid, patch: ProfilePatch) -> ResultEngine<User> {
        let mut active = users::ActiveModel {
            id: ActiveValue::Unchanged(user_id),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        if let Some(name) = patch.name.as_deref() {
            active.name = ActiveValue::Set(normalize_required_text(name, "name", 150)?);
        }
        if let Some(avatar_url) = patch.avatar_url {
            active.avatar_url = ActiveValue::Set(normalize_avatar_url(avatar_url.as_deref())?);
        }
        if let Some(currency) = patch.currency.as_deref() {
            active.currency = ActiveValue::Set(Currency::try_from(currency)?.code().to_string());
        }
        if let Some(language) = patch.language.as_deref() {
            active.language = ActiveValue::Set(normalize_language(language)?);
        }
        if let Some(income) = patch.monthly_income_minor {
            if income < 0 {
                return Err(EngineError::validation(
                    "monthly_income",
                    "must not be negative",
                ));
            }
            active.monthly_income_minor =
                ActiveValue::Set(require_balance_in_range("monthly_income", income)?);
        }
        if let Some(frequency) = patch.income_frequency {
            active.income_frequency = ActiveValue::Set(frequency.as_str().to_string());
        }

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let model = active.update(&db_tx).await?;
            User::try_from(model)
        })
    }

    /// Deletes a user and everything they own.
    pub async fn delete_user(&self, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            // Children first: SQLite only cascades when foreign keys are on.
            transactions::Entity::delete_many()
                .filter(transactions::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            wallets::Entity::delete_many()
                .filter(wallets::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            saving_goals::Entity::delete_many()
                .filter(saving_goals::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            fixed_expenses::Entity::delete_many()
                .filter(fixed_expenses::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(user_id).exec(&db_tx).await?;

            tracing::info!(user_id = %user_id, "deleted user");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies_only_the_original() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn password_work_leaves_the_runtime_thread() {
        let runtime_thread = std::thread::current().id();
        let worker_thread = run_blocking(|| Ok(std::thread::current().id()))
            .await
            .unwrap();
        assert_ne!(worker_thread, runtime_thread);
    }

    fn user_row(email: &str, username: &str) -> users::ActiveModel {
        let now = Utc::now();
        users::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            email: ActiveValue::Set(email.to_string()),
            username: ActiveValue::Set(username.to_string()),
            name: ActiveValue::Set("Ann".to_string()),
            password_hash: ActiveValue::Set("x".to_string()),
            avatar_url: ActiveValue::Set(None),
            currency: ActiveValue::Set("USD".to_string()),
            language: ActiveValue::Set("fr".to_string()),
            monthly_income_minor: ActiveValue::Set(0),
            income_frequency: ActiveValue::Set("monthly".to_string()),
            is_staff: ActiveValue::Set(false),
            is_superuser: ActiveValue::Set(false),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
    }

    #[tokio::test]
    async fn unique_index_violation_maps_to_existing_key() {
        use migration::{Migrator, MigratorTrait};

        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        user_row("ann@example.com", "ann").insert(&db).await.unwrap();
        let err = user_row("ann@example.com", "ann2")
            .insert(&db)
            .await
            .unwrap_err();

        assert_eq!(
            existing_key_on_conflict(err, "ann@example.com"),
            EngineError::ExistingKey("ann@example.com".to_string())
        );
    }

    #[test]
    fn other_database_errors_pass_through() {
        let err = existing_key_on_conflict(DbErr::Custom("boom".to_string()), "k");
        assert!(matches!(err, EngineError::Database(_)));
    }
}
