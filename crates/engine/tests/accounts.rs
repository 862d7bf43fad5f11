use chrono::{NaiveDate, TimeZone, Utc};
use sea_orm::{Database, EntityTrait, PaginatorTrait};

use engine::{
    Engine, EngineError, FixedExpenseListFilter, FixedExpenseOrderField, FixedExpensePatch,
    NewFixedExpenseCmd, NewSavingGoalCmd, NewTransactionCmd, NewWalletCmd, Periodicity,
    ProfilePatch, RegisterUserCmd, SavingGoalPatch, User, WalletKind, WalletPatch,
    parse_ordering,
};
use migration::MigratorTrait;

async fn engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn register(engine: &Engine, name: &str) -> User {
    engine
        .register_user(RegisterUserCmd::new(
            format!("{name}@example.com"),
            name,
            name,
            "password",
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn registration_enforces_unique_email_and_username() {
    let engine = engine().await;
    let alice = register(&engine, "alice").await;
    assert_eq!(alice.currency.code(), "USD");
    assert!(!alice.is_superuser);

    let dup_email = RegisterUserCmd::new("ALICE@example.com", "alice2", "Alice", "pw");
    assert!(matches!(
        engine.register_user(dup_email).await,
        Err(EngineError::ExistingKey(_))
    ));

    let dup_username = RegisterUserCmd::new("other@example.com", "alice", "Alice", "pw");
    assert!(matches!(
        engine.register_user(dup_username).await,
        Err(EngineError::ExistingKey(_))
    ));

    let mut mismatch = RegisterUserCmd::new("carol@example.com", "carol", "Carol", "pw");
    mismatch.password_confirm = "other".to_string();
    assert_eq!(
        engine.register_user(mismatch).await.unwrap_err(),
        EngineError::validation("password", "passwords do not match")
    );
}

#[tokio::test]
async fn authenticate_checks_password() {
    let engine = engine().await;
    let alice = register(&engine, "alice").await;

    let found = engine
        .authenticate(" Alice@Example.com ", "password")
        .await
        .unwrap();
    assert_eq!(found.id, alice.id);

    assert_eq!(
        engine
            .authenticate("alice@example.com", "nope")
            .await
            .unwrap_err(),
        EngineError::Unauthorized
    );
    assert_eq!(
        engine
            .authenticate("ghost@example.com", "password")
            .await
            .unwrap_err(),
        EngineError::Unauthorized
    );
}

#[tokio::test]
async fn profile_patch_updates_only_given_fields() {
    let engine = engine().await;
    let alice = register(&engine, "alice").await;

    let updated = engine
        .update_profile(
            alice.id,
            ProfilePatch {
                monthly_income_minor: Some(520_000),
                income_frequency: Some(Periodicity::Yearly),
                avatar_url: Some(Some("https://example.com/a.png".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "alice");
    assert_eq!(updated.email, "alice@example.com");
    assert_eq!(updated.monthly_income_minor, 520_000);
    assert_eq!(updated.income_frequency, Periodicity::Yearly);
    assert_eq!(
        updated.avatar_url.as_deref(),
        Some("https://example.com/a.png")
    );

    let err = engine
        .update_profile(
            alice.id,
            ProfilePatch {
                avatar_url: Some(Some("ftp://example.com".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { field, .. } if field == "avatar_url"));
}

#[tokio::test]
async fn wallet_defaults_and_balance_override() {
    let engine = engine().await;
    let alice = register(&engine, "alice").await;

    let wallet = engine
        .create_wallet(
            alice.id,
            NewWalletCmd::new("Main", WalletKind::Checking).balance_minor(1_000),
        )
        .await
        .unwrap();
    assert_eq!(wallet.color, "blue");
    assert_eq!(wallet.icon, "account_balance");
    assert_eq!(wallet.currency.code(), "USD");
    assert_eq!(wallet.opening_balance_minor, 1_000);

    engine
        .create_transaction(
            alice.id,
            NewTransactionCmd::income(wallet.id, 500, Utc::now()),
        )
        .await
        .unwrap();

    let updated = engine
        .update_wallet(
            alice.id,
            wallet.id,
            WalletPatch {
                balance_minor: Some(2_000),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.balance_minor, 2_000);
    assert_eq!(updated.opening_balance_minor, 1_500);

    // The override survives a recompute.
    engine.recompute_balances(alice.id).await.unwrap();
    assert_eq!(
        engine
            .wallet(alice.id, wallet.id)
            .await
            .unwrap()
            .balance_minor,
        2_000
    );
}

#[tokio::test]
async fn deleting_wallet_reverses_counterpart_transfers() {
    let engine = engine().await;
    let alice = register(&engine, "alice").await;
    let a = engine
        .create_wallet(
            alice.id,
            NewWalletCmd::new("A", WalletKind::Checking).balance_minor(1_000),
        )
        .await
        .unwrap()
        .id;
    let b = engine
        .create_wallet(alice.id, NewWalletCmd::new("B", WalletKind::Savings))
        .await
        .unwrap()
        .id;

    engine
        .create_transaction(alice.id, NewTransactionCmd::transfer(a, b, 300, Utc::now()))
        .await
        .unwrap();
    engine
        .create_transaction(alice.id, NewTransactionCmd::transfer(b, a, 100, Utc::now()))
        .await
        .unwrap();

    engine.delete_wallet(alice.id, b).await.unwrap();

    assert_eq!(
        engine.wallet(alice.id, a).await.unwrap().balance_minor,
        1_000
    );
    assert!(
        engine
            .list_transactions(alice.id, &Default::default())
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(engine.list_wallets(alice.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn saving_goals_crud_and_progress() {
    let engine = engine().await;
    let alice = register(&engine, "alice").await;
    let deadline = |m| NaiveDate::from_ymd_opt(2027, m, 1).unwrap();

    let later = engine
        .create_saving_goal(
            alice.id,
            NewSavingGoalCmd {
                name: "Car".to_string(),
                target_amount_minor: 20_000,
                current_amount_minor: Some(5_000),
                deadline: deadline(9),
                color: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(later.progress_percentage(), 25.0);
    assert_eq!(later.color, "blue");

    engine
        .create_saving_goal(
            alice.id,
            NewSavingGoalCmd {
                name: "Trip".to_string(),
                target_amount_minor: 0,
                current_amount_minor: None,
                deadline: deadline(3),
                color: Some("green".to_string()),
            },
        )
        .await
        .unwrap();

    let names: Vec<_> = engine
        .list_saving_goals(alice.id)
        .await
        .unwrap()
        .into_iter()
        .map(|goal| goal.name)
        .collect();
    assert_eq!(names, ["Trip", "Car"]);

    let updated = engine
        .update_saving_goal(
            alice.id,
            later.id,
            SavingGoalPatch {
                current_amount_minor: Some(30_000),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.progress_percentage(), 150.0);

    engine.delete_saving_goal(alice.id, later.id).await.unwrap();
    assert!(matches!(
        engine.saving_goal(alice.id, later.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn fixed_expenses_filter_and_order() {
    let engine = engine().await;
    let alice = register(&engine, "alice").await;

    for (name, amount, periodicity, currency) in [
        ("Rent", 90_000, Periodicity::Monthly, None),
        ("Gym", 2_500, Periodicity::Weekly, None),
        ("Insurance", 60_000, Periodicity::Yearly, Some("EUR")),
    ] {
        engine
            .create_fixed_expense(
                alice.id,
                NewFixedExpenseCmd {
                    name: name.to_string(),
                    amount_minor: amount,
                    currency: currency.map(str::to_string),
                    periodicity: Some(periodicity),
                    start_date: None,
                },
            )
            .await
            .unwrap();
    }

    let by_amount = engine
        .list_fixed_expenses(
            alice.id,
            &FixedExpenseListFilter {
                ordering: parse_ordering::<FixedExpenseOrderField>("-amount").unwrap(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let names: Vec<_> = by_amount.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["Rent", "Insurance", "Gym"]);

    let eur = engine
        .list_fixed_expenses(
            alice.id,
            &FixedExpenseListFilter {
                currency: Some("EUR".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(eur.len(), 1);
    assert_eq!(eur[0].monthly_amount_minor(), 5_000);

    let weekly = engine
        .list_fixed_expenses(
            alice.id,
            &FixedExpenseListFilter {
                periodicity: Some(Periodicity::Weekly),
                search: Some("gy".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(weekly.len(), 1);

    let cleared = engine
        .update_fixed_expense(
            alice.id,
            weekly[0].id,
            FixedExpensePatch {
                start_date: Some(NaiveDate::from_ymd_opt(2026, 1, 5)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.start_date, NaiveDate::from_ymd_opt(2026, 1, 5));
}

#[tokio::test]
async fn month_summary_aggregates_the_month() {
    let engine = engine().await;
    let alice = register(&engine, "alice").await;
    engine
        .update_profile(
            alice.id,
            ProfilePatch {
                monthly_income_minor: Some(300_000),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let w = engine
        .create_wallet(
            alice.id,
            NewWalletCmd::new("Main", WalletKind::Checking).balance_minor(100_000),
        )
        .await
        .unwrap()
        .id;
    let in_march = |d| Utc.with_ymd_and_hms(2026, 3, d, 10, 0, 0).unwrap();

    for (cmd, category) in [
        (NewTransactionCmd::expense(w, 60_000, in_march(2)), "rent"),
        (NewTransactionCmd::expense(w, 15_000, in_march(9)), "food"),
        (NewTransactionCmd::expense(w, 25_000, in_march(20)), "food"),
        (NewTransactionCmd::income(w, 300_000, in_march(1)), "salary"),
        (
            NewTransactionCmd::expense(w, 9_999, Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap()),
            "food",
        ),
    ] {
        engine
            .create_transaction(alice.id, cmd.category(category))
            .await
            .unwrap();
    }
    engine
        .create_fixed_expense(
            alice.id,
            NewFixedExpenseCmd {
                name: "Gym".to_string(),
                amount_minor: 1_200,
                currency: None,
                periodicity: Some(Periodicity::Weekly),
                start_date: None,
            },
        )
        .await
        .unwrap();

    let summary = engine.month_summary(alice.id, 2026, 3).await.unwrap();
    assert_eq!(summary.total_balance_minor, 100_000 + 300_000 - 100_000 - 9_999);
    assert_eq!(summary.monthly_income_minor, 300_000);
    assert_eq!(summary.month_income_minor, 300_000);
    assert_eq!(summary.month_expenses_minor, 100_000);
    assert_eq!(summary.budget_left_minor, 200_000);
    assert_eq!(summary.budget_percentage, 67);
    assert_eq!(summary.fixed_expenses_monthly_minor, 5_200);
    let categories: Vec<_> = summary
        .expenses_by_category
        .iter()
        .map(|c| (c.category.as_str(), c.amount_minor))
        .collect();
    assert_eq!(categories, [("rent", 60_000), ("food", 40_000)]);
}

#[tokio::test]
async fn deleting_user_removes_owned_rows() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;
    let w = engine
        .create_wallet(alice.id, NewWalletCmd::new("Main", WalletKind::Cash))
        .await
        .unwrap()
        .id;
    engine
        .create_transaction(alice.id, NewTransactionCmd::income(w, 100, Utc::now()))
        .await
        .unwrap();
    engine
        .create_wallet(bob.id, NewWalletCmd::new("Bob", WalletKind::Cash))
        .await
        .unwrap();

    engine.delete_user(alice.id).await.unwrap();

    assert!(matches!(
        engine.user(alice.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert_eq!(
        engine::transactions::Entity::find().count(&db).await.unwrap(),
        0
    );
    assert_eq!(engine::wallets::Entity::find().count(&db).await.unwrap(), 1);
}
