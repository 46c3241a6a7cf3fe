mod common;

use common::{alice, app_on, day, setup_app};
use tally::{config::Config, AppError, BudgetApp};
use tally_core::{CoreError, StaticIdentity, TransactionFilter, TransactionInput};
use tally_domain::{Milliunits, MonthKey, TransactionKind};

#[test]
fn anonymous_sessions_are_rejected_everywhere() {
    let app = setup_app(day(2025, 1, 3));
    let anonymous = StaticIdentity::anonymous();
    let session = app.session(&anonymous);
    assert!(session.caller().is_none());

    assert!(matches!(
        session.budget_summary(None),
        Err(AppError::Core(CoreError::NotAuthenticated))
    ));
    assert!(matches!(
        session.categories(),
        Err(AppError::Core(CoreError::NotAuthenticated))
    ));
    assert!(matches!(
        session.create_category_group("Bills"),
        Err(AppError::Core(CoreError::NotAuthenticated))
    ));
    assert!(matches!(
        session.transactions(TransactionFilter::default()),
        Err(AppError::Core(CoreError::NotAuthenticated))
    ));
    let err = session.upsert_assignment(uuid::Uuid::new_v4(), "1").unwrap_err();
    assert_eq!(err.user_message(), "Not authenticated");
}

#[test]
fn form_payloads_deserialize_into_transactions() {
    let app = setup_app(day(2025, 2, 14));
    let identity = alice();
    let session = app.session(&identity);
    let group = session.create_category_group("Fun").expect("group");
    let category = session
        .create_category(tally_core::NewCategory {
            name: "Dining".into(),
            group_id: group.id,
            target_amount: "0".into(),
        })
        .expect("category");

    let payload = format!(
        r#"{{"type":"expense","amount":"10.50","date":"2025-02-14","payee":" Bistro ","category_id":"{}","memo":""}}"#,
        category.id
    );
    let input: TransactionInput = serde_json::from_str(&payload).expect("payload");
    let stored = session.create_transaction(input).expect("create");
    assert_eq!(stored.amount, Milliunits::new(-10_500));

    let fetched = session.transaction(stored.id).expect("get");
    assert_eq!(fetched.category_name.as_deref(), Some("Dining"));
    assert_eq!(fetched.transaction.payee.as_deref(), Some("Bistro"));
    assert_eq!(fetched.transaction.memo, None);

    let view = session.budget_view(Some(MonthKey::new(2025, 2).unwrap())).expect("view");
    assert_eq!(view.category(category.id).unwrap().activity, Milliunits::new(-10_500));
}

#[test]
fn other_users_records_look_missing() {
    let app = setup_app(day(2025, 2, 14));
    let alice_identity = alice();
    let bob_identity = StaticIdentity::authenticated("bob");
    let alice_session = app.session(&alice_identity);
    let bob_session = app.session(&bob_identity);

    let income = alice_session
        .create_transaction(TransactionInput {
            kind: TransactionKind::Income,
            amount: "100".into(),
            date: day(2025, 2, 1),
            payee: None,
            category_id: None,
            memo: None,
        })
        .expect("income");

    for err in [
        bob_session.transaction(income.id).unwrap_err(),
        bob_session.delete_transaction(income.id).unwrap_err(),
    ] {
        assert!(matches!(err, AppError::Core(CoreError::NotFound(_))));
    }
    assert_eq!(
        bob_session
            .transactions(TransactionFilter::default())
            .expect("list")
            .total,
        0
    );
    assert!(alice_session.transaction(income.id).is_ok());
}

#[test]
fn reference_offset_decides_the_current_month() {
    let config = Config {
        reference_utc_offset_minutes: -5 * 60,
        ..common::temp_config()
    };
    // 02:00 UTC on March 1st is still February 28th at UTC-5.
    let app = BudgetApp::open(&config).expect("open");
    let ctx = app.context().clone().with_clock(std::sync::Arc::new(
        tally_core::FixedClock::new(
            day(2025, 3, 1)
                .and_hms_opt(2, 0, 0)
                .expect("time")
                .and_utc(),
        ),
    ));
    assert_eq!(ctx.current_month(), MonthKey::new(2025, 2).unwrap());

    let utc = app_on(&BudgetApp::in_memory(&Config::default()).expect("memory"), day(2025, 3, 1));
    assert_eq!(utc.context().current_month(), MonthKey::new(2025, 3).unwrap());
}

#[test]
fn invalid_config_is_rejected_at_open() {
    let config = Config {
        transactions_page_size: 0,
        ..common::temp_config()
    };
    assert!(matches!(BudgetApp::open(&config), Err(AppError::Config(_))));
}

#[test]
fn configured_page_size_applies_to_listing() {
    let config = Config {
        transactions_page_size: 2,
        ..common::temp_config()
    };
    let app = app_on(&BudgetApp::open(&config).expect("open"), day(2025, 2, 10));
    let identity = alice();
    let session = app.session(&identity);
    for d in 1..=3 {
        session
            .create_transaction(TransactionInput {
                kind: TransactionKind::Income,
                amount: "1".into(),
                date: day(2025, 2, d),
                payee: None,
                category_id: None,
                memo: None,
            })
            .expect("income");
    }
    let page = session
        .transactions(TransactionFilter::default())
        .expect("list");
    assert_eq!(page.total, 3);
    assert_eq!(page.transactions.len(), 2);
    assert_eq!(page.transactions[0].transaction.date, day(2025, 2, 3));
}
