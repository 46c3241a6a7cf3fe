mod common;

use common::{alice, app_on, day, setup_app};
use tally_core::{NewCategory, TransactionInput};
use tally_domain::{Milliunits, MonthKey, TransactionKind};
use uuid::Uuid;

fn expense(amount: &str, date: chrono::NaiveDate, category: Uuid) -> TransactionInput {
    TransactionInput {
        kind: TransactionKind::Expense,
        amount: amount.into(),
        date,
        payee: None,
        category_id: Some(category),
        memo: None,
    }
}

#[test]
fn groceries_january_into_february() {
    let app = setup_app(day(2025, 1, 3));
    let identity = alice();
    let session = app.session(&identity);

    let everyday = session.create_category_group("Everyday").expect("group");
    let groceries = session
        .create_category(NewCategory {
            name: "Groceries".into(),
            group_id: everyday.id,
            target_amount: "250".into(),
        })
        .expect("category");

    session
        .upsert_assignment(groceries.id, "200.00")
        .expect("assign");
    session
        .create_transaction(expense("45.30", day(2025, 1, 6), groceries.id))
        .expect("first expense");
    session
        .create_transaction(expense("12.00", day(2025, 1, 19), groceries.id))
        .expect("second expense");
    session
        .create_transaction(TransactionInput {
            kind: TransactionKind::Income,
            amount: "$2,000.00".into(),
            date: day(2025, 1, 1),
            payee: Some("Employer".into()),
            category_id: None,
            memo: None,
        })
        .expect("income");

    let january = session.budget_summary(None).expect("january");
    let line = january.category(groceries.id).expect("groceries");
    assert_eq!(line.assigned, Milliunits::new(200_000));
    assert_eq!(line.activity, Milliunits::new(-57_300));
    assert_eq!(line.available, Milliunits::new(142_700));
    assert_eq!(january.total_income, Milliunits::new(2_000_000));
    assert_eq!(january.total_assigned, Milliunits::new(200_000));
    assert_eq!(january.money_to_assign, Milliunits::new(1_800_000));

    let february_app = app_on(&app, day(2025, 2, 1));
    let february = february_app
        .session(&identity)
        .budget_summary(None)
        .expect("february");
    assert_eq!(february.month, MonthKey::new(2025, 2).unwrap());
    let line = february.category(groceries.id).expect("groceries");
    assert_eq!(line.assigned, Milliunits::ZERO);
    assert_eq!(line.activity, Milliunits::ZERO);
    assert_eq!(line.available, Milliunits::new(142_700));
    assert_eq!(february.money_to_assign, Milliunits::ZERO);
}

#[test]
fn unspent_assignment_rolls_forward() {
    let app = setup_app(day(2025, 3, 12));
    let identity = alice();
    let session = app.session(&identity);
    let group = session.create_category_group("Savings").expect("group");
    let category = session
        .create_category(NewCategory {
            name: "Emergency".into(),
            group_id: group.id,
            target_amount: String::new(),
        })
        .expect("category");
    session.upsert_assignment(category.id, "50").expect("assign");

    let april = app_on(&app, day(2025, 4, 30));
    for summary in [
        session.budget_summary(None).expect("march"),
        april.session(&identity).budget_summary(None).expect("april"),
    ] {
        assert_eq!(
            summary.category(category.id).unwrap().available,
            Milliunits::new(50_000)
        );
    }
}

#[test]
fn group_totals_conserve_category_figures() {
    let app = setup_app(day(2025, 5, 2));
    let identity = alice();
    let session = app.session(&identity);
    let group = session.create_category_group("Bills").expect("group");
    let mut ids = Vec::new();
    for (name, assigned, spent) in [("Rent", "1200", "1200"), ("Power", "80", "96.41"), ("Phone", "40", "15")] {
        let category = session
            .create_category(NewCategory {
                name: name.into(),
                group_id: group.id,
                target_amount: assigned.into(),
            })
            .expect("category");
        session.upsert_assignment(category.id, assigned).expect("assign");
        session
            .create_transaction(expense(spent, day(2025, 5, 3), category.id))
            .expect("expense");
        ids.push(category.id);
    }

    let summary = session.budget_summary(None).expect("summary");
    let bills = summary.group(group.id).expect("group");
    let assigned: Milliunits = bills.categories.iter().map(|c| c.assigned).sum();
    let activity: Milliunits = bills.categories.iter().map(|c| c.activity).sum();
    let available: Milliunits = bills.categories.iter().map(|c| c.available).sum();
    assert_eq!(bills.total_assigned, assigned);
    assert_eq!(bills.total_activity, activity);
    assert_eq!(bills.total_available, available);
    assert_eq!(summary.total_assigned, Milliunits::new(1_320_000));
    assert_eq!(bills.total_activity, Milliunits::new(-1_311_410));
    assert!(summary.category(ids[1]).unwrap().is_overspent());
}

#[test]
fn state_survives_reopening_the_store() {
    let config = common::temp_config();
    let identity = alice();
    let category_id = {
        let app = app_on(&tally::BudgetApp::open(&config).expect("open"), day(2025, 1, 9));
        let session = app.session(&identity);
        let group = session.create_category_group("Everyday").expect("group");
        let category = session
            .create_category(NewCategory {
                name: "Groceries".into(),
                group_id: group.id,
                target_amount: String::new(),
            })
            .expect("category");
        session.upsert_assignment(category.id, "75").expect("assign");
        category.id
    };

    let reopened = app_on(&tally::BudgetApp::open(&config).expect("reopen"), day(2025, 1, 20));
    let summary = reopened
        .session(&identity)
        .budget_summary(None)
        .expect("summary");
    assert_eq!(
        summary.category(category_id).unwrap().assigned,
        Milliunits::new(75_000)
    );
}
