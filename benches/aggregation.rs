use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tally_core::{
    storage::{AssignmentUpsert, StoreTables},
    BudgetStore, MemoryStore, SummaryService,
};
use tally_domain::{Category, CategoryGroup, Milliunits, MonthKey, Transaction, UserId};

fn build_sample_store(txn_count: usize) -> MemoryStore {
    let user = UserId::new("bench");
    let mut tables = StoreTables::default();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    let mut category_ids = Vec::new();
    for g in 0..4 {
        let group = CategoryGroup::new(user.clone(), format!("Group {g}")).with_sort_order(g);
        for c in 0..8 {
            let category = Category::new(user.clone(), group.id, format!("Category {g}.{c}"))
                .with_sort_order(c);
            category_ids.push(category.id);
            tables.categories.push(category);
        }
        tables.category_groups.push(group);
    }

    for month in 0..24 {
        let key = MonthKey::containing(start + Duration::days(month * 31));
        for category_id in &category_ids {
            tables.upsert_assignment(AssignmentUpsert {
                user_id: user.clone(),
                category_id: *category_id,
                month: key,
                assigned_amount: Milliunits::new(100_000),
                at: chrono::Utc::now(),
            });
        }
    }

    for idx in 0..txn_count {
        let date = start + Duration::days((idx % 730) as i64);
        let category = (idx % 5 != 0).then(|| category_ids[idx % category_ids.len()]);
        let amount = if category.is_some() {
            Milliunits::new(-((idx % 90_000) as i64) - 1)
        } else {
            Milliunits::new(2_500_000)
        };
        tables
            .transactions
            .push(Transaction::new(user.clone(), category, date, amount));
    }

    MemoryStore::from_tables(tables)
}

fn bench_aggregation(c: &mut Criterion) {
    let store = build_sample_store(black_box(20_000));
    let user = UserId::new("bench");
    let month = MonthKey::new(2025, 6).unwrap();
    assert!(!store.categories(&user).unwrap().is_empty());

    c.bench_function("aggregate_month_20k", |b| {
        b.iter(|| {
            let summary = SummaryService::aggregate(&store, &user, month).expect("aggregate");
            black_box(summary);
        })
    });
}

criterion_group!(benches, bench_aggregation);
criterion_main!(benches);
