// MySQL ledger: persistence, due queries, conditional writes, day sequences.
//
// Run with a disposable database:
//   TEST_DATABASE_URL=mysql://... cargo test --test mysql_repository_test -- --ignored

#[path = "../helpers/mod.rs"]
mod helpers;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use helpers::*;
use storefront::core::AppError;
use storefront::orders::models::{Order, OrderStatus};
use storefront::orders::{MySqlOrderRepository, OrderFilter, OrderRepository};

async fn repository() -> MySqlOrderRepository {
    let repo = MySqlOrderRepository::new(create_test_pool().await);
    repo.migrate().await.unwrap();
    repo
}

/// A day no other run has used, so sequences and due queries start empty
fn fresh_day() -> NaiveDate {
    let offset = Uuid::new_v4().as_u128() % 300_000;
    day(2200, 1, 1)
        .checked_add_days(Days::new(offset as u64))
        .unwrap()
}

fn order_due_on(first_date: NaiveDate) -> Order {
    let id = Uuid::new_v4().to_string();
    Order::from_request(
        id.clone(),
        format!("owner-{}", id),
        format!("ORD-T-{}", &id[..24]),
        three_by_hundred(first_date),
        Utc::now(),
        first_date,
    )
    .unwrap()
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_insert_and_read_back() {
    let repo = repository().await;
    let order = repo.insert(order_due_on(fresh_day())).await.unwrap();
    assert_eq!(order.version, 1);

    let stored = repo.find_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.order_number, order.order_number);
    assert_eq!(stored.payment_plan, order.payment_plan);
    assert_eq!(stored.total, dec!(300));
    assert_eq!(stored.version, 1);

    assert!(repo.find_by_id("missing").await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_duplicate_order_number_conflicts() {
    let repo = repository().await;
    let order = repo.insert(order_due_on(fresh_day())).await.unwrap();

    let mut copy = order_due_on(fresh_day());
    copy.order_number = order.order_number.clone();
    let err = repo.insert(copy).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_due_query_uses_projected_columns() {
    let repo = repository().await;
    let due_day = fresh_day();

    let due = repo.insert(order_due_on(due_day)).await.unwrap();
    let later = repo
        .insert(order_due_on(due_day.checked_add_days(Days::new(1)).unwrap()))
        .await
        .unwrap();

    let mut cancelled = repo.insert(order_due_on(due_day)).await.unwrap();
    cancelled.status = OrderStatus::Cancelled;
    repo.save(cancelled).await.unwrap();

    let exact: Vec<String> = repo
        .find(&OrderFilter::installments_due_on(due_day))
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(exact, vec![due.id.clone()]);

    let owned = repo
        .find(&OrderFilter::for_owner(later.owner_ref.clone()))
        .await
        .unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id, later.id);
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_stale_save_conflicts() {
    let repo = repository().await;
    let order = repo.insert(order_due_on(fresh_day())).await.unwrap();

    let first = order.clone();
    let stale = order;

    let saved = repo.save(first).await.unwrap();
    assert_eq!(saved.version, 2);

    let err = repo.save(stale).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let mut ghost = order_due_on(fresh_day());
    ghost.version = 1;
    let err = repo.save(ghost).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_day_sequence_is_atomic() {
    let repo = Arc::new(repository().await);
    let sequence_day = fresh_day();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.reserve_order_sequence(sequence_day).await.unwrap() })
        })
        .collect();

    let mut values = HashSet::new();
    for handle in handles {
        values.insert(handle.await.unwrap());
    }
    assert_eq!(values, (1..=10).collect::<HashSet<u32>>());

    let next_day = sequence_day.checked_add_days(Days::new(1)).unwrap();
    assert_eq!(repo.reserve_order_sequence(next_day).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_ping() {
    let repo = repository().await;
    repo.ping().await.unwrap();
}
