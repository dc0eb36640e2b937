//! Order repository tests against a disposable Postgres

mod helpers;

use helpers::TestDatabase;
use leadflow::database::DatabaseService;
use leadflow::models::{CreateOrderRequest, OrderItem, OrderStatus, UpdateOrderDetails};
use serial_test::serial;

async fn service() -> (TestDatabase, DatabaseService) {
    let db = TestDatabase::new().await;
    db.cleanup().await;
    let service = DatabaseService::new(db.pool.clone());
    (db, service)
}

fn lead_request(user_id: i64, name: &str, contact: &str) -> CreateOrderRequest {
    CreateOrderRequest {
        user_id,
        name: Some(name.to_string()),
        contact_info: Some(contact.to_string()),
        business_type: Some("кафе".to_string()),
        budget: Some("Бизнес (2000-5000 с.)".to_string()),
        task_description: Some("бот для приема заказов".to_string()),
        service_context: Some("Бот записи клиентов".to_string()),
        items: None,
    }
}

#[tokio::test]
#[serial]
async fn created_order_round_trips_verbatim() {
    let (_db, db) = service().await;
    db.initialize_user(501, Some("ivan".to_string()), None, None, None)
        .await
        .expect("user init failed");

    let created = db
        .orders
        .create(lead_request(501, "Иван Петров", "+992900000001"))
        .await
        .expect("create failed");

    assert!(created.id > 0);
    assert_eq!(created.status, OrderStatus::New);
    assert!(created.items.0.is_empty());

    let fetched = db
        .orders
        .find_by_id(created.id)
        .await
        .expect("lookup failed")
        .expect("order missing after create");

    assert_eq!(fetched.user_id, 501);
    assert_eq!(fetched.name.as_deref(), Some("Иван Петров"));
    assert_eq!(fetched.contact_info.as_deref(), Some("+992900000001"));
    assert_eq!(fetched.business_type.as_deref(), Some("кафе"));
    assert_eq!(fetched.budget.as_deref(), Some("Бизнес (2000-5000 с.)"));
    assert_eq!(
        fetched.task_description.as_deref(),
        Some("бот для приема заказов")
    );
    assert_eq!(fetched.service_context.as_deref(), Some("Бот записи клиентов"));
    assert_eq!(fetched.status, OrderStatus::New);
}

#[tokio::test]
#[serial]
async fn updates_to_missing_orders_are_not_found_no_ops() {
    let (_db, db) = service().await;

    let by_status = db
        .orders
        .update_status(424242, OrderStatus::Completed)
        .await
        .expect("status update errored");
    assert!(by_status.is_none());

    let by_details = db
        .orders
        .update_details(
            424242,
            UpdateOrderDetails {
                admin_comment: Some("призрак".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("details update errored");
    assert!(by_details.is_none());

    assert_eq!(db.orders.count().await.expect("count failed"), 0);
}

#[tokio::test]
#[serial]
async fn search_matches_exactly_one_client() {
    let (_db, db) = service().await;
    for (user_id, name, contact) in [
        (601, "Иван Петров", "+992900000001"),
        (602, "Alex Smirnov", "@alex_handle"),
    ] {
        db.initialize_user(user_id, None, None, None, None)
            .await
            .expect("user init failed");
        db.orders
            .create(lead_request(user_id, name, contact))
            .await
            .expect("create failed");
    }

    // Case-insensitive, matches either name or contact
    let by_name = db
        .orders
        .list_recent(50, Some("иван"))
        .await
        .expect("search failed");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name.as_deref(), Some("Иван Петров"));

    let by_contact = db
        .orders
        .list_recent(50, Some("alex_handle"))
        .await
        .expect("search failed");
    assert_eq!(by_contact.len(), 1);
    assert_eq!(by_contact[0].name.as_deref(), Some("Alex Smirnov"));

    let no_match = db
        .orders
        .list_recent(50, Some("nobody"))
        .await
        .expect("search failed");
    assert!(no_match.is_empty());
}

#[tokio::test]
#[serial]
async fn status_and_detail_updates_persist() {
    let (_db, db) = service().await;
    db.initialize_user(701, None, None, None, None)
        .await
        .expect("user init failed");
    let order = db
        .orders
        .create(lead_request(701, "Иван Петров", "+992900000001"))
        .await
        .expect("create failed");

    let in_progress = db
        .orders
        .update_status(order.id, OrderStatus::InProgress)
        .await
        .expect("status update errored")
        .expect("order vanished");
    assert_eq!(in_progress.status, OrderStatus::InProgress);

    let patched = db
        .orders
        .update_details(
            order.id,
            UpdateOrderDetails {
                admin_comment: Some("перезвонить завтра".to_string()),
                items: Some(vec![OrderItem {
                    title: "Бот-магазин".to_string(),
                    price: 1500.0,
                }]),
                ..Default::default()
            },
        )
        .await
        .expect("details update errored")
        .expect("order vanished");

    assert_eq!(patched.admin_comment.as_deref(), Some("перезвонить завтра"));
    assert_eq!(patched.items.0.len(), 1);
    // Untouched whitelist fields keep their values
    assert_eq!(patched.contact_info.as_deref(), Some("+992900000001"));
    assert_eq!(patched.budget.as_deref(), Some("Бизнес (2000-5000 с.)"));

    let fetched = db
        .orders
        .find_by_id(order.id)
        .await
        .expect("lookup failed")
        .expect("order missing");
    assert_eq!(fetched.status, OrderStatus::InProgress);
    assert_eq!(fetched.admin_comment.as_deref(), Some("перезвонить завтра"));
}

#[tokio::test]
#[serial]
async fn broadcast_population_is_distinct_order_owners() {
    let (_db, db) = service().await;
    for user_id in [801, 801, 802] {
        db.initialize_user(user_id, None, None, None, None)
            .await
            .expect("user init failed");
        db.orders
            .create(lead_request(user_id, "Иван Петров", "+992900000001"))
            .await
            .expect("create failed");
    }

    let mut owners = db
        .orders
        .distinct_user_ids()
        .await
        .expect("distinct owners failed");
    owners.sort_unstable();
    assert_eq!(owners, vec![801, 802]);
}
