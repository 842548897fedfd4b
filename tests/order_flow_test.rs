use phoneshop::db;
use phoneshop::integrations::feed;
use phoneshop::models::{cart_item, order, product, user};
use phoneshop::services::{cart_service, order_service, tradein_service, ServiceError};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_test_user(db: &DatabaseConnection, username: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let u = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set("hash".to_string()),
        role: Set(user::ROLE_CUSTOMER.to_string()),
        email: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    u.insert(db).await.expect("Failed to create user").id
}

async fn create_test_product(db: &DatabaseConnection, model_name: &str, price: i64) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let p = product::ActiveModel {
        brand: Set("Samsung".to_string()),
        model_name: Set(model_name.to_string()),
        category: Set("smartphone".to_string()),
        price: Set(price),
        stock_count: Set(0),
        approved: Set(true),
        sku: Set(None),
        image_url: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    p.insert(db).await.expect("Failed to create product").id
}

#[tokio::test]
async fn test_checkout_captures_prices_and_clears_cart() {
    let db = setup_test_db().await;
    let user_id = create_test_user(&db, "alice").await;
    let phone = create_test_product(&db, "Galaxy A15", 50_000).await;
    let charger = create_test_product(&db, "25W Charger", 4_500).await;

    cart_service::add_to_cart(&db, user_id, phone, 1).await.unwrap();
    cart_service::add_to_cart(&db, user_id, charger, 2).await.unwrap();

    let order = order_service::checkout(&db, user_id).await.unwrap();

    assert_eq!(order.total, 50_000 + 2 * 4_500);
    assert_eq!(order.status, order::STATUS_PENDING);
    assert_eq!(order.items.len(), 2);

    // Later catalog edits must not rewrite the captured price
    let captured: Vec<i64> = order.items.iter().map(|i| i.unit_price).collect();
    assert!(captured.contains(&50_000) && captured.contains(&4_500));

    let remaining = cart_item::Entity::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_checkout_rejects_empty_cart() {
    let db = setup_test_db().await;
    let user_id = create_test_user(&db, "alice").await;

    let err = order_service::checkout(&db, user_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_cart_merges_lines_and_validates_quantity() {
    let db = setup_test_db().await;
    let user_id = create_test_user(&db, "alice").await;
    let phone = create_test_product(&db, "Galaxy A15", 50_000).await;

    cart_service::add_to_cart(&db, user_id, phone, 1).await.unwrap();
    cart_service::add_to_cart(&db, user_id, phone, 2).await.unwrap();

    let lines = cart_service::list_cart(&db, user_id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 3);

    let err = cart_service::set_quantity(&db, user_id, phone, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_order_delete_requires_cleared_items() {
    let db = setup_test_db().await;
    let user_id = create_test_user(&db, "alice").await;
    let phone = create_test_product(&db, "Galaxy A15", 50_000).await;
    cart_service::add_to_cart(&db, user_id, phone, 1).await.unwrap();
    let order = order_service::checkout(&db, user_id).await.unwrap();

    let err = order_service::delete_order(&db, order.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    order_service::clear_items(&db, order.id).await.unwrap();
    order_service::delete_order(&db, order.id).await.unwrap();

    let gone = order::Entity::find_by_id(order.id).one(&db).await.unwrap();
    assert!(gone.is_none());
}

#[tokio::test]
async fn test_customers_only_see_their_own_orders() {
    let db = setup_test_db().await;
    let alice = create_test_user(&db, "alice").await;
    let bob = create_test_user(&db, "bob").await;
    let phone = create_test_product(&db, "Galaxy A15", 50_000).await;

    cart_service::add_to_cart(&db, alice, phone, 1).await.unwrap();
    let order = order_service::checkout(&db, alice).await.unwrap();

    let err = order_service::get_order(&db, order.id, Some(bob))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound));

    let own = order_service::list_orders(&db, Some(alice)).await.unwrap();
    assert_eq!(own.len(), 1);
    let others = order_service::list_orders(&db, Some(bob)).await.unwrap();
    assert!(others.is_empty());
}

#[tokio::test]
async fn test_tradein_quote_tiers() {
    let db = setup_test_db().await;

    // Default base price from migrations is 100000
    assert_eq!(tradein_service::quote(&db, "mint").await.unwrap(), 70_000);
    assert_eq!(tradein_service::quote(&db, "good").await.unwrap(), 55_000);
    assert_eq!(tradein_service::quote(&db, "fair").await.unwrap(), 40_000);
    assert_eq!(tradein_service::quote(&db, "poor").await.unwrap(), 20_000);

    let err = tradein_service::quote(&db, "melted").await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_tradein_review_is_one_shot() {
    let db = setup_test_db().await;

    let request = tradein_service::create_request(&db, "Apple", "iPhone 11", "good", None)
        .await
        .unwrap();
    assert_eq!(request.quoted_price, 55_000);

    tradein_service::set_status(&db, request.id, "accepted")
        .await
        .unwrap();

    let err = tradein_service::set_status(&db, request.id, "rejected")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

// --- Social feed mirror ---

#[tokio::test]
async fn test_feed_mirrors_upstream_posts() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "posts": [
                { "id": "p1", "text": "New arrivals this week" },
                { "id": "p2", "text": "Trade-in bonus weekend" }
            ]
        })))
        .mount(&mock_server)
        .await;

    let url = format!("{}/feed", mock_server.uri());
    let (posts, fallback) = feed::fetch_posts(Some(&url)).await;

    assert!(!fallback);
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, "p1");
}

#[tokio::test]
async fn test_feed_degrades_to_fallback() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let url = format!("{}/feed", mock_server.uri());
    let (posts, fallback) = feed::fetch_posts(Some(&url)).await;

    assert!(fallback);
    assert_eq!(posts, feed::fallback_posts());

    // Unconfigured upstream also falls back, never errors
    let (posts, fallback) = feed::fetch_posts(None).await;
    assert!(fallback);
    assert!(!posts.is_empty());
}
