use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use phoneshop::models::{product, user};
use phoneshop::services::stock_service;
use phoneshop::{api, auth, db};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_test_user(db: &DatabaseConnection, username: &str, role: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let u = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set("hash".to_string()),
        role: Set(role.to_string()),
        email: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    u.insert(db).await.expect("Failed to create user").id
}

async fn create_test_product(db: &DatabaseConnection, model_name: &str, sku: Option<&str>) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let p = product::ActiveModel {
        brand: Set("Samsung".to_string()),
        model_name: Set(model_name.to_string()),
        category: Set("smartphone".to_string()),
        price: Set(50_000),
        stock_count: Set(0),
        approved: Set(true),
        sku: Set(sku.map(str::to_string)),
        image_url: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    p.insert(db).await.expect("Failed to create product").id
}

async fn set_setting(db: &DatabaseConnection, key: &str, value: &str) {
    let mut values = std::collections::HashMap::new();
    values.insert(key.to_string(), value.to_string());
    phoneshop::services::settings_service::set_many(db, values)
        .await
        .expect("Failed to set setting");
}

fn app(db: &DatabaseConnection) -> Router {
    api::api_router(db.clone())
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, token: Option<&str>, payload: &serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .method("POST")
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

// --- TRCSL IMEI check ---

#[tokio::test]
async fn test_imei_check_statuses() {
    let db = setup_test_db().await;
    let product_id = create_test_product(&db, "Galaxy A15", None).await;

    // In active inventory -> pending
    stock_service::add_unit(&db, product_id, "111111111111111", false)
        .await
        .unwrap();
    // In sold history -> approved
    stock_service::add_unit(&db, product_id, "222222222222222", false)
        .await
        .unwrap();
    stock_service::mark_sold(&db, "222222222222222", None)
        .await
        .unwrap();

    let cases = [
        ("111111111111111", "pending"),
        ("222222222222222", "approved"),
        ("333333333333333", "not_found"),
        ("12345678901234", "invalid"), // 14 digits
    ];

    for (imei, expected) in cases {
        let response = app(&db)
            .oneshot(get(&format!("/imei-check/{}", imei)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], expected, "IMEI {}", imei);
    }
}

// --- POS webhook ---

#[tokio::test]
async fn test_pos_webhook_rejects_bad_token() {
    let db = setup_test_db().await;
    set_setting(&db, "pos_webhook_token", "topsecret").await;

    let payload = serde_json::json!({ "action": "SOLD", "imei": "111111111111111" });

    let response = app(&db)
        .oneshot(post_json("/pos/webhook", Some("wrong"), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app(&db)
        .oneshot(post_json("/pos/webhook", None, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_pos_webhook_itemizes_validation_errors() {
    let db = setup_test_db().await;
    set_setting(&db, "pos_webhook_token", "topsecret").await;

    // RESTOCK missing both modelName and price
    let payload = serde_json::json!({ "action": "RESTOCK" });
    let response = app(&db)
        .oneshot(post_json("/pos/webhook", Some("topsecret"), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_pos_webhook_sold_and_restock_flow() {
    let db = setup_test_db().await;
    set_setting(&db, "pos_webhook_token", "topsecret").await;
    let product_id = create_test_product(&db, "Galaxy A15", None).await;
    stock_service::add_unit(&db, product_id, "111111111111111", false)
        .await
        .unwrap();

    // SOLD for a tracked unit
    let payload = serde_json::json!({ "action": "SOLD", "imei": "111111111111111" });
    let response = app(&db)
        .oneshot(post_json("/pos/webhook", Some("topsecret"), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    // RESTOCK bootstraps an unknown model
    let payload = serde_json::json!({
        "action": "RESTOCK",
        "modelName": "Pixel 8",
        "brand": "Google",
        "price": 150000,
        "imei": "444444444444444"
    });
    let response = app(&db)
        .oneshot(post_json("/pos/webhook", Some("topsecret"), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // SOLD for a product the shop has never seen -> 404
    let payload = serde_json::json!({
        "action": "SOLD",
        "imei": "999999999999999",
        "modelName": "Nokia 3310"
    });
    let response = app(&db)
        .oneshot(post_json("/pos/webhook", Some("topsecret"), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// --- Role gate ---

#[tokio::test]
async fn test_admin_surface_rejects_customers() {
    let db = setup_test_db().await;
    let customer_id = create_test_user(&db, "alice", user::ROLE_CUSTOMER).await;
    let token = auth::create_jwt("alice", customer_id, user::ROLE_CUSTOMER).unwrap();

    let payload = serde_json::json!({ "product_id": 1, "imei": "111111111111111" });
    let response = app(&db)
        .oneshot(post_json("/admin/inventory", Some(&token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // No token at all
    let response = app(&db)
        .oneshot(post_json("/admin/inventory", None, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_staff_can_register_units() {
    let db = setup_test_db().await;
    let staff_id = create_test_user(&db, "bob", user::ROLE_STAFF).await;
    let token = auth::create_jwt("bob", staff_id, user::ROLE_STAFF).unwrap();
    let product_id = create_test_product(&db, "Galaxy A15", None).await;

    let payload = serde_json::json!({ "product_id": product_id, "imei": "111111111111111" });
    let response = app(&db)
        .oneshot(post_json("/admin/inventory", Some(&token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Duplicate -> 400 (conflict)
    let response = app(&db)
        .oneshot(post_json("/admin/inventory", Some(&token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// --- Bulk import ---

#[tokio::test]
async fn test_bulk_import_upserts_by_sku_and_skips_blank() {
    let db = setup_test_db().await;
    let admin_id = create_test_user(&db, "admin", user::ROLE_ADMIN).await;
    let token = auth::create_jwt("admin", admin_id, user::ROLE_ADMIN).unwrap();
    let existing = create_test_product(&db, "Galaxy A15", Some("SKU-A15")).await;

    let payload = serde_json::json!([
        { "sku": "SKU-A15", "price": 60000, "stock": 7 },
        { "sku": "SKU-NEW", "model_name": "iPhone 13", "brand": "Apple", "price": 220000, "stock": 2 },
        { "model_name": "No SKU, skipped", "price": 1 }
    ]);

    let response = app(&db)
        .oneshot(post_json(
            "/admin/products/import",
            Some(&token),
            &payload,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["processed"], 2);

    let updated = product::Entity::find_by_id(existing)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.price, 60_000);
    assert_eq!(updated.stock_count, 7);
}

#[tokio::test]
async fn test_bulk_import_rejects_negative_price_and_stock() {
    let db = setup_test_db().await;
    let admin_id = create_test_user(&db, "admin", user::ROLE_ADMIN).await;
    let token = auth::create_jwt("admin", admin_id, user::ROLE_ADMIN).unwrap();

    let payload = serde_json::json!([
        { "sku": "SKU-NEG", "model_name": "Galaxy A15", "price": -500, "stock": -3 }
    ]);

    let response = app(&db)
        .oneshot(post_json(
            "/admin/products/import",
            Some(&token),
            &payload,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing was written to the catalog
    let count = product::Entity::find().count(&db).await.unwrap();
    assert_eq!(count, 0);
}

// --- Product delete guard ---

#[tokio::test]
async fn test_product_delete_guarded_by_history() {
    let db = setup_test_db().await;
    let admin_id = create_test_user(&db, "admin", user::ROLE_ADMIN).await;
    let token = auth::create_jwt("admin", admin_id, user::ROLE_ADMIN).unwrap();
    let product_id = create_test_product(&db, "Galaxy A15", None).await;
    let unit = stock_service::add_unit(&db, product_id, "111111111111111", false)
        .await
        .unwrap();

    let delete = |uri: String, token: String| {
        Request::builder()
            .uri(uri)
            .method("DELETE")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    };

    // IMEI row still references the product -> 400
    let response = app(&db)
        .oneshot(delete(
            format!("/admin/products/{}", product_id),
            token.clone(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Clear the unit, then deletion succeeds
    stock_service::remove_unit(&db, unit.id).await.unwrap();
    let response = app(&db)
        .oneshot(delete(format!("/admin/products/{}", product_id), token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_product_delete_guarded_by_sold_history() {
    let db = setup_test_db().await;
    let admin_id = create_test_user(&db, "admin", user::ROLE_ADMIN).await;
    let token = auth::create_jwt("admin", admin_id, user::ROLE_ADMIN).unwrap();
    let product_id = create_test_product(&db, "Galaxy A15", None).await;

    // Untracked sale: no IMEI row remains, only the sold_devices record
    stock_service::mark_sold(&db, "999999999999999", Some("Galaxy A15"))
        .await
        .unwrap();

    let request = Request::builder()
        .uri(format!("/admin/products/{}", product_id))
        .method("DELETE")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    // Sales history keeps the product undeletable
    let response = app(&db).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let still_there = product::Entity::find_by_id(product_id)
        .one(&db)
        .await
        .unwrap();
    assert!(still_there.is_some());
}

// --- Auth ---

#[tokio::test]
async fn test_register_then_login_roundtrip() {
    let db = setup_test_db().await;

    let payload = serde_json::json!({ "username": "carol", "password": "hunter2hunter2" });
    let response = app(&db)
        .oneshot(post_json("/auth/register", None, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app(&db)
        .oneshot(post_json("/auth/login", None, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["role"], user::ROLE_CUSTOMER);
    assert!(body["token"].as_str().is_some());

    let wrong = serde_json::json!({ "username": "carol", "password": "wrong-password" });
    let response = app(&db)
        .oneshot(post_json("/auth/login", None, &wrong))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// --- Settings ---

#[tokio::test]
async fn test_settings_load_includes_seeded_defaults() {
    let db = setup_test_db().await;

    let settings = phoneshop::services::settings_service::load(&db)
        .await
        .unwrap();
    assert_eq!(settings.get("shop_name").map(String::as_str), Some("PhoneShop"));
    assert_eq!(
        settings.get("tradein_base_price").map(String::as_str),
        Some("100000")
    );
}

// --- Inventory edits trigger recompute ---

#[tokio::test]
async fn test_unit_status_edit_recomputes_stock() {
    let db = setup_test_db().await;
    let staff_id = create_test_user(&db, "bob", user::ROLE_STAFF).await;
    let token = auth::create_jwt("bob", staff_id, user::ROLE_STAFF).unwrap();
    let product_id = create_test_product(&db, "Galaxy A15", None).await;
    let unit = stock_service::add_unit(&db, product_id, "111111111111111", false)
        .await
        .unwrap();

    let request = Request::builder()
        .uri(format!("/admin/inventory/{}", unit.id))
        .method("PUT")
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::json!({ "status": "sold" }).to_string(),
        ))
        .unwrap();

    let response = app(&db).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["stock_count"], 0);

    let updated = product::Entity::find_by_id(product_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.stock_count, 0);
}
