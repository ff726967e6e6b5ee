//! End-to-end tests driving the full router over an in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use orderdesk::auth::TokenKeys;
use orderdesk::models::{Role, User};
use orderdesk::store::MemStore;
use orderdesk::AppState;

fn test_app() -> Router {
    let state = AppState::new(Arc::new(MemStore::new()), TokenKeys::new("test-secret"));
    orderdesk::app(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Signs up an account and returns its token plus the user object.
async fn signup(app: &Router, name: &str, email: &str, role: &str) -> (String, Value) {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "name": name, "email": email, "password": "hunter-2", "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
    (
        body["token"].as_str().expect("token").to_string(),
        body["user"].clone(),
    )
}

async fn create_product(app: &Router, admin: &str, name: &str, price: f64, quantity: i32) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/products",
        Some(admin),
        Some(json!({
            "name": name,
            "category": "general",
            "description": "test item",
            "price": price,
            "quantity": quantity,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "product create failed: {body}");
    body
}

async fn product_quantity(app: &Router, token: &str, id: &str) -> i64 {
    let (status, body) = send(app, Method::GET, &format!("/products/{id}"), Some(token), None).await;
    assert_eq!(status, StatusCode::OK, "product fetch failed: {body}");
    body["quantity"].as_i64().expect("quantity")
}

#[tokio::test]
async fn health_probe_is_open() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "orderdesk");
}

#[tokio::test]
async fn signup_returns_token_and_sanitized_user() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "name": "Ada", "email": "ada@example.com", "password": "hunter-2" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["name"], "Ada");
    assert_eq!(body["user"]["role"], "customer");
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn signup_requires_all_fields() {
    let app = test_app();
    for body in [
        json!({ "email": "x@example.com", "password": "hunter-2" }),
        json!({ "name": "X", "password": "hunter-2" }),
        json!({ "name": "X", "email": "x@example.com" }),
        json!({ "name": "", "email": "x@example.com", "password": "hunter-2" }),
    ] {
        let (status, body) = send(&app, Method::POST, "/auth/signup", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Name, email and password are required");
    }
}

#[tokio::test]
async fn signup_rejects_unknown_roles() {
    let app = test_app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "name": "X", "email": "x@example.com", "password": "pw", "role": "superuser" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = test_app();
    signup(&app, "Ada", "ada@example.com", "customer").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "name": "Other", "email": "ada@example.com", "password": "pw-123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already in use");
}

#[tokio::test]
async fn login_accepts_only_the_right_password() {
    let app = test_app();
    signup(&app, "Ada", "ada@example.com", "customer").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "hunter-2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email"], "ada@example.com");

    for bad in [
        json!({ "email": "ada@example.com", "password": "wrong" }),
        json!({ "email": "nobody@example.com", "password": "hunter-2" }),
    ] {
        let (status, body) = send(&app, Method::POST, "/auth/login", None, Some(bad)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid email or password");
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ada@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email and password are required");
}

#[tokio::test]
async fn token_failures_are_unauthorized() {
    let app = test_app();
    let (token, _) = signup(&app, "Ada", "ada@example.com", "customer").await;

    let (status, body) = send(&app, Method::GET, "/auth/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No authorization header provided");

    let request = Request::builder()
        .method(Method::GET)
        .uri("/auth/profile")
        .header(header::AUTHORIZATION, format!("Token {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body["message"],
        "Invalid authorization header format. Format is \"Bearer <token>\""
    );

    let (status, body) = send(&app, Method::GET, "/auth/profile", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");

    let (status, body) = send(&app, Method::GET, "/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "ada@example.com");
}

#[tokio::test]
async fn profile_of_a_vanished_account_is_not_found() {
    let app = test_app();
    // A validly signed token for an account the store has never seen.
    let ghost = User::new("Ghost".into(), "ghost@example.com".into(), "h".into(), Role::Customer);
    let token = TokenKeys::new("test-secret").issue(&ghost).unwrap();

    let (status, body) = send(&app, Method::GET, "/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn product_mutations_are_admin_gated() {
    let app = test_app();
    let (admin, _) = signup(&app, "Root", "root@example.com", "admin").await;
    let (customer, _) = signup(&app, "Cleo", "cleo@example.com", "customer").await;

    let payload = json!({
        "name": "widget", "category": "general", "description": "d",
        "price": 1.0, "quantity": 1,
    });
    let (status, body) = send(&app, Method::POST, "/products", Some(&customer), Some(payload)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin access required");

    let product = create_product(&app, &admin, "widget", 9.5, 3).await;
    let id = product["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/products/{id}"),
        Some(&customer),
        Some(json!({ "price": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::DELETE, &format!("/products/{id}"), Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Reads only need a valid token.
    let (status, body) = send(&app, Method::GET, "/products", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Stray query parameters are ignored, never an error.
    let (status, body) = send(&app, Method::GET, "/products?inStock=true", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::GET, "/products", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn product_update_is_partial() {
    let app = test_app();
    let (admin, _) = signup(&app, "Root", "root@example.com", "admin").await;
    let product = create_product(&app, &admin, "widget", 9.5, 3).await;
    let id = product["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/products/{id}"),
        Some(&admin),
        Some(json!({ "price": 12.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 12.5);
    assert_eq!(body["name"], "widget");
    assert_eq!(body["quantity"], 3);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/products/{id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted successfully");

    let (status, body) = send(&app, Method::GET, &format!("/products/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn product_ids_are_validated() {
    let app = test_app();
    let (token, _) = signup(&app, "Ada", "ada@example.com", "customer").await;
    let (status, body) = send(&app, Method::GET, "/products/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid product ID");
}

#[tokio::test]
async fn product_creation_validates_fields() {
    let app = test_app();
    let (admin, _) = signup(&app, "Root", "root@example.com", "admin").await;

    for bad in [
        json!({ "name": "", "category": "c", "description": "d", "price": 1.0, "quantity": 1 }),
        json!({ "name": "n", "category": "c", "description": "d", "price": -1.0, "quantity": 1 }),
        json!({ "name": "n", "category": "c", "description": "d", "price": 1.0, "quantity": -1 }),
        json!({ "category": "c", "description": "d", "price": 1.0, "quantity": 1 }),
    ] {
        let (status, _) = send(&app, Method::POST, "/products", Some(&admin), Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn order_lifecycle_keeps_the_stock_ledger() {
    let app = test_app();
    let (admin, _) = signup(&app, "Root", "root@example.com", "admin").await;
    let (customer, _) = signup(&app, "Cleo", "cleo@example.com", "customer").await;
    let product = create_product(&app, &admin, "widget", 3.0, 5).await;
    let id = product["id"].as_str().unwrap();

    let (status, order) = send(
        &app,
        Method::POST,
        "/orders",
        Some(&customer),
        Some(json!({ "product": id, "quantity": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["totalPrice"], 15.0);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["product"]["name"], "widget");
    assert_eq!(order["customer"]["email"], "cleo@example.com");
    assert!(order["customer"].get("passwordHash").is_none());
    assert_eq!(product_quantity(&app, &customer, id).await, 0);

    let (status, body) = send(
        &app,
        Method::POST,
        "/orders",
        Some(&customer),
        Some(json!({ "product": id, "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Insufficient product stock");
    assert_eq!(product_quantity(&app, &customer, id).await, 0);

    let order_id = order["id"].as_str().unwrap();
    let (status, body) = send(&app, Method::DELETE, &format!("/orders/{order_id}"), Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order deleted successfully");
    assert_eq!(product_quantity(&app, &customer, id).await, 5);
}

#[tokio::test]
async fn order_creation_requires_product_and_quantity() {
    let app = test_app();
    let (token, _) = signup(&app, "Ada", "ada@example.com", "customer").await;

    for bad in [
        json!({}),
        json!({ "quantity": 2 }),
        json!({ "product": uuid::Uuid::now_v7(), "quantity": 0 }),
    ] {
        let (status, body) = send(&app, Method::POST, "/orders", Some(&token), Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Product ID and quantity are required");
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/orders",
        Some(&token),
        Some(json!({ "product": uuid::Uuid::now_v7(), "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn order_update_moves_the_reservation() {
    let app = test_app();
    let (admin, _) = signup(&app, "Root", "root@example.com", "admin").await;
    let (customer, _) = signup(&app, "Cleo", "cleo@example.com", "customer").await;
    let alpha = create_product(&app, &admin, "alpha", 2.0, 5).await;
    let beta = create_product(&app, &admin, "beta", 4.0, 10).await;
    let alpha_id = alpha["id"].as_str().unwrap();
    let beta_id = beta["id"].as_str().unwrap();

    let (status, order) = send(
        &app,
        Method::POST,
        "/orders",
        Some(&customer),
        Some(json!({ "product": alpha_id, "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(product_quantity(&app, &customer, alpha_id).await, 2);

    let order_id = order["id"].as_str().unwrap();
    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/orders/{order_id}"),
        Some(&customer),
        Some(json!({ "product": beta_id, "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["totalPrice"], 4.0);
    assert_eq!(updated["quantity"], 1);
    assert_eq!(updated["product"]["name"], "beta");
    assert_eq!(product_quantity(&app, &customer, alpha_id).await, 5);
    assert_eq!(product_quantity(&app, &customer, beta_id).await, 9);
}

#[tokio::test]
async fn status_updates_leave_stock_alone() {
    let app = test_app();
    let (admin, _) = signup(&app, "Root", "root@example.com", "admin").await;
    let (customer, _) = signup(&app, "Cleo", "cleo@example.com", "customer").await;
    let product = create_product(&app, &admin, "widget", 2.0, 10).await;
    let id = product["id"].as_str().unwrap();

    let (_, order) = send(
        &app,
        Method::POST,
        "/orders",
        Some(&customer),
        Some(json!({ "product": id, "quantity": 2 })),
    )
    .await;
    let order_id = order["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/orders/{order_id}"),
        Some(&admin),
        Some(json!({ "status": "delivered" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "delivered");
    assert_eq!(updated["totalPrice"], 4.0);
    assert_eq!(product_quantity(&app, &customer, id).await, 8);

    // No lifecycle guard: delivered may go straight back to pending.
    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/orders/{order_id}"),
        Some(&admin),
        Some(json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "pending");
    assert_eq!(product_quantity(&app, &customer, id).await, 8);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/orders/{order_id}"),
        Some(&admin),
        Some(json!({ "status": "returned" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn foreign_orders_are_protected() {
    let app = test_app();
    let (admin, _) = signup(&app, "Root", "root@example.com", "admin").await;
    let (owner, _) = signup(&app, "Cleo", "cleo@example.com", "customer").await;
    let (stranger, _) = signup(&app, "Sam", "sam@example.com", "customer").await;
    let product = create_product(&app, &admin, "widget", 2.0, 10).await;
    let id = product["id"].as_str().unwrap();

    let (_, order) = send(
        &app,
        Method::POST,
        "/orders",
        Some(&owner),
        Some(json!({ "product": id, "quantity": 4 })),
    )
    .await;
    let order_id = order["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/orders/{order_id}"),
        Some(&stranger),
        Some(json!({ "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied");

    let (status, _) = send(&app, Method::DELETE, &format!("/orders/{order_id}"), Some(&stranger), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Nothing moved.
    assert_eq!(product_quantity(&app, &owner, id).await, 6);

    // An admin may touch anyone's order.
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/orders/{order_id}"),
        Some(&admin),
        Some(json!({ "status": "shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn order_listings_respect_ownership() {
    let app = test_app();
    let (admin, _) = signup(&app, "Root", "root@example.com", "admin").await;
    let (cleo, cleo_user) = signup(&app, "Cleo", "cleo@example.com", "customer").await;
    let (sam, _) = signup(&app, "Sam", "sam@example.com", "customer").await;
    let product = create_product(&app, &admin, "widget", 2.0, 10).await;
    let id = product["id"].as_str().unwrap();

    send(
        &app,
        Method::POST,
        "/orders",
        Some(&cleo),
        Some(json!({ "product": id, "quantity": 1 })),
    )
    .await;

    // Any authenticated caller may read the full list.
    let (status, body) = send(&app, Method::GET, "/orders", Some(&sam), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let cleo_id = cleo_user["id"].as_str().unwrap();
    let (status, body) = send(&app, Method::GET, &format!("/orders/user/{cleo_id}"), Some(&cleo), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::GET, &format!("/orders/user/{cleo_id}"), Some(&sam), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied");

    let (status, body) = send(&app, Method::GET, &format!("/orders/user/{cleo_id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::GET, "/orders/user/not-a-uuid", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid user ID");
}

#[tokio::test]
async fn user_listing_is_admin_only() {
    let app = test_app();
    let (admin, _) = signup(&app, "Root", "root@example.com", "admin").await;
    let (customer, _) = signup(&app, "Cleo", "cleo@example.com", "customer").await;

    let (status, body) = send(&app, Method::GET, "/users", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin access required");

    let (status, body) = send(&app, Method::GET, "/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user.get("passwordHash").is_none());
    }
}

#[tokio::test]
async fn expansion_outlives_deleted_products() {
    let app = test_app();
    let (admin, _) = signup(&app, "Root", "root@example.com", "admin").await;
    let (customer, _) = signup(&app, "Cleo", "cleo@example.com", "customer").await;
    let product = create_product(&app, &admin, "widget", 2.0, 10).await;
    let id = product["id"].as_str().unwrap();

    let (_, order) = send(
        &app,
        Method::POST,
        "/orders",
        Some(&customer),
        Some(json!({ "product": id, "quantity": 1 })),
    )
    .await;
    let order_id = order["id"].as_str().unwrap();

    let (status, _) = send(&app, Method::DELETE, &format!("/products/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/orders", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body[0]["product"].is_null());
    assert_eq!(body[0]["customer"]["email"], "cleo@example.com");

    // Deleting the order still answers 200; the restore is silently skipped.
    let (status, body) = send(&app, Method::DELETE, &format!("/orders/{order_id}"), Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order deleted successfully");
}
