//! Integration tests for the Shopfront resource methods

#![cfg(feature = "client")]

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use shopfront_core::{KeyValueStore, MemoryStore};
use shopfront_http::types::{
    OrderItem, OrderQuery, OrderRequest, OrderStatus, ProductInput, ProductQuery,
    PurchaseRequest, SignupRequest, UpdateUserRequest, UserQuery,
};
use shopfront_http::{ClientError, SessionClient};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn logged_in_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_entries([
        ("token", "abc".to_string()),
        (
            "tokenExpiry",
            (Utc::now() + Duration::hours(1)).to_rfc3339(),
        ),
    ]))
}

async fn client_for(server: &MockServer) -> (SessionClient, Arc<MemoryStore>) {
    let store = logged_in_store();
    let client = SessionClient::builder()
        .base_url(format!("{}/api", server.uri()))
        .store(store.clone())
        .build()
        .unwrap();
    (client, store)
}

#[tokio::test]
async fn test_client_builder() {
    let client = SessionClient::builder()
        .base_url("http://localhost:3000/api")
        .build();

    assert!(client.is_ok());
    let client = client.unwrap();
    assert_eq!(client.base_url(), "http://localhost:3000/api");
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_client_builder_rejects_empty_base_url() {
    let result = SessionClient::builder().base_url("").build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_signup_captures_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/account/signup"))
        .and(body_json(json!({
            "email": "ada@example.com",
            "password": "secret",
            "name": "Ada"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "token": "new-user" })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = SessionClient::builder()
        .base_url(format!("{}/api", server.uri()))
        .store(store.clone())
        .build()
        .unwrap();

    client
        .signup(&SignupRequest {
            email: "ada@example.com".into(),
            password: "secret".into(),
            name: Some("Ada".into()),
        })
        .await
        .unwrap();

    assert_eq!(store.get("token").unwrap().as_deref(), Some("new-user"));
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_delete_account_clears_session() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/account"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "deleted" })))
        .mount(&server)
        .await;

    let (client, store) = client_for(&server).await;

    let body = client.delete_account().await.unwrap();
    assert_eq!(body["message"], "deleted");
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_update_me_refreshes_cached_profile() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/users/me"))
        .and(body_json(json!({ "name": "Ada L." })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "email": "ada@example.com",
            "name": "Ada L."
        })))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server).await;

    let user = client
        .update_me(&UpdateUserRequest {
            name: Some("Ada L.".into()),
            ..UpdateUserRequest::default()
        })
        .await
        .unwrap();

    assert_eq!(user.name.as_deref(), Some("Ada L."));
    assert_eq!(client.session().cached_user().unwrap(), user);
}

#[tokio::test]
async fn test_list_users_and_get_user() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("role", "admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "u1", "email": "ada@example.com", "role": "admin" }],
            "total": 1
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "email": "ada@example.com"
        })))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server).await;

    let users = client
        .list_users(&UserQuery {
            role: Some("admin".into()),
            ..UserQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].role.as_deref(), Some("admin"));

    let user = client.get_user("u1").await.unwrap();
    assert_eq!(user.email, "ada@example.com");
}

#[tokio::test]
async fn test_list_products_is_public_and_omits_empty_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("category", "mugs"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "p1", "name": "Blue mug", "price": 9.5, "category": "mugs" }
        ])))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server).await;

    let products = client
        .list_products(&ProductQuery {
            category: Some("mugs".into()),
            limit: Some(10),
            ..ProductQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(products[0].name, "Blue mug");

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    assert!(request.headers.get("authorization").is_none());
    let query = request.url.query().unwrap();
    assert!(!query.contains("search"));
    assert!(!query.contains("page"));
}

#[tokio::test]
async fn test_product_crud() {
    let server = MockServer::start().await;
    let product = json!({ "id": "p1", "name": "Mug", "price": 12.0, "stock": 3 });

    Mock::given(method("GET"))
        .and(path("/api/products/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&product))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/products"))
        .and(header("authorization", "Bearer abc"))
        .and(body_json(json!({ "name": "Mug", "price": 12.0, "stock": 3 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(&product))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/products/p1"))
        .and(body_json(json!({ "price": 10.0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p1", "name": "Mug", "price": 10.0, "stock": 3
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/products/p1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server).await;

    let fetched = client.get_product("p1").await.unwrap();
    assert_eq!(fetched.stock, Some(3));

    let created = client
        .create_product(&ProductInput {
            name: Some("Mug".into()),
            price: Some(12.0),
            stock: Some(3),
            ..ProductInput::default()
        })
        .await
        .unwrap();
    assert_eq!(created.id, "p1");

    let updated = client
        .update_product(
            "p1",
            &ProductInput {
                price: Some(10.0),
                ..ProductInput::default()
            },
        )
        .await
        .unwrap();
    assert!((updated.price - 10.0).abs() < f64::EPSILON);

    let deleted = client.delete_product("p1").await.unwrap();
    assert!(deleted.is_null());
}

#[tokio::test]
async fn test_purchases() {
    let server = MockServer::start().await;
    let purchase = json!({ "id": "pu1", "productId": "p1", "quantity": 2, "total": 19.0 });

    Mock::given(method("POST"))
        .and(path("/api/purchases"))
        .and(body_json(json!({ "productId": "p1", "quantity": 2 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(&purchase))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/purchases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([purchase.clone()])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/purchases/pu1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&purchase))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server).await;

    let created = client
        .create_purchase(&PurchaseRequest {
            product_id: "p1".into(),
            quantity: 2,
        })
        .await
        .unwrap();
    assert_eq!(created.quantity, 2);

    let listed = client.list_purchases(&Default::default()).await.unwrap();
    assert_eq!(listed, vec![created.clone()]);

    let fetched = client.get_purchase("pu1").await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_orders() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .and(query_param("status", "pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "o1", "status": "pending", "items": [] }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(body_json(json!({
            "items": [{ "productId": "p1", "quantity": 1 }],
            "shippingAddress": "1 Analytical Way"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "o2",
            "status": "pending",
            "items": [{ "productId": "p1", "quantity": 1, "price": 12.0 }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/orders/o2/status"))
        .and(body_json(json!({ "status": "shipped" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "o2", "status": "shipped"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/orders/o2/cancel"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "Shipped orders cannot be cancelled"
        })))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server).await;

    let pending = client
        .list_orders(&OrderQuery {
            status: Some(OrderStatus::Pending),
            ..OrderQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(pending[0].id, "o1");

    let order = client
        .create_order(&OrderRequest {
            items: vec![OrderItem {
                product_id: "p1".into(),
                quantity: 1,
                price: None,
            }],
            shipping_address: Some("1 Analytical Way".into()),
        })
        .await
        .unwrap();
    assert_eq!(order.items[0].price, Some(12.0));

    let shipped = client
        .update_order_status("o2", OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);

    let err = client.cancel_order("o2").await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.to_string(), "Shipped orders cannot be cancelled");
}

#[tokio::test]
async fn test_unexpected_shape_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/o1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server).await;

    let err = client.get_order("o1").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_ids_are_escaped_as_one_path_segment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products/mugs%2Fblue%3Fsize%3Dxl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "mugs/blue?size=xl", "name": "Mug", "price": 9.5
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/orders/o%201/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "o 1", "status": "cancelled"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server).await;

    let product = client.get_product("mugs/blue?size=xl").await.unwrap();
    assert_eq!(product.id, "mugs/blue?size=xl");

    let order = client.cancel_order("o 1").await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.query().is_none()));
}
