//! HTTP contract tests for the movement endpoints
//!
//! The router runs over the in-memory store with the caller's identity
//! injected directly, so no database or token is needed.

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Extension, Router,
};
use estoque_backend::handlers::movement_routes;
use estoque_backend::middleware::AuthUser;
use estoque_backend::services::MovementService;
use estoque_backend::store::InMemoryStore;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    store: InMemoryStore,
    company: i64,
    product: i64,
    user: i64,
}

impl TestApp {
    async fn new() -> Self {
        let store = InMemoryStore::new();
        let company = store.add_company().await;
        let category = store.add_category(company, "Informática").await;
        let product = store
            .add_product(company, category, "Mouse Óptico", 10, 2, Decimal::new(4990, 2))
            .await;
        let user = store.add_user(company, "Carla Mendes", "carla@loja.com").await;

        Self {
            store,
            company,
            product,
            user,
        }
    }

    fn router(&self) -> Router {
        let service = MovementService::new(self.store.clone());
        self.unauthenticated_router().layer(Extension(AuthUser {
            user_id: self.user,
            company_id: self.company,
        }))
        .with_state(service)
    }

    fn unauthenticated_router(&self) -> Router<MovementService<InMemoryStore>> {
        Router::new().nest(
            "/api/v1/movements",
            movement_routes::<InMemoryStore, MovementService<InMemoryStore>>(),
        )
    }

    async fn post(&self, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/movements")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(self.router(), request).await
    }

    async fn get(&self, query: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(format!("/api/v1/movements{}", query))
            .body(Body::empty())
            .unwrap();
        send(self.router(), request).await
    }

    fn body(&self, kind: &str, quantity: i64) -> Value {
        json!({
            "productId": self.product,
            "userId": self.user,
            "kind": kind,
            "quantity": quantity,
            "unitPrice": "49.90",
        })
    }
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

// ============================================================================
// POST /movements
// ============================================================================

#[tokio::test]
async fn create_returns_201_with_joined_movement() {
    let app = TestApp::new().await;

    let (status, body) = app.post(app.body("saida", 4)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["kind"], "saida");
    assert_eq!(body["quantity"], 4);
    assert_eq!(body["unitPrice"], "49.90");
    assert_eq!(body["productId"], app.product);
    assert_eq!(body["product"]["name"], "Mouse Óptico");
    assert_eq!(body["product"]["category"]["name"], "Informática");
    assert_eq!(body["user"]["email"], "carla@loja.com");
    assert!(body["createdAt"].is_string());

    assert_eq!(app.store.product_quantity(app.product).await, Some(6));
    assert_eq!(app.store.user_withdrawn(app.user).await, Some(4));
}

#[tokio::test]
async fn english_kind_names_are_accepted() {
    let app = TestApp::new().await;

    let (status, body) = app.post(app.body("entry", 1)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["kind"], "entrada");
    assert_eq!(app.store.product_quantity(app.product).await, Some(11));
}

#[tokio::test]
async fn insufficient_stock_is_400() {
    let app = TestApp::new().await;

    let (status, body) = app.post(app.body("saida", 11)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    assert!(body["error"].as_str().unwrap().contains("10 available"));
    assert_eq!(app.store.product_quantity(app.product).await, Some(10));
}

#[tokio::test]
async fn missing_product_is_400() {
    let app = TestApp::new().await;
    let mut body = app.body("entrada", 1);
    body["productId"] = json!(424242);

    let (status, body) = app.post(body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
async fn zero_quantity_is_400() {
    let app = TestApp::new().await;

    let (status, body) = app.post(app.body("entrada", 0)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(app.store.movement_count().await, 0);
}

#[tokio::test]
async fn malformed_bodies_are_400() {
    let app = TestApp::new().await;

    let bodies = [
        // Unknown kind
        app.body("transfer", 1),
        // Fractional quantity
        json!({ "productId": app.product, "userId": app.user, "kind": "entrada",
                "quantity": 1.5, "unitPrice": "1.00" }),
        // Missing unit price
        json!({ "productId": app.product, "userId": app.user, "kind": "entrada", "quantity": 1 }),
    ];

    for body in bodies {
        let (status, body) = app.post(body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MALFORMED_BODY");
        assert!(body["error"].is_string());
    }
    assert_eq!(app.store.movement_count().await, 0);
}

#[tokio::test]
async fn persistence_failure_is_generic_500() {
    let app = TestApp::new().await;
    app.store.fail_next_commit().await;

    let (status, body) = app.post(app.body("saida", 1)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "An internal server error occurred");
    assert_eq!(app.store.product_quantity(app.product).await, Some(10));
}

#[tokio::test]
async fn requests_without_identity_are_401() {
    let app = TestApp::new().await;
    let router = app
        .unauthenticated_router()
        .with_state(MovementService::new(app.store.clone()));

    let request = Request::builder()
        .uri("/api/v1/movements")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

// ============================================================================
// GET /movements
// ============================================================================

#[tokio::test]
async fn empty_result_is_an_empty_array() {
    let app = TestApp::new().await;

    let (status, body) = app.get("").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn listing_is_newest_first_and_filterable() {
    let app = TestApp::new().await;
    for (kind, quantity) in [("entrada", 5), ("saida", 2), ("saida", 3)] {
        let (status, _) = app.post(app.body(kind, quantity)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, all) = app.get("").await;
    assert_eq!(status, StatusCode::OK);
    let quantities: Vec<i64> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["quantity"].as_i64().unwrap())
        .collect();
    assert_eq!(quantities, vec![3, 2, 5]);

    let (_, sentinel) = app
        .get("?search=all&category=Todas&user=Todos&kind=all")
        .await;
    assert_eq!(sentinel, all);

    let (_, exits) = app.get("?tipo=saida&usuario=Carla%20Mendes").await;
    assert_eq!(exits.as_array().unwrap().len(), 2);

    let (_, english) = app.get("?kind=exit").await;
    assert_eq!(english, exits);

    let (_, by_search) = app.get("?busca=Mouse&categoria=Inform%C3%A1tica").await;
    assert_eq!(by_search.as_array().unwrap().len(), 3);

    let (status, none) = app.get("?category=Cabos").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(none, json!([]));
}
