use super::*;
use akaun_core::{Category, ProductInput, StockStatus};
use axum::body::{to_bytes, Body};
use axum::http::Request;
use rust_decimal::Decimal;
use tower::ServiceExt;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADMIN_TOKEN: &str = "admin-test-token";

// -------------------------------------------------------------------------
// Helpers
// -------------------------------------------------------------------------

fn checkout_settings() -> Arc<CheckoutSettings> {
    Arc::new(CheckoutSettings {
        whatsapp_base_url: "https://wa.me".to_string(),
        whatsapp_recipient: "+60123456789".to_string(),
        format: MessageFormat::default(),
    })
}

fn test_state(pool: PgPool, storage: Option<StorageClient>) -> AppState {
    AppState {
        pool,
        storage: storage.map(Arc::new),
        product_storage: None,
        checkout: checkout_settings(),
    }
}

fn open_app(pool: PgPool) -> Router {
    let auth = AuthState::from_keys("", true).expect("auth");
    build_app(test_state(pool, None), auth, default_rate_limit_state())
}

fn guarded_app(state: AppState) -> Router {
    let auth = AuthState::from_keys(ADMIN_TOKEN, false).expect("auth");
    build_app(state, auth, default_rate_limit_state())
}

fn storage_client(base_url: &str) -> StorageClient {
    StorageClient::new(base_url, "service-key", "feedbacks", 5).expect("storage client")
}

fn product_storage_client(base_url: &str) -> StorageClient {
    StorageClient::new(base_url, "service-key", "products", 5).expect("storage client")
}

fn image_put(uri: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "image/png")
        .body(Body::from(vec![1u8, 2, 3]))
        .expect("request")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).expect("json parse")
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn with_token(mut request: Request<Body>) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {ADMIN_TOKEN}").parse().expect("header"),
    );
    request
}

fn decimal(value: &serde_json::Value) -> Decimal {
    match value {
        serde_json::Value::String(s) => s.parse().expect("decimal string"),
        serde_json::Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("expected decimal, got {other}"),
    }
}

fn product(name: &str, category: Category, game: &str, price: i64) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        category,
        game: Some(game.to_string()),
        stock: StockStatus::Ready,
        level: None,
        server: Some("Asia".to_string()),
        hero_count: None,
        rank: None,
        price: Decimal::new(price, 0),
        image: None,
        description: None,
    }
}

async fn seed_catalog(pool: &PgPool) -> Vec<i64> {
    let inputs = [
        product("MLBB Mythic", Category::Game, "mlbb", 300),
        product("TikTok 10k", Category::Sosmed, "tiktok", 10),
        product("iPhone 12", Category::Gadget, "iphone", 1500),
    ];
    let mut ids = Vec::new();
    for input in &inputs {
        let created = akaun_db::create_product(pool, input)
            .await
            .expect("create product");
        ids.push(created.id);
    }
    ids
}

fn names(json: &serde_json::Value) -> Vec<String> {
    json["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|p| p["name"].as_str().expect("name").to_string())
        .collect()
}

// -------------------------------------------------------------------------
// Envelope
// -------------------------------------------------------------------------

#[test]
fn api_error_validation_error_maps_to_bad_request() {
    let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn api_error_service_unavailable_maps_to_503() {
    let response = ApiError::new("req-1", "service_unavailable", "down").into_response();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[test]
fn api_error_unknown_code_maps_to_500() {
    let response = ApiError::new("req-1", "internal_error", "boom").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[sqlx::test(migrations = "../../migrations")]
async fn health_reports_storage_state(pool: PgPool) {
    let (status, json) = send(open_app(pool), get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["database"], "ok");
    assert_eq!(json["data"]["storage"], "disabled");
    assert!(json["meta"]["request_id"].is_string());
}

// -------------------------------------------------------------------------
// Storefront catalog
// -------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn catalog_filters_by_query_and_tags(pool: PgPool) {
    seed_catalog(&pool).await;
    let app = open_app(pool);

    let (status, json) = send(app.clone(), get("/api/v1/products")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&json).len(), 3);

    let (_, json) = send(app.clone(), get("/api/v1/products?category=tiktok")).await;
    assert_eq!(names(&json), vec!["TikTok 10k"]);

    let (_, json) = send(app.clone(), get("/api/v1/products?category=game&stock=ready")).await;
    assert_eq!(names(&json), vec!["MLBB Mythic"]);

    let (_, json) = send(app.clone(), get("/api/v1/products?q=asia&stock=preorder")).await;
    assert!(names(&json).is_empty());

    let (_, json) = send(app, get("/api/v1/products?q=IPHONE")).await;
    assert_eq!(names(&json), vec!["iPhone 12"]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_product_returns_404_for_unknown_id(pool: PgPool) {
    let (status, json) = send(open_app(pool), get("/api/v1/products/999999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

// -------------------------------------------------------------------------
// Checkout
// -------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn checkout_totals_cart_and_builds_link(pool: PgPool) {
    let ids = seed_catalog(&pool).await;
    let body = serde_json::json!({
        "items": [
            { "product_id": ids[1], "quantity": 2 },
            { "product_id": ids[0] }
        ],
        "customer_name": "Ali",
        "customer_contact": "0123"
    });

    let (status, json) = send(open_app(pool), json_request("POST", "/api/v1/checkout", &body)).await;
    assert_eq!(status, StatusCode::OK);

    let data = &json["data"];
    assert_eq!(decimal(&data["total_amount"]), Decimal::new(320, 0));
    assert!(data["unresolved"].as_array().expect("unresolved").is_empty());

    let link = data["whatsapp_link"].as_str().expect("link");
    assert!(link.starts_with("https://wa.me/60123456789?text="), "got {link}");
    assert!(link.ends_with(data["message"].as_str().expect("message")));
}

#[sqlx::test(migrations = "../../migrations")]
async fn checkout_reports_unresolved_products(pool: PgPool) {
    let ids = seed_catalog(&pool).await;
    let body = serde_json::json!({
        "items": [
            { "product_id": ids[1], "quantity": 1 },
            { "product_id": 424_242, "quantity": 3 }
        ],
        "customer_name": "Ali",
        "customer_contact": "0123"
    });

    let (status, json) = send(open_app(pool), json_request("POST", "/api/v1/checkout", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&json["data"]["total_amount"]), Decimal::new(10, 0));
    assert_eq!(json["data"]["unresolved"], serde_json::json!([424_242]));
}

#[sqlx::test(migrations = "../../migrations")]
async fn checkout_rejects_empty_cart(pool: PgPool) {
    let body = serde_json::json!({
        "items": [],
        "customer_name": "Ali",
        "customer_contact": "0123"
    });

    let (status, json) = send(open_app(pool), json_request("POST", "/api/v1/checkout", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

// -------------------------------------------------------------------------
// Feedback
// -------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn feedback_submit_defaults_name_and_lists(pool: PgPool) {
    let app = open_app(pool);

    let (status, json) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/v1/feedbacks",
            &serde_json::json!({ "name": "  ", "message": " Amanah! " }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["name"], "Anonymous");
    assert_eq!(json["data"]["message"], "Amanah!");

    let (status, json) = send(app, get("/api/v1/feedbacks")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().expect("data array").len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn feedback_submit_rejects_blank_message(pool: PgPool) {
    let (status, json) = send(
        open_app(pool),
        json_request(
            "POST",
            "/api/v1/feedbacks",
            &serde_json::json!({ "message": "   " }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[sqlx::test(migrations = "../../migrations")]
async fn image_upload_without_storage_is_unavailable(pool: PgPool) {
    let request = Request::builder()
        .method("PUT")
        .uri("/api/v1/feedbacks/images/bukti.png")
        .header(header::CONTENT_TYPE, "image/png")
        .body(Body::from(vec![1u8, 2, 3]))
        .expect("request");

    let (status, json) = send(open_app(pool), request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "service_unavailable");
}

#[sqlx::test(migrations = "../../migrations")]
async fn image_upload_stores_object_and_returns_url(pool: PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/feedbacks/uploads/\d+_bukti_1.png$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let auth = AuthState::from_keys("", true).expect("auth");
    let app = build_app(
        test_state(pool, Some(storage_client(&server.uri()))),
        auth,
        default_rate_limit_state(),
    );

    let request = Request::builder()
        .method("PUT")
        .uri("/api/v1/feedbacks/images/bukti%201.png")
        .header(header::CONTENT_TYPE, "image/png")
        .body(Body::from(vec![1u8, 2, 3]))
        .expect("request");

    let (status, json) = send(app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    let path = json["data"]["path"].as_str().expect("path");
    assert!(path.starts_with("uploads/") && path.ends_with("_bukti_1.png"), "got {path}");
    let url = json["data"]["url"].as_str().expect("url");
    assert!(url.contains("/storage/v1/object/public/feedbacks/uploads/"), "got {url}");
}

#[sqlx::test(migrations = "../../migrations")]
async fn image_upload_rejects_non_image_content_type(pool: PgPool) {
    let server = MockServer::start().await;
    let auth = AuthState::from_keys("", true).expect("auth");
    let app = build_app(
        test_state(pool, Some(storage_client(&server.uri()))),
        auth,
        default_rate_limit_state(),
    );

    let request = Request::builder()
        .method("PUT")
        .uri("/api/v1/feedbacks/images/notes.txt")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("hello"))
        .expect("request");

    let (status, json) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

// -------------------------------------------------------------------------
// Admin
// -------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn product_image_upload_uses_product_bucket(pool: PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/products/uploads/\d+_ml_skin.png$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut state = test_state(pool, Some(storage_client(&server.uri())));
    state.product_storage = Some(Arc::new(product_storage_client(&server.uri())));
    let app = guarded_app(state);

    let (status, _) = send(
        app.clone(),
        image_put("/api/v1/admin/products/images/ml%20skin.png"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = send(
        app,
        with_token(image_put("/api/v1/admin/products/images/ml%20skin.png")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let url = json["data"]["url"].as_str().expect("url");
    assert!(url.contains("/storage/v1/object/public/products/uploads/"), "got {url}");
}

#[sqlx::test(migrations = "../../migrations")]
async fn product_image_upload_without_storage_is_unavailable(pool: PgPool) {
    let server = MockServer::start().await;
    let app = guarded_app(test_state(pool, Some(storage_client(&server.uri()))));

    let (status, json) = send(
        app,
        with_token(image_put("/api/v1/admin/products/images/a.png")),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "service_unavailable");
}

#[sqlx::test(migrations = "../../migrations")]
async fn admin_routes_require_bearer_token(pool: PgPool) {
    let app = guarded_app(test_state(pool, None));

    let (status, json) = send(app.clone(), get("/api/v1/admin/products")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["code"], "unauthorized");

    let (status, _) = send(app.clone(), with_token(get("/api/v1/admin/products"))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(app, get("/api/v1/products")).await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "../../migrations")]
async fn admin_list_searches_and_sorts(pool: PgPool) {
    seed_catalog(&pool).await;
    let app = guarded_app(test_state(pool, None));

    let (status, json) = send(
        app.clone(),
        with_token(get("/api/v1/admin/products?sort=price")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        names(&json),
        vec!["TikTok 10k", "MLBB Mythic", "iPhone 12"]
    );

    let (_, json) = send(app.clone(), with_token(get("/api/v1/admin/products"))).await;
    assert_eq!(
        names(&json),
        vec!["iPhone 12", "MLBB Mythic", "TikTok 10k"]
    );

    let (_, json) = send(app.clone(), with_token(get("/api/v1/admin/products?q=tik"))).await;
    assert_eq!(names(&json), vec!["TikTok 10k"]);

    let (status, json) = send(app, with_token(get("/api/v1/admin/products?sort=stock"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[sqlx::test(migrations = "../../migrations")]
async fn admin_product_crud_round_trip(pool: PgPool) {
    let app = guarded_app(test_state(pool, None));
    let body = serde_json::json!({
        "name": "  Akaun FF Sultan ",
        "category": "game",
        "game": "freefire",
        "stock": "preorder",
        "level": 70,
        "price": "150.00"
    });

    let (status, json) = send(
        app.clone(),
        with_token(json_request("POST", "/api/v1/admin/products", &body)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["name"], "Akaun FF Sultan");
    let id = json["data"]["id"].as_i64().expect("id");

    let mut changed = body.clone();
    changed["price"] = serde_json::json!("175.50");
    changed["stock"] = serde_json::json!("ready");
    let (status, json) = send(
        app.clone(),
        with_token(json_request("PUT", &format!("/api/v1/admin/products/{id}"), &changed)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["stock"], "ready");
    assert_eq!(decimal(&json["data"]["price"]), Decimal::new(17550, 2));

    let delete = || {
        with_token(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/admin/products/{id}"))
                .body(Body::empty())
                .expect("request"),
        )
    };
    let (status, _) = send(app.clone(), delete()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = send(app, delete()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[sqlx::test(migrations = "../../migrations")]
async fn admin_rejects_negative_price(pool: PgPool) {
    let app = guarded_app(test_state(pool, None));
    let body = serde_json::json!({
        "name": "Bad",
        "category": "gadget",
        "stock": "ready",
        "price": "-1"
    });

    let (status, json) = send(
        app,
        with_token(json_request("POST", "/api/v1/admin/products", &body)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[sqlx::test(migrations = "../../migrations")]
async fn admin_rejects_price_outside_column_range(pool: PgPool) {
    let app = guarded_app(test_state(pool, None));

    for price in ["1000000000000", "12.345"] {
        let body = serde_json::json!({
            "name": "Too precise",
            "category": "gadget",
            "stock": "ready",
            "price": price
        });
        let (status, json) = send(
            app.clone(),
            with_token(json_request("POST", "/api/v1/admin/products", &body)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "price {price}");
        assert_eq!(json["error"]["code"], "validation_error");
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn admin_update_unknown_product_is_404(pool: PgPool) {
    let app = guarded_app(test_state(pool, None));
    let body = serde_json::json!({
        "name": "Ghost",
        "category": "gadget",
        "stock": "ready",
        "price": "1"
    });

    let (status, _) = send(
        app,
        with_token(json_request("PUT", "/api/v1/admin/products/777777", &body)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn admin_delete_feedback_removes_stored_image(pool: PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/storage/v1/object/feedbacks/uploads/1_bukti.png$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let storage = storage_client(&server.uri());
    let image = storage.public_url("uploads/1_bukti.png");
    let created = akaun_db::create_feedback(
        &pool,
        &akaun_core::FeedbackInput {
            name: Some("Siti".to_string()),
            message: "Laju".to_string(),
            image: Some(image),
        },
    )
    .await
    .expect("create feedback");

    let app = guarded_app(test_state(pool, Some(storage)));
    let delete = || {
        with_token(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/admin/feedbacks/{}", created.id))
                .body(Body::empty())
                .expect("request"),
        )
    };

    let (status, json) = send(app.clone(), delete()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["image_removed"], true);

    let (status, _) = send(app, delete()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn admin_delete_feedback_survives_storage_failure(pool: PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let storage = storage_client(&server.uri());
    let image = storage.public_url("uploads/2_x.png");
    let created = akaun_db::create_feedback(
        &pool,
        &akaun_core::FeedbackInput {
            name: None,
            message: "Ok".to_string(),
            image: Some(image),
        },
    )
    .await
    .expect("create feedback");

    let app = guarded_app(test_state(pool, Some(storage)));
    let (status, json) = send(
        app,
        with_token(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/admin/feedbacks/{}", created.id))
                .body(Body::empty())
                .expect("request"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["image_removed"], false);
}

#[sqlx::test(migrations = "../../migrations")]
async fn admin_delete_feedback_keeps_image_referenced_elsewhere(pool: PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let storage = storage_client(&server.uri());
    let image = storage.public_url("uploads/3_asli.png");
    let input = akaun_core::FeedbackInput {
        name: Some("Ali".to_string()),
        message: "Puas hati".to_string(),
        image: Some(image),
    };
    akaun_db::create_feedback(&pool, &input)
        .await
        .expect("create original");
    let copy = akaun_db::create_feedback(&pool, &input)
        .await
        .expect("create copy");

    let app = guarded_app(test_state(pool, Some(storage)));
    let (status, json) = send(
        app,
        with_token(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/admin/feedbacks/{}", copy.id))
                .body(Body::empty())
                .expect("request"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["image_removed"], false);
}
