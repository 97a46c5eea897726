mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use common::{ADMIN_EMAIL, create_user, test_app, token_for};
use serde_json::{Value, json};
use storefront_api::app::app;
use tower::ServiceExt;

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> anyhow::Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}

async fn login(app: &Router, email: &str, password: &str) -> anyhow::Result<String> {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(body["data"]["token"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn signup_login_and_profile_update() -> anyhow::Result<()> {
    let test = test_app()?;
    let app = app(test.state.clone());

    let signup = json!({ "name": "Ada", "email": "ada@example.com", "password": "hunter22" });
    let (status, body) = send(&app, Method::POST, "/api/auth/signup", None, Some(signup.clone())).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"].get("password").is_none());

    let (status, _) = send(&app, Method::POST, "/api/auth/signup", None, Some(signup)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "wrong" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "hunter22" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["isAdmin"], json!(false));
    let token = body["data"]["token"].as_str().unwrap_or_default().to_string();

    let (status, _) = send(&app, Method::GET, "/api/auth/me", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/auth/me",
        Some(&token),
        Some(json!({ "city": "Lahore", "email": "hijack@example.com" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let user = &body["data"]["user"];
    assert_eq!(user["city"], json!("Lahore"));
    assert_eq!(user["name"], json!("Ada"));
    assert_eq!(user["email"], json!("ada@example.com"));
    Ok(())
}

#[tokio::test]
async fn saved_cart_lines_get_consistent_totals() -> anyhow::Result<()> {
    let test = test_app()?;
    let user = create_user(&test.state, "Ada", "ada@example.com").await?;
    let token = token_for(&user)?;
    let app = app(test.state.clone());

    let cart = json!([
        { "id": 1, "name": "Mug", "price": 4.0, "quantity": 0, "totalPrice": 999.0 },
        { "id": 2, "name": "Lamp", "price": 2.5, "quantity": 3, "totalPrice": 1.0 }
    ]);
    let (status, body) = send(&app, Method::PUT, "/api/auth/me", Some(&token), Some(json!({ "cart": cart }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["cart"][0]["quantity"], json!(1));
    assert_eq!(body["data"]["user"]["cart"][0]["totalPrice"], json!(4.0));

    let stored: storefront_api::models::User = test.state.store.get(&user.id).await.expect("user stored");
    assert_eq!(stored.cart.len(), 2);
    for line in &stored.cart {
        assert!(line.quantity >= 1);
        assert_eq!(line.total_price, line.price * f64::from(line.quantity));
    }
    assert_eq!(stored.cart[1].total_price, 7.5);
    Ok(())
}

#[tokio::test]
async fn session_cookie_is_accepted() -> anyhow::Result<()> {
    let test = test_app()?;
    let user = create_user(&test.state, "Ada", "ada@example.com").await?;
    let app = app(test.state.clone());

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, format!("theme=dark; token={}", token_for(&user)?))
        .body(Body::empty())?;
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn admin_endpoints_check_identity_first() -> anyhow::Result<()> {
    let test = test_app()?;
    let user = create_user(&test.state, "Ada", "ada@example.com").await?;
    let admin = create_user(&test.state, "Admin", ADMIN_EMAIL).await?;
    let app = app(test.state.clone());

    let (status, _) = send(&app, Method::GET, "/api/admin/stats", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/admin/stats", Some("not-a-jwt"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user_token = token_for(&user)?;
    let (status, _) = send(&app, Method::GET, "/api/admin/stats", Some(&user_token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::DELETE, "/api/admin/users/missing", Some(&user_token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_token = token_for(&admin)?;
    let (status, body) = send(&app, Method::GET, "/api/admin/stats", Some(&admin_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalUsers"], json!(2));

    let (status, _) = send(&app, Method::DELETE, "/api/admin/users/missing", Some(&admin_token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/admin/stats?start=2026-10-10&end=2026-10-01",
        Some(&admin_token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/admin/stats?end=-262143-01-01",
        Some(&admin_token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn checkout_flow_over_http() -> anyhow::Result<()> {
    let test = test_app()?;
    create_user(&test.state, "Admin", ADMIN_EMAIL).await?;
    let app = app(test.state.clone());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "name": "Ada", "email": "ada@example.com", "password": "hunter22" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let token = login(&app, "ada@example.com", "hunter22").await?;

    let cart = json!([{ "id": 3, "name": "Lamp", "price": 22.75, "quantity": 2, "totalPrice": 45.5 }]);
    let (status, _) = send(&app, Method::PUT, "/api/auth/me", Some(&token), Some(json!({ "cart": cart }))).await?;
    assert_eq!(status, StatusCode::OK);

    let order = json!({
        "customer": { "name": "Ada", "email": "ada@example.com", "address": "12 Analytical Way" },
        "items": [{ "name": "Lamp", "price": 22.75, "quantity": 2, "totalPrice": 45.5 }],
        "totalAmount": 45.5
    });
    let (status, body) = send(&app, Method::POST, "/api/place-order", Some(&token), Some(order)).await?;
    assert_eq!(status, StatusCode::OK);
    let order_id = body["data"]["orderId"].as_str().unwrap_or_default().to_string();
    assert!(!order_id.is_empty());

    let (status, body) = send(&app, Method::GET, "/api/orders", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let orders = body["data"]["orders"].as_array().cloned().unwrap_or_default();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["status"], json!("Pending"));
    assert_eq!(orders[0]["total"], json!(45.5));

    let admin_token = login_admin(&test).await?;
    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/admin/orders/{order_id}"),
        Some(&admin_token),
        Some(json!({ "status": "Accepted" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("Accepted"));

    let (_, body) = send(&app, Method::GET, "/api/admin/orders", Some(&admin_token), None).await?;
    assert_eq!(body["data"]["orders"][0]["status"], json!("Accepted"));

    let (_, body) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await?;
    assert_eq!(body["data"]["user"]["cart"], json!([]));

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/admin/orders/0",
        Some(&admin_token),
        Some(json!({ "status": "Completed" })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

async fn login_admin(test: &common::TestApp) -> anyhow::Result<String> {
    let admin = test
        .state
        .store
        .list::<storefront_api::models::User>()
        .await
        .into_iter()
        .find(|u| u.email == ADMIN_EMAIL)
        .ok_or_else(|| anyhow::anyhow!("admin missing"))?;
    token_for(&admin)
}

#[tokio::test]
async fn reviews_are_public_and_filtered() -> anyhow::Result<()> {
    let test = test_app()?;
    let app = app(test.state.clone());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/reviews",
        None,
        Some(json!({ "userName": "Ada", "comment": "no rating" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for (product, rating) in [(1, 5), (1, 2), (2, 4)] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/reviews",
            None,
            Some(json!({ "userName": "Ada", "rating": rating, "productId": product })),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::GET, "/api/reviews?productId=1", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    let reviews = body["data"]["reviews"].as_array().cloned().unwrap_or_default();
    assert_eq!(reviews.len(), 2);
    let id = reviews[0]["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = send(&app, Method::PUT, &format!("/api/reviews/{id}"), None, Some(json!({ "rating": 3 }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rating"], json!(3));

    let (status, _) = send(&app, Method::DELETE, &format!("/api/reviews/{id}"), None, None).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/reviews/{id}"), None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::PUT, "/api/reviews/missing", None, Some(json!({ "rating": 1 }))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn admin_manages_catalog() -> anyhow::Result<()> {
    let test = test_app()?;
    let admin = create_user(&test.state, "Admin", ADMIN_EMAIL).await?;
    let token = token_for(&admin)?;
    let app = app(test.state.clone());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/products",
        Some(&token),
        Some(json!({ "title": "Mug", "price": 12.5 })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], json!(1));
    assert_eq!(body["data"]["price"], json!("$12.50"));

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/admin/products/1",
        Some(&token),
        Some(json!({ "badge": "Sale" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["badge"], json!("Sale"));
    assert_eq!(body["data"]["title"], json!("Mug"));

    let (status, body) = send(&app, Method::GET, "/api/products?q=mug", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["products"].as_array().map(Vec::len), Some(1));

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/products?page=9223372036854775807&per_page=100",
        None,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["products"], json!([]));

    let (status, _) = send(&app, Method::DELETE, "/api/admin/products/1", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, "/api/products/1", None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
