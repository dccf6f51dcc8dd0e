mod common;

use chrono::Duration;
use common::spawn_app;
use serde_json::{json, Value};

// --- Registration Tests ---

#[tokio::test]
async fn register_returns_token_pair() {
    let app = spawn_app();

    let response = app
        .post_json(
            "/auth/register",
            &json!({"name": "John Doe", "email": "john@example.com", "password": "pw", "age": 41}),
        )
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["accessToken"].is_string());
    assert!(body["refreshToken"].is_string());
}

#[tokio::test]
async fn register_returns_409_for_duplicate_email() {
    let app = spawn_app();
    app.register("john@example.com", "pw").await;

    let response = app
        .post_json(
            "/auth/register",
            &json!({"name": "Other", "email": "john@example.com", "password": "pw2", "age": 20}),
        )
        .await;

    assert_eq!(409, response.status().as_u16(), "Should reject duplicate email with 409 Conflict");
}

#[tokio::test]
async fn register_returns_400_for_invalid_email() {
    let app = spawn_app();

    for invalid_email in ["notanemail", "user@", "@example.com", "user@@example.com"] {
        let response = app
            .post_json(
                "/auth/register",
                &json!({"name": "Test", "email": invalid_email, "password": "pw", "age": 20}),
            )
            .await;

        assert_eq!(400, response.status().as_u16(), "Should reject invalid email: {}", invalid_email);
    }
}

#[tokio::test]
async fn register_returns_400_for_missing_fields() {
    let app = spawn_app();

    let test_cases = vec![
        (json!({"email": "test@example.com", "password": "pw"}), "missing name"),
        (json!({"name": "Test", "password": "pw"}), "missing email"),
        (json!({"name": "Test", "email": "test@example.com"}), "missing password"),
        (json!({}), "missing all fields"),
    ];

    for (body, reason) in test_cases {
        let response = app.post_json("/auth/register", &body).await;

        assert_eq!(400, response.status().as_u16(), "Should reject request: {}", reason);
    }
}

// --- Login Tests ---

#[tokio::test]
async fn login_returns_fresh_pair_distinct_from_registration() {
    let app = spawn_app();
    let registered = app.register("a@x.com", "pw").await;

    let response = app.login("a@x.com", "pw", false).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_ne!(body["accessToken"], registered["accessToken"]);
    assert_ne!(body["refreshToken"], registered["refreshToken"]);
    assert!(body["refreshToken"].is_string());
}

#[tokio::test]
async fn login_does_not_reveal_whether_email_exists() {
    let app = spawn_app();
    app.register("a@x.com", "pw").await;

    let wrong_password = app.login("a@x.com", "wrong", false).await;
    let unknown_user = app.login("nobody@x.com", "pw", false).await;

    assert_eq!(401, wrong_password.status().as_u16());
    assert_eq!(401, unknown_user.status().as_u16());

    let wrong_password: Value = wrong_password.json().await.unwrap();
    let unknown_user: Value = unknown_user.json().await.unwrap();
    assert_eq!(wrong_password["message"], unknown_user["message"]);
    assert_eq!(wrong_password["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn login_returns_400_for_missing_fields() {
    let app = spawn_app();

    for body in [json!({"email": "test@example.com"}), json!({"password": "pw"}), json!({})] {
        let response = app.post_json("/auth/login", &body).await;
        assert_eq!(400, response.status().as_u16());
    }
}

// --- Refresh / Logout Tests ---

#[tokio::test]
async fn refresh_returns_new_access_token_without_rotation() {
    let app = spawn_app();
    app.register("a@x.com", "pw").await;
    let login: Value = app.login("a@x.com", "pw", false).await.json().await.unwrap();
    let refresh_token = login["refreshToken"].as_str().unwrap();

    let response = app
        .post_json("/auth/refresh", &json!({"refreshToken": refresh_token}))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert!(body["accessToken"].is_string());
    assert!(body["refreshToken"].is_null());

    // Same refresh token still works
    let again = app
        .post_json("/auth/refresh", &json!({"refreshToken": refresh_token}))
        .await;
    assert_eq!(200, again.status().as_u16());

    let me = app
        .get_with_token("/api/me", body["accessToken"].as_str())
        .await;
    assert_eq!(200, me.status().as_u16());
}

#[tokio::test]
async fn refresh_with_unknown_token_returns_401() {
    let app = spawn_app();

    let response = app
        .post_json("/auth/refresh", &json!({"refreshToken": "made-up"}))
        .await;

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid or expired refresh token");
}

#[tokio::test]
async fn logout_then_refresh_is_rejected() {
    let app = spawn_app();
    let tokens = app.register("a@x.com", "pw").await;
    let refresh_token = tokens["refreshToken"].as_str().unwrap();

    let logout = app
        .post_json("/auth/logout", &json!({"refreshToken": refresh_token}))
        .await;
    assert_eq!(200, logout.status().as_u16());
    assert!(logout.text().await.unwrap().is_empty());

    let response = app
        .post_json("/auth/refresh", &json!({"refreshToken": refresh_token}))
        .await;
    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid or expired refresh token");
}

#[tokio::test]
async fn logout_with_unknown_token_still_succeeds() {
    let app = spawn_app();

    for _ in 0..2 {
        let response = app
            .post_json("/auth/logout", &json!({"refreshToken": "never-issued"}))
            .await;
        assert_eq!(200, response.status().as_u16());
    }
}

#[tokio::test]
async fn refresh_token_expires_after_seven_days() {
    let app = spawn_app();
    let tokens = app.register("a@x.com", "pw").await;
    let refresh_token = tokens["refreshToken"].as_str().unwrap();

    app.clock.advance(Duration::days(8));

    let response = app
        .post_json("/auth/refresh", &json!({"refreshToken": refresh_token}))
        .await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn remember_me_refresh_token_lasts_four_weeks() {
    let app = spawn_app();
    app.register("a@x.com", "pw").await;
    let login: Value = app.login("a@x.com", "pw", true).await.json().await.unwrap();
    let refresh_token = login["refreshToken"].as_str().unwrap().to_string();

    app.clock.advance(Duration::days(27));
    let response = app
        .post_json("/auth/refresh", &json!({"refreshToken": refresh_token}))
        .await;
    assert_eq!(200, response.status().as_u16());

    app.clock.advance(Duration::days(2));
    let response = app
        .post_json("/auth/refresh", &json!({"refreshToken": refresh_token}))
        .await;
    assert_eq!(401, response.status().as_u16());
}

// --- Protected Routes Tests ---

#[tokio::test]
async fn protected_route_returns_401_without_token() {
    let app = spawn_app();

    let response = app.get_with_token("/api/me", None).await;

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn protected_route_returns_401_with_invalid_token() {
    let app = spawn_app();

    let response = app.get_with_token("/api/me", Some("invalid.token.here")).await;

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn protected_route_returns_current_user_with_valid_token() {
    let app = spawn_app();
    let tokens = app.register("a@x.com", "pw").await;

    let response = app
        .get_with_token("/api/me", tokens["accessToken"].as_str())
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["name"], "Alice");
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn access_token_stops_working_after_fifteen_minutes() {
    let app = spawn_app();
    let tokens = app.register("a@x.com", "pw").await;
    let access = tokens["accessToken"].as_str();

    app.clock.advance(Duration::minutes(14));
    assert_eq!(200, app.get_with_token("/api/me", access).await.status().as_u16());

    app.clock.advance(Duration::minutes(2));
    assert_eq!(401, app.get_with_token("/api/me", access).await.status().as_u16());
}

// --- User Management Tests ---

#[tokio::test]
async fn user_crud_requires_authentication() {
    let app = spawn_app();

    let response = app.get_with_token("/api/users", None).await;
    assert_eq!(401, response.status().as_u16());

    let response = app
        .post_json(
            "/api/users",
            &json!({"name": "Bob", "email": "b@x.com", "password": "pw", "age": 22}),
        )
        .await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn user_crud_round_trip() {
    let app = spawn_app();
    let tokens = app.register("a@x.com", "pw").await;
    let access = tokens["accessToken"].as_str().unwrap();

    let created = app
        .client
        .post(&format!("{}/api/users", &app.address))
        .bearer_auth(access)
        .json(&json!({"name": "Bob", "email": "b@x.com", "password": "pw", "age": 22}))
        .send()
        .await
        .unwrap();
    assert_eq!(201, created.status().as_u16());
    let created: Value = created.json().await.unwrap();
    let id = created["id"].as_str().unwrap();

    let users: Value = app
        .get_with_token("/api/users", Some(access))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(users.as_array().unwrap().len(), 2);

    let fetched = app
        .get_with_token(&format!("/api/users/{}", id), Some(access))
        .await;
    assert_eq!(200, fetched.status().as_u16());
    let fetched: Value = fetched.json().await.unwrap();
    assert_eq!(fetched["email"], "b@x.com");
    assert_eq!(fetched["age"], 22);

    let deleted = app
        .client
        .delete(&format!("{}/api/users/{}", &app.address, id))
        .bearer_auth(access)
        .send()
        .await
        .unwrap();
    assert_eq!(204, deleted.status().as_u16());

    let missing = app
        .get_with_token(&format!("/api/users/{}", id), Some(access))
        .await;
    assert_eq!(404, missing.status().as_u16());
}

#[tokio::test]
async fn malformed_user_id_returns_400_json() {
    let app = spawn_app();
    let tokens = app.register("a@x.com", "pw").await;

    let response = app
        .get_with_token("/api/users/not-a-uuid", tokens["accessToken"].as_str())
        .await;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error_id"].is_string());
}

#[tokio::test]
async fn created_user_can_log_in() {
    let app = spawn_app();
    let tokens = app.register("a@x.com", "pw").await;

    app.client
        .post(&format!("{}/api/users", &app.address))
        .bearer_auth(tokens["accessToken"].as_str().unwrap())
        .json(&json!({"name": "Bob", "email": "b@x.com", "password": "secret", "age": 22}))
        .send()
        .await
        .unwrap();

    assert_eq!(200, app.login("b@x.com", "secret", false).await.status().as_u16());
}

// --- CORS Tests ---

async fn preflight(app: &common::TestApp, path: &str, origin: &str) -> reqwest::Response {
    app.client
        .request(reqwest::Method::OPTIONS, &format!("{}{}", &app.address, path))
        .header("Origin", origin)
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .expect("Failed to execute request.")
}

#[tokio::test]
async fn preflight_from_allowed_origin_is_answered() {
    let app = spawn_app();

    for path in ["/auth/login", "/api/users"] {
        let response = preflight(&app, path, "http://localhost:5173").await;

        assert_eq!(200, response.status().as_u16(), "preflight for {}", path);
        let headers = response.headers();
        assert_eq!(
            headers
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:5173")
        );
        assert_eq!(
            headers
                .get("access-control-allow-credentials")
                .and_then(|v| v.to_str().ok()),
            Some("true")
        );
    }
}

#[tokio::test]
async fn preflight_from_unknown_origin_is_not_allowed() {
    let app = spawn_app();

    let response = preflight(&app, "/auth/login", "http://evil.example").await;

    assert!(response.headers().get("access-control-allow-origin").is_none());
}
