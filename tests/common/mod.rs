#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use authgate::auth::ManualClock;
use authgate::configuration::{
    ApplicationSettings, CorsSettings, JwtSettings, PasswordSettings, Settings,
};
use authgate::startup::{build_gate, run};
use serde_json::{json, Value};

pub struct TestApp {
    pub address: String,
    pub clock: ManualClock,
    pub client: reqwest::Client,
}

pub fn test_settings() -> Settings {
    Settings {
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        jwt: JwtSettings {
            secret: "integration-test-secret-at-least-32-bytes".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            remember_me_multiplier: 4,
            issuer: "authgate-test".to_string(),
        },
        password: PasswordSettings { hash_cost: 4 },
        cors: CorsSettings::default(),
    }
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let settings = test_settings();
    let clock = ManualClock::default();
    let gate = build_gate(&settings, Arc::new(clock.clone())).expect("Failed to build gate");
    let server = run(listener, gate, settings.cors).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        clock,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", &self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_with_token(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(&format!("{}{}", &self.address, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn register(&self, email: &str, password: &str) -> Value {
        let response = self
            .post_json(
                "/auth/register",
                &json!({"name": "Alice", "email": email, "password": password, "age": 30}),
            )
            .await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }

    pub async fn login(&self, email: &str, password: &str, remember_me: bool) -> reqwest::Response {
        self.post_json(
            "/auth/login",
            &json!({"email": email, "password": password, "rememberMe": remember_me}),
        )
        .await
    }
}
