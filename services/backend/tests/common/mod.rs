/// Common test utilities and fixtures for integration tests
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::json;

use backend::build_router;
use backend::config::{Config, DatabaseConfig, MailConfig, SessionConfig};
use backend::repository::MemoryStore;
use backend::services::mailer::{MailError, MailMessage, Mailer};
use backend::services::session::SessionStore;
use backend::state::AppState;

/// Mailer that records outbound messages for assertions.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<MailMessage>>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Mailer that always fails, for degraded-delivery scenarios.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: MailMessage) -> Result<(), MailError> {
        Err(MailError("smtp unreachable".to_string()))
    }
}

pub fn test_config() -> Config {
    Config {
        api_port: 0,
        database: DatabaseConfig {
            url: None,
            pool_size: 5,
        },
        mail: MailConfig {
            from_address: "no-reply@test.local".to_string(),
            app_url: "http://localhost:3001".to_string(),
        },
        session: SessionConfig {
            sweep_interval_secs: 86_400,
        },
    }
}

/// In-process server over the in-memory store with a cookie jar, plus
/// handles to the store, sessions, and outbound mail.
pub struct TestContext {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub sessions: SessionStore,
    pub mailer: RecordingMailer,
}

impl TestContext {
    pub fn new() -> Self {
        let mailer = RecordingMailer::default();
        Self::with_mailer(Arc::new(mailer.clone()), mailer)
    }

    pub fn with_failing_mailer() -> Self {
        Self::with_mailer(Arc::new(FailingMailer), RecordingMailer::default())
    }

    fn with_mailer(mailer: Arc<dyn Mailer>, recorder: RecordingMailer) -> Self {
        let store = Arc::new(MemoryStore::new());
        let sessions = SessionStore::new();
        let state = AppState::new(
            test_config(),
            store.clone(),
            sessions.clone(),
            mailer,
            None,
        );
        let mut server =
            TestServer::new(build_router(state)).expect("failed to start test server");
        server.do_save_cookies();
        Self {
            server,
            store,
            sessions,
            mailer: recorder,
        }
    }

    /// Token carried by the link in the most recent outbound mail.
    pub fn last_mail_token(&self) -> Option<String> {
        let sent = self.mailer.sent.lock().unwrap();
        let body = &sent.last()?.body;
        body.lines()
            .find(|line| line.starts_with("http"))
            .and_then(|line| line.trim().rsplit('/').next())
            .map(|token| token.to_string())
    }

    /// Register, verify, and log in a user; the session cookie stays in
    /// the server's jar for subsequent requests.
    pub async fn login_fresh_user(&self, username: &str) {
        let email = format!("{}@gmail.com", username);
        let response = self
            .server
            .post("/api/auth/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": "Passw0rd!",
            }))
            .await;
        assert_eq!(response.status_code(), 201, "{}", response.text());

        let token = self.last_mail_token().expect("no verification mail");
        let response = self
            .server
            .get(&format!("/api/auth/verify/{}", token))
            .await;
        assert_eq!(response.status_code(), 302);

        let response = self
            .server
            .post("/api/auth/login")
            .json(&json!({
                "login": username,
                "password": "Passw0rd!",
            }))
            .await;
        assert_eq!(response.status_code(), 200, "{}", response.text());
    }
}
