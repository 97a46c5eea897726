#![allow(dead_code)]

use std::{sync::{Arc, Mutex}, time::Duration};

use async_trait::async_trait;
use storefront_api::{
    config::AppConfig,
    middleware::auth::AuthUser,
    models::User,
    notify::{Email, Notifier, NotifyError},
    services::auth_service::issue_token,
    state::AppState,
    store::JsonStore,
};
use tempfile::TempDir;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@shop.test";
pub const STORE_EMAIL: &str = "orders@shop.test";
pub const JWT_SECRET: &str = "test-secret";

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Email>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Waits for detached notification tasks to deliver `count` emails.
    pub async fn wait_for(&self, count: usize) -> Vec<Email> {
        for _ in 0..100 {
            let sent = self.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.sent()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: Email) -> Result<(), NotifyError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email);
        }
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, email: Email) -> Result<(), NotifyError> {
        Err(NotifyError::InvalidAddress(email.to))
    }
}

pub struct TestApp {
    pub state: AppState,
    pub notifier: Arc<RecordingNotifier>,
    // Keeps the data directory alive for the test.
    pub dir: TempDir,
}

pub fn config(data_dir: &std::path::Path) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        data_dir: data_dir.to_path_buf(),
        jwt_secret: JWT_SECRET.into(),
        admin_email: ADMIN_EMAIL.into(),
        store_email: STORE_EMAIL.into(),
        mail: None,
    }
}

pub fn test_app() -> anyhow::Result<TestApp> {
    let dir = tempfile::tempdir()?;
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::new(
        JsonStore::open(dir.path()),
        config(dir.path()),
        notifier.clone(),
    );
    Ok(TestApp { state, notifier, dir })
}

pub fn state_with_notifier(notifier: Arc<dyn Notifier>) -> anyhow::Result<(AppState, TempDir)> {
    let dir = tempfile::tempdir()?;
    let state = AppState::new(JsonStore::open(dir.path()), config(dir.path()), notifier);
    Ok((state, dir))
}

/// Inserts a user straight into the store, bypassing signup.
pub async fn create_user(state: &AppState, name: &str, email: &str) -> anyhow::Result<User> {
    let user = state
        .store
        .insert(User {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            ..Default::default()
        })
        .await?;
    Ok(user)
}

pub fn auth_user(user: &User) -> AuthUser {
    AuthUser {
        user_id: user.id.clone(),
        email: user.email.clone(),
    }
}

pub fn token_for(user: &User) -> anyhow::Result<String> {
    issue_token(user, JWT_SECRET).map_err(|e| anyhow::anyhow!(e.to_string()))
}
