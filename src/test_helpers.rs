//! Shared fixtures for unit tests: sample users, storage doubles, an
//! in-process backend, and a navigator that records redirects.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::Api;
use crate::config::ClientConfig;
use crate::gateway::Gateway;
use crate::navigation::Navigator;
use crate::session::{SessionStore, UserSummary};
use crate::storage::{SessionStorage, StorageError};

#[must_use]
pub fn sample_user(id: i64, nickname: &str) -> UserSummary {
    UserSummary::new(id, nickname)
}

/// Fresh directory under the system temp dir, deleted when the guard drops.
#[must_use]
pub fn temp_dir(label: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(&format!("sweatlo-{label}-"))
        .tempdir()
        .expect("temp dir should be created")
}

/// Storage whose writes always fail, as with an exhausted quota.
#[derive(Debug, Default)]
pub struct FailingStorage;

impl SessionStorage for FailingStorage {
    fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn save(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("quota exceeded".into()))
    }
}

/// Storage that cannot be read at all, as with `localStorage` disabled.
#[derive(Debug, Default)]
pub struct UnreadableStorage;

impl SessionStorage for UnreadableStorage {
    fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("storage disabled".into()))
    }

    fn save(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage disabled".into()))
    }
}

/// Serve `routes` under `/api` on an ephemeral port; returns the API base URL.
pub async fn spawn_backend(routes: axum::Router) -> String {
    let app = axum::Router::new().nest("/api", routes);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("test backend should bind");
    let addr = listener.local_addr().expect("test backend addr");
    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("test backend failed");
    });
    format!("http://{addr}/api")
}

#[must_use]
pub fn gateway_for(base_url: &str, session: &SessionStore) -> Gateway {
    Gateway::new(&ClientConfig::with_base_url(base_url), session.clone()).expect("gateway should build")
}

#[must_use]
pub fn api_for(base_url: &str, session: &SessionStore) -> Api {
    Api::new(gateway_for(base_url, session))
}

/// Navigator that forwards every route it is asked to visit.
pub struct RecordingNavigator {
    tx: mpsc::UnboundedSender<String>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        let _ = self.tx.send(route.to_owned());
    }
}
