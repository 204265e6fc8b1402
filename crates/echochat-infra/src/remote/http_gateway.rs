//! HttpSessionGateway -- [`RemoteSessionGateway`] over the remote session HTTP API.
//!
//! Routes, all scoped by the device id passed as `userId`:
//! - `GET    {base}/api/sessions?userId=<id>` returns a JSON array of sessions
//! - `POST   {base}/api/sessions` with `{ "session": ..., "userId": ... }`
//! - `DELETE {base}/api/sessions/<sessionId>?userId=<id>`, the id escaped as one path segment
//!
//! Failures never propagate: they are logged at `warn` and come back as an
//! empty list or `false`. The API key is held in a [`SecretString`] and is
//! only exposed when building the `Authorization` header.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use echochat_core::remote::gateway::RemoteSessionGateway;
use echochat_types::chat::ChatSession;
use echochat_types::config::RemoteConfig;
use echochat_types::identity::DeviceId;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpsertBody<'a> {
    session: &'a ChatSession,
    user_id: &'a str,
}

/// Remote session store reached over HTTP.
///
/// Does not derive `Debug` so the client and key never end up in logs.
pub struct HttpSessionGateway {
    client: reqwest::Client,
    base_url: Option<String>,
    api_key: Option<SecretString>,
    last_synced: Mutex<Option<DateTime<Utc>>>,
}

impl HttpSessionGateway {
    /// Build a gateway from configuration. A missing or blank `base_url`
    /// produces an unconfigured gateway that never touches the network.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        let base_url = config
            .base_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.expose_secret().trim().is_empty());

        Ok(Self {
            client,
            base_url,
            api_key,
            last_synced: Mutex::new(None),
        })
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header("content-type", "application/json");
        match &self.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }

    /// `{base}/api/sessions/{session_id}` with the id escaped as one path segment.
    fn session_url(base: &str, session_id: &str) -> Option<reqwest::Url> {
        let mut url = reqwest::Url::parse(base).ok()?;
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["api", "sessions", session_id]);
        Some(url)
    }

    fn mark_synced(&self) {
        if let Ok(mut last) = self.last_synced.lock() {
            *last = Some(Utc::now());
        }
    }

    /// Send a request, returning the response only for 2xx statuses.
    async fn send(&self, op: &str, request: reqwest::RequestBuilder) -> Option<reqwest::Response> {
        let response = match self.authorize(request).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(op, error = %e, "Remote session request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(op, status = status.as_u16(), body = %body, "Remote session store rejected request");
            return None;
        }
        Some(response)
    }
}

impl RemoteSessionGateway for HttpSessionGateway {
    fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    fn last_synced(&self) -> Option<DateTime<Utc>> {
        self.last_synced.lock().ok().and_then(|last| *last)
    }

    async fn fetch_all(&self, device_id: &DeviceId) -> Vec<ChatSession> {
        let Some(base) = &self.base_url else {
            return Vec::new();
        };

        let request = self
            .client
            .get(format!("{base}/api/sessions"))
            .query(&[("userId", device_id.as_str())]);
        let Some(response) = self.send("fetch_all", request).await else {
            return Vec::new();
        };

        match response.json::<Vec<ChatSession>>().await {
            Ok(sessions) => {
                self.mark_synced();
                tracing::debug!(count = sessions.len(), "Fetched remote sessions");
                sessions
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to decode remote sessions");
                Vec::new()
            }
        }
    }

    async fn upsert(&self, session: &ChatSession, device_id: &DeviceId) -> bool {
        let Some(base) = &self.base_url else {
            return false;
        };

        let body = UpsertBody {
            session,
            user_id: device_id.as_str(),
        };
        let request = self.client.post(format!("{base}/api/sessions")).json(&body);
        let ok = self.send("upsert", request).await.is_some();
        if ok {
            self.mark_synced();
        }
        ok
    }

    async fn delete(&self, session_id: &str, device_id: &DeviceId) -> bool {
        let Some(base) = &self.base_url else {
            return false;
        };

        let Some(url) = Self::session_url(base, session_id) else {
            tracing::warn!(base_url = %base, "Remote session base URL cannot carry a path");
            return false;
        };
        let request = self
            .client
            .delete(url)
            .query(&[("userId", device_id.as_str())]);
        let ok = self.send("delete", request).await.is_some();
        if ok {
            self.mark_synced();
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{delete, get};
    use axum::{Json, Router};
    use serde::Deserialize;
    use tokio::net::TcpListener;

    #[derive(Default)]
    struct Remote {
        sessions: Mutex<HashMap<String, Vec<ChatSession>>>,
        auth_headers: Mutex<Vec<Option<String>>>,
        deleted: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    type Shared = Arc<Remote>;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct UserQuery {
        user_id: String,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct UpsertPayload {
        session: ChatSession,
        user_id: String,
    }

    fn record_auth(remote: &Remote, headers: &HeaderMap) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        remote.auth_headers.lock().unwrap().push(auth);
    }

    async fn list(
        State(remote): State<Shared>,
        headers: HeaderMap,
        Query(q): Query<UserQuery>,
    ) -> Result<Json<Vec<ChatSession>>, StatusCode> {
        record_auth(&remote, &headers);
        if remote.fail {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        let all = remote.sessions.lock().unwrap();
        Ok(Json(all.get(&q.user_id).cloned().unwrap_or_default()))
    }

    async fn upsert(
        State(remote): State<Shared>,
        headers: HeaderMap,
        Json(payload): Json<UpsertPayload>,
    ) -> StatusCode {
        record_auth(&remote, &headers);
        if remote.fail {
            return StatusCode::SERVICE_UNAVAILABLE;
        }
        let mut all = remote.sessions.lock().unwrap();
        let list = all.entry(payload.user_id).or_default();
        list.retain(|s| s.id != payload.session.id);
        list.push(payload.session);
        StatusCode::OK
    }

    async fn remove(
        State(remote): State<Shared>,
        headers: HeaderMap,
        Path(session_id): Path<String>,
        Query(q): Query<UserQuery>,
    ) -> StatusCode {
        record_auth(&remote, &headers);
        remote
            .deleted
            .lock()
            .unwrap()
            .push((session_id.clone(), q.user_id.clone()));
        if let Some(list) = remote.sessions.lock().unwrap().get_mut(&q.user_id) {
            list.retain(|s| s.id != session_id);
        }
        StatusCode::NO_CONTENT
    }

    async fn serve(remote: Shared) -> String {
        let app = Router::new()
            .route("/api/sessions", get(list).post(upsert))
            .route("/api/sessions/{id}", delete(remove))
            .with_state(remote);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn gateway(base_url: Option<String>, api_key: Option<&str>) -> HttpSessionGateway {
        HttpSessionGateway::from_config(&RemoteConfig {
            base_url,
            api_key: api_key.map(SecretString::from),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_against_server() {
        let remote = Shared::default();
        let base = serve(remote.clone()).await;
        let gateway = gateway(Some(format!("{base}/")), Some("sk-test"));
        let device = DeviceId::new("device-1");
        assert!(gateway.last_synced().is_none());

        let session = ChatSession::new("llama3");
        assert!(gateway.upsert(&session, &device).await);
        assert!(gateway.last_synced().is_some());

        let fetched = gateway.fetch_all(&device).await;
        assert_eq!(fetched, vec![session.clone()]);
        assert!(gateway.fetch_all(&DeviceId::new("other")).await.is_empty());

        assert!(gateway.delete(&session.id, &device).await);
        assert!(gateway.fetch_all(&device).await.is_empty());

        let headers = remote.auth_headers.lock().unwrap();
        assert!(headers.iter().all(|h| h.as_deref() == Some("Bearer sk-test")));
    }

    #[tokio::test]
    async fn test_delete_escapes_session_id() {
        let remote = Shared::default();
        let base = serve(remote.clone()).await;
        let gateway = gateway(Some(base), None);
        let device = DeviceId::new("device-1");

        let mut session = ChatSession::new("llama3");
        session.id = "a/b?userId=other#frag".to_string();
        assert!(gateway.upsert(&session, &device).await);

        assert!(gateway.delete(&session.id, &device).await);
        assert!(gateway.fetch_all(&device).await.is_empty());
        assert_eq!(
            *remote.deleted.lock().unwrap(),
            vec![(session.id.clone(), "device-1".to_string())]
        );
    }

    #[test]
    fn test_session_url_keeps_base_path() {
        let url = HttpSessionGateway::session_url("http://host:8080/sync", "x y/z").unwrap();
        assert_eq!(url.as_str(), "http://host:8080/sync/api/sessions/x%20y%2Fz");
        let url = HttpSessionGateway::session_url("http://host", "plain").unwrap();
        assert_eq!(url.as_str(), "http://host/api/sessions/plain");
    }

    #[tokio::test]
    async fn test_no_api_key_sends_no_authorization() {
        let remote = Shared::default();
        let base = serve(remote.clone()).await;
        let gateway = gateway(Some(base), None);

        gateway.fetch_all(&DeviceId::new("d")).await;
        assert_eq!(*remote.auth_headers.lock().unwrap(), vec![None]);
    }

    #[tokio::test]
    async fn test_server_errors_fail_soft() {
        let remote = Arc::new(Remote {
            fail: true,
            ..Remote::default()
        });
        let base = serve(remote).await;
        let gateway = gateway(Some(base), None);
        let device = DeviceId::new("d");

        assert!(gateway.fetch_all(&device).await.is_empty());
        assert!(!gateway.upsert(&ChatSession::new("llama3"), &device).await);
        assert!(gateway.last_synced().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_soft() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let gateway = gateway(Some(format!("http://{addr}")), None);
        let device = DeviceId::new("d");
        assert!(gateway.fetch_all(&device).await.is_empty());
        assert!(!gateway.delete("x", &device).await);
    }

    #[tokio::test]
    async fn test_unconfigured_gateway_is_inert() {
        for base_url in [None, Some("   ".to_string())] {
            let gateway = gateway(base_url, Some("sk-test"));
            assert!(!gateway.is_configured());
            assert!(gateway.base_url().is_none());
            let device = DeviceId::new("d");
            assert!(gateway.fetch_all(&device).await.is_empty());
            assert!(!gateway.upsert(&ChatSession::new("llama3"), &device).await);
            assert!(!gateway.delete("x", &device).await);
        }
    }

    #[test]
    fn test_upsert_body_wire_shape() {
        let session = ChatSession::new("mistral");
        let body = UpsertBody {
            session: &session,
            user_id: "device-1",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["userId"], "device-1");
        assert_eq!(json["session"]["id"], session.id.as_str());
        assert_eq!(json["session"]["modelId"], "mistral");
    }
}
