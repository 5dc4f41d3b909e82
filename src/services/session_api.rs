// Author: Dustin Pilgrim
// License: MIT

//! Remote session records.
//!
//! Every call here is best-effort from the daemon's point of view: failures
//! are logged by the caller and never hold up local cleanup.

use std::time::Duration;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::core::state::SessionOwner;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("http: {0}")]
    Http(String),

    #[error("{method} {path} returned {status}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
    },

    #[error("session {0} has an unrecognized owner type")]
    UnknownOwner(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        ServiceError::Http(e.to_string())
    }
}

pub trait SessionService: Send + Sync {
    /// Mark the session ended as of now.
    fn end_session<'a>(&'a self, session_id: &'a str) -> BoxFuture<'a, Result<(), ServiceError>>;

    /// Reconcile a user-owned session with the user's history.
    fn sync_session<'a>(&'a self, session_id: &'a str) -> BoxFuture<'a, Result<(), ServiceError>>;

    fn session_ownership<'a>(
        &'a self,
        session_id: &'a str,
    ) -> BoxFuture<'a, Result<SessionOwner, ServiceError>>;
}

// ---------------- http ----------------

pub struct HttpSessionService {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EndSessionBody {
    ends_at: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncSessionBody<'a> {
    session_id: &'a str,
}

#[derive(Deserialize)]
struct SessionEnvelope {
    session: SessionRecord,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRecord {
    owner_type: String,
}

impl HttpSessionService {
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn check(method: &'static str, path: String, resp: &reqwest::Response) -> Result<(), ServiceError> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ServiceError::Status {
                method,
                path,
                status: status.as_u16(),
            })
        }
    }
}

impl SessionService for HttpSessionService {
    fn end_session<'a>(&'a self, session_id: &'a str) -> BoxFuture<'a, Result<(), ServiceError>> {
        Box::pin(async move {
            let path = format!("/api/sessions/{session_id}");
            let body = EndSessionBody {
                ends_at: crate::core::utils::now_ms(),
            };

            let resp = self.http.patch(self.url(&path)).json(&body).send().await?;
            Self::check("PATCH", path, &resp)
        })
    }

    fn sync_session<'a>(&'a self, session_id: &'a str) -> BoxFuture<'a, Result<(), ServiceError>> {
        Box::pin(async move {
            let path = "/api/sessions/sync".to_string();
            let body = SyncSessionBody { session_id };

            let resp = self.http.post(self.url(&path)).json(&body).send().await?;
            Self::check("POST", path, &resp)
        })
    }

    fn session_ownership<'a>(
        &'a self,
        session_id: &'a str,
    ) -> BoxFuture<'a, Result<SessionOwner, ServiceError>> {
        Box::pin(async move {
            let path = format!("/api/sessions/{session_id}");

            let resp = self.http.get(self.url(&path)).send().await?;
            Self::check("GET", path, &resp)?;

            let env: SessionEnvelope = resp.json().await?;
            SessionOwner::parse(&env.session.owner_type)
                .ok_or_else(|| ServiceError::UnknownOwner(session_id.to_string()))
        })
    }
}

// ---------------- detached ----------------

/// Used when no API is configured: the kiosk still signs out locally.
pub struct DetachedSessionService;

impl SessionService for DetachedSessionService {
    fn end_session<'a>(&'a self, session_id: &'a str) -> BoxFuture<'a, Result<(), ServiceError>> {
        Box::pin(async move {
            tracing::debug!("session api: detached, not ending {session_id} remotely");
            Ok(())
        })
    }

    fn sync_session<'a>(&'a self, session_id: &'a str) -> BoxFuture<'a, Result<(), ServiceError>> {
        Box::pin(async move {
            tracing::debug!("session api: detached, not syncing {session_id}");
            Ok(())
        })
    }

    fn session_ownership<'a>(
        &'a self,
        session_id: &'a str,
    ) -> BoxFuture<'a, Result<SessionOwner, ServiceError>> {
        Box::pin(async move { Err(ServiceError::UnknownOwner(session_id.to_string())) })
    }
}

/// Close a session remotely: end it, then sync it when a user owns it.
/// The owner is looked up only if it is not known locally.
///
/// Each step is attempted on its own; a failed end does not prevent the
/// sync. Returns every failure, empty on full success.
pub async fn close_session(
    service: &dyn SessionService,
    session_id: &str,
    owner: Option<SessionOwner>,
) -> Vec<ServiceError> {
    let mut failures = Vec::new();

    if let Err(e) = service.end_session(session_id).await {
        failures.push(e);
    }

    let owner = match owner {
        Some(o) => o,
        None => match service.session_ownership(session_id).await {
            Ok(o) => o,
            Err(e) => {
                failures.push(e);
                return failures;
            }
        },
    };

    if owner == SessionOwner::User {
        if let Err(e) = service.sync_session(session_id).await {
            failures.push(e);
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<String>>,
        owner: Option<SessionOwner>,
        end_status: Option<u16>,
    }

    impl SessionService for Recording {
        fn end_session<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<(), ServiceError>> {
            Box::pin(async move {
                self.calls.lock().unwrap().push(format!("end {id}"));
                match self.end_status {
                    Some(status) => Err(ServiceError::Status {
                        method: "PATCH",
                        path: format!("/api/sessions/{id}"),
                        status,
                    }),
                    None => Ok(()),
                }
            })
        }

        fn sync_session<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<(), ServiceError>> {
            Box::pin(async move {
                self.calls.lock().unwrap().push(format!("sync {id}"));
                Ok(())
            })
        }

        fn session_ownership<'a>(
            &'a self,
            id: &'a str,
        ) -> BoxFuture<'a, Result<SessionOwner, ServiceError>> {
            Box::pin(async move {
                self.calls.lock().unwrap().push(format!("owner {id}"));
                self.owner.ok_or_else(|| ServiceError::UnknownOwner(id.to_string()))
            })
        }
    }

    #[tokio::test]
    async fn user_session_is_ended_then_synced() {
        let svc = Recording::default();
        assert!(close_session(&svc, "s1", Some(SessionOwner::User)).await.is_empty());
        assert_eq!(*svc.calls.lock().unwrap(), vec!["end s1", "sync s1"]);
    }

    #[tokio::test]
    async fn guest_session_is_not_synced() {
        let svc = Recording::default();
        assert!(close_session(&svc, "s1", Some(SessionOwner::Guest)).await.is_empty());
        assert_eq!(*svc.calls.lock().unwrap(), vec!["end s1"]);
    }

    #[tokio::test]
    async fn unknown_owner_is_looked_up() {
        let svc = Recording {
            owner: Some(SessionOwner::User),
            ..Default::default()
        };
        assert!(close_session(&svc, "s1", None).await.is_empty());
        assert_eq!(*svc.calls.lock().unwrap(), vec!["end s1", "owner s1", "sync s1"]);
    }

    #[tokio::test]
    async fn failed_end_still_syncs() {
        let svc = Recording {
            end_status: Some(404),
            ..Default::default()
        };
        let failures = close_session(&svc, "s1", Some(SessionOwner::User)).await;

        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], ServiceError::Status { status: 404, .. }));
        assert_eq!(*svc.calls.lock().unwrap(), vec!["end s1", "sync s1"]);
    }

    #[tokio::test]
    async fn failed_lookup_skips_sync() {
        let svc = Recording::default();
        let failures = close_session(&svc, "s1", None).await;

        assert!(matches!(failures.as_slice(), [ServiceError::UnknownOwner(_)]));
        assert_eq!(*svc.calls.lock().unwrap(), vec!["end s1", "owner s1"]);
    }

    #[test]
    fn ownership_envelope_parses() {
        let env: SessionEnvelope =
            serde_json::from_str(r#"{"session":{"id":"s1","ownerType":"user"}}"#).unwrap();
        assert_eq!(SessionOwner::parse(&env.session.owner_type), Some(SessionOwner::User));
    }

    #[test]
    fn request_bodies_use_camel_case() {
        let end = serde_json::to_value(EndSessionBody { ends_at: 42 }).unwrap();
        assert_eq!(end, serde_json::json!({ "endsAt": 42 }));

        let sync = serde_json::to_value(SyncSessionBody { session_id: "s1" }).unwrap();
        assert_eq!(sync, serde_json::json!({ "sessionId": "s1" }));
    }
}
