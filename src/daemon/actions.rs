// Author: Dustin Pilgrim
// License: MIT

use crate::core::{action::Action, events::Event, manager_msg::ManagerMsg};
use crate::services::session_api::close_session;

use tokio::sync::mpsc;

use super::{AnyError, Daemon};

impl Daemon {
    pub(super) async fn exec_action_with_tx(
        &mut self,
        action: Action,
        tx: mpsc::Sender<ManagerMsg>,
    ) -> Result<(), AnyError> {
        match action {
            Action::CloseSession { session_id, owner } => {
                self.spawn_close_session(session_id, owner);
            }

            Action::WriteRecoveryBreadcrumb {
                session_id,
                started_at_ms,
            } => {
                if let Some(store) = &self.collab.recovery {
                    if let Err(e) = store.write(&session_id, started_at_ms) {
                        tracing::warn!("recovery: failed to write breadcrumb for {session_id}: {e}");
                    }
                }
            }

            Action::ClearRecoveryBreadcrumb { session_id } => {
                if let Some(store) = &self.collab.recovery {
                    match store.clear_if_matches(&session_id) {
                        Ok(true) => tracing::debug!("recovery: cleared breadcrumb for {session_id}"),
                        Ok(false) => {}
                        Err(e) => tracing::warn!("recovery: failed to clear breadcrumb: {e}"),
                    }
                }
            }

            Action::ClearSession => self.collab.stores.clear_session(),
            Action::ClearAuthentication => self.collab.stores.clear_authentication(),
            Action::ClearLinkedAccounts => self.collab.stores.clear_linked_accounts(),
            Action::ClearGuestProfiles => self.collab.stores.clear_guest_profiles(),
            Action::ClearPlayerSelections => self.collab.stores.clear_player_selections(),

            Action::ReplaceRoute { path } => {
                tracing::info!("navigate: {path}");
                self.collab.navigator.replace_route(&path);
            }

            Action::CompleteSignOut => {
                // Queued behind anything already waiting; the guard holds until then.
                tokio::spawn(async move {
                    let _ = tx
                        .send(ManagerMsg::Event(Event::SignOutCompleted {
                            now_ms: crate::core::utils::now_ms(),
                        }))
                        .await;
                });
            }
        }

        Ok(())
    }

    /// Never awaited by the event loop.
    fn spawn_close_session(&self, session_id: String, owner: Option<crate::core::state::SessionOwner>) {
        let sessions = self.collab.sessions.clone();

        tokio::spawn(async move {
            let failures = close_session(sessions.as_ref(), &session_id, owner).await;
            if failures.is_empty() {
                tracing::info!("session api: closed {session_id}");
            }
            for e in failures {
                tracing::warn!("session api: closing {session_id}: {e}");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use futures::future::BoxFuture;

    use super::*;
    use crate::core::config::ConfigFile;
    use crate::core::state::SessionOwner;
    use crate::daemon::Collaborators;
    use crate::services::recovery::RecoveryStore;
    use crate::services::session_api::{ServiceError, SessionService};
    use crate::services::ui_bridge::{KioskStores, Navigator, UiBridge};

    #[derive(Default)]
    struct RecordingUi {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingUi {
        fn push(&self, s: &str) {
            self.calls.lock().unwrap().push(s.to_string());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl KioskStores for RecordingUi {
        fn clear_session(&self) {
            self.push("session");
        }
        fn clear_authentication(&self) {
            self.push("auth");
        }
        fn clear_linked_accounts(&self) {
            self.push("linked");
        }
        fn clear_guest_profiles(&self) {
            self.push("guests");
        }
        fn clear_player_selections(&self) {
            self.push("players");
        }
    }

    impl Navigator for RecordingUi {
        fn replace_route(&self, path: &str) {
            self.push(&format!("route {path}"));
        }
    }

    /// A backend that never answers.
    struct Hanging;

    impl SessionService for Hanging {
        fn end_session<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<(), ServiceError>> {
            Box::pin(futures::future::pending())
        }
        fn sync_session<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<(), ServiceError>> {
            Box::pin(futures::future::pending())
        }
        fn session_ownership<'a>(
            &'a self,
            _: &'a str,
        ) -> BoxFuture<'a, Result<SessionOwner, ServiceError>> {
            Box::pin(futures::future::pending())
        }
    }

    /// Reports every call on a channel; sessions are owned by a user.
    struct Reporting(mpsc::UnboundedSender<String>);

    impl SessionService for Reporting {
        fn end_session<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<(), ServiceError>> {
            let _ = self.0.send(format!("end {id}"));
            Box::pin(async { Ok(()) })
        }
        fn sync_session<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<(), ServiceError>> {
            let _ = self.0.send(format!("sync {id}"));
            Box::pin(async { Ok(()) })
        }
        fn session_ownership<'a>(
            &'a self,
            id: &'a str,
        ) -> BoxFuture<'a, Result<SessionOwner, ServiceError>> {
            let _ = self.0.send(format!("owner {id}"));
            Box::pin(async { Ok(SessionOwner::User) })
        }
    }

    struct Failing;

    impl SessionService for Failing {
        fn end_session<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<(), ServiceError>> {
            Box::pin(async {
                Err(ServiceError::Status {
                    method: "PATCH",
                    path: "/api/sessions/s1".into(),
                    status: 503,
                })
            })
        }
        fn sync_session<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<(), ServiceError>> {
            Box::pin(async { Ok(()) })
        }
        fn session_ownership<'a>(
            &'a self,
            id: &'a str,
        ) -> BoxFuture<'a, Result<SessionOwner, ServiceError>> {
            Box::pin(async move { Err(ServiceError::UnknownOwner(id.to_string())) })
        }
    }

    fn daemon_with(
        sessions: Arc<dyn SessionService>,
        dir: &tempfile::TempDir,
    ) -> (Daemon, Arc<RecordingUi>, RecoveryStore) {
        let ui = Arc::new(RecordingUi::default());
        let recovery = RecoveryStore::new(dir.path().join("session-recovery.json"));

        let collab = Collaborators {
            sessions,
            stores: ui.clone(),
            navigator: ui.clone(),
            recovery: Some(recovery.clone()),
        };

        let daemon = Daemon::with_collaborators(
            ConfigFile::default(),
            PathBuf::from("/nonexistent/bayguard.rune"),
            UiBridge::new(),
            collab,
        );

        (daemon, ui, recovery)
    }

    fn start_session(id: &str) -> Event {
        Event::SessionStarted {
            session_id: id.to_string(),
            owner: Some(SessionOwner::User),
            started_at_ms: 42,
            now_ms: crate::core::utils::now_ms(),
        }
    }

    fn force_sign_out() -> Event {
        Event::ForceSignOut {
            now_ms: crate::core::utils::now_ms(),
        }
    }

    const EXPECTED_CLEANUP: [&str; 6] = ["session", "auth", "linked", "guests", "players", "route /"];

    #[tokio::test]
    async fn hanging_backend_does_not_block_local_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let (mut daemon, ui, recovery) = daemon_with(Arc::new(Hanging), &dir);
        let (tx, mut rx) = mpsc::channel(8);

        daemon.dispatch(start_session("s1"), &tx).await.unwrap();
        assert!(recovery.read().unwrap().is_some());

        tokio::time::timeout(Duration::from_secs(1), daemon.dispatch(force_sign_out(), &tx))
            .await
            .expect("sign-out must not wait on the network")
            .unwrap();

        assert_eq!(ui.calls(), EXPECTED_CLEANUP);
        assert!(recovery.read().unwrap().is_none());

        let msg = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert!(matches!(
            msg,
            Some(ManagerMsg::Event(Event::SignOutCompleted { .. }))
        ));
    }

    #[tokio::test]
    async fn failing_backend_still_signs_out_locally() {
        let dir = tempfile::tempdir().unwrap();
        let (mut daemon, ui, _recovery) = daemon_with(Arc::new(Failing), &dir);
        let (tx, mut rx) = mpsc::channel(8);

        daemon.dispatch(start_session("s1"), &tx).await.unwrap();
        daemon.dispatch(force_sign_out(), &tx).await.unwrap();

        assert_eq!(ui.calls(), EXPECTED_CLEANUP);

        // Completion comes back through the channel and releases the guard.
        let Some(ManagerMsg::Event(done)) = rx.recv().await else {
            panic!("expected sign-out completion");
        };
        daemon.dispatch(done, &tx).await.unwrap();
        assert!(!daemon.state.signing_out());
    }

    #[tokio::test]
    async fn second_sign_out_request_is_ignored_while_in_flight() {
        let dir = tempfile::tempdir().unwrap();
        let (mut daemon, ui, _recovery) = daemon_with(Arc::new(Hanging), &dir);
        let (tx, _rx) = mpsc::channel(8);

        daemon.dispatch(force_sign_out(), &tx).await.unwrap();
        daemon.dispatch(force_sign_out(), &tx).await.unwrap();

        assert_eq!(ui.calls(), EXPECTED_CLEANUP);
        assert_eq!(daemon.state.sign_out_count(), 1);
    }

    #[tokio::test]
    async fn breadcrumb_for_other_session_survives_sign_out() {
        let dir = tempfile::tempdir().unwrap();
        let (mut daemon, _ui, recovery) = daemon_with(Arc::new(Hanging), &dir);
        let (tx, _rx) = mpsc::channel(8);

        daemon.dispatch(start_session("s1"), &tx).await.unwrap();
        recovery.write("other", 7).unwrap();

        daemon.dispatch(force_sign_out(), &tx).await.unwrap();
        assert_eq!(
            recovery.read().unwrap().map(|c| c.session_id),
            Some("other".to_string())
        );
    }

    #[tokio::test]
    async fn view_follows_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let (mut daemon, _ui, _recovery) = daemon_with(Arc::new(Hanging), &dir);
        let (tx, _rx) = mpsc::channel(8);
        let mut view = daemon.view();

        let now_ms = crate::core::utils::now_ms();
        daemon
            .dispatch(
                Event::RouteChanged {
                    path: "/mode/range".to_string(),
                    now_ms,
                },
                &tx,
            )
            .await
            .unwrap();
        daemon
            .dispatch(Event::TriggerPrompt { now_ms }, &tx)
            .await
            .unwrap();

        assert!(view.has_changed().unwrap());
        assert!(view.borrow_and_update().modal_visible);

        daemon
            .dispatch(Event::AcknowledgePresence { now_ms }, &tx)
            .await
            .unwrap();
        assert!(!view.borrow_and_update().modal_visible);
    }

    #[tokio::test]
    async fn unknown_owner_is_resolved_before_sync() {
        let dir = tempfile::tempdir().unwrap();
        let (calls_tx, mut calls) = mpsc::unbounded_channel();
        let (mut daemon, _ui, _recovery) = daemon_with(Arc::new(Reporting(calls_tx)), &dir);
        let (tx, _rx) = mpsc::channel(8);

        daemon
            .dispatch(
                Event::SessionStarted {
                    session_id: "s9".to_string(),
                    owner: None,
                    started_at_ms: 42,
                    now_ms: crate::core::utils::now_ms(),
                },
                &tx,
            )
            .await
            .unwrap();
        daemon.dispatch(force_sign_out(), &tx).await.unwrap();

        let mut seen = Vec::new();
        for _ in 0..3 {
            let call = tokio::time::timeout(Duration::from_secs(1), calls.recv())
                .await
                .unwrap()
                .unwrap();
            seen.push(call);
        }
        assert_eq!(seen, ["end s9", "owner s9", "sync s9"]);
    }

    #[test]
    fn boot_schedules_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (daemon, ui, _recovery) = daemon_with(Arc::new(Failing), &dir);

        assert_eq!(daemon.state.timers().next_due_ms(), None);
        assert!(ui.calls().is_empty());
    }
}
