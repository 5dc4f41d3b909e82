// Author: Dustin Pilgrim
// License: MIT

use crate::core::manager_msg::ManagerMsg;
use crate::ipc::router::IpcContext;

use tokio::sync::{mpsc, watch};

use super::{AnyError, Daemon, recovery_store_for, session_service_for};

pub const EVENT_CHANNEL_CAPACITY: usize = 256;

impl Daemon {
    pub async fn run(
        &mut self,
        mut shutdown: watch::Receiver<bool>,
        shutdown_tx: watch::Sender<bool>,
    ) -> Result<(), AnyError> {
        tracing::info!("daemon starting");

        let (tx, mut rx) = mpsc::channel::<ManagerMsg>(EVENT_CHANNEL_CAPACITY);

        let ctx = IpcContext {
            tx: tx.clone(),
            view: self.view(),
            ui: self.ui.clone(),
        };
        if let Err(e) = crate::ipc::server::spawn_ipc_server(ctx).await {
            tracing::warn!("ipc: failed to start: {}", e);
        }

        tokio::spawn(crate::services::ticker::run_ticker(tx.clone(), shutdown.clone()));

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("daemon stopping (shutdown requested)");
                        break;
                    }
                }

                maybe = rx.recv() => {
                    let Some(msg) = maybe else {
                        tracing::info!("daemon stopping (event channel closed)");
                        break;
                    };

                    match msg {
                        ManagerMsg::Event(event) => {
                            let _ = self.dispatch(event, &tx).await;
                        }

                        ManagerMsg::Request { event, reply } => {
                            let out = self.dispatch(event, &tx).await.map_err(|e| e.to_string());
                            let _ = reply.send(out);
                        }

                        ManagerMsg::GetInfo { reply } => {
                            let now_ms = crate::core::utils::now_ms();
                            let snap = self.manager.snapshot(&self.state, now_ms);
                            let _ = reply.send(snap);
                        }

                        ManagerMsg::ReloadConfig { reply } => {
                            let out = self.reload_config(&tx).await;
                            let _ = reply.send(out);
                        }

                        ManagerMsg::StopDaemon { reply } => {
                            tracing::info!("daemon stopping (stop requested via IPC)");
                            let _ = reply.send(Ok("Stopping bayguard daemon".to_string()));
                            let _ = shutdown_tx.send(true);
                            break;
                        }
                    }
                }
            }
        }

        self.manager.dispose(&mut self.state);
        self.publish_view();

        Ok(())
    }

    /// Re-read the config file. On any error the running config stays.
    async fn reload_config(&mut self, tx: &mpsc::Sender<ManagerMsg>) -> Result<String, String> {
        let loaded = crate::config::load_from_path(&self.config_path).map_err(|e| {
            tracing::error!("reload: {e}");
            format!("{e} (keeping current config)")
        })?;

        self.collab.sessions = session_service_for(&loaded.cfg);
        self.collab.recovery = recovery_store_for(&loaded.cfg);

        let now_ms = crate::core::utils::now_ms();
        let actions = self.manager.apply_config(&mut self.state, loaded.cfg.idle, now_ms);
        self.exec_actions(actions, tx).await;
        self.publish_view();

        if loaded.from_file {
            Ok(format!("Reloaded {}", loaded.path.display()))
        } else {
            Ok("Reloaded (no config file, using defaults)".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConfigFile;
    use crate::core::events::{ActivityKind, Event};
    use crate::core::state::Phase;

    fn daemon_at(path: std::path::PathBuf) -> Daemon {
        Daemon::new(ConfigFile::default(), path)
    }

    #[tokio::test]
    async fn reload_applies_new_timings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bayguard.rune");
        let mut daemon = daemon_at(path.clone());
        let (tx, _rx) = mpsc::channel(8);

        std::fs::write(
            &path,
            "bayguard:\n  prompt_after_seconds 60\n  countdown_after_seconds 120\n  sign_out_after_seconds 180\nend\n",
        )
        .unwrap();

        let out = daemon.reload_config(&tx).await;
        assert!(out.unwrap().starts_with("Reloaded"));
        assert_eq!(daemon.manager.cfg().prompt_after_ms, 60_000);
    }

    #[tokio::test]
    async fn broken_reload_keeps_running_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bayguard.rune");
        let mut daemon = daemon_at(path.clone());
        let (tx, _rx) = mpsc::channel(8);

        std::fs::write(
            &path,
            "bayguard:\n  prompt_after_seconds 900\nend\n",
        )
        .unwrap();

        assert!(daemon.reload_config(&tx).await.is_err());
        assert_eq!(daemon.manager.cfg().prompt_after_ms, 300_000);
    }

    #[tokio::test]
    async fn request_reports_rejected_events() {
        let dir = tempfile::tempdir().unwrap();
        let mut daemon = daemon_at(dir.path().join("missing.rune"));
        let (tx, _rx) = mpsc::channel(8);

        // Still on the splash screen: the prompt cannot be opened.
        let now_ms = crate::core::utils::now_ms();
        let err = daemon.dispatch(Event::TriggerPrompt { now_ms }, &tx).await;
        assert!(err.is_err());

        daemon
            .dispatch(
                Event::UserActivity {
                    kind: ActivityKind::Generic,
                    now_ms,
                },
                &tx,
            )
            .await
            .unwrap();
        assert_eq!(daemon.state.phase(), Phase::Active);
    }
}
