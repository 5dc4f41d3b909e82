// Author: Dustin Pilgrim
// License: MIT

mod actions;
mod run;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::core::{
    action::Action,
    config::{ConfigFile, RouteClass},
    error::Error,
    events::Event,
    info::ModalView,
    manager::Manager,
    manager_msg::ManagerMsg,
    state::State,
};
use crate::services::{
    recovery::RecoveryStore,
    session_api::{DetachedSessionService, HttpSessionService, SessionService},
    ui_bridge::{KioskStores, Navigator, UiBridge},
};

type AnyError = Box<dyn std::error::Error + Send + Sync>;

/// Everything the daemon drives on the outside.
#[derive(Clone)]
pub struct Collaborators {
    pub sessions: Arc<dyn SessionService>,
    pub stores: Arc<dyn KioskStores>,
    pub navigator: Arc<dyn Navigator>,
    pub recovery: Option<RecoveryStore>,
}

impl Collaborators {
    pub fn from_config(cfg: &ConfigFile, ui: &UiBridge) -> Self {
        Self {
            sessions: session_service_for(cfg),
            stores: Arc::new(ui.clone()),
            navigator: Arc::new(ui.clone()),
            recovery: recovery_store_for(cfg),
        }
    }
}

fn session_service_for(cfg: &ConfigFile) -> Arc<dyn SessionService> {
    let Some(url) = cfg.api_base_url.as_deref() else {
        tracing::info!("session api: no api_base_url configured, sign-out stays local");
        return Arc::new(DetachedSessionService);
    };

    match HttpSessionService::new(url) {
        Ok(svc) => {
            tracing::info!("session api: {url}");
            Arc::new(svc)
        }
        Err(e) => {
            tracing::warn!("session api: client setup failed ({e}); sign-out stays local");
            Arc::new(DetachedSessionService)
        }
    }
}

fn recovery_store_for(cfg: &ConfigFile) -> Option<RecoveryStore> {
    let path = cfg.recovery_path.clone().or_else(RecoveryStore::default_path);
    if path.is_none() {
        tracing::warn!("recovery: no data directory, breadcrumbs disabled");
    }
    path.map(RecoveryStore::new)
}

pub struct Daemon {
    manager: Manager,
    state: State,

    config_path: PathBuf,

    ui: UiBridge,
    collab: Collaborators,

    view_tx: watch::Sender<ModalView>,
}

impl Daemon {
    pub fn new(cfg_file: ConfigFile, config_path: PathBuf) -> Self {
        let ui = UiBridge::new();
        let collab = Collaborators::from_config(&cfg_file, &ui);
        Self::with_collaborators(cfg_file, config_path, ui, collab)
    }

    pub fn with_collaborators(
        cfg_file: ConfigFile,
        config_path: PathBuf,
        ui: UiBridge,
        collab: Collaborators,
    ) -> Self {
        let now_ms = crate::core::utils::now_ms();
        let manager = Manager::new(cfg_file.idle);

        // The kiosk boots onto its splash screen.
        let home = manager.cfg().routes.home_route.clone();
        let mut state = State::new(now_ms, home, RouteClass::Splash);
        let boot = manager.start(&mut state, now_ms);
        debug_assert!(boot.is_empty(), "splash boot with no occupant has nothing to run");

        let view_tx = watch::Sender::new(manager.view(&state));

        tracing::debug!(
            "daemon: config_path={}, recovery={:?}",
            config_path.display(),
            collab.recovery.as_ref().map(|r| r.path().display().to_string()),
        );

        Self {
            manager,
            state,
            config_path,
            ui,
            collab,
            view_tx,
        }
    }

    pub fn view(&self) -> watch::Receiver<ModalView> {
        self.view_tx.subscribe()
    }

    fn handle_one_event_scoped(&mut self, event: Event) -> Result<Vec<Action>, Error> {
        if matches!(event, Event::Tick { .. }) {
            return self.manager.handle_event(&mut self.state, event).map_err(|e| {
                tracing::error!("handle_event failed: {e}");
                e
            });
        }

        let _span = tracing::debug_span!("event").entered();
        tracing::debug!("incoming: {:?}", event);

        match self.manager.handle_event(&mut self.state, event) {
            Ok(actions) => {
                if !actions.is_empty() {
                    tracing::debug!("actions: {:?}", actions);
                }
                Ok(actions)
            }
            Err(e) => {
                tracing::warn!("event rejected: {e}");
                Err(e)
            }
        }
    }

    /// Handle one event end to end: state transition, side effects, view.
    async fn dispatch(&mut self, event: Event, tx: &mpsc::Sender<ManagerMsg>) -> Result<(), Error> {
        let out = match self.handle_one_event_scoped(event) {
            Ok(actions) => {
                self.exec_actions(actions, tx).await;
                Ok(())
            }
            Err(e) => Err(e),
        };

        self.publish_view();
        out
    }

    async fn exec_actions(&mut self, actions: Vec<Action>, tx: &mpsc::Sender<ManagerMsg>) {
        for action in actions {
            if let Err(e) = self.exec_action_with_tx(action, tx.clone()).await {
                tracing::error!("action failed: {}", e);
            }
        }
    }

    fn publish_view(&self) {
        let view = self.manager.view(&self.state);
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }
}
