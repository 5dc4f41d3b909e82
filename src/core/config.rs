// Author: Dustin Pilgrim
// License: MIT

use std::path::PathBuf;

use crate::core::error::{ConfigError, Error};

pub const DEFAULT_PROMPT_AFTER_MS: u64 = 5 * 60 * 1000;
pub const DEFAULT_COUNTDOWN_AFTER_MS: u64 = 8 * 60 * 1000;
pub const DEFAULT_SIGN_OUT_AFTER_MS: u64 = 10 * 60 * 1000;
pub const DEFAULT_COUNTDOWN_DURATION_MS: u64 = 2 * 60 * 1000;
pub const DEFAULT_NO_PROFILE_RETURN_MS: u64 = 2 * 60 * 1000;

/// How idle tracking treats the current route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// The home/splash screen. Nothing left to protect, so no timers run.
    Splash,
    /// Authentication, pairing and phone-simulation screens.
    /// Prompt and countdown are suppressed; the hard timeout still runs.
    NonKiosk,
    /// The unattended shared-device experience.
    Kiosk,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    pub home_route: String,

    /// Routes where the empty-screen auto-return applies (exact match).
    pub play_routes: Vec<String>,

    /// Prefixes excluded from the visible idle sequence.
    pub non_kiosk_prefixes: Vec<String>,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            home_route: "/".to_string(),
            play_routes: vec!["/play".to_string()],
            non_kiosk_prefixes: vec![
                "/auth".to_string(),
                "/pair".to_string(),
                "/sim".to_string(),
            ],
        }
    }
}

impl RoutePolicy {
    pub fn classify(&self, path: &str) -> RouteClass {
        let path = normalize_route(path);

        if path == normalize_route(&self.home_route) {
            return RouteClass::Splash;
        }

        if self
            .non_kiosk_prefixes
            .iter()
            .any(|p| route_has_prefix(path, normalize_route(p)))
        {
            return RouteClass::NonKiosk;
        }

        RouteClass::Kiosk
    }

    pub fn is_play_route(&self, path: &str) -> bool {
        let path = normalize_route(path);
        self.play_routes.iter().any(|p| normalize_route(p) == path)
    }
}

/// Drop a trailing slash (but keep "/") and any query string.
fn normalize_route(path: &str) -> &str {
    let path = path.trim();
    let path = path.split(['?', '#']).next().unwrap_or(path);
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

/// `/pair` matches `/pair` and `/pair/qr`, not `/pairing`.
fn route_has_prefix(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() || prefix == "/" {
        return false;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Idle timing, all measured from the last recognized activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleConfig {
    pub prompt_after_ms: u64,
    pub countdown_after_ms: u64,
    pub sign_out_after_ms: u64,
    pub countdown_duration_ms: u64,

    /// Empty play screen auto-return. `None` disables the rule.
    pub no_profile_return_ms: Option<u64>,

    pub routes: RoutePolicy,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            prompt_after_ms: DEFAULT_PROMPT_AFTER_MS,
            countdown_after_ms: DEFAULT_COUNTDOWN_AFTER_MS,
            sign_out_after_ms: DEFAULT_SIGN_OUT_AFTER_MS,
            countdown_duration_ms: DEFAULT_COUNTDOWN_DURATION_MS,
            no_profile_return_ms: Some(DEFAULT_NO_PROFILE_RETURN_MS),
            routes: RoutePolicy::default(),
        }
    }
}

impl IdleConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.countdown_after_ms <= self.prompt_after_ms {
            return Err(Error::InvalidConfig(ConfigError::CountdownNotAfterPrompt));
        }

        if self.sign_out_after_ms < self.countdown_after_ms {
            return Err(Error::InvalidConfig(ConfigError::SignOutBeforeCountdown));
        }

        let window = self.sign_out_after_ms - self.countdown_after_ms;
        if window != self.countdown_duration_ms {
            return Err(Error::InvalidConfig(ConfigError::CountdownWindowMismatch {
                expected_ms: window,
                actual_ms: self.countdown_duration_ms,
            }));
        }

        if self.countdown_duration_ms % 1000 != 0 {
            return Err(Error::InvalidConfig(ConfigError::FractionalCountdown));
        }

        if self.routes.home_route.trim().is_empty() {
            return Err(Error::InvalidConfig(ConfigError::EmptyHomeRoute));
        }

        Ok(())
    }

    pub fn countdown_seconds(&self) -> u64 {
        self.countdown_duration_ms / 1000
    }
}

/// Everything the daemon reads from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub idle: IdleConfig,

    /// Base URL of the kiosk REST API. Without it session calls are skipped.
    pub api_base_url: Option<String>,

    /// Override for the session-recovery breadcrumb location.
    pub recovery_path: Option<PathBuf>,
}
