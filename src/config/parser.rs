// Author: Dustin Pilgrim
// License: MIT

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use rune_cfg::RuneConfig;

use crate::core::config::{ConfigFile, IdleConfig, RoutePolicy};

const BLOCK: &str = "bayguard";

pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let config = RuneConfig::from_file(path)
        .map_err(|e| eyre!("failed to load config from {}: {}", path.display(), e))?;

    parse_config(&config).map_err(|e| eyre!("{}: {}", path.display(), e))
}

pub fn parse_str(src: &str) -> Result<ConfigFile> {
    let config = RuneConfig::from_str(src).map_err(|e| eyre!("failed to parse config: {}", e))?;
    parse_config(&config)
}

/// Reads the `bayguard:` block. Keys may be snake_case or kebab-case;
/// durations are whole seconds.
pub fn parse_config(config: &RuneConfig) -> Result<ConfigFile> {
    let defaults = IdleConfig::default();

    let prompt_after_ms = get_seconds(config, "prompt_after_seconds")
        .unwrap_or(defaults.prompt_after_ms);
    let countdown_after_ms = get_seconds(config, "countdown_after_seconds")
        .unwrap_or(defaults.countdown_after_ms);
    let sign_out_after_ms = get_seconds(config, "sign_out_after_seconds")
        .unwrap_or(defaults.sign_out_after_ms);

    // Unset means "the rest of the window".
    let countdown_duration_ms = get_seconds(config, "countdown_seconds")
        .unwrap_or_else(|| sign_out_after_ms.saturating_sub(countdown_after_ms));

    // 0 disables the empty play screen return.
    let no_profile_return_ms = match get_seconds(config, "no_profile_return_seconds") {
        Some(0) => None,
        Some(ms) => Some(ms),
        None => defaults.no_profile_return_ms,
    };

    let route_defaults = RoutePolicy::default();

    let home_route = get_string(config, "home_route").unwrap_or(route_defaults.home_route);
    let play_routes = get_list(config, "play_routes").unwrap_or(route_defaults.play_routes);
    let non_kiosk_prefixes =
        get_list(config, "non_kiosk_routes").unwrap_or(route_defaults.non_kiosk_prefixes);

    let idle = IdleConfig {
        prompt_after_ms,
        countdown_after_ms,
        sign_out_after_ms,
        countdown_duration_ms,
        no_profile_return_ms,
        routes: RoutePolicy {
            home_route,
            play_routes,
            non_kiosk_prefixes,
        },
    };

    idle.validate().map_err(|e| eyre!("{}", e))?;

    let api_base_url = get_string(config, "api_base_url");
    let recovery_path = get_string(config, "recovery_file").map(PathBuf::from);

    tracing::debug!(
        "config: prompt={}ms countdown={}ms sign_out={}ms no_profile={:?} api={:?}",
        idle.prompt_after_ms,
        idle.countdown_after_ms,
        idle.sign_out_after_ms,
        idle.no_profile_return_ms,
        api_base_url,
    );

    Ok(ConfigFile {
        idle,
        api_base_url,
        recovery_path,
    })
}

fn kebab(key: &str) -> String {
    format!("{BLOCK}.{}", key.replace('_', "-"))
}

fn snake(key: &str) -> String {
    format!("{BLOCK}.{key}")
}

fn get_seconds(config: &RuneConfig, key: &str) -> Option<u64> {
    config
        .get::<u64>(&snake(key))
        .or_else(|_| config.get::<u64>(&kebab(key)))
        .ok()
        .map(|secs| secs.saturating_mul(1000))
}

/// Blank strings count as unset.
fn get_string(config: &RuneConfig, key: &str) -> Option<String> {
    config
        .get::<String>(&snake(key))
        .or_else(|_| config.get::<String>(&kebab(key)))
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn get_list(config: &RuneConfig, key: &str) -> Option<Vec<String>> {
    let list: Vec<String> = config
        .get(&snake(key))
        .or_else(|_| config.get(&kebab(key)))
        .ok()?;

    Some(
        list.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    )
}
