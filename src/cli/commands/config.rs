//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{RecymError, RecymResult};
use crate::worker::WorkerSettings;
use console::style;
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> RecymResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config),
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, config, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) {
    let toml =
        toml::to_string_pretty(config).unwrap_or_else(|_| "Error serializing config".to_string());
    println!("{}", toml);
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> RecymResult<()> {
    let path = manager.path();

    if manager.init(force).await? {
        println!(
            "{} Configuration initialized ({})",
            style("✓").green(),
            path.display()
        );
    } else {
        println!(
            "{} Config already exists at {} - use --force to overwrite",
            style("!").yellow(),
            path.display()
        );
    }

    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> RecymResult<()> {
    let config = apply_value(config, key, value)?;

    // Reject values that would leave the worker unbuildable
    WorkerSettings::from_config(&config)?;

    manager.save(&config).await?;
    println!("{} {} = {}", style("✓").green(), key, value);
    Ok(())
}

/// Return a copy of `config` with one dot-separated key set
fn apply_value(config: &Config, key: &str, value: &str) -> RecymResult<Config> {
    let mut config = config.clone();
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "verbose"] => config.general.verbose = parse_bool(value)?,
        ["general", "log_format"] => config.general.log_format = value.to_string(),
        ["general", "journal"] => config.general.journal = parse_bool(value)?,

        ["cache", "prefix"] => config.cache.prefix = value.to_string(),
        ["cache", "version"] => config.cache.version = value.to_string(),
        ["cache", "api_prefix"] => config.cache.api_prefix = value.to_string(),
        ["cache", "static_files"] => config.cache.static_files = parse_list(value),
        ["cache", "model_extensions"] => config.cache.model_extensions = parse_list(value),
        ["cache", "store_dir"] => config.cache.store_dir = Some(PathBuf::from(value)),

        ["network", "origin"] => config.network.origin = value.to_string(),
        ["network", "timeout_secs"] => config.network.timeout_secs = parse_u64(value)?,
        ["network", "user_agent"] => config.network.user_agent = value.to_string(),

        ["notifications", "icon"] => config.notifications.icon = value.to_string(),
        ["notifications", "badge"] => config.notifications.badge = value.to_string(),
        ["notifications", "explore_title"] => {
            config.notifications.explore_title = value.to_string()
        }
        ["notifications", "close_title"] => config.notifications.close_title = value.to_string(),
        ["notifications", "open_url"] => config.notifications.open_url = value.to_string(),

        _ => return Err(RecymError::ConfigKey(key.to_string())),
    }

    Ok(config)
}

fn parse_bool(value: &str) -> RecymResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(RecymError::User(format!("Invalid boolean value: {}", value))),
    }
}

fn parse_u64(value: &str) -> RecymResult<u64> {
    value
        .parse()
        .map_err(|_| RecymError::User(format!("Invalid number: {}", value)))
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_version() {
        let config = apply_value(&Config::default(), "cache.version", "1.1.0").unwrap();
        assert_eq!(config.cache.version, "1.1.0");
    }

    #[test]
    fn apply_list() {
        let config =
            apply_value(&Config::default(), "cache.model_extensions", ".glb, .gltf,").unwrap();
        assert_eq!(config.cache.model_extensions, vec![".glb", ".gltf"]);
    }

    #[test]
    fn apply_unknown_key() {
        let err = apply_value(&Config::default(), "cache.colour", "blue").unwrap_err();
        assert!(matches!(err, RecymError::ConfigKey(_)));
    }

    #[test]
    fn parse_bool_values() {
        assert!(parse_bool("yes").unwrap());
        assert!(!parse_bool("OFF").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn parse_u64_values() {
        assert_eq!(parse_u64("30").unwrap(), 30);
        assert!(parse_u64("-1").is_err());
    }
}
