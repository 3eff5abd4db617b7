//! Settings management for CLI set/unset commands.
//!
//! Each configuration key has a [`SettingHandler`]; the [`SettingRegistry`]
//! routes `promptchip set <key> ...` to it. Handlers mutate a loaded
//! [`Config`] and the caller persists it.

pub mod error;
pub mod handlers;
pub mod helpers;
pub mod registry;

pub use error::SettingError;
pub use registry::SettingRegistry;

use crate::core::config::data::Config;

/// Trait for handling a configuration setting.
pub trait SettingHandler: Send + Sync {
    /// Returns the configuration key this handler manages.
    fn key(&self) -> &'static str;

    /// Set the configuration value from the arguments after the key.
    /// Returns a success message to display.
    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError>;

    /// Unset (clear) the configuration value.
    fn unset(&self, config: &mut Config) -> Result<String, SettingError>;

    /// Format the current value for display in `promptchip set` output.
    fn format(&self, config: &Config) -> String;
}

/// Apply `set` and persist through `save`.
pub fn apply_set<S>(
    registry: &SettingRegistry,
    key: &str,
    args: &[String],
    config: &mut Config,
    save: S,
) -> Result<String, SettingError>
where
    S: FnOnce(&Config) -> Result<(), Box<dyn std::error::Error>>,
{
    let handler = registry
        .get(key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;
    let message = handler.set(args, config)?;
    save(config).map_err(|e| SettingError::ConfigError(e.to_string()))?;
    Ok(message)
}

/// Apply `unset` and persist through `save`.
pub fn apply_unset<S>(
    registry: &SettingRegistry,
    key: &str,
    config: &mut Config,
    save: S,
) -> Result<String, SettingError>
where
    S: FnOnce(&Config) -> Result<(), Box<dyn std::error::Error>>,
{
    let handler = registry
        .get(key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;
    let message = handler.unset(config)?;
    save(config).map_err(|e| SettingError::ConfigError(e.to_string()))?;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn set_routes_to_handler_and_saves() {
        let registry = SettingRegistry::new();
        let mut config = Config::default();
        let saved = Cell::new(false);

        let message = apply_set(&registry, "trigger", &args(&["#"]), &mut config, |_| {
            saved.set(true);
            Ok(())
        })
        .expect("set trigger");

        assert_eq!(config.trigger, Some('#'));
        assert!(saved.get());
        assert_eq!(message, "✅ Set trigger to: #");
    }

    #[test]
    fn unknown_key_is_rejected_without_saving() {
        let registry = SettingRegistry::new();
        let mut config = Config::default();
        let err = apply_set(&registry, "theme", &args(&["dark"]), &mut config, |_| {
            panic!("must not save")
        })
        .unwrap_err();
        assert!(matches!(err, SettingError::UnknownKey(ref key) if key == "theme"));
    }

    #[test]
    fn save_failure_maps_to_config_error() {
        let registry = SettingRegistry::new();
        let mut config = Config::default();
        let err = apply_unset(&registry, "tool-color", &mut config, |_| {
            Err("disk full".into())
        })
        .unwrap_err();
        assert!(matches!(err, SettingError::ConfigError(ref msg) if msg == "disk full"));
    }
}
