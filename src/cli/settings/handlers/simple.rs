//! Simple setting handlers for single-value settings.

use std::path::PathBuf;

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{
    parse_trigger_char, require_value, success_set, success_unset,
};
use crate::cli::settings::SettingHandler;
use crate::core::config::data::{path_display, Config, DEFAULT_MAX_POPUP_ROWS};
use crate::core::trigger::DEFAULT_TRIGGER;

/// Handler for the `trigger` setting.
pub struct TriggerHandler;

impl SettingHandler for TriggerHandler {
    fn key(&self) -> &'static str {
        "trigger"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let value = require_value(
            args,
            "To set the completion trigger, provide a single character:",
            "promptchip set trigger #",
        )?;
        let trigger = parse_trigger_char(&value).ok_or_else(|| SettingError::InvalidValue {
            key: "trigger",
            input: value.clone(),
            expected: "a single visible character",
        })?;
        config.trigger = Some(trigger);
        Ok(success_set("trigger", &value))
    }

    fn unset(&self, config: &mut Config) -> Result<String, SettingError> {
        config.trigger = None;
        Ok(success_unset("trigger"))
    }

    fn format(&self, config: &Config) -> String {
        match config.trigger {
            Some(trigger) => format!("  trigger: {trigger}"),
            None => format!("  trigger: {DEFAULT_TRIGGER} (default)"),
        }
    }
}

/// Handler for the `max-popup-rows` setting.
pub struct MaxPopupRowsHandler;

impl SettingHandler for MaxPopupRowsHandler {
    fn key(&self) -> &'static str {
        "max-popup-rows"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let value = require_value(
            args,
            "To set the popup height, provide a row count:",
            "promptchip set max-popup-rows 6",
        )?;
        let rows = value
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|rows| *rows > 0)
            .ok_or_else(|| SettingError::InvalidValue {
                key: "max-popup-rows",
                input: value.clone(),
                expected: "a positive whole number",
            })?;
        config.max_popup_rows = Some(rows);
        Ok(success_set("max-popup-rows", &rows.to_string()))
    }

    fn unset(&self, config: &mut Config) -> Result<String, SettingError> {
        config.max_popup_rows = None;
        Ok(success_unset("max-popup-rows"))
    }

    fn format(&self, config: &Config) -> String {
        match config.max_popup_rows {
            Some(rows) => format!("  max-popup-rows: {rows}"),
            None => format!("  max-popup-rows: {DEFAULT_MAX_POPUP_ROWS} (default)"),
        }
    }
}

/// Handler for the `registry` setting (path to a JSON registry file).
pub struct RegistryPathHandler;

impl SettingHandler for RegistryPathHandler {
    fn key(&self) -> &'static str {
        "registry"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let value = require_value(
            args,
            "To set the mention registry, provide the path to a JSON file:",
            "promptchip set registry ~/.config/promptchip/mentions.json",
        )?;
        let path = PathBuf::from(value);
        let message = success_set("registry", &path_display(&path));
        config.registry = Some(path);
        Ok(message)
    }

    fn unset(&self, config: &mut Config) -> Result<String, SettingError> {
        config.registry = None;
        Ok("✅ Unset registry".to_string())
    }

    fn format(&self, config: &Config) -> String {
        match &config.registry {
            Some(path) => format!("  registry: {}", path_display(path)),
            None => "  registry: (unset)".to_string(),
        }
    }
}
