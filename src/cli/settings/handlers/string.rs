//! String setting handlers for chip decoration fallbacks.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{require_value, success_set, success_unset};
use crate::cli::settings::SettingHandler;
use crate::core::config::data::Config;
use crate::core::registry::KindDefaults;

/// Handler for a free-form string setting stored as `Option<String>`.
pub struct StringSettingHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    field: fn(&mut Config) -> &mut Option<String>,
    current: fn(&Config) -> &Option<String>,
    fallback: fn(&KindDefaults) -> &str,
}

impl SettingHandler for StringSettingHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let value = require_value(args, self.hint, self.example)?;
        let message = success_set(self.key, &value);
        *(self.field)(config) = Some(value);
        Ok(message)
    }

    fn unset(&self, config: &mut Config) -> Result<String, SettingError> {
        *(self.field)(config) = None;
        Ok(success_unset(self.key))
    }

    fn format(&self, config: &Config) -> String {
        match (self.current)(config) {
            Some(value) => format!("  {}: {value}", self.key),
            None => format!(
                "  {}: {} (default)",
                self.key,
                (self.fallback)(&KindDefaults::default())
            ),
        }
    }
}

pub fn model_icon_handler() -> StringSettingHandler {
    StringSettingHandler {
        key: "model-icon",
        hint: "To set the fallback model icon, provide the icon:",
        example: "promptchip set model-icon ✨",
        field: |config| &mut config.model_icon,
        current: |config| &config.model_icon,
        fallback: |defaults| defaults.model_icon.as_str(),
    }
}

pub fn model_color_handler() -> StringSettingHandler {
    StringSettingHandler {
        key: "model-color",
        hint: "To set the fallback model color, provide a color name or hex value:",
        example: "promptchip set model-color #33ccff",
        field: |config| &mut config.model_color,
        current: |config| &config.model_color,
        fallback: |defaults| defaults.model_color.as_str(),
    }
}

pub fn tool_icon_handler() -> StringSettingHandler {
    StringSettingHandler {
        key: "tool-icon",
        hint: "To set the fallback tool icon, provide the icon:",
        example: "promptchip set tool-icon 🔧",
        field: |config| &mut config.tool_icon,
        current: |config| &config.tool_icon,
        fallback: |defaults| defaults.tool_icon.as_str(),
    }
}

pub fn tool_color_handler() -> StringSettingHandler {
    StringSettingHandler {
        key: "tool-color",
        hint: "To set the fallback tool color, provide a color name or hex value:",
        example: "promptchip set tool-color magenta",
        field: |config| &mut config.tool_color,
        current: |config| &config.tool_color,
        fallback: |defaults| defaults.tool_color.as_str(),
    }
}
