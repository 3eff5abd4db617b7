use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::editor::EditorConfig;
use crate::core::registry::{
    KindDefaults, MentionRegistry, RegistryEntry, RegistryError, DEFAULT_MODEL_COLOR,
    DEFAULT_MODEL_ICON, DEFAULT_TOOL_COLOR, DEFAULT_TOOL_ICON,
};
use crate::core::trigger::DEFAULT_TRIGGER;

pub const DEFAULT_MAX_POPUP_ROWS: usize = 8;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Character that opens a completion session (default `@`)
    pub trigger: Option<char>,
    /// Chip icon for models the registry does not describe
    pub model_icon: Option<String>,
    pub model_color: Option<String>,
    /// Chip icon for tools the registry does not describe
    pub tool_icon: Option<String>,
    pub tool_color: Option<String>,
    /// Rows shown in the completion popup before it scrolls
    pub max_popup_rows: Option<usize>,
    /// JSON file holding registry entries
    pub registry: Option<PathBuf>,
    /// Registry entries declared inline; appended after the registry file's
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<RegistryEntry>,
}

impl Config {
    pub fn kind_defaults(&self) -> KindDefaults {
        KindDefaults {
            model_icon: self
                .model_icon
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL_ICON.to_string()),
            model_color: self
                .model_color
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL_COLOR.to_string()),
            tool_icon: self
                .tool_icon
                .clone()
                .unwrap_or_else(|| DEFAULT_TOOL_ICON.to_string()),
            tool_color: self
                .tool_color
                .clone()
                .unwrap_or_else(|| DEFAULT_TOOL_COLOR.to_string()),
        }
    }

    pub fn editor_config(&self) -> EditorConfig {
        EditorConfig {
            trigger: self.trigger.unwrap_or(DEFAULT_TRIGGER),
            defaults: self.kind_defaults(),
        }
    }

    pub fn popup_rows(&self) -> usize {
        self.max_popup_rows
            .filter(|rows| *rows > 0)
            .unwrap_or(DEFAULT_MAX_POPUP_ROWS)
    }

    /// Build the registry snapshot: entries from `registry_override` (or the
    /// configured registry file) followed by inline `mentions`.
    pub fn load_registry(
        &self,
        registry_override: Option<&Path>,
    ) -> Result<MentionRegistry, RegistryError> {
        let mut entries = match registry_override.or(self.registry.as_deref()) {
            Some(path) => MentionRegistry::load_json(path)?.entries().to_vec(),
            None => Vec::new(),
        };
        entries.extend(self.mentions.iter().cloned());
        MentionRegistry::new(entries)
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
