//! Registry of setting handlers.

use std::collections::HashMap;

use super::handlers::{
    model_color_handler, model_icon_handler, tool_color_handler, tool_icon_handler,
    MaxPopupRowsHandler, RegistryPathHandler, TriggerHandler,
};
use super::SettingHandler;
use crate::core::config::data::Config;

/// Registry of all available setting handlers.
pub struct SettingRegistry {
    handlers: HashMap<&'static str, Box<dyn SettingHandler>>,
    /// Keys in display order for `promptchip set` output.
    display_order: Vec<&'static str>,
}

impl SettingRegistry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
            display_order: Vec::new(),
        };

        registry.register(Box::new(TriggerHandler));
        registry.register(Box::new(model_icon_handler()));
        registry.register(Box::new(model_color_handler()));
        registry.register(Box::new(tool_icon_handler()));
        registry.register(Box::new(tool_color_handler()));
        registry.register(Box::new(MaxPopupRowsHandler));
        registry.register(Box::new(RegistryPathHandler));

        registry
    }

    fn register(&mut self, handler: Box<dyn SettingHandler>) {
        let key = handler.key();
        self.display_order.push(key);
        self.handlers.insert(key, handler);
    }

    /// Get a handler by key.
    pub fn get(&self, key: &str) -> Option<&dyn SettingHandler> {
        self.handlers.get(key).map(|h| h.as_ref())
    }

    /// Get all keys in display order.
    pub fn keys_display_order(&self) -> &[&'static str] {
        &self.display_order
    }

    /// Render every setting, one per line, for `promptchip set` with no key.
    pub fn format_all(&self, config: &Config) -> Vec<String> {
        self.display_order
            .iter()
            .filter_map(|key| self.get(key))
            .map(|handler| handler.format(config))
            .collect()
    }
}

impl Default for SettingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_formats_a_line() {
        let registry = SettingRegistry::new();
        let lines = registry.format_all(&Config::default());
        assert_eq!(lines.len(), registry.keys_display_order().len());
        assert_eq!(lines[0], "  trigger: @ (default)");
    }
}
