use super::data::{path_display, Config, DEFAULT_MAX_POPUP_ROWS};
use super::io::ConfigError;
use crate::core::registry::{MentionKind, RegistryEntry, RegistryError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    // Phase 1: initial save creates parent dirs
    let config = Config {
        trigger: Some('#'),
        tool_color: Some("magenta".to_string()),
        mentions: vec![RegistryEntry::tool("web", "Web Search").with_icon("🔎")],
        ..Default::default()
    };
    config
        .save_to_path(&config_path)
        .expect("Failed to save config");
    let loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded, config);

    // Phase 2: unset one field, others persist
    let mut config = loaded;
    config.trigger = None;
    config
        .save_to_path(&config_path)
        .expect("Failed to save modified config");
    let loaded = Config::load_from_path(&config_path).expect("Failed to load modified config");
    assert_eq!(loaded.trigger, None);
    assert_eq!(loaded.tool_color.as_deref(), Some("magenta"));
    assert_eq!(loaded.mentions.len(), 1);
    assert_eq!(loaded.mentions[0].kind, MentionKind::Tool);
}

#[test]
fn test_invalid_toml_reports_parse_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "trigger = [unterminated").expect("write config");

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().starts_with("Failed to parse config at"));
}

#[test]
fn test_inline_mentions_parse_from_toml() {
    let config: Config = toml::from_str(
        r#"
        trigger = "@"
        model_icon = "✨"

        [[mentions]]
        id = "gpt-4"
        label = "GPT-4"
        type = "model"

        [[mentions]]
        id = "web"
        label = "Web Search"
        type = "tool"
        color = "green"
        "#,
    )
    .expect("parse config");

    let editor = config.editor_config();
    assert_eq!(editor.trigger, '@');
    assert_eq!(editor.defaults.model_icon, "✨");
    assert_eq!(editor.defaults.tool_icon, "🛠️");

    let registry = config.load_registry(None).expect("registry");
    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry
            .find(MentionKind::Tool, "web")
            .and_then(|entry| entry.color.as_deref()),
        Some("green")
    );
}

#[test]
fn test_registry_file_and_inline_entries_combine() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let registry_path = temp_dir.path().join("registry.json");
    fs::write(
        &registry_path,
        r#"[{"id": "claude", "label": "Claude", "type": "model"}]"#,
    )
    .expect("write registry");

    let config = Config {
        registry: Some(registry_path.clone()),
        mentions: vec![RegistryEntry::tool("calc", "Calculator")],
        ..Default::default()
    };
    let registry = config.load_registry(None).expect("registry");
    let ids: Vec<_> = registry.entries().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["claude", "calc"]);

    let duplicate = Config {
        mentions: vec![RegistryEntry::model("claude", "Claude again")],
        ..Default::default()
    };
    assert!(matches!(
        duplicate.load_registry(Some(&registry_path)),
        Err(RegistryError::DuplicateId { .. })
    ));
}

#[test]
fn test_popup_rows_fall_back_to_default() {
    let mut config = Config::default();
    assert_eq!(config.popup_rows(), DEFAULT_MAX_POPUP_ROWS);
    config.max_popup_rows = Some(0);
    assert_eq!(config.popup_rows(), DEFAULT_MAX_POPUP_ROWS);
    config.max_popup_rows = Some(3);
    assert_eq!(config.popup_rows(), 3);
}

#[cfg(unix)]
#[test]
fn test_path_display_uses_tilde_for_home() {
    if let Some(home) = std::env::var_os("HOME") {
        let path = std::path::PathBuf::from(home).join(".config/promptchip/config.toml");
        assert_eq!(path_display(&path), "~/.config/promptchip/config.toml");
    }
}

#[test]
fn test_mention_lines_list_inline_entries() {
    let mut config = Config::default();
    assert_eq!(config.mention_lines(), vec!["  mentions: (none set)"]);

    config.mentions = vec![RegistryEntry::model("gpt-4", "GPT-4")];
    assert_eq!(
        config.mention_lines(),
        vec!["  mentions:", "    [Model:GPT-4] (gpt-4)"]
    );
}
