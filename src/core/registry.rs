//! Caller-supplied set of mentionable models and tools.
//!
//! A [`MentionRegistry`] is an immutable snapshot. Refreshing the candidate
//! list mid-session means building a new registry and handing it to the
//! editor, never mutating one that a filter pass may be reading.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_MODEL_ICON: &str = "🤖";
pub const DEFAULT_TOOL_ICON: &str = "🛠️";
pub const DEFAULT_MODEL_COLOR: &str = "cyan";
pub const DEFAULT_TOOL_COLOR: &str = "purple";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionKind {
    Model,
    Tool,
}

impl MentionKind {
    /// Token spelling used inside `[Kind:Label]`.
    pub fn token_name(self) -> &'static str {
        match self {
            MentionKind::Model => "Model",
            MentionKind::Tool => "Tool",
        }
    }

    pub fn from_token_name(name: &str) -> Option<Self> {
        match name {
            "Model" => Some(MentionKind::Model),
            "Tool" => Some(MentionKind::Tool),
            _ => None,
        }
    }
}

impl fmt::Display for MentionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub id: String,
    pub label: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: MentionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl RegistryEntry {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: MentionKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            icon: None,
            logo: None,
            color: None,
        }
    }

    pub fn model(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, MentionKind::Model)
    }

    pub fn tool(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, MentionKind::Tool)
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = Some(logo.into());
        self
    }

    pub fn same_identity(&self, other: &RegistryEntry) -> bool {
        self.kind == other.kind && self.id == other.id
    }
}

/// Fallback chip decoration for mentions the registry cannot describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindDefaults {
    pub model_icon: String,
    pub model_color: String,
    pub tool_icon: String,
    pub tool_color: String,
}

impl KindDefaults {
    pub fn icon(&self, kind: MentionKind) -> &str {
        match kind {
            MentionKind::Model => &self.model_icon,
            MentionKind::Tool => &self.tool_icon,
        }
    }

    pub fn color(&self, kind: MentionKind) -> &str {
        match kind {
            MentionKind::Model => &self.model_color,
            MentionKind::Tool => &self.tool_color,
        }
    }
}

impl Default for KindDefaults {
    fn default() -> Self {
        Self {
            model_icon: DEFAULT_MODEL_ICON.to_string(),
            model_color: DEFAULT_MODEL_COLOR.to_string(),
            tool_icon: DEFAULT_TOOL_ICON.to_string(),
            tool_color: DEFAULT_TOOL_COLOR.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum RegistryError {
    /// Two entries of the same kind share an id.
    DuplicateId { kind: MentionKind, id: String },
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateId { kind, id } => {
                write!(f, "Duplicate {kind} id in mention registry: {id}")
            }
            RegistryError::Read { path, source } => {
                write!(f, "Failed to read registry at {}: {}", path.display(), source)
            }
            RegistryError::Parse { path, source } => {
                write!(
                    f,
                    "Failed to parse registry at {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl StdError for RegistryError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            RegistryError::DuplicateId { .. } => None,
            RegistryError::Read { source, .. } => Some(source),
            RegistryError::Parse { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionRegistry {
    entries: Arc<[RegistryEntry]>,
}

impl MentionRegistry {
    pub fn new(entries: Vec<RegistryEntry>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert((entry.kind, entry.id.as_str())) {
                return Err(RegistryError::DuplicateId {
                    kind: entry.kind,
                    id: entry.id.clone(),
                });
            }
        }
        Ok(Self {
            entries: entries.into(),
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load_json(path: &Path) -> Result<Self, RegistryError> {
        let contents = fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<RegistryEntry> =
            serde_json::from_str(&contents).map_err(|source| RegistryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::new(entries)
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, kind: MentionKind, id: &str) -> Option<&RegistryEntry> {
        self.entries
            .iter()
            .find(|entry| entry.kind == kind && entry.id == id)
    }

    pub fn find_label(&self, kind: MentionKind, label: &str) -> Option<&RegistryEntry> {
        self.entries
            .iter()
            .find(|entry| entry.kind == kind && entry.label == label)
    }

    pub fn contains(&self, entry: &RegistryEntry) -> bool {
        self.find(entry.kind, &entry.id).is_some()
    }

    /// True when both handles point at the same snapshot.
    pub fn same_snapshot(&self, other: &MentionRegistry) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}
