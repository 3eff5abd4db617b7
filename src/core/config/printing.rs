use crate::core::config::data::Config;

impl Config {
    /// Inline `[[mentions]]` entries, one line each.
    pub fn mention_lines(&self) -> Vec<String> {
        if self.mentions.is_empty() {
            return vec!["  mentions: (none set)".to_string()];
        }
        let mut lines = vec!["  mentions:".to_string()];
        lines.extend(
            self.mentions
                .iter()
                .map(|entry| format!("    [{}:{}] ({})", entry.kind, entry.label, entry.id)),
        );
        lines
    }
}
