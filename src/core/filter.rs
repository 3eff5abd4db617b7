use crate::core::registry::{MentionRegistry, RegistryEntry};

/// Case-insensitive substring match on label or id. Label-prefix matches come
/// first; within each group registry order is kept.
pub fn filter(registry: &MentionRegistry, query: &str) -> Vec<RegistryEntry> {
    let needle = query.to_lowercase();
    let mut matches: Vec<(bool, &RegistryEntry)> = registry
        .entries()
        .iter()
        .filter_map(|entry| {
            let label = entry.label.to_lowercase();
            if label.contains(&needle) || entry.id.to_lowercase().contains(&needle) {
                Some((label.starts_with(&needle), entry))
            } else {
                None
            }
        })
        .collect();

    // sort_by_key is stable, which keeps registry order inside each group.
    matches.sort_by_key(|(is_prefix, _)| !*is_prefix);
    matches.into_iter().map(|(_, entry)| entry.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(entries: &[RegistryEntry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.label.as_str()).collect()
    }

    fn registry() -> MentionRegistry {
        MentionRegistry::new(vec![
            RegistryEntry::model("gpt-4", "GPT-4"),
            RegistryEntry::model("claude", "Claude"),
            RegistryEntry::model("super-gpt", "Super-GPT"),
        ])
        .expect("registry")
    }

    #[test]
    fn prefix_matches_sort_before_contains_matches() {
        assert_eq!(labels(&filter(&registry(), "gp")), vec!["GPT-4", "Super-GPT"]);
    }

    #[test]
    fn empty_query_returns_registry_order() {
        assert_eq!(
            labels(&filter(&registry(), "")),
            vec!["GPT-4", "Claude", "Super-GPT"]
        );
    }

    #[test]
    fn matches_on_id_when_label_differs() {
        let registry = MentionRegistry::new(vec![
            RegistryEntry::tool("web-search", "Browse"),
            RegistryEntry::tool("calc", "Calculator"),
        ])
        .expect("registry");
        assert_eq!(labels(&filter(&registry, "SEARCH")), vec!["Browse"]);
    }

    #[test]
    fn no_match_yields_empty_list() {
        assert!(filter(&registry(), "zzz").is_empty());
    }

    #[test]
    fn ties_keep_registry_order() {
        let registry = MentionRegistry::new(vec![
            RegistryEntry::model("b", "Mini B"),
            RegistryEntry::model("a", "Mini A"),
            RegistryEntry::model("c", "Omni"),
            RegistryEntry::model("d", "Mini C"),
        ])
        .expect("registry");
        assert_eq!(
            labels(&filter(&registry, "mini")),
            vec!["Mini B", "Mini A", "Mini C"]
        );
        assert_eq!(labels(&filter(&registry, "ni")), vec!["Mini B", "Mini A", "Omni", "Mini C"]);
    }
}
