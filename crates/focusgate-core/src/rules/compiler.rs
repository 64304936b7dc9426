//! Compilation of the block-list into enforcement rules.
//!
//! `compile` is a pure function: the rule set is regenerated wholesale on
//! every session transition and never patched incrementally.

use serde::{Deserialize, Serialize};

/// Request classes a rule applies to.
///
/// Every compiled rule carries the full set -- blocking must not be
/// bypassable via a non-document resource load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    MainFrame,
    SubFrame,
    Script,
    Stylesheet,
    Image,
    Font,
    Media,
    Websocket,
    XmlHttpRequest,
    Other,
}

impl ResourceType {
    pub const ALL: [ResourceType; 10] = [
        ResourceType::MainFrame,
        ResourceType::SubFrame,
        ResourceType::Script,
        ResourceType::Stylesheet,
        ResourceType::Image,
        ResourceType::Font,
        ResourceType::Media,
        ResourceType::Websocket,
        ResourceType::XmlHttpRequest,
        ResourceType::Other,
    ];
}

/// A derived, ephemeral blocking rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledRule {
    pub id: u32,
    /// Wildcard-wrapped substring pattern, e.g. `*example.com*`.
    pub url_pattern: String,
    pub resource_types: Vec<ResourceType>,
}

impl CompiledRule {
    /// Case-insensitive substring match of the pattern against a URL for a
    /// given request class.
    pub fn matches(&self, url: &str, resource_type: ResourceType) -> bool {
        if !self.resource_types.contains(&resource_type) {
            return false;
        }
        let needle = self.url_pattern.trim_matches('*').to_lowercase();
        url.to_lowercase().contains(&needle)
    }
}

/// Derive one rule per block-list entry, sites first, then keywords.
///
/// Ids are assigned densely starting at 1 in input order; they are only
/// unique within a single compilation, which is why activation always
/// removes every previously active id first.
pub fn compile(sites: &[String], keywords: &[String]) -> Vec<CompiledRule> {
    sites
        .iter()
        .chain(keywords.iter())
        .enumerate()
        .map(|(index, term)| CompiledRule {
            id: (index + 1) as u32,
            url_pattern: format!("*{term}*"),
            resource_types: ResourceType::ALL.to_vec(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn one_rule_per_entry_sites_first() {
        let rules = compile(
            &strings(&["example.com", "b.org"]),
            &strings(&["news", "games"]),
        );
        assert_eq!(rules.len(), 4);
        assert_eq!(rules[0].url_pattern, "*example.com*");
        assert_eq!(rules[2].url_pattern, "*news*");
    }

    #[test]
    fn ids_start_at_one_and_are_dense() {
        let rules = compile(&strings(&["a.com", "b.com"]), &strings(&["kw"]));
        let ids: Vec<u32> = rules.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn empty_lists_compile_to_nothing() {
        assert!(compile(&[], &[]).is_empty());
    }

    #[test]
    fn rules_cover_every_resource_type() {
        let rules = compile(&strings(&["example.com"]), &[]);
        assert_eq!(rules[0].resource_types.len(), ResourceType::ALL.len());
        for rt in ResourceType::ALL {
            assert!(rules[0].matches("https://example.com/x", rt));
        }
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let rules = compile(&strings(&["example.com"]), &[]);
        assert!(rules[0].matches("https://EXAMPLE.com/page", ResourceType::MainFrame));
        assert!(rules[0].matches(
            "https://cdn.example.com/app.js",
            ResourceType::Script
        ));
        assert!(!rules[0].matches("https://other.org/", ResourceType::MainFrame));
    }

    proptest! {
        #[test]
        fn ids_are_dense_for_any_input(
            sites in proptest::collection::vec("[a-z]{1,12}", 0..8),
            keywords in proptest::collection::vec("[a-z]{1,12}", 0..8),
        ) {
            let rules = compile(&sites, &keywords);
            prop_assert_eq!(rules.len(), sites.len() + keywords.len());
            for (index, rule) in rules.iter().enumerate() {
                prop_assert_eq!(rule.id, (index + 1) as u32);
            }
        }
    }
}
