//! The enforcement-engine seam.
//!
//! Rule activation is deliberately non-incremental: the single operation is
//! "remove these ids, then add this set", and the controller always passes
//! every currently active id. Ids are reassigned from 1 on each compilation,
//! so a partial diff would collide across activations.

use crate::error::{Result, ValidationError};
use crate::rules::{CompiledRule, ResourceType};

/// Sink for compiled rules.
///
/// Implementations apply `replace_rules` atomically: either the whole
/// replacement takes effect or none of it does.
pub trait RuleEngine {
    fn active_rules(&self) -> &[CompiledRule];

    /// Remove `remove_ids`, then add `add`, as one operation.
    fn replace_rules(&mut self, remove_ids: &[u32], add: Vec<CompiledRule>) -> Result<()>;

    fn active_rule_ids(&self) -> Vec<u32> {
        self.active_rules().iter().map(|rule| rule.id).collect()
    }
}

/// In-process rule engine; also answers match queries so callers can ask
/// "would this request be blocked right now".
#[derive(Debug, Default)]
pub struct MemoryRuleEngine {
    rules: Vec<CompiledRule>,
}

impl MemoryRuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// First active rule matching the URL for the given request class.
    pub fn match_request(&self, url: &str, resource_type: ResourceType) -> Option<&CompiledRule> {
        self.rules
            .iter()
            .find(|rule| rule.matches(url, resource_type))
    }
}

impl RuleEngine for MemoryRuleEngine {
    fn active_rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    fn replace_rules(&mut self, remove_ids: &[u32], add: Vec<CompiledRule>) -> Result<()> {
        let mut next: Vec<CompiledRule> = self
            .rules
            .iter()
            .filter(|rule| !remove_ids.contains(&rule.id))
            .cloned()
            .collect();
        // Validate before mutating anything visible: all-or-nothing.
        for rule in &add {
            if next.iter().any(|existing| existing.id == rule.id) {
                return Err(ValidationError::RuleIdCollision { id: rule.id }.into());
            }
        }
        next.extend(add);
        self.rules = next;
        Ok(())
    }
}
