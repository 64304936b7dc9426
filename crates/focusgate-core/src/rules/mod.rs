mod blocklist;
mod compiler;
mod engine;

pub use blocklist::BlockList;
pub use compiler::{compile, CompiledRule, ResourceType};
pub use engine::{MemoryRuleEngine, RuleEngine};
