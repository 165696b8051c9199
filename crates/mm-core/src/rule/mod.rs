mod builder;
mod graph;
mod stale;

pub use builder::calculate_dependencies;
pub use graph::{LinkKind, Rule, RuleGraph, RuleId, RuleKind};
pub use stale::prepare_all;
