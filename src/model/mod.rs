mod rule;
mod source;

pub use rule::Rule;
pub use source::Source;

/// One source together with its current rule set, rebuilt from the store on
/// every reconciliation tick. Never persisted.
#[derive(Debug, Clone)]
pub struct SourceRuleSet {
    pub source: Source,
    pub rules: Vec<Rule>,
}
