use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::Rule;

/// Fixed name of the single group every rendered document carries.
pub const GROUP_NAME: &str = "ruleengine";

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    pub groups: Vec<RuleGroup>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleGroup {
    pub name: String,
    pub rules: Vec<AlertingRule>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct AlertingRule {
    pub alert: String,
    pub expr: String,
    pub r#for: String,
    pub annotations: BTreeMap<String, String>,
}

/// Renders one source's rules into the declarative rule-group document the
/// evaluation engine consumes. Rules are sorted by id so identical input
/// always yields identical bytes, which is what makes the every-tick
/// re-update policy safe.
pub fn render(rules: &[Rule]) -> Result<Vec<u8>, serde_yaml::Error> {
    let mut sorted: Vec<&Rule> = rules.iter().collect();
    sorted.sort_by_key(|r| r.id);

    let entries = sorted
        .iter()
        .map(|r| AlertingRule {
            alert: r.id.to_string(),
            expr: r.expression(),
            r#for: r.for_duration.clone(),
            annotations: BTreeMap::from([
                ("rule_id".to_string(), r.id.to_string()),
                ("source_id".to_string(), r.source_id.to_string()),
                ("summary".to_string(), r.summary.clone()),
                ("description".to_string(), r.description.clone()),
            ]),
        })
        .collect();

    let doc = RuleDocument {
        groups: vec![RuleGroup {
            name: GROUP_NAME.to_string(),
            rules: entries,
        }],
    };
    serde_yaml::to_string(&doc).map(String::into_bytes)
}
