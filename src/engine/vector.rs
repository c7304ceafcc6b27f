/// Label pairs, sorted by name. A BTreeMap keeps serialized output stable.
pub type Labels = std::collections::BTreeMap<String, String>;

/// One sample of an instant vector result.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub labels: Labels,
    pub timestamp_ms: i64,
    pub value: f64,
}

pub type Vector = Vec<Sample>;
