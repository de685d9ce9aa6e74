use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::descriptor::FieldRef;
use super::engine::ScoreDimension;

/// Comparison applied by a [`Condition`].
///
/// Operator strings outside the supported set are kept as [`Operator::Unsupported`] so the rule
/// still loads in lenient mode; evaluating one is a hard error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    In,
    Contains,
    Gte,
    Lte,
    Unsupported(String),
}

impl Operator {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "eq" => Operator::Eq,
            "ne" => Operator::Ne,
            "in" => Operator::In,
            "contains" => Operator::Contains,
            "gte" => Operator::Gte,
            "lte" => Operator::Lte,
            other => Operator::Unsupported(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::In => "in",
            Operator::Contains => "contains",
            Operator::Gte => "gte",
            Operator::Lte => "lte",
            Operator::Unsupported(raw) => raw,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operator {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Operator::parse(&raw))
    }
}

/// Atomic predicate over one descriptor field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: FieldRef,
    #[serde(rename = "op", alias = "operator")]
    pub operator: Operator,
    pub value: Value,
}

impl Condition {
    pub fn new(field: &str, operator: &str, value: Value) -> Self {
        Self {
            field: FieldRef::parse(field),
            operator: Operator::parse(operator),
            value,
        }
    }
}

/// ALL/ANY grouping of conditions. Both groups empty means the rule always applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhenClause {
    #[serde(default)]
    pub all: Vec<Condition>,
    #[serde(default)]
    pub any: Vec<Condition>,
}

impl WhenClause {
    pub fn is_catch_all(&self) -> bool {
        self.all.is_empty() && self.any.is_empty()
    }

    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.all.iter().chain(self.any.iter())
    }
}

/// Recommendation urgency. Unrecognised labels are preserved and rank after `P2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Priority {
    P0,
    P1,
    P2,
    Other(String),
}

impl Priority {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "P0" => Priority::P0,
            "P1" => Priority::P1,
            "P2" => Priority::P2,
            other => Priority::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::Other(raw) => raw,
        }
    }

    pub const fn rank(&self) -> u8 {
        match self {
            Priority::P0 => 0,
            Priority::P1 => 1,
            Priority::P2 => 2,
            Priority::Other(_) => 9,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Priority {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Priority::parse(&raw))
    }
}

/// Declarative advisory rule: applicability, advice, and an optional score adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub title: String,
    pub category: String,
    pub priority: Priority,
    pub confidence: f64,
    pub when: WhenClause,
    pub recommendation: String,
    pub rationale: String,
    #[serde(default)]
    pub tradeoffs: Vec<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Signed adjustment per scorecard dimension. Integers beyond `i64` saturate.
    #[serde(default, deserialize_with = "saturating_deltas")]
    pub score_delta: BTreeMap<String, i64>,
}

fn saturating_deltas<'de, D>(deserializer: D) -> Result<BTreeMap<String, i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = BTreeMap::<String, DeltaAmount>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(dimension, DeltaAmount(amount))| (dimension, amount))
        .collect())
}

struct DeltaAmount(i64);

impl<'de> Deserialize<'de> for DeltaAmount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl serde::de::Visitor<'_> for AmountVisitor {
            type Value = DeltaAmount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer score delta")
            }

            fn visit_i64<E: serde::de::Error>(self, value: i64) -> Result<DeltaAmount, E> {
                Ok(DeltaAmount(value))
            }

            fn visit_u64<E: serde::de::Error>(self, value: u64) -> Result<DeltaAmount, E> {
                Ok(DeltaAmount(i64::try_from(value).unwrap_or(i64::MAX)))
            }

            fn visit_i128<E: serde::de::Error>(self, value: i128) -> Result<DeltaAmount, E> {
                let clamped = value.clamp(i128::from(i64::MIN), i128::from(i64::MAX));
                Ok(DeltaAmount(clamped as i64))
            }

            fn visit_u128<E: serde::de::Error>(self, value: u128) -> Result<DeltaAmount, E> {
                Ok(DeltaAmount(i64::try_from(value).unwrap_or(i64::MAX)))
            }

            // Integers too wide for the YAML/JSON integer types arrive as floats; `as` saturates.
            fn visit_f64<E: serde::de::Error>(self, value: f64) -> Result<DeltaAmount, E> {
                if value.is_finite() && value.fract() == 0.0 {
                    Ok(DeltaAmount(value as i64))
                } else {
                    Err(E::invalid_value(serde::de::Unexpected::Float(value), &self))
                }
            }
        }

        deserializer.deserialize_i64(AmountVisitor)
    }
}

impl Rule {
    /// Structural checks applied in every validation mode.
    pub fn validate(&self) -> Result<(), MalformedRule> {
        if self.id.trim().is_empty() {
            return Err(MalformedRule::MissingId);
        }

        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(MalformedRule::ConfidenceOutOfRange {
                rule_id: self.id.clone(),
                confidence: self.confidence,
            });
        }

        for condition in self.when.conditions() {
            let compatible = match condition.operator {
                Operator::In => condition.value.is_array(),
                Operator::Contains => !(condition.value.is_array() || condition.value.is_object()),
                _ => true,
            };
            if !compatible {
                return Err(MalformedRule::IncompatibleValue {
                    rule_id: self.id.clone(),
                    operator: condition.operator.to_string(),
                    field: condition.field.name(),
                });
            }
        }

        Ok(())
    }

    /// Authoring mistakes tolerated in lenient mode and rejected in strict mode.
    pub fn findings(&self) -> Vec<MalformedRule> {
        let mut findings = Vec::new();

        for condition in self.when.conditions() {
            if let FieldRef::Unknown(name) = &condition.field {
                findings.push(MalformedRule::UnknownField {
                    rule_id: self.id.clone(),
                    field: name.clone(),
                });
            }
            if let Operator::Unsupported(raw) = &condition.operator {
                findings.push(MalformedRule::UnsupportedOperator {
                    rule_id: self.id.clone(),
                    operator: raw.clone(),
                });
            }
        }

        for dimension in self.score_delta.keys() {
            if ScoreDimension::parse(dimension).is_none() {
                findings.push(MalformedRule::UnknownDimension {
                    rule_id: self.id.clone(),
                    dimension: dimension.clone(),
                });
            }
        }

        findings
    }
}

/// How strictly authoring mistakes are treated when a rule set is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    #[default]
    Lenient,
    Strict,
}

/// Rule definition defect detected before evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedRule {
    #[error("rule is missing an id")]
    MissingId,
    #[error("rule {rule_id}: confidence {confidence} outside [0, 1]")]
    ConfidenceOutOfRange { rule_id: String, confidence: f64 },
    #[error("rule {rule_id}: value for `{operator}` on `{field}` has an incompatible type")]
    IncompatibleValue {
        rule_id: String,
        operator: String,
        field: String,
    },
    #[error("rule {rule_id}: unknown field `{field}`")]
    UnknownField { rule_id: String, field: String },
    #[error("rule {rule_id}: unsupported operator `{operator}`")]
    UnsupportedOperator { rule_id: String, operator: String },
    #[error("rule {rule_id}: unknown score dimension `{dimension}`")]
    UnknownDimension { rule_id: String, dimension: String },
    #[error("duplicate rule id `{0}`")]
    DuplicateId(String),
}

/// Immutable, ordered snapshot of the rules an engine evaluates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
    mode: ValidationMode,
}

impl RuleSet {
    /// Wrap rules that were already validated, keeping their order.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            mode: ValidationMode::Lenient,
        }
    }

    /// Validate rules under `mode` and freeze them into a snapshot.
    pub fn validated(rules: Vec<Rule>, mode: ValidationMode) -> Result<Self, MalformedRule> {
        let mut seen = HashSet::new();
        for rule in &rules {
            rule.validate()?;

            let mut findings = rule.findings();
            if !seen.insert(rule.id.as_str()) {
                findings.push(MalformedRule::DuplicateId(rule.id.clone()));
            }

            for finding in findings {
                match mode {
                    ValidationMode::Strict => return Err(finding),
                    ValidationMode::Lenient => {
                        tracing::warn!(rule_id = %rule.id, %finding, "tolerating rule defect");
                    }
                }
            }
        }

        Ok(Self { rules, mode })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
