use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const SCORE_MIN: u8 = 0;
pub const SCORE_MAX: u8 = 100;

/// The five scorecard dimensions a rule may adjust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreDimension {
    Cost,
    Security,
    Reliability,
    Performance,
    Operations,
}

impl ScoreDimension {
    pub const ALL: [ScoreDimension; 5] = [
        ScoreDimension::Cost,
        ScoreDimension::Security,
        ScoreDimension::Reliability,
        ScoreDimension::Performance,
        ScoreDimension::Operations,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ScoreDimension::Cost => "cost",
            ScoreDimension::Security => "security",
            ScoreDimension::Reliability => "reliability",
            ScoreDimension::Performance => "performance",
            ScoreDimension::Operations => "operations",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|dimension| dimension.label() == raw)
    }
}

/// Five-dimension posture score. Every dimension stays within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawScorecard")]
pub struct Scorecard {
    cost: u8,
    security: u8,
    reliability: u8,
    performance: u8,
    operations: u8,
}

impl Scorecard {
    /// Build a scorecard, saturating each value into range.
    pub fn new(cost: i64, security: i64, reliability: i64, performance: i64, operations: i64) -> Self {
        Self {
            cost: clamp_score(cost),
            security: clamp_score(security),
            reliability: clamp_score(reliability),
            performance: clamp_score(performance),
            operations: clamp_score(operations),
        }
    }

    pub fn uniform(value: u8) -> Self {
        let value = i64::from(value);
        Self::new(value, value, value, value, value)
    }

    pub fn get(&self, dimension: ScoreDimension) -> u8 {
        match dimension {
            ScoreDimension::Cost => self.cost,
            ScoreDimension::Security => self.security,
            ScoreDimension::Reliability => self.reliability,
            ScoreDimension::Performance => self.performance,
            ScoreDimension::Operations => self.operations,
        }
    }

    pub fn cost(&self) -> u8 {
        self.cost
    }

    pub fn security(&self) -> u8 {
        self.security
    }

    pub fn reliability(&self) -> u8 {
        self.reliability
    }

    pub fn performance(&self) -> u8 {
        self.performance
    }

    pub fn operations(&self) -> u8 {
        self.operations
    }

    /// Add `amount` to one dimension and saturate into range.
    pub fn adjust(&mut self, dimension: ScoreDimension, amount: i64) {
        let slot = match dimension {
            ScoreDimension::Cost => &mut self.cost,
            ScoreDimension::Security => &mut self.security,
            ScoreDimension::Reliability => &mut self.reliability,
            ScoreDimension::Performance => &mut self.performance,
            ScoreDimension::Operations => &mut self.operations,
        };
        *slot = clamp_score(i64::from(*slot).saturating_add(amount));
    }

    /// Apply one rule's delta map, returning the adjusted copy plus before/after snapshots.
    ///
    /// Names outside [`ScoreDimension`] are skipped.
    pub fn apply_delta(self, delta: &BTreeMap<String, i64>) -> (Scorecard, Scorecard, Scorecard) {
        let before = self;
        let mut after = self;
        for (name, amount) in delta {
            if let Some(dimension) = ScoreDimension::parse(name) {
                after.adjust(dimension, *amount);
            }
        }
        (after, before, after)
    }
}

impl fmt::Display for Scorecard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cost={} security={} reliability={} performance={} operations={}",
            self.cost, self.security, self.reliability, self.performance, self.operations
        )
    }
}

fn clamp_score(value: i64) -> u8 {
    value.clamp(i64::from(SCORE_MIN), i64::from(SCORE_MAX)) as u8
}

#[derive(Deserialize)]
struct RawScorecard {
    cost: i64,
    security: i64,
    reliability: i64,
    performance: i64,
    operations: i64,
}

/// Raised when an externally supplied scorecard carries a value outside `0..=100`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("score for {dimension} must be within 0..=100 (found {value})")]
pub struct ScoreOutOfRange {
    pub dimension: &'static str,
    pub value: i64,
}

impl TryFrom<RawScorecard> for Scorecard {
    type Error = ScoreOutOfRange;

    fn try_from(raw: RawScorecard) -> Result<Self, Self::Error> {
        let checked = |dimension: ScoreDimension, value: i64| {
            if (i64::from(SCORE_MIN)..=i64::from(SCORE_MAX)).contains(&value) {
                Ok(value)
            } else {
                Err(ScoreOutOfRange {
                    dimension: dimension.label(),
                    value,
                })
            }
        };

        Ok(Scorecard::new(
            checked(ScoreDimension::Cost, raw.cost)?,
            checked(ScoreDimension::Security, raw.security)?,
            checked(ScoreDimension::Reliability, raw.reliability)?,
            checked(ScoreDimension::Performance, raw.performance)?,
            checked(ScoreDimension::Operations, raw.operations)?,
        ))
    }
}
