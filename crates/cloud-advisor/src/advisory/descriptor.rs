use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized description of the workload under assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadDescriptor {
    pub workload_type: WorkloadType,
    pub environment: Environment,
    pub traffic_profile: TrafficProfile,
    #[serde(default)]
    pub availability_target: AvailabilityTarget,
    #[serde(default)]
    pub rto_minutes: u32,
    #[serde(default)]
    pub rpo_minutes: u32,
    #[serde(default)]
    pub data_sensitivity: DataSensitivity,
    #[serde(default)]
    pub budget_priority: BudgetPriority,
    #[serde(default)]
    pub team_experience: TeamExperience,
    /// Hard constraints, e.g. `no k8s` or `single region`.
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Provider preference hints. The boolean `trace` key requests the evaluation trace.
    #[serde(default)]
    pub provider_hints: BTreeMap<String, Value>,
}

impl WorkloadDescriptor {
    /// Descriptor with every optional field at its default.
    pub fn new(
        workload_type: WorkloadType,
        environment: Environment,
        traffic_profile: TrafficProfile,
    ) -> Self {
        Self {
            workload_type,
            environment,
            traffic_profile,
            availability_target: AvailabilityTarget::default(),
            rto_minutes: 0,
            rpo_minutes: 0,
            data_sensitivity: DataSensitivity::default(),
            budget_priority: BudgetPriority::default(),
            team_experience: TeamExperience::default(),
            constraints: Vec::new(),
            notes: None,
            provider_hints: BTreeMap::new(),
        }
    }

    pub fn trace_requested(&self) -> bool {
        matches!(self.provider_hints.get("trace"), Some(Value::Bool(true)))
    }

    pub(crate) fn resolve(&self, field: &FieldRef) -> FieldValue<'_> {
        match field {
            FieldRef::Attribute(attribute) => match attribute {
                DescriptorField::WorkloadType => FieldValue::Text(self.workload_type.label()),
                DescriptorField::Environment => FieldValue::Text(self.environment.label()),
                DescriptorField::TrafficProfile => FieldValue::Text(self.traffic_profile.label()),
                DescriptorField::AvailabilityTarget => {
                    FieldValue::Text(self.availability_target.label())
                }
                DescriptorField::RtoMinutes => FieldValue::Integer(self.rto_minutes),
                DescriptorField::RpoMinutes => FieldValue::Integer(self.rpo_minutes),
                DescriptorField::DataSensitivity => {
                    FieldValue::Text(self.data_sensitivity.label())
                }
                DescriptorField::BudgetPriority => FieldValue::Text(self.budget_priority.label()),
                DescriptorField::TeamExperience => FieldValue::Text(self.team_experience.label()),
                DescriptorField::Constraints => FieldValue::List(&self.constraints),
                DescriptorField::Notes => self
                    .notes
                    .as_deref()
                    .map_or(FieldValue::Null, FieldValue::Text),
                DescriptorField::ProviderHints => FieldValue::Map(&self.provider_hints),
            },
            FieldRef::ProviderHint(key) => self
                .provider_hints
                .get(key)
                .map_or(FieldValue::Null, FieldValue::Json),
            FieldRef::Unknown(_) => FieldValue::Null,
        }
    }
}

macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? } $(default $default:ident)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        $(
            impl Default for $name {
                fn default() -> Self {
                    $name::$default
                }
            }
        )?
    };
}

labelled_enum! {
    /// Broad shape of the workload.
    WorkloadType {
        WebApi => "web_api",
        Batch => "batch",
        DataPipeline => "data_pipeline",
        MlInference => "ml_inference",
        StaticSite => "static_site",
    }
}

labelled_enum! {
    Environment {
        Dev => "dev",
        Staging => "staging",
        Prod => "prod",
    }
}

labelled_enum! {
    TrafficProfile {
        Low => "low",
        Medium => "medium",
        High => "high",
        Spiky => "spiky",
    }
}

labelled_enum! {
    AvailabilityTarget {
        Standard => "standard",
        High => "high",
        MissionCritical => "mission_critical",
    } default Standard
}

labelled_enum! {
    /// Classification of the most sensitive data the workload handles.
    DataSensitivity {
        Public => "public",
        Internal => "internal",
        Confidential => "confidential",
        Regulated => "regulated",
    } default Internal
}

labelled_enum! {
    BudgetPriority {
        LowestCost => "lowest_cost",
        Balanced => "balanced",
        PerformanceFirst => "performance_first",
    } default Balanced
}

labelled_enum! {
    TeamExperience {
        Junior => "junior",
        Mixed => "mixed",
        Senior => "senior",
    } default Mixed
}

/// Descriptor attributes addressable from rule conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorField {
    WorkloadType,
    Environment,
    TrafficProfile,
    AvailabilityTarget,
    RtoMinutes,
    RpoMinutes,
    DataSensitivity,
    BudgetPriority,
    TeamExperience,
    Constraints,
    Notes,
    ProviderHints,
}

impl DescriptorField {
    pub const ALL: [DescriptorField; 12] = [
        DescriptorField::WorkloadType,
        DescriptorField::Environment,
        DescriptorField::TrafficProfile,
        DescriptorField::AvailabilityTarget,
        DescriptorField::RtoMinutes,
        DescriptorField::RpoMinutes,
        DescriptorField::DataSensitivity,
        DescriptorField::BudgetPriority,
        DescriptorField::TeamExperience,
        DescriptorField::Constraints,
        DescriptorField::Notes,
        DescriptorField::ProviderHints,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            DescriptorField::WorkloadType => "workload_type",
            DescriptorField::Environment => "environment",
            DescriptorField::TrafficProfile => "traffic_profile",
            DescriptorField::AvailabilityTarget => "availability_target",
            DescriptorField::RtoMinutes => "rto_minutes",
            DescriptorField::RpoMinutes => "rpo_minutes",
            DescriptorField::DataSensitivity => "data_sensitivity",
            DescriptorField::BudgetPriority => "budget_priority",
            DescriptorField::TeamExperience => "team_experience",
            DescriptorField::Constraints => "constraints",
            DescriptorField::Notes => "notes",
            DescriptorField::ProviderHints => "provider_hints",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

const PROVIDER_HINT_PREFIX: &str = "provider_hints.";

/// Field reference resolved once when a rule is parsed.
///
/// Names outside the registry stay addressable as [`FieldRef::Unknown`] and resolve to null, so
/// lenient rule sets keep loading; strict loading rejects them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    Attribute(DescriptorField),
    ProviderHint(String),
    Unknown(String),
}

impl FieldRef {
    pub fn parse(name: &str) -> Self {
        if let Some(field) = DescriptorField::from_name(name) {
            return FieldRef::Attribute(field);
        }

        match name.strip_prefix(PROVIDER_HINT_PREFIX) {
            Some(key) if !key.is_empty() && !key.contains('.') => {
                FieldRef::ProviderHint(key.to_string())
            }
            _ => FieldRef::Unknown(name.to_string()),
        }
    }

    pub fn name(&self) -> String {
        match self {
            FieldRef::Attribute(field) => field.name().to_string(),
            FieldRef::ProviderHint(key) => format!("{PROVIDER_HINT_PREFIX}{key}"),
            FieldRef::Unknown(name) => name.clone(),
        }
    }
}

impl Serialize for FieldRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> Deserialize<'de> for FieldRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(FieldRef::parse(&raw))
    }
}

/// Borrowed view of a descriptor attribute as seen by condition operators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum FieldValue<'a> {
    Null,
    Text(&'a str),
    Integer(u32),
    List(&'a [String]),
    Map(&'a BTreeMap<String, Value>),
    Json(&'a Value),
}
