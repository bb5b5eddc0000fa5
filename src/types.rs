use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identity handed to us by the identity provider. Opaque here.
pub type UserId = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Interest {
    Building,
    Analyzing,
    Leading,
    Designing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WorkEnvironment {
    Remote,
    Office,
    Hybrid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Logic,
    Creativity,
    Communication,
}

/// One selected option per quiz question. Unknown keys are rejected at the
/// boundary rather than carried around as an open map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AssessmentAnswers {
    pub interest: Interest,
    /// Captured for the audit record; the decision table never consults it.
    pub environment: WorkEnvironment,
    pub strength: Strength,
}

/// Audit record of one quiz submission. Immutable once written.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Assessment {
    pub id: String,
    pub user_id: UserId,
    /// The answer set serialized as JSON text.
    pub answers: String,
    pub recommended_career: String,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct Step {
    pub id: String,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoadmapStatus {
    Active,
    /// Reserved. Nothing assigns this today.
    Completed,
    Archived,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Roadmap {
    pub id: String,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub steps: Vec<Step>,
    pub status: RoadmapStatus,
    pub skills: Vec<String>,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub user_id: UserId,
    pub title: String,
    pub is_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub created_at: String,
}

/// Per-user career profile. Written automatically when an assessment sets a
/// target role for the first time; otherwise untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}
