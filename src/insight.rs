//! Insight input types
//!
//! An insight is one unit of captured information — a chat excerpt, an
//! AI-generated summary, or a manually entered note — plus the stage and
//! project it belongs to. Insights are caller-constructed and immutable once
//! submitted to the coordinator.

use crate::storage::now_millis;
use serde::{Deserialize, Serialize};

/// Where a captured insight came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsightKind {
    /// Excerpt lifted from a chat conversation
    Chat,
    /// Summary produced by the completion backend
    AiSummary,
    /// Note typed in directly by the user
    Manual,
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chat => write!(f, "chat"),
            Self::AiSummary => write!(f, "ai-summary"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

impl std::str::FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Self::Chat),
            "ai-summary" => Ok(Self::AiSummary),
            "manual" => Ok(Self::Manual),
            other => Err(format!("unknown insight kind: {}", other)),
        }
    }
}

/// Which product track a project belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsKind {
    /// Foundry-stage track
    FoundryOs,
    /// Launch-stage track
    LaunchOs,
}

impl OsKind {
    /// Classify a project from its naming convention.
    ///
    /// Project ids created by the foundry track carry a `foundry` marker;
    /// everything else is treated as launch-track. Substring classification
    /// is a latent correctness risk for projects that do not follow the
    /// convention — callers that know the track should set it on the
    /// [`InsightSource`] explicitly instead.
    pub fn for_project(project_id: &str) -> Self {
        if project_id.contains("foundry") {
            Self::FoundryOs
        } else {
            Self::LaunchOs
        }
    }
}

impl std::fmt::Display for OsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FoundryOs => write!(f, "foundryos"),
            Self::LaunchOs => write!(f, "launchos"),
        }
    }
}

impl std::str::FromStr for OsKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "foundryos" => Ok(Self::FoundryOs),
            "launchos" => Ok(Self::LaunchOs),
            other => Err(format!("unknown os kind: {}", other)),
        }
    }
}

/// One unit of captured information handed to the sync coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSource {
    /// Capture source
    #[serde(rename = "type")]
    pub kind: InsightKind,

    /// Raw captured text
    pub content: String,

    /// Stage this insight belongs to
    pub stage_id: String,

    /// Project this insight belongs to
    pub project_id: String,

    /// Product track of the project
    pub os: OsKind,

    /// Capture time in Unix milliseconds.
    ///
    /// The memory store reassigns this at persist time; callers must not
    /// rely on their own timestamp surviving storage.
    pub timestamp: u64,
}

impl InsightSource {
    /// Build an insight, classifying the track from the project id's naming
    /// convention.
    pub fn new(
        kind: InsightKind,
        content: impl Into<String>,
        stage_id: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        let project_id = project_id.into();
        let os = OsKind::for_project(&project_id);
        Self {
            kind,
            content: content.into(),
            stage_id: stage_id.into(),
            project_id,
            os,
            timestamp: now_millis(),
        }
    }
}
