//! Data models for tonesmith
//!
//! Defines the persisted document: projects holding sessions of generation
//! attempts, liked outputs, and the global tone-of-voice text.
//!
//! Every field carries a serde default so a document with missing keys
//! still loads; `{}` deserializes to the empty state.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The root document stored on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct State {
    /// Projects keyed by name (case-sensitive)
    #[serde(default)]
    pub projects: BTreeMap<String, Project>,
    /// Currently selected project, if any
    #[serde(default)]
    pub active_project: Option<String>,
    /// Global tone-of-voice guidance applied to every generation
    #[serde(default)]
    pub tone_of_voice: String,
}

impl State {
    /// Look up a project by name
    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.get(name)
    }

    /// Get a project for mutation, creating an empty one if absent
    pub fn project_mut_or_default(&mut self, name: &str) -> &mut Project {
        self.projects.entry(name.to_string()).or_default()
    }
}

/// A named workspace of sessions and liked outputs
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Sessions in creation order
    #[serde(default)]
    pub sessions: Vec<Session>,
    /// Liked items in the order they were liked
    #[serde(default)]
    pub likes: Vec<HistoryItem>,
}

impl Project {
    /// Find a session by id
    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }
}

/// One editing conversation: generation attempts sharing an id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: String,
    /// Items in generation order (v1, v2, ...)
    #[serde(default)]
    pub items: Vec<HistoryItem>,
}

impl Session {
    pub fn new(id: impl Into<String>, first: HistoryItem) -> Self {
        Self {
            id: id.into(),
            items: vec![first],
        }
    }

    /// The most recent generation in this session
    pub fn latest(&self) -> Option<&HistoryItem> {
        self.items.last()
    }

    /// Look up an item by its 1-based version number
    pub fn version(&self, n: usize) -> Option<&HistoryItem> {
        n.checked_sub(1).and_then(|idx| self.items.get(idx))
    }
}

/// The full record of one generation attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryItem {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub params: GenerationParams,
}

impl HistoryItem {
    /// Create an unliked history item
    pub fn new(
        input: impl Into<String>,
        instructions: impl Into<String>,
        output: impl Into<String>,
        params: GenerationParams,
    ) -> Self {
        Self {
            input: input.into(),
            instructions: instructions.into(),
            output: output.into(),
            liked: false,
            params,
        }
    }

    /// A copy of this item marked as liked
    pub fn as_liked(&self) -> Self {
        Self {
            liked: true,
            ..self.clone()
        }
    }
}

/// Length and strength controls for one generation
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationParams {
    #[serde(default)]
    pub length: Length,
    #[serde(default)]
    pub strength: Strength,
}

impl GenerationParams {
    pub fn new(length: Length, strength: Strength) -> Self {
        Self { length, strength }
    }
}

/// Target output length
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Short,
    #[default]
    Medium,
    Long,
}

impl Length {
    pub const ALL: [Length; 3] = [Length::Short, Length::Medium, Length::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            Length::Short => "short",
            Length::Medium => "medium",
            Length::Long => "long",
        }
    }
}

/// How strongly the tone of voice reshapes the input
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Subtle,
    #[default]
    Balanced,
    Strong,
}

impl Strength {
    pub const ALL: [Strength; 3] = [Strength::Subtle, Strength::Balanced, Strength::Strong];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strength::Subtle => "subtle",
            Strength::Balanced => "balanced",
            Strength::Strong => "strong",
        }
    }
}

/// Error parsing a length or strength name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {kind} '{value}'. Expected one of: {expected}")]
pub struct ParseParamError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl FromStr for Length {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Length::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseParamError {
                kind: "length",
                value: s.to_string(),
                expected: "short, medium, long",
            })
    }
}

impl FromStr for Strength {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strength::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseParamError {
                kind: "strength",
                value: s.to_string(),
                expected: "subtle, balanced, strong",
            })
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
