//! Core graph types: concepts, relations, and learner progress.
//!
//! These are plain data records borrowed from storage. The engine never
//! mutates them; every algorithm works on an immutable
//! [`GraphSnapshot`](crate::GraphSnapshot) assembled from them.

use cognita_core::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Identifiers
// ============================================================================

/// Stable identifier of a concept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptId(pub u64);

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ConceptId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Stable identifier of a learner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LearnerId(pub u64);

impl fmt::Display for LearnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for LearnerId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Set of concepts a learner has completed or mastered.
pub type LearnedSet = BTreeSet<ConceptId>;

/// Clamp a weight into `[0, 1]`, mapping NaN to 0.
pub(crate) fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// ============================================================================
// Category / difficulty
// ============================================================================

/// Domain tag of a concept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Algorithm,
    DataStructure,
    Network,
    Os,
    Database,
    SoftwareEngineering,
    Programming,
    Ai,
    Security,
    Architecture,
    Theory,
    Graphics,
    Hci,
    Distributed,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 14] = [
        Category::Algorithm,
        Category::DataStructure,
        Category::Network,
        Category::Os,
        Category::Database,
        Category::SoftwareEngineering,
        Category::Programming,
        Category::Ai,
        Category::Security,
        Category::Architecture,
        Category::Theory,
        Category::Graphics,
        Category::Hci,
        Category::Distributed,
    ];

    /// Wire name of the category.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Algorithm => "algorithm",
            Category::DataStructure => "data_structure",
            Category::Network => "network",
            Category::Os => "os",
            Category::Database => "database",
            Category::SoftwareEngineering => "software_engineering",
            Category::Programming => "programming",
            Category::Ai => "ai",
            Category::Security => "security",
            Category::Architecture => "architecture",
            Category::Theory => "theory",
            Category::Graphics => "graphics",
            Category::Hci => "hci",
            Category::Distributed => "distributed",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| Error::invalid_data(format!("unknown category: {s}")))
    }
}

/// Difficulty tier of a concept. Ordered `Beginner < ... < Expert`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    /// Every tier, lowest first.
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
        Difficulty::Expert,
    ];

    /// Wire name of the tier.
    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
            Difficulty::Expert => "expert",
        }
    }

    /// Zero-based rank of the tier.
    pub fn rank(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| Error::invalid_data(format!("unknown difficulty: {s}")))
    }
}

// ============================================================================
// Concept
// ============================================================================

fn default_true() -> bool {
    true
}

fn default_strength() -> f32 {
    0.5
}

/// A learnable unit in the concept graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    /// Stable identifier.
    pub id: ConceptId,
    /// Human-readable name, unique among active concepts.
    pub name: String,
    /// Optional English name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Domain tag.
    #[serde(default)]
    pub category: Category,
    /// Difficulty tier.
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Ranking weight in `[0, 1]`.
    #[serde(default = "default_importance")]
    pub importance: f32,
    /// Number of times the concept was viewed.
    #[serde(default)]
    pub view_count: u32,
    /// Number of recorded study events.
    #[serde(default)]
    pub learn_count: u32,
    /// Per-concept study estimate, overriding the path default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<u32>,
    /// Inactive concepts are ignored by the builder.
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_importance() -> f32 {
    1.0
}

impl Concept {
    /// Create an active beginner concept with full importance.
    pub fn new(id: impl Into<ConceptId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            name_en: None,
            description: String::new(),
            category: Category::default(),
            difficulty: Difficulty::default(),
            importance: default_importance(),
            view_count: 0,
            learn_count: 0,
            estimated_minutes: None,
            active: true,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Set the importance weight, clamped into `[0, 1]`.
    pub fn with_importance(mut self, importance: f32) -> Self {
        self.importance = clamp_unit(importance);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_name_en(mut self, name_en: impl Into<String>) -> Self {
        self.name_en = Some(name_en.into());
        self
    }

    pub fn with_counts(mut self, views: u32, learns: u32) -> Self {
        self.view_count = views;
        self.learn_count = learns;
        self
    }

    pub fn with_estimated_minutes(mut self, minutes: u32) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    /// Mark the concept inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Return a copy with importance clamped into `[0, 1]`.
    ///
    /// Storage rows are not trusted to respect the range.
    pub fn normalized(mut self) -> Self {
        self.importance = clamp_unit(self.importance);
        self
    }

    /// Popularity used as a ranking tie-break (views plus study events).
    pub fn popularity(&self) -> u64 {
        u64::from(self.view_count) + u64::from(self.learn_count)
    }
}

// ============================================================================
// Relations
// ============================================================================

/// Kind of a directed relation between two concepts.
///
/// Only [`RelationKind::Prerequisite`] participates in ordering; every other
/// kind is informational and only shows up in the visualization graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Source must be learned before target.
    Prerequisite,
    Related,
    Contains,
    Implements,
    Extends,
    Uses,
    Similar,
    Opposite,
}

impl RelationKind {
    /// Every relation kind, in declaration order.
    pub const ALL: [RelationKind; 8] = [
        RelationKind::Prerequisite,
        RelationKind::Related,
        RelationKind::Contains,
        RelationKind::Implements,
        RelationKind::Extends,
        RelationKind::Uses,
        RelationKind::Similar,
        RelationKind::Opposite,
    ];

    /// Wire name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            RelationKind::Prerequisite => "prerequisite",
            RelationKind::Related => "related",
            RelationKind::Contains => "contains",
            RelationKind::Implements => "implements",
            RelationKind::Extends => "extends",
            RelationKind::Uses => "uses",
            RelationKind::Similar => "similar",
            RelationKind::Opposite => "opposite",
        }
    }

    /// Whether edges of this kind constrain learning order.
    pub const fn is_ordering(&self) -> bool {
        matches!(self, RelationKind::Prerequisite)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RelationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelationKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| Error::invalid_data(format!("unknown relation kind: {s}")))
    }
}

/// A directed, typed, weighted edge between two concepts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Source concept (the prerequisite, for prerequisite edges).
    pub source: ConceptId,
    /// Target concept (the dependent, for prerequisite edges).
    pub target: ConceptId,
    /// Relation kind.
    pub kind: RelationKind,
    /// Weight in `[0, 1]`.
    #[serde(default = "default_strength")]
    pub strength: f32,
    /// Optional free-text note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Inactive relations are ignored by the builder.
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Relation {
    /// Create an active relation with the default strength of 0.5.
    pub fn new(
        source: impl Into<ConceptId>,
        target: impl Into<ConceptId>,
        kind: RelationKind,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            strength: default_strength(),
            description: None,
            active: true,
        }
    }

    /// Shorthand for a prerequisite edge: `before` must be learned before `after`.
    pub fn prerequisite(before: impl Into<ConceptId>, after: impl Into<ConceptId>) -> Self {
        Self::new(before, after, RelationKind::Prerequisite)
    }

    /// Set the strength, clamped into `[0, 1]`.
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = clamp_unit(strength);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the relation inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Return a copy with strength clamped into `[0, 1]`.
    pub fn normalized(mut self) -> Self {
        self.strength = clamp_unit(self.strength);
        self
    }

    /// Uniqueness key among active relations.
    pub fn key(&self) -> (ConceptId, ConceptId, RelationKind) {
        (self.source, self.target, self.kind)
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// Short human-readable form, e.g. `1 -[prerequisite]-> 2`.
    pub fn describe(&self) -> String {
        format!("{} -[{}]-> {}", self.source, self.kind, self.target)
    }
}

// ============================================================================
// Learning paths
// ============================================================================

/// A curated, published sequence of concepts maintained outside the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearningPath {
    /// Path identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Concepts on the path, in curated order.
    #[serde(default)]
    pub concepts: Vec<ConceptId>,
    /// Featured paths are listed first.
    #[serde(default)]
    pub featured: bool,
    /// Number of learners following the path.
    #[serde(default)]
    pub follower_count: u32,
}

impl LearningPath {
    pub fn new(id: u64, name: impl Into<String>, concepts: Vec<ConceptId>) -> Self {
        Self {
            id,
            name: name.into(),
            concepts,
            featured: false,
            follower_count: 0,
        }
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    pub fn with_followers(mut self, count: u32) -> Self {
        self.follower_count = count;
        self
    }
}

// ============================================================================
// Learner progress
// ============================================================================

/// Study status of a learner on one concept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Mastered,
}

impl ProgressStatus {
    /// Completed and mastered concepts count as learned.
    pub fn is_learned(&self) -> bool {
        matches!(self, ProgressStatus::Completed | ProgressStatus::Mastered)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not_started",
            ProgressStatus::InProgress => "in_progress",
            ProgressStatus::Completed => "completed",
            ProgressStatus::Mastered => "mastered",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One learner's progress on one concept. Unique per `(learner, concept)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearnerProgress {
    /// The learner.
    pub learner: LearnerId,
    /// The concept studied.
    pub concept: ConceptId,
    /// Current status.
    #[serde(default)]
    pub status: ProgressStatus,
    /// Mastery estimate, 0 to 100.
    #[serde(default)]
    pub mastery_level: u8,
    /// Accumulated study time in minutes.
    #[serde(default)]
    pub study_minutes: u32,
    /// Number of study sessions.
    #[serde(default)]
    pub sessions: u32,
}

impl LearnerProgress {
    /// Create a not-started record.
    pub fn new(learner: impl Into<LearnerId>, concept: impl Into<ConceptId>) -> Self {
        Self {
            learner: learner.into(),
            concept: concept.into(),
            status: ProgressStatus::NotStarted,
            mastery_level: 0,
            study_minutes: 0,
            sessions: 0,
        }
    }

    pub fn with_status(mut self, status: ProgressStatus) -> Self {
        self.status = status;
        self
    }

    /// Apply one study session and recompute mastery and status.
    ///
    /// Mastery is `min(sessions * 10, 50) + min(minutes / 30, 30)`, capped at
    /// 100. Status becomes mastered at 90, completed at 70, in progress above 0.
    /// This mirrors the progress tracker that owns these rows; the engine
    /// itself only reads them.
    pub fn record_session(mut self, minutes: u32) -> Self {
        self.sessions = self.sessions.saturating_add(1);
        self.study_minutes = self.study_minutes.saturating_add(minutes);

        let base = self.sessions.saturating_mul(10).min(50);
        let time_bonus = (self.study_minutes / 30).min(30);
        self.mastery_level = (base + time_bonus).min(100) as u8;

        self.status = match self.mastery_level {
            90.. => ProgressStatus::Mastered,
            70.. => ProgressStatus::Completed,
            1.. => ProgressStatus::InProgress,
            0 => self.status,
        };
        self
    }

    pub fn is_learned(&self) -> bool {
        self.status.is_learned()
    }
}

/// Collect the learned concept ids from a progress snapshot.
pub fn learned_set(progress: &[LearnerProgress]) -> LearnedSet {
    progress
        .iter()
        .filter(|p| p.is_learned())
        .map(|p| p.concept)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
