//! Read-only storage contract consumed by the graph builder.
//!
//! Persistence of concepts, relations, and learner progress belongs to an
//! external collaborator. The engine only needs the three reads defined by
//! [`ConceptStore`]; it never writes through them.
//!
//! [`MemoryStore`] is a plain in-memory implementation used by tests and by
//! the JSON dataset loader in [`persistence`](crate::persistence).

use crate::types::{
    Category, Concept, ConceptId, LearnerId, LearnerProgress, LearningPath, Relation,
    RelationKind,
};
use cognita_core::Result;
use std::collections::BTreeSet;

/// Trait implemented by whatever owns concept data.
///
/// Implementations may be backed by a database, a file, or memory. Calls are
/// synchronous; the builder issues them once per snapshot.
pub trait ConceptStore: Send + Sync {
    /// List concepts, optionally restricted to one category.
    fn list_concepts(&self, category: Option<Category>, active_only: bool) -> Result<Vec<Concept>>;

    /// List relations whose source and target are both in `ids`.
    ///
    /// Implementations backed by eventually consistent storage may return
    /// rows that reference concepts outside `ids`; the builder drops those.
    fn list_relations(
        &self,
        ids: &BTreeSet<ConceptId>,
        kind: Option<RelationKind>,
        active_only: bool,
    ) -> Result<Vec<Relation>>;

    /// Progress rows of one learner.
    fn learner_progress(&self, learner: LearnerId) -> Result<Vec<LearnerProgress>>;

    /// Published learning paths. Stores without curated paths return none.
    fn learning_paths(&self) -> Result<Vec<LearningPath>> {
        Ok(Vec::new())
    }

    /// Returns the name of this store for logging/debugging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Store holding every row in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    concepts: Vec<Concept>,
    relations: Vec<Relation>,
    progress: Vec<LearnerProgress>,
    paths: Vec<LearningPath>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from raw rows.
    pub fn from_parts(
        concepts: Vec<Concept>,
        relations: Vec<Relation>,
        progress: Vec<LearnerProgress>,
    ) -> Self {
        Self {
            concepts,
            relations,
            progress,
            paths: Vec::new(),
        }
    }

    pub fn with_concept(mut self, concept: Concept) -> Self {
        self.concepts.push(concept);
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn with_progress(mut self, progress: LearnerProgress) -> Self {
        self.progress.push(progress);
        self
    }

    pub fn with_paths(mut self, paths: Vec<LearningPath>) -> Self {
        self.paths = paths;
        self
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn progress(&self) -> &[LearnerProgress] {
        &self.progress
    }
}

impl ConceptStore for MemoryStore {
    fn list_concepts(&self, category: Option<Category>, active_only: bool) -> Result<Vec<Concept>> {
        Ok(self
            .concepts
            .iter()
            .filter(|c| !active_only || c.active)
            .filter(|c| category.is_none_or(|cat| c.category == cat))
            .cloned()
            .collect())
    }

    fn list_relations(
        &self,
        ids: &BTreeSet<ConceptId>,
        kind: Option<RelationKind>,
        active_only: bool,
    ) -> Result<Vec<Relation>> {
        Ok(self
            .relations
            .iter()
            .filter(|r| !active_only || r.active)
            .filter(|r| kind.is_none_or(|k| r.kind == k))
            .filter(|r| ids.contains(&r.source) && ids.contains(&r.target))
            .cloned()
            .collect())
    }

    fn learner_progress(&self, learner: LearnerId) -> Result<Vec<LearnerProgress>> {
        Ok(self
            .progress
            .iter()
            .filter(|p| p.learner == learner)
            .cloned()
            .collect())
    }

    fn learning_paths(&self) -> Result<Vec<LearningPath>> {
        Ok(self.paths.clone())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ============================================================================
// Tests
// ============================================================================
