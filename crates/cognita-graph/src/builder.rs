//! Graph builder: loads concepts and relations into a [`GraphSnapshot`].
//!
//! The builder is the only component that talks to a [`ConceptStore`].
//! Storage rows are not trusted: relations that point outside the loaded
//! concept set, self-loops, duplicate `(source, target, kind)` triples and
//! duplicate concept names are dropped with a warning and counted in
//! [`BuildStats`]. None of these abort the build.
//!
//! # Example
//!
//! ```
//! use cognita_graph::{GraphBuilder, MemoryStore, Concept, Relation};
//!
//! let store = MemoryStore::new()
//!     .with_concept(Concept::new(1, "Array").with_importance(0.9))
//!     .with_concept(Concept::new(2, "Stack").with_importance(0.8))
//!     .with_relation(Relation::prerequisite(1, 2));
//!
//! let (snapshot, stats) = GraphBuilder::new(&store).build().unwrap();
//! assert_eq!(snapshot.len(), 2);
//! assert_eq!(stats.relations_loaded, 1);
//! ```

use crate::graph::{GraphSnapshot, PrereqGraph, VisGraph};
use crate::store::ConceptStore;
use crate::types::{Category, Concept, ConceptId, Relation};
use cognita_core::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Default node cap, bounding the quadratic force-directed layout.
pub const DEFAULT_MAX_NODES: usize = 50;

/// Counters describing what the builder loaded and what it dropped.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildStats {
    /// Concepts kept in the snapshot.
    pub concepts_loaded: usize,
    /// Concepts cut by the node cap.
    pub concepts_capped: usize,
    /// Relations kept in the snapshot.
    pub relations_loaded: usize,
    /// Relations dropped because an endpoint was not loaded.
    pub dangling_refs: Vec<String>,
    /// Self-loop relations dropped.
    pub self_loops: usize,
    /// Relations dropped as duplicate `(source, target, kind)` triples.
    pub duplicate_relations: usize,
    /// Names of concepts dropped because an earlier concept had the same name.
    pub duplicate_names: Vec<String>,
}

impl BuildStats {
    /// Total number of storage rows the builder discarded.
    pub fn dropped(&self) -> usize {
        self.dangling_refs.len()
            + self.self_loops
            + self.duplicate_relations
            + self.duplicate_names.len()
    }
}

/// Builder for [`GraphSnapshot`]s backed by a [`ConceptStore`].
pub struct GraphBuilder<'a, S: ConceptStore + ?Sized> {
    store: &'a S,
    category: Option<Category>,
    max_nodes: Option<usize>,
}

impl<'a, S: ConceptStore + ?Sized> GraphBuilder<'a, S> {
    /// Create a builder with no category filter and the default node cap.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            category: None,
            max_nodes: Some(DEFAULT_MAX_NODES),
        }
    }

    /// Restrict loading to one category (`None` loads every category).
    pub fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    /// Set the node cap (`None` disables it).
    pub fn with_max_nodes(mut self, max_nodes: Option<usize>) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Load concepts and relations and assemble the snapshot.
    ///
    /// Only storage failures are errors. An empty concept set yields an
    /// empty snapshot.
    pub fn build(self) -> Result<(GraphSnapshot, BuildStats)> {
        log::debug!(
            "Building graph from store '{}' (category: {:?}, max_nodes: {:?})",
            self.store.name(),
            self.category,
            self.max_nodes
        );

        let concepts = self.store.list_concepts(self.category, true)?;
        let mut stats = BuildStats::default();
        let mut concepts = rank_concepts(concepts, &mut stats);

        if let Some(max) = self.max_nodes
            && concepts.len() > max
        {
            stats.concepts_capped = concepts.len() - max;
            concepts.truncate(max);
        }

        if concepts.is_empty() {
            log::debug!("No concepts matched; returning empty snapshot");
            return Ok((GraphSnapshot::empty(), stats));
        }

        let ids: BTreeSet<ConceptId> = concepts.iter().map(|c| c.id).collect();
        let relations = self.store.list_relations(&ids, None, true)?;
        let snapshot = assemble(concepts, relations, &mut stats);

        log::debug!(
            "Built graph: {} concepts, {} relations ({} prerequisite), {} rows dropped",
            snapshot.len(),
            stats.relations_loaded,
            snapshot.prereq().edge_count(),
            stats.dropped()
        );
        Ok((snapshot, stats))
    }
}

impl GraphSnapshot {
    /// Build a snapshot directly from rows, without a store or node cap.
    ///
    /// Applies the same normalisation and dropping rules as
    /// [`GraphBuilder::build`].
    pub fn from_parts(concepts: Vec<Concept>, relations: Vec<Relation>) -> (Self, BuildStats) {
        let mut stats = BuildStats::default();
        let concepts = rank_concepts(concepts, &mut stats);
        let snapshot = assemble(concepts, relations, &mut stats);
        (snapshot, stats)
    }
}

/// Keep active concepts, clamp weights, order by importance and drop
/// duplicate names (the lower-ranked concept loses).
fn rank_concepts(concepts: Vec<Concept>, stats: &mut BuildStats) -> Vec<Concept> {
    let mut concepts: Vec<Concept> = concepts
        .into_iter()
        .filter(|c| c.active)
        .map(Concept::normalized)
        .collect();
    concepts.sort_by(|a, b| {
        b.importance
            .total_cmp(&a.importance)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut seen_ids = HashSet::new();
    let mut seen_names = HashSet::new();
    concepts.retain(|c| {
        if !seen_ids.insert(c.id) {
            log::warn!("Dropping duplicate concept row for id {}", c.id);
            return false;
        }
        if !seen_names.insert(c.name.clone()) {
            log::warn!(
                "Dropping concept {} ('{}'): name already used by a higher-ranked concept",
                c.id,
                c.name
            );
            stats.duplicate_names.push(c.name.clone());
            return false;
        }
        true
    });
    concepts
}

/// Assemble both graphs from ranked concepts and raw relations.
fn assemble(
    concepts: Vec<Concept>,
    relations: Vec<Relation>,
    stats: &mut BuildStats,
) -> GraphSnapshot {
    let mut vis = VisGraph::new();
    let mut prereq = PrereqGraph::new();
    let mut ordered_ids = Vec::with_capacity(concepts.len());
    let mut by_id = BTreeMap::new();

    for concept in concepts {
        vis.add_node(concept.id);
        prereq.add_node(concept.id);
        ordered_ids.push(concept.id);
        by_id.insert(concept.id, concept);
    }

    let mut seen = HashSet::new();
    for relation in relations {
        if !relation.active {
            continue;
        }
        let relation = relation.normalized();

        if !by_id.contains_key(&relation.source) || !by_id.contains_key(&relation.target) {
            log::warn!(
                "Dropping relation {}: endpoint not in loaded concept set",
                relation.describe()
            );
            stats.dangling_refs.push(relation.describe());
            continue;
        }
        if relation.is_self_loop() {
            log::warn!("Dropping self-loop relation {}", relation.describe());
            stats.self_loops += 1;
            continue;
        }
        if !seen.insert(relation.key()) {
            log::warn!("Dropping duplicate relation {}", relation.describe());
            stats.duplicate_relations += 1;
            continue;
        }

        if relation.kind.is_ordering() {
            prereq.add_edge(relation.source, relation.target);
        }
        // Both endpoints were checked against the loaded set above.
        if vis.add_relation(relation).is_ok() {
            stats.relations_loaded += 1;
        }
    }

    stats.concepts_loaded = by_id.len();
    GraphSnapshot {
        concepts: by_id,
        ordered_ids,
        vis,
        prereq,
    }
}

// ============================================================================
// Tests
// ============================================================================
