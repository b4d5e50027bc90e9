//! In-memory graph snapshot.
//!
//! A [`GraphSnapshot`] is built once per request by the
//! [`GraphBuilder`](crate::GraphBuilder) and handed by reference to the
//! layout, ordering, and recommendation components. It is never mutated
//! after construction.
//!
//! It carries two views of the same concept set:
//!
//! - [`VisGraph`]: a petgraph `DiGraph` over every relation kind, used for
//!   display and relatedness.
//! - [`PrereqGraph`]: forward/reverse adjacency and in-degrees restricted to
//!   prerequisite relations, used for ordering.

use crate::types::{Concept, ConceptId, Relation};
use cognita_core::{Error, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// Visualization graph
// ============================================================================

/// Directed graph over all relation kinds.
#[derive(Clone, Debug, Default)]
pub struct VisGraph {
    /// Underlying petgraph graph. Node weights are concept ids.
    pub graph: DiGraph<ConceptId, Relation>,
    node_indices: HashMap<ConceptId, NodeIndex>,
}

impl VisGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; re-adding an existing id returns the existing index.
    pub fn add_node(&mut self, id: ConceptId) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(&id) {
            return idx;
        }
        let idx = self.graph.add_node(id);
        self.node_indices.insert(id, idx);
        idx
    }

    /// Add a relation between two existing nodes.
    pub fn add_relation(&mut self, relation: Relation) -> Result<()> {
        let from = self
            .index(relation.source)
            .ok_or_else(|| Error::not_found(format!("source concept {}", relation.source)))?;
        let to = self
            .index(relation.target)
            .ok_or_else(|| Error::not_found(format!("target concept {}", relation.target)))?;
        self.graph.add_edge(from, to, relation);
        Ok(())
    }

    pub fn index(&self, id: ConceptId) -> Option<NodeIndex> {
        self.node_indices.get(&id).copied()
    }

    pub fn contains(&self, id: ConceptId) -> bool {
        self.node_indices.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All relations, in insertion order.
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.graph.edge_weights()
    }

    /// Relations leaving `id`.
    pub fn outgoing(&self, id: ConceptId) -> Vec<&Relation> {
        self.directed(id, Direction::Outgoing)
    }

    /// Relations entering `id`.
    pub fn incoming(&self, id: ConceptId) -> Vec<&Relation> {
        self.directed(id, Direction::Incoming)
    }

    /// Number of relations touching `id` in the given direction.
    pub fn degree(&self, id: ConceptId, direction: Direction) -> usize {
        self.index(id)
            .map(|idx| self.graph.edges_directed(idx, direction).count())
            .unwrap_or(0)
    }

    fn directed(&self, id: ConceptId, direction: Direction) -> Vec<&Relation> {
        let Some(idx) = self.index(id) else {
            return Vec::new();
        };
        // petgraph walks adjacency newest-first; restore insertion order.
        let mut edges: Vec<_> = self.graph.edges_directed(idx, direction).collect();
        edges.sort_by_key(|e| e.id());
        edges.into_iter().map(|e| e.weight()).collect()
    }
}

// ============================================================================
// Prerequisite graph
// ============================================================================

/// Adjacency structure restricted to prerequisite edges.
///
/// Every loaded concept is a key in all three maps, so lookups for concepts
/// without prerequisite edges yield empty slices and zero in-degree.
/// Adjacency lists are kept sorted and free of duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrereqGraph {
    forward: BTreeMap<ConceptId, Vec<ConceptId>>,
    reverse: BTreeMap<ConceptId, Vec<ConceptId>>,
    in_degree: BTreeMap<ConceptId, usize>,
}

impl PrereqGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build directly from node ids and `(prerequisite, dependent)` pairs.
    ///
    /// Pairs referencing unknown nodes are ignored.
    pub fn from_edges(
        nodes: impl IntoIterator<Item = ConceptId>,
        edges: impl IntoIterator<Item = (ConceptId, ConceptId)>,
    ) -> Self {
        let mut graph = Self::new();
        for id in nodes {
            graph.add_node(id);
        }
        for (before, after) in edges {
            graph.add_edge(before, after);
        }
        graph
    }

    pub fn add_node(&mut self, id: ConceptId) {
        self.forward.entry(id).or_default();
        self.reverse.entry(id).or_default();
        self.in_degree.entry(id).or_insert(0);
    }

    /// Record that `before` must be learned before `after`.
    ///
    /// Returns `false` (and changes nothing) when either node is unknown, the
    /// edge is a self-loop, or the edge already exists.
    pub fn add_edge(&mut self, before: ConceptId, after: ConceptId) -> bool {
        if before == after || !self.contains(before) || !self.contains(after) {
            return false;
        }
        let Some(successors) = self.forward.get_mut(&before) else {
            return false;
        };
        let Err(pos) = successors.binary_search(&after) else {
            return false;
        };
        successors.insert(pos, after);

        let predecessors = self.reverse.entry(after).or_default();
        if let Err(pos) = predecessors.binary_search(&before) {
            predecessors.insert(pos, before);
        }
        *self.in_degree.entry(after).or_insert(0) += 1;
        true
    }

    pub fn contains(&self, id: ConceptId) -> bool {
        self.in_degree.contains_key(&id)
    }

    /// Node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = ConceptId> + '_ {
        self.in_degree.keys().copied()
    }

    pub fn node_count(&self) -> usize {
        self.in_degree.len()
    }

    pub fn edge_count(&self) -> usize {
        self.forward.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.in_degree.is_empty()
    }

    /// Concepts that directly require `id` (forward adjacency).
    pub fn dependents(&self, id: ConceptId) -> &[ConceptId] {
        self.forward.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Direct prerequisites of `id` (reverse adjacency).
    pub fn direct_prerequisites(&self, id: ConceptId) -> &[ConceptId] {
        self.reverse.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn in_degree(&self, id: ConceptId) -> usize {
        self.in_degree.get(&id).copied().unwrap_or(0)
    }

    pub fn in_degrees(&self) -> &BTreeMap<ConceptId, usize> {
        &self.in_degree
    }

    /// All `(prerequisite, dependent)` pairs in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = (ConceptId, ConceptId)> + '_ {
        self.forward
            .iter()
            .flat_map(|(&from, tos)| tos.iter().map(move |&to| (from, to)))
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Immutable view of the concept graph for one computation.
#[derive(Clone, Debug, Default)]
pub struct GraphSnapshot {
    pub(crate) concepts: BTreeMap<ConceptId, Concept>,
    pub(crate) ordered_ids: Vec<ConceptId>,
    pub(crate) vis: VisGraph,
    pub(crate) prereq: PrereqGraph,
}

impl GraphSnapshot {
    /// An empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn contains(&self, id: ConceptId) -> bool {
        self.concepts.contains_key(&id)
    }

    pub fn concept(&self, id: ConceptId) -> Option<&Concept> {
        self.concepts.get(&id)
    }

    /// Look up a concept, failing with `NotFound` when it is not loaded.
    pub fn require(&self, id: ConceptId) -> Result<&Concept> {
        self.concepts
            .get(&id)
            .ok_or_else(|| Error::not_found(format!("concept {id}")))
    }

    /// Concept name, or the id rendered as text when unknown.
    pub fn name_of(&self, id: ConceptId) -> String {
        self.concepts
            .get(&id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Concepts in load order (descending importance, then ascending id).
    pub fn concepts_in_order(&self) -> impl Iterator<Item = &Concept> {
        self.ordered_ids
            .iter()
            .filter_map(|id| self.concepts.get(id))
    }

    /// Concept ids in load order.
    pub fn ordered_ids(&self) -> &[ConceptId] {
        &self.ordered_ids
    }

    /// Concepts keyed by id.
    pub fn concepts(&self) -> &BTreeMap<ConceptId, Concept> {
        &self.concepts
    }

    /// The all-kinds visualization graph.
    pub fn vis(&self) -> &VisGraph {
        &self.vis
    }

    /// The prerequisite-only ordering graph.
    pub fn prereq(&self) -> &PrereqGraph {
        &self.prereq
    }

    /// All relations in the snapshot, in insertion order.
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.vis.relations()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RelationKind;

    fn ids(raw: &[u64]) -> Vec<ConceptId> {
        raw.iter().copied().map(ConceptId).collect()
    }

    #[test]
    fn test_prereq_graph_adjacency() {
        let graph = PrereqGraph::from_edges(
            ids(&[1, 2, 3]),
            [(ConceptId(1), ConceptId(2)), (ConceptId(1), ConceptId(3))],
        );

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.dependents(ConceptId(1)), ids(&[2, 3]).as_slice());
        assert_eq!(
            graph.direct_prerequisites(ConceptId(3)),
            ids(&[1]).as_slice()
        );
        assert_eq!(graph.in_degree(ConceptId(1)), 0);
        assert_eq!(graph.in_degree(ConceptId(2)), 1);
    }

    #[test]
    fn test_prereq_graph_rejects_bad_edges() {
        let mut graph = PrereqGraph::from_edges(ids(&[1, 2]), []);

        assert!(graph.add_edge(ConceptId(1), ConceptId(2)));
        assert!(!graph.add_edge(ConceptId(1), ConceptId(2)), "duplicate");
        assert!(!graph.add_edge(ConceptId(1), ConceptId(1)), "self-loop");
        assert!(!graph.add_edge(ConceptId(1), ConceptId(9)), "unknown node");
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.in_degree(ConceptId(2)), 1);
    }

    #[test]
    fn test_prereq_graph_unknown_lookups_are_empty() {
        let graph = PrereqGraph::new();
        assert!(graph.is_empty());
        assert!(graph.dependents(ConceptId(5)).is_empty());
        assert!(graph.direct_prerequisites(ConceptId(5)).is_empty());
        assert_eq!(graph.in_degree(ConceptId(5)), 0);
    }

    #[test]
    fn test_vis_graph_relations() {
        let mut vis = VisGraph::new();
        vis.add_node(ConceptId(1));
        vis.add_node(ConceptId(2));
        vis.add_relation(Relation::prerequisite(1, 2)).unwrap();
        vis.add_relation(Relation::new(2, 1, RelationKind::Uses))
            .unwrap();

        assert_eq!(vis.node_count(), 2);
        assert_eq!(vis.edge_count(), 2);
        assert_eq!(vis.outgoing(ConceptId(1)).len(), 1);
        assert_eq!(vis.incoming(ConceptId(1))[0].kind, RelationKind::Uses);
        assert_eq!(vis.degree(ConceptId(2), Direction::Incoming), 1);
    }

    #[test]
    fn test_vis_graph_outgoing_insertion_order() {
        let mut vis = VisGraph::new();
        for id in 1..=4 {
            vis.add_node(ConceptId(id));
        }
        vis.add_relation(Relation::new(1, 3, RelationKind::Related))
            .unwrap();
        vis.add_relation(Relation::new(1, 2, RelationKind::Related))
            .unwrap();
        vis.add_relation(Relation::new(1, 4, RelationKind::Related))
            .unwrap();

        let targets: Vec<_> = vis.outgoing(ConceptId(1)).iter().map(|r| r.target).collect();
        assert_eq!(targets, ids(&[3, 2, 4]));
    }

    #[test]
    fn test_vis_graph_missing_endpoint() {
        let mut vis = VisGraph::new();
        vis.add_node(ConceptId(1));
        assert!(vis.add_relation(Relation::prerequisite(1, 2)).is_err());
    }

    #[test]
    fn test_snapshot_require() {
        let snapshot = GraphSnapshot::empty();
        assert!(snapshot.is_empty());
        let err = snapshot.require(ConceptId(3)).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(snapshot.name_of(ConceptId(3)), "3");
    }
}
