//! Prerequisite ordering: topological sort, ancestors, cycles, readiness
//! and personalized paths.
//!
//! Every function is pure over a [`PrereqGraph`] or [`GraphSnapshot`] and
//! keeps no state between calls. The prerequisite graph is not guaranteed
//! to be acyclic; cycles never cause a failure. Orderings carry an explicit
//! `has_cycle` flag and list the nodes Kahn's algorithm could not place.
//!
//! Iteration is always in ascending [`ConceptId`] order where the algorithm
//! leaves a choice, so results are reproducible.

use crate::graph::{GraphSnapshot, PrereqGraph};
use crate::types::{learned_set, ConceptId, Difficulty, LearnedSet, LearnerProgress};
use cognita_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

/// Study estimate for concepts without their own, in minutes (two hours).
pub const DEFAULT_CONCEPT_MINUTES: u32 = 120;

// ============================================================================
// Topological order
// ============================================================================

/// Result of a topological sort.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    /// Every node exactly once. Nodes stuck on cycles come last, ascending.
    pub order: Vec<ConceptId>,
    /// Whether some nodes could not be placed because of a cycle.
    pub has_cycle: bool,
    /// The nodes appended by the cycle fallback, ascending.
    pub unresolved: Vec<ConceptId>,
}

impl Ordering {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Zero-based position of `id` in the order.
    pub fn position(&self, id: ConceptId) -> Option<usize> {
        self.order.iter().position(|&n| n == id)
    }
}

/// Topologically sort every node of the prerequisite graph.
pub fn topological_sort(graph: &PrereqGraph) -> Ordering {
    let nodes: BTreeSet<ConceptId> = graph.node_ids().collect();
    kahn(graph, &nodes)
}

/// Topologically sort the subgraph induced by `nodes`.
///
/// Ids not present in the graph are ignored.
pub fn topological_sort_subset(graph: &PrereqGraph, nodes: &BTreeSet<ConceptId>) -> Ordering {
    let nodes: BTreeSet<ConceptId> = nodes
        .iter()
        .copied()
        .filter(|&id| graph.contains(id))
        .collect();
    kahn(graph, &nodes)
}

/// Kahn's algorithm restricted to `nodes`, with the ascending-id fallback.
fn kahn(graph: &PrereqGraph, nodes: &BTreeSet<ConceptId>) -> Ordering {
    let mut in_degree: BTreeMap<ConceptId, usize> = nodes
        .iter()
        .map(|&id| {
            let degree = graph
                .direct_prerequisites(id)
                .iter()
                .filter(|p| nodes.contains(p))
                .count();
            (id, degree)
        })
        .collect();

    let mut queue: VecDeque<ConceptId> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(&id, _)| id)
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(id) = queue.pop_front() {
        order.push(id);
        for next in graph.dependents(id) {
            if let Some(degree) = in_degree.get_mut(next) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(*next);
                }
            }
        }
    }

    let unresolved: Vec<ConceptId> = in_degree
        .into_iter()
        .filter(|(_, degree)| *degree > 0)
        .map(|(id, _)| id)
        .collect();
    let has_cycle = !unresolved.is_empty();
    if has_cycle {
        log::debug!(
            "Cycle left {} of {} nodes unordered",
            unresolved.len(),
            nodes.len()
        );
        order.extend(unresolved.iter().copied());
    }

    Ordering {
        order,
        has_cycle,
        unresolved,
    }
}

// ============================================================================
// Ancestors and learning sequences
// ============================================================================

fn require_node(graph: &PrereqGraph, id: ConceptId) -> Result<()> {
    if graph.contains(id) {
        Ok(())
    } else {
        Err(Error::not_found(format!("concept {id}")))
    }
}

/// Every transitive prerequisite of `id`, in depth-first discovery order.
///
/// `id` itself is never part of the result, even on a cycle through it.
pub fn prerequisites(graph: &PrereqGraph, id: ConceptId) -> Result<Vec<ConceptId>> {
    require_node(graph, id)?;

    let mut visited: HashSet<ConceptId> = HashSet::from([id]);
    let mut found = Vec::new();
    let mut stack: Vec<(ConceptId, usize)> = vec![(id, 0)];

    while let Some(top) = stack.last_mut() {
        let (node, next) = *top;
        top.1 += 1;
        match graph.direct_prerequisites(node).get(next) {
            Some(&prereq) => {
                if visited.insert(prereq) {
                    found.push(prereq);
                    stack.push((prereq, 0));
                }
            }
            None => {
                stack.pop();
            }
        }
    }
    Ok(found)
}

/// Ordered study path for `id`: all its prerequisites, then `id`.
///
/// When the ancestors are acyclic the order ends in `id`.
pub fn learning_sequence(graph: &PrereqGraph, id: ConceptId) -> Result<Ordering> {
    let mut nodes: BTreeSet<ConceptId> = prerequisites(graph, id)?.into_iter().collect();
    nodes.insert(id);
    Ok(kahn(graph, &nodes))
}

// ============================================================================
// Cycles
// ============================================================================

/// One prerequisite cycle, listed in traversal order without repeating the
/// first node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cycle(pub Vec<ConceptId>);

impl Cycle {
    pub fn nodes(&self) -> &[ConceptId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: ConceptId) -> bool {
        self.0.contains(&id)
    }

    /// The same cycle rotated to start at its smallest id.
    pub fn canonical(&self) -> Cycle {
        let mut nodes = self.0.clone();
        if let Some(start) = nodes
            .iter()
            .enumerate()
            .min_by_key(|(_, id)| **id)
            .map(|(i, _)| i)
        {
            nodes.rotate_left(start);
        }
        Cycle(nodes)
    }
}

/// Find prerequisite cycles with a depth-first search from every unvisited
/// root, in ascending id order.
///
/// Reaching a node that is still on the recursion stack reports the path
/// slice from that node. Overlapping or repeated cycles are reported as
/// found; use [`dedup_cycles`] for a unique set.
pub fn detect_cycles(graph: &PrereqGraph) -> Vec<Cycle> {
    let mut visited: HashSet<ConceptId> = HashSet::new();
    let mut on_stack: HashSet<ConceptId> = HashSet::new();
    let mut path: Vec<ConceptId> = Vec::new();
    let mut cycles = Vec::new();

    for root in graph.node_ids() {
        if !visited.insert(root) {
            continue;
        }
        on_stack.insert(root);
        path.push(root);
        let mut stack: Vec<(ConceptId, usize)> = vec![(root, 0)];

        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            top.1 += 1;
            match graph.dependents(node).get(next) {
                Some(&succ) if on_stack.contains(&succ) => {
                    if let Some(start) = path.iter().position(|&n| n == succ) {
                        cycles.push(Cycle(path[start..].to_vec()));
                    }
                }
                Some(&succ) => {
                    if visited.insert(succ) {
                        on_stack.insert(succ);
                        path.push(succ);
                        stack.push((succ, 0));
                    }
                }
                None => {
                    stack.pop();
                    on_stack.remove(&node);
                    path.pop();
                }
            }
        }
    }

    if !cycles.is_empty() {
        log::warn!("Detected {} prerequisite cycle(s)", cycles.len());
    }
    cycles
}

/// Canonicalize every cycle and drop repeats, keeping first-seen order.
pub fn dedup_cycles(cycles: Vec<Cycle>) -> Vec<Cycle> {
    let mut seen = HashSet::new();
    cycles
        .into_iter()
        .map(|c| c.canonical())
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

// ============================================================================
// Readiness
// ============================================================================

/// Concepts ready to study: not learned, with every direct prerequisite
/// learned.
///
/// Sorted by descending importance, ties by ascending id.
pub fn next_concepts(snapshot: &GraphSnapshot, learned: &LearnedSet) -> Vec<ConceptId> {
    let prereq = snapshot.prereq();
    let mut ready: Vec<_> = snapshot
        .concepts()
        .values()
        .filter(|c| !learned.contains(&c.id))
        .filter(|c| {
            prereq
                .direct_prerequisites(c.id)
                .iter()
                .all(|p| learned.contains(p))
        })
        .collect();
    ready.sort_by(|a, b| {
        b.importance
            .total_cmp(&a.importance)
            .then_with(|| a.id.cmp(&b.id))
    });
    ready.into_iter().map(|c| c.id).collect()
}

// ============================================================================
// Personalized paths
// ============================================================================

/// Options for [`personalized_path`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathOptions {
    /// Estimate for concepts that carry none of their own.
    pub per_concept_minutes: u32,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            per_concept_minutes: DEFAULT_CONCEPT_MINUTES,
        }
    }
}

/// The learning sequence computed for one target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSequence {
    pub target: ConceptId,
    pub sequence: Vec<ConceptId>,
}

/// Multi-target study plan for one learner.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizedPath {
    /// Concepts still to study, in prerequisite order.
    pub path: Vec<ConceptId>,
    /// Requested targets, as given.
    pub targets: Vec<ConceptId>,
    /// Number of concepts the learner has already learned.
    pub learned_count: usize,
    /// Estimated study time of `path`.
    pub estimated_minutes: u64,
    /// Whether the remaining subgraph contained a cycle.
    pub has_cycle: bool,
    /// Full learning sequence of each target, before removing learned
    /// concepts.
    pub sequences: Vec<TargetSequence>,
}

impl PersonalizedPath {
    /// Estimated study time in whole hours, rounded up.
    pub fn estimated_hours(&self) -> u64 {
        self.estimated_minutes.div_ceil(60)
    }
}

/// Plan the concepts a learner still needs to reach every target.
///
/// The union of the targets' learning sequences, minus learned concepts,
/// re-sorted on the remaining induced subgraph. Fails with `NotFound` if a
/// target is not loaded.
pub fn personalized_path(
    snapshot: &GraphSnapshot,
    progress: &[LearnerProgress],
    targets: &[ConceptId],
    options: &PathOptions,
) -> Result<PersonalizedPath> {
    let learned = learned_set(progress);
    let prereq = snapshot.prereq();

    let mut required = BTreeSet::new();
    let mut sequences = Vec::with_capacity(targets.len());
    for &target in targets {
        snapshot.require(target)?;
        let sequence = learning_sequence(prereq, target)?;
        required.extend(sequence.order.iter().copied());
        sequences.push(TargetSequence {
            target,
            sequence: sequence.order,
        });
    }

    let remaining: BTreeSet<ConceptId> = required.difference(&learned).copied().collect();
    let ordering = kahn(prereq, &remaining);

    let estimated_minutes = ordering
        .order
        .iter()
        .map(|id| {
            let minutes = snapshot
                .concept(*id)
                .and_then(|c| c.estimated_minutes)
                .unwrap_or(options.per_concept_minutes);
            u64::from(minutes)
        })
        .sum();

    log::debug!(
        "Personalized path: {} targets, {} required, {} remaining",
        targets.len(),
        required.len(),
        ordering.len()
    );

    Ok(PersonalizedPath {
        path: ordering.order,
        targets: targets.to_vec(),
        learned_count: learned.len(),
        estimated_minutes,
        has_cycle: ordering.has_cycle,
        sequences,
    })
}

// ============================================================================
// Dependency summaries
// ============================================================================

/// Full dependency picture of one concept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptDependencies {
    pub concept: ConceptId,
    pub difficulty: Difficulty,
    pub direct_prerequisites: Vec<ConceptId>,
    pub direct_dependents: Vec<ConceptId>,
    pub all_prerequisites: Vec<ConceptId>,
    pub learning_sequence: Vec<ConceptId>,
    /// One-based position of the concept in its own learning sequence.
    pub position_in_sequence: usize,
    pub has_cycle: bool,
    pub estimated_minutes: u32,
}

/// Collect direct and transitive dependencies of `id`.
pub fn concept_dependencies(snapshot: &GraphSnapshot, id: ConceptId) -> Result<ConceptDependencies> {
    let concept = snapshot.require(id)?;
    let prereq = snapshot.prereq();
    let sequence = learning_sequence(prereq, id)?;
    let position_in_sequence = sequence.position(id).map_or(sequence.len(), |p| p + 1);

    Ok(ConceptDependencies {
        concept: id,
        difficulty: concept.difficulty,
        direct_prerequisites: prereq.direct_prerequisites(id).to_vec(),
        direct_dependents: prereq.dependents(id).to_vec(),
        all_prerequisites: prerequisites(prereq, id)?,
        learning_sequence: sequence.order,
        position_in_sequence,
        has_cycle: sequence.has_cycle,
        estimated_minutes: concept.estimated_minutes.unwrap_or(DEFAULT_CONCEPT_MINUTES),
    })
}

/// Concepts grouped by difficulty tier, each tier by ascending importance
/// then id. Every tier is present, possibly empty.
pub fn difficulty_progression(snapshot: &GraphSnapshot) -> BTreeMap<Difficulty, Vec<ConceptId>> {
    let mut tiers: BTreeMap<Difficulty, Vec<_>> =
        Difficulty::ALL.into_iter().map(|d| (d, Vec::new())).collect();
    for concept in snapshot.concepts().values() {
        tiers.entry(concept.difficulty).or_default().push(concept);
    }

    tiers
        .into_iter()
        .map(|(difficulty, mut concepts)| {
            concepts.sort_by(|a, b| {
                a.importance
                    .total_cmp(&b.importance)
                    .then_with(|| a.id.cmp(&b.id))
            });
            (difficulty, concepts.into_iter().map(|c| c.id).collect())
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
