//! Graph statistics and analysis.
//!
//! Provides functions for analysing snapshot structure and composition,
//! including degree distribution, category breakdowns, and top-concept
//! rankings.

use crate::graph::GraphSnapshot;
use crate::types::ConceptId;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Types
// ============================================================================

/// Comprehensive statistics about a snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphStats {
    /// Total number of concepts.
    pub node_count: usize,
    /// Total number of relations (all kinds).
    pub edge_count: usize,
    /// Number of prerequisite relations.
    pub prerequisite_count: usize,
    /// Concepts per category.
    pub category_distribution: BTreeMap<String, usize>,
    /// Concepts per difficulty tier.
    pub difficulty_distribution: BTreeMap<String, usize>,
    /// Relations per kind.
    pub relation_distribution: BTreeMap<String, usize>,
    /// Concepts without any relation (orphans).
    pub orphan_count: usize,
    /// Average relations per concept (in + out).
    pub avg_degree: f32,
    /// Maximum in-degree.
    pub max_in_degree: usize,
    /// Maximum out-degree.
    pub max_out_degree: usize,
    /// Concept with highest in-degree (lowest id on ties).
    pub most_depended_on: Option<ConceptId>,
    /// Concept with highest out-degree (lowest id on ties).
    pub most_dependencies: Option<ConceptId>,
}

/// Direction for degree calculation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DegreeDirection {
    /// Incoming relations only.
    In,
    /// Outgoing relations only.
    Out,
    /// Both directions.
    #[default]
    Both,
}

// ============================================================================
// Functions
// ============================================================================

/// Compute comprehensive statistics for a snapshot.
pub fn compute_stats(snapshot: &GraphSnapshot) -> GraphStats {
    let vis = snapshot.vis();
    let node_count = snapshot.len();
    let edge_count = vis.edge_count();

    let mut category_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut difficulty_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for concept in snapshot.concepts().values() {
        *category_distribution
            .entry(concept.category.to_string())
            .or_insert(0) += 1;
        *difficulty_distribution
            .entry(concept.difficulty.to_string())
            .or_insert(0) += 1;
    }

    let mut relation_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for relation in snapshot.relations() {
        *relation_distribution
            .entry(relation.kind.to_string())
            .or_insert(0) += 1;
    }

    let degrees: Vec<(ConceptId, usize, usize)> = snapshot
        .concepts()
        .keys()
        .map(|&id| {
            (
                id,
                vis.degree(id, Direction::Incoming),
                vis.degree(id, Direction::Outgoing),
            )
        })
        .collect();

    let orphan_count = degrees
        .iter()
        .filter(|(_, din, dout)| *din == 0 && *dout == 0)
        .count();

    let total_degree: usize = degrees.iter().map(|(_, din, dout)| din + dout).sum();
    let avg_degree = if node_count > 0 {
        total_degree as f32 / node_count as f32
    } else {
        0.0
    };

    // Ascending ids with a strict comparison keep the lowest id on ties.
    let (most_depended_on, max_in_degree) = degrees
        .iter()
        .fold((None, 0), |(best, max), &(id, din, _)| {
            if best.is_none() || din > max {
                (Some(id), din)
            } else {
                (best, max)
            }
        });
    let (most_dependencies, max_out_degree) = degrees
        .iter()
        .fold((None, 0), |(best, max), &(id, _, dout)| {
            if best.is_none() || dout > max {
                (Some(id), dout)
            } else {
                (best, max)
            }
        });

    GraphStats {
        node_count,
        edge_count,
        prerequisite_count: snapshot.prereq().edge_count(),
        category_distribution,
        difficulty_distribution,
        relation_distribution,
        orphan_count,
        avg_degree,
        max_in_degree,
        max_out_degree,
        most_depended_on,
        most_dependencies,
    }
}

/// Get a quick summary of snapshot size.
pub fn quick_summary(snapshot: &GraphSnapshot) -> String {
    format!(
        "{} concepts, {} relations ({} prerequisite)",
        snapshot.len(),
        snapshot.vis().edge_count(),
        snapshot.prereq().edge_count()
    )
}

/// Get the top N concepts by degree, highest first (ties by ascending id).
pub fn top_concepts_by_degree(
    snapshot: &GraphSnapshot,
    limit: usize,
    direction: DegreeDirection,
) -> Vec<(ConceptId, usize)> {
    let vis = snapshot.vis();
    let mut scores: Vec<(ConceptId, usize)> = snapshot
        .concepts()
        .keys()
        .map(|&id| {
            let degree = match direction {
                DegreeDirection::In => vis.degree(id, Direction::Incoming),
                DegreeDirection::Out => vis.degree(id, Direction::Outgoing),
                DegreeDirection::Both => {
                    vis.degree(id, Direction::Incoming) + vis.degree(id, Direction::Outgoing)
                }
            };
            (id, degree)
        })
        .collect();

    scores.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scores.truncate(limit);
    scores
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Concept, Difficulty, Relation, RelationKind};

    fn create_test_snapshot() -> GraphSnapshot {
        let concepts = vec![
            Concept::new(1, "A").with_category(Category::DataStructure),
            Concept::new(2, "B").with_category(Category::DataStructure),
            Concept::new(3, "C")
                .with_category(Category::Algorithm)
                .with_difficulty(Difficulty::Advanced),
            Concept::new(4, "D").with_category(Category::Theory),
            Concept::new(5, "Orphan").with_category(Category::DataStructure),
        ];
        let relations = vec![
            Relation::prerequisite(1, 2),
            Relation::prerequisite(2, 3),
            Relation::new(1, 3, RelationKind::Related),
            Relation::new(3, 4, RelationKind::Uses),
        ];
        GraphSnapshot::from_parts(concepts, relations).0
    }

    #[test]
    fn test_compute_stats_basic_counts() {
        let stats = compute_stats(&create_test_snapshot());

        assert_eq!(stats.node_count, 5);
        assert_eq!(stats.edge_count, 4);
        assert_eq!(stats.prerequisite_count, 2);
    }

    #[test]
    fn test_compute_stats_distributions() {
        let stats = compute_stats(&create_test_snapshot());

        assert_eq!(stats.category_distribution["data_structure"], 3);
        assert_eq!(stats.category_distribution["algorithm"], 1);
        assert_eq!(stats.difficulty_distribution["beginner"], 4);
        assert_eq!(stats.difficulty_distribution["advanced"], 1);
        assert_eq!(stats.relation_distribution["prerequisite"], 2);
        assert_eq!(stats.relation_distribution["related"], 1);
        assert_eq!(stats.relation_distribution["uses"], 1);
    }

    #[test]
    fn test_compute_stats_orphans_and_degree() {
        let stats = compute_stats(&create_test_snapshot());

        assert_eq!(stats.orphan_count, 1);
        // 4 relations contribute 8 degree over 5 concepts.
        assert!((stats.avg_degree - 1.6).abs() < 0.01);
    }

    #[test]
    fn test_compute_stats_max_degrees() {
        let stats = compute_stats(&create_test_snapshot());

        assert_eq!(stats.max_out_degree, 2);
        assert_eq!(stats.most_dependencies, Some(ConceptId(1)));
        assert_eq!(stats.max_in_degree, 2);
        assert_eq!(stats.most_depended_on, Some(ConceptId(3)));
    }

    #[test]
    fn test_compute_stats_empty() {
        let stats = compute_stats(&GraphSnapshot::empty());

        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.avg_degree, 0.0);
        assert!(stats.most_depended_on.is_none());
        assert!(stats.most_dependencies.is_none());
    }

    #[test]
    fn test_quick_summary() {
        assert_eq!(
            quick_summary(&create_test_snapshot()),
            "5 concepts, 4 relations (2 prerequisite)"
        );
    }

    #[test]
    fn test_top_concepts_by_degree() {
        let snapshot = create_test_snapshot();

        let top_in = top_concepts_by_degree(&snapshot, 1, DegreeDirection::In);
        assert_eq!(top_in, vec![(ConceptId(3), 2)]);

        let top_out = top_concepts_by_degree(&snapshot, 2, DegreeDirection::Out);
        assert_eq!(top_out[0], (ConceptId(1), 2));

        let both = top_concepts_by_degree(&snapshot, 10, DegreeDirection::Both);
        assert_eq!(both.len(), 5);
        assert_eq!(both[0], (ConceptId(3), 3));
        assert_eq!(both[4], (ConceptId(5), 0));
    }

    #[test]
    fn test_graph_stats_serialization() {
        let stats = compute_stats(&create_test_snapshot());
        let json = serde_json::to_string(&stats).unwrap();
        let parsed: GraphStats = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.node_count, stats.node_count);
        assert_eq!(parsed.most_depended_on, stats.most_depended_on);
    }
}
