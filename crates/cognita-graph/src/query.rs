//! Response types for graph reads.
//!
//! These are the shapes returned to callers of the read API (graph
//! snapshot, concept detail, recommendations). All types derive
//! `Serialize`/`Deserialize` for JSON transport.

use crate::graph::GraphSnapshot;
use crate::layout::Layout;
use crate::recommend::Recommendation;
use crate::types::{
    Category, Concept, ConceptId, Difficulty, LearnerProgress, LearningPath, Relation,
    RelationKind,
};
use cognita_core::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Descriptions in graph views are cut to this many characters.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// Containing paths listed in a concept detail.
pub const MAX_CONTAINING_PATHS: usize = 5;

// ============================================================================
// Node / Edge views
// ============================================================================

/// Summary information about a concept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub id: ConceptId,
    pub name: String,
    pub category: Category,
    pub difficulty: Difficulty,
}

impl From<&Concept> for NodeSummary {
    fn from(concept: &Concept) -> Self {
        Self {
            id: concept.id,
            name: concept.name.clone(),
            category: concept.category,
            difficulty: concept.difficulty,
        }
    }
}

/// A positioned node of the graph view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: ConceptId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    pub category: Category,
    pub difficulty: Difficulty,
    /// Description preview.
    pub description: String,
    pub importance: f32,
    pub view_count: u32,
    pub learn_count: u32,
    pub x: f64,
    pub y: f64,
}

/// An edge of the graph view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeView {
    pub source: ConceptId,
    pub target: ConceptId,
    pub kind: RelationKind,
    pub strength: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&Relation> for EdgeView {
    fn from(relation: &Relation) -> Self {
        Self {
            source: relation.source,
            target: relation.target,
            kind: relation.kind,
            strength: relation.strength,
            description: relation.description.clone(),
        }
    }
}

/// Totals attached to a graph view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    /// Distinct categories present, sorted.
    pub categories: Vec<Category>,
}

/// Laid-out graph returned by the snapshot read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub stats: ViewStats,
}

/// Cut a description to [`DESCRIPTION_PREVIEW_CHARS`], appending `...`.
pub fn preview(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_PREVIEW_CHARS {
        let cut: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        description.to_string()
    }
}

/// Combine a snapshot and its layout into a view. Nodes follow load order.
pub fn graph_view(snapshot: &GraphSnapshot, layout: &Layout) -> GraphView {
    let nodes: Vec<NodeView> = snapshot
        .concepts_in_order()
        .map(|c| {
            let point = layout.get(&c.id).copied().unwrap_or_default();
            NodeView {
                id: c.id,
                name: c.name.clone(),
                name_en: c.name_en.clone(),
                category: c.category,
                difficulty: c.difficulty,
                description: preview(&c.description),
                importance: c.importance,
                view_count: c.view_count,
                learn_count: c.learn_count,
                x: point.x,
                y: point.y,
            }
        })
        .collect();
    let edges: Vec<EdgeView> = snapshot.relations().map(EdgeView::from).collect();
    let categories: BTreeSet<Category> = nodes.iter().map(|n| n.category).collect();

    GraphView {
        stats: ViewStats {
            total_nodes: nodes.len(),
            total_edges: edges.len(),
            categories: categories.into_iter().collect(),
        },
        nodes,
        edges,
    }
}

/// Summaries for a list of ids, skipping ids that are not loaded.
pub fn summaries(snapshot: &GraphSnapshot, ids: &[ConceptId]) -> Vec<NodeSummary> {
    ids.iter()
        .filter_map(|id| snapshot.concept(*id))
        .map(NodeSummary::from)
        .collect()
}

// ============================================================================
// Concept detail
// ============================================================================

/// Which way a relation points, seen from the concept being described.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationDirection {
    Incoming,
    Outgoing,
}

/// A concept linked to the described concept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelatedConcept {
    pub concept: NodeSummary,
    pub kind: RelationKind,
    pub strength: f32,
    pub direction: RelationDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A curated learning path that contains the described concept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathSummary {
    pub id: u64,
    pub name: String,
    pub featured: bool,
    pub follower_count: u32,
    pub step_count: usize,
    /// One-based position of the concept on the path.
    pub position: usize,
}

/// Detail view of one concept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConceptDetail {
    pub concept: Concept,
    pub related: Vec<RelatedConcept>,
    pub containing_paths: Vec<PathSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<LearnerProgress>,
}

/// Describe `id`: related concepts both ways, containing paths, and the
/// learner's progress if a progress snapshot is given.
///
/// Fails with `NotFound` when the concept is not loaded.
pub fn concept_detail(
    snapshot: &GraphSnapshot,
    id: ConceptId,
    paths: &[LearningPath],
    progress: &[LearnerProgress],
) -> Result<ConceptDetail> {
    let concept = snapshot.require(id)?.clone();
    let vis = snapshot.vis();

    let outgoing = vis
        .outgoing(id)
        .into_iter()
        .map(|r| (r, r.target, RelationDirection::Outgoing));
    let incoming = vis
        .incoming(id)
        .into_iter()
        .map(|r| (r, r.source, RelationDirection::Incoming));
    let related = outgoing
        .chain(incoming)
        .filter_map(|(relation, other, direction)| {
            let other = snapshot.concept(other)?;
            Some(RelatedConcept {
                concept: NodeSummary::from(other),
                kind: relation.kind,
                strength: relation.strength,
                direction,
                description: relation.description.clone(),
            })
        })
        .collect();

    let mut containing: Vec<&LearningPath> =
        paths.iter().filter(|p| p.concepts.contains(&id)).collect();
    containing.sort_by(|a, b| {
        b.featured
            .cmp(&a.featured)
            .then_with(|| b.follower_count.cmp(&a.follower_count))
            .then_with(|| a.id.cmp(&b.id))
    });
    let containing_paths = containing
        .into_iter()
        .take(MAX_CONTAINING_PATHS)
        .map(|p| PathSummary {
            id: p.id,
            name: p.name.clone(),
            featured: p.featured,
            follower_count: p.follower_count,
            step_count: p.concepts.len(),
            position: p.concepts.iter().position(|c| *c == id).map_or(0, |i| i + 1),
        })
        .collect();

    Ok(ConceptDetail {
        concept,
        related,
        containing_paths,
        progress: progress.iter().find(|p| p.concept == id).cloned(),
    })
}

// ============================================================================
// Recommendations
// ============================================================================

/// A recommendation with the concept summary and a display reason.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationView {
    pub concept: NodeSummary,
    pub reason: String,
    pub score: f32,
}

/// Attach summaries to recommendations.
pub fn recommendation_views(
    snapshot: &GraphSnapshot,
    recommendations: &[Recommendation],
) -> Vec<RecommendationView> {
    recommendations
        .iter()
        .filter_map(|r| {
            let concept = snapshot.concept(r.concept)?;
            Some(RecommendationView {
                concept: NodeSummary::from(concept),
                reason: r.reason.to_string(),
                score: r.score,
            })
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{compute_layout, LayoutConfig, LayoutStrategy, Point};
    use crate::recommend::recommend;
    use crate::types::ProgressStatus;

    fn sample() -> GraphSnapshot {
        let concepts = vec![
            Concept::new(1, "Array")
                .with_importance(0.9)
                .with_category(Category::DataStructure)
                .with_description("x".repeat(150)),
            Concept::new(2, "Stack")
                .with_importance(0.8)
                .with_category(Category::DataStructure),
            Concept::new(3, "DFS").with_importance(0.7),
        ];
        let relations = vec![
            Relation::prerequisite(1, 2),
            Relation::new(2, 1, RelationKind::Uses).with_description("backed by"),
            Relation::new(2, 3, RelationKind::Related).with_strength(0.6),
        ];
        GraphSnapshot::from_parts(concepts, relations).0
    }

    #[test]
    fn test_graph_view_shape() {
        let snapshot = sample();
        let layout = compute_layout(
            &snapshot,
            LayoutStrategy::Circular,
            &LayoutConfig::default(),
            0,
        );
        let view = graph_view(&snapshot, &layout);

        assert_eq!(view.stats.total_nodes, 3);
        assert_eq!(view.stats.total_edges, 3);
        assert_eq!(
            view.stats.categories,
            vec![Category::Algorithm, Category::DataStructure]
        );
        assert_eq!(view.nodes[0].id, ConceptId(1));
        assert_eq!(view.nodes[0].description.chars().count(), 103);
        assert!((view.nodes[0].x - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_graph_view_json_fields() {
        let snapshot = sample();
        let mut layout = Layout::new();
        layout.insert(ConceptId(1), Point::new(1.0, 2.0));
        let json = serde_json::to_value(graph_view(&snapshot, &layout)).unwrap();

        assert_eq!(json["nodes"][0]["x"], 1.0);
        assert_eq!(json["nodes"][1]["x"], 0.0);
        assert_eq!(json["edges"][0]["kind"], "prerequisite");
        assert_eq!(json["stats"]["total_nodes"], 3);
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short"), "short");
        let long = "é".repeat(120);
        assert_eq!(preview(&long).chars().count(), 103);
    }

    #[test]
    fn test_concept_detail_related_both_directions() {
        let snapshot = sample();
        let detail = concept_detail(&snapshot, ConceptId(2), &[], &[]).unwrap();

        assert_eq!(detail.concept.name, "Stack");
        assert_eq!(detail.related.len(), 3);

        let outgoing: Vec<_> = detail
            .related
            .iter()
            .filter(|r| r.direction == RelationDirection::Outgoing)
            .map(|r| (r.concept.id, r.kind))
            .collect();
        assert_eq!(
            outgoing,
            vec![
                (ConceptId(1), RelationKind::Uses),
                (ConceptId(3), RelationKind::Related)
            ]
        );

        let incoming = detail
            .related
            .iter()
            .find(|r| r.direction == RelationDirection::Incoming)
            .unwrap();
        assert_eq!(incoming.concept.id, ConceptId(1));
        assert_eq!(incoming.kind, RelationKind::Prerequisite);
        assert!(detail.progress.is_none());
    }

    #[test]
    fn test_concept_detail_paths_and_progress() {
        let snapshot = sample();
        let paths = vec![
            LearningPath::new(1, "Intro", vec![ConceptId(1), ConceptId(2)]).with_followers(3),
            LearningPath::new(2, "Featured", vec![ConceptId(2)]).featured(),
            LearningPath::new(3, "Graphs", vec![ConceptId(3)]),
        ];
        let progress = vec![
            LearnerProgress::new(5, 2).with_status(ProgressStatus::InProgress),
            LearnerProgress::new(5, 3).with_status(ProgressStatus::Completed),
        ];

        let detail = concept_detail(&snapshot, ConceptId(2), &paths, &progress).unwrap();

        let names: Vec<_> = detail
            .containing_paths
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Featured", "Intro"]);
        assert_eq!(detail.containing_paths[1].position, 2);
        assert_eq!(
            detail.progress.map(|p| p.status),
            Some(ProgressStatus::InProgress)
        );
    }

    #[test]
    fn test_concept_detail_not_found() {
        let err = concept_detail(&sample(), ConceptId(40), &[], &[]).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_recommendation_views() {
        let snapshot = sample();
        let progress = vec![LearnerProgress::new(1, 2).with_status(ProgressStatus::Completed)];
        let views = recommendation_views(&snapshot, &recommend(&snapshot, &progress, 2));

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].concept.name, "DFS");
        assert_eq!(views[0].reason, "related to Stack");
        assert_eq!(views[1].reason, "popular");
    }

    #[test]
    fn test_summaries_skip_unknown() {
        let snapshot = sample();
        let names: Vec<_> = summaries(&snapshot, &[ConceptId(3), ConceptId(99)])
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["DFS"]);
    }
}
