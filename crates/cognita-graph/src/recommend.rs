//! Concept recommendations for a learner.
//!
//! Learners with nothing learned get the globally most important concepts.
//! Otherwise `related` edges leaving their learned concepts nominate
//! candidates, scored by edge strength, and the global list fills the rest.

use crate::graph::GraphSnapshot;
use crate::types::{learned_set, Concept, ConceptId, LearnedSet, LearnerProgress, RelationKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Why a concept was recommended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reason {
    /// Globally important concept.
    Popular,
    /// Reached through a `related` edge from a learned concept.
    RelatedTo {
        source: ConceptId,
        source_name: String,
    },
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Popular => f.write_str("popular"),
            Reason::RelatedTo { source_name, .. } => write!(f, "related to {source_name}"),
        }
    }
}

/// One ranked recommendation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub concept: ConceptId,
    pub reason: Reason,
    pub score: f32,
}

/// Rank up to `limit` concepts the learner has not learned yet.
pub fn recommend(
    snapshot: &GraphSnapshot,
    progress: &[LearnerProgress],
    limit: usize,
) -> Vec<Recommendation> {
    if limit == 0 {
        return Vec::new();
    }
    let learned = learned_set(progress);

    let mut picks = if learned.is_empty() {
        Vec::new()
    } else {
        related_candidates(snapshot, &learned, limit)
    };

    if picks.len() < limit {
        let chosen: HashSet<ConceptId> = picks.iter().map(|r| r.concept).collect();
        let backfill = popular(snapshot)
            .into_iter()
            .filter(|c| !learned.contains(&c.id) && !chosen.contains(&c.id))
            .take(limit - picks.len())
            .map(|c| Recommendation {
                concept: c.id,
                reason: Reason::Popular,
                score: c.importance,
            });
        picks.extend(backfill);
    }

    log::debug!(
        "Recommended {} concepts ({} learned)",
        picks.len(),
        learned.len()
    );
    picks
}

/// Concepts by descending importance, then popularity, then ascending id.
pub fn popular(snapshot: &GraphSnapshot) -> Vec<&Concept> {
    let mut concepts: Vec<&Concept> = snapshot.concepts().values().collect();
    concepts.sort_by(|a, b| {
        b.importance
            .total_cmp(&a.importance)
            .then_with(|| b.popularity().cmp(&a.popularity()))
            .then_with(|| a.id.cmp(&b.id))
    });
    concepts
}

fn related_candidates(
    snapshot: &GraphSnapshot,
    learned: &LearnedSet,
    limit: usize,
) -> Vec<Recommendation> {
    // Best (strength, source) seen per candidate.
    let mut best: BTreeMap<ConceptId, (f32, ConceptId)> = BTreeMap::new();

    for &source in learned {
        for relation in snapshot.vis().outgoing(source) {
            if relation.kind != RelationKind::Related
                || learned.contains(&relation.target)
                || !snapshot.contains(relation.target)
            {
                continue;
            }
            best.entry(relation.target)
                .and_modify(|entry| {
                    if relation.strength > entry.0 {
                        *entry = (relation.strength, source);
                    }
                })
                .or_insert((relation.strength, source));
        }
    }

    let mut ranked: Vec<(ConceptId, f32, ConceptId)> = best
        .into_iter()
        .map(|(target, (score, source))| (target, score, source))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);

    ranked
        .into_iter()
        .map(|(concept, score, source)| Recommendation {
            concept,
            reason: Reason::RelatedTo {
                source,
                source_name: snapshot.name_of(source),
            },
            score,
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProgressStatus, Relation};

    fn learned(concept: u64) -> LearnerProgress {
        LearnerProgress::new(1, concept).with_status(ProgressStatus::Completed)
    }

    fn sample() -> GraphSnapshot {
        let concepts = vec![
            Concept::new(1, "Array").with_importance(0.9),
            Concept::new(2, "Linked List").with_importance(0.7).with_counts(5, 0),
            Concept::new(3, "Hash Table").with_importance(0.7).with_counts(50, 3),
            Concept::new(4, "Tree").with_importance(0.6),
            Concept::new(5, "Graph").with_importance(0.5),
        ];
        let relations = vec![
            Relation::new(1, 4, RelationKind::Related).with_strength(0.4),
            Relation::new(1, 5, RelationKind::Related).with_strength(0.8),
            Relation::new(2, 4, RelationKind::Related).with_strength(0.9),
            Relation::new(1, 2, RelationKind::Uses).with_strength(1.0),
        ];
        GraphSnapshot::from_parts(concepts, relations).0
    }

    #[test]
    fn test_cold_start_is_popular() {
        let recs = recommend(&sample(), &[], 3);
        let ids: Vec<u64> = recs.iter().map(|r| r.concept.0).collect();

        // Hash Table beats Linked List on popularity at equal importance.
        assert_eq!(ids, vec![1, 3, 2]);
        assert!(recs.iter().all(|r| r.reason == Reason::Popular));
        assert_eq!(recs[0].score, 0.9);
    }

    #[test]
    fn test_related_then_backfill() {
        let recs = recommend(&sample(), &[learned(1)], 4);
        let ids: Vec<u64> = recs.iter().map(|r| r.concept.0).collect();

        // Related 5 (0.8) and 4 (0.4); `uses` edge to 2 is ignored.
        assert_eq!(ids, vec![5, 4, 3, 2]);
        assert_eq!(recs[0].reason.to_string(), "related to Array");
        assert_eq!(recs[0].score, 0.8);
        assert_eq!(recs[2].reason, Reason::Popular);
    }

    #[test]
    fn test_related_keeps_strongest_edge() {
        let recs = recommend(&sample(), &[learned(1), learned(2)], 1);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].concept, ConceptId(4));
        assert_eq!(recs[0].score, 0.9);
        assert_eq!(
            recs[0].reason,
            Reason::RelatedTo {
                source: ConceptId(2),
                source_name: "Linked List".to_string(),
            }
        );
    }

    #[test]
    fn test_never_recommends_learned() {
        let progress = vec![learned(1), learned(3), learned(5)];
        let recs = recommend(&sample(), &progress, 10);
        assert!(recs.iter().all(|r| ![1, 3, 5].contains(&r.concept.0)));
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn test_zero_limit() {
        assert!(recommend(&sample(), &[learned(1)], 0).is_empty());
    }

    #[test]
    fn test_reason_serialization() {
        let json = serde_json::to_value(Reason::RelatedTo {
            source: ConceptId(1),
            source_name: "Array".into(),
        })
        .unwrap();
        assert_eq!(json["kind"], "related_to");
        assert_eq!(json["source"], 1);
    }
}
