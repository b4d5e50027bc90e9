//! 2D layout of the visualization graph.
//!
//! Three interchangeable strategies:
//!
//! - [`LayoutStrategy::ForceDirected`]: spring/repulsion simulation with a
//!   fixed iteration count. Deterministic for a given seed.
//! - [`LayoutStrategy::Hierarchical`]: one horizontal band per difficulty
//!   tier.
//! - [`LayoutStrategy::Circular`]: nodes evenly spaced around a circle.
//!
//! Every node of the snapshot receives exactly one [`Point`].

use crate::graph::GraphSnapshot;
use crate::types::{ConceptId, Difficulty};
use cognita_core::Error;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Coordinates keyed by concept id.
pub type Layout = BTreeMap<ConceptId, Point>;

/// A position in layout space. The origin is the centre of the drawing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Layout algorithm selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStrategy {
    #[default]
    ForceDirected,
    Hierarchical,
    Circular,
}

impl LayoutStrategy {
    pub const ALL: [LayoutStrategy; 3] = [
        LayoutStrategy::ForceDirected,
        LayoutStrategy::Hierarchical,
        LayoutStrategy::Circular,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LayoutStrategy::ForceDirected => "force_directed",
            LayoutStrategy::Hierarchical => "hierarchical",
            LayoutStrategy::Circular => "circular",
        }
    }
}

impl fmt::Display for LayoutStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayoutStrategy::ALL
            .into_iter()
            .find(|l| l.name() == s)
            .ok_or_else(|| Error::invalid_data(format!("unknown layout strategy: {s}")))
    }
}

/// Tunable layout constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Force-directed iterations. Always run in full.
    pub iterations: usize,
    /// Scale applied to summed forces before moving a node.
    pub damping: f64,
    /// Repulsion constant (force is `repulsion / d²`).
    pub repulsion: f64,
    /// Spring constant (force is `spring * strength * d`).
    pub spring: f64,
    /// Initial positions are drawn from `[-init_extent, init_extent]`.
    pub init_extent: f64,
    /// Circle radius for the circular layout.
    pub radius: f64,
    /// Horizontal gap between nodes of one hierarchical band.
    pub node_spacing: f64,
    /// Vertical gap between hierarchical bands.
    pub tier_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 50,
            damping: 0.1,
            repulsion: 10_000.0,
            spring: 0.01,
            init_extent: 500.0,
            radius: 300.0,
            node_spacing: 150.0,
            tier_spacing: 200.0,
        }
    }
}

/// Compute a layout with the given strategy.
///
/// `seed` only affects [`LayoutStrategy::ForceDirected`].
pub fn compute_layout(
    snapshot: &GraphSnapshot,
    strategy: LayoutStrategy,
    config: &LayoutConfig,
    seed: u64,
) -> Layout {
    log::debug!(
        "Computing {strategy} layout for {} nodes",
        snapshot.len()
    );
    match strategy {
        LayoutStrategy::ForceDirected => {
            let mut rng = StdRng::seed_from_u64(seed);
            force_directed(snapshot, config, &mut rng)
        }
        LayoutStrategy::Hierarchical => hierarchical(snapshot, config),
        LayoutStrategy::Circular => circular(snapshot, config),
    }
}

/// Force-directed layout driven by the caller's random source.
///
/// Cost is `O(iterations * n²)`; there is no convergence check.
pub fn force_directed<R: Rng + ?Sized>(
    snapshot: &GraphSnapshot,
    config: &LayoutConfig,
    rng: &mut R,
) -> Layout {
    // Ascending id order fixes which random draw each node receives.
    let ids: Vec<ConceptId> = snapshot.concepts().keys().copied().collect();
    let index: BTreeMap<ConceptId, usize> =
        ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

    let extent = config.init_extent.abs();
    let mut positions: Vec<Point> = ids
        .iter()
        .map(|_| {
            let x = rng.gen_range(-extent..=extent);
            let y = rng.gen_range(-extent..=extent);
            Point::new(x, y)
        })
        .collect();

    let springs: Vec<(usize, usize, f64)> = snapshot
        .relations()
        .filter_map(|r| {
            let src = *index.get(&r.source)?;
            let tgt = *index.get(&r.target)?;
            Some((src, tgt, f64::from(r.strength)))
        })
        .collect();

    let n = positions.len();
    for _ in 0..config.iterations {
        let mut forces = vec![(0.0_f64, 0.0_f64); n];

        for i in 0..n {
            for j in (i + 1)..n {
                let dx = positions[i].x - positions[j].x;
                let dy = positions[i].y - positions[j].y;
                let dist = (dx * dx + dy * dy).sqrt().max(1.0);

                let force = config.repulsion / (dist * dist);
                let fx = (dx / dist) * force;
                let fy = (dy / dist) * force;

                forces[i].0 += fx;
                forces[i].1 += fy;
                forces[j].0 -= fx;
                forces[j].1 -= fy;
            }
        }

        for &(src, tgt, strength) in &springs {
            let dx = positions[tgt].x - positions[src].x;
            let dy = positions[tgt].y - positions[src].y;
            let dist = (dx * dx + dy * dy).sqrt().max(1.0);

            let force = config.spring * strength * dist;
            let fx = (dx / dist) * force;
            let fy = (dy / dist) * force;

            forces[src].0 += fx;
            forces[src].1 += fy;
            forces[tgt].0 -= fx;
            forces[tgt].1 -= fy;
        }

        for (pos, (fx, fy)) in positions.iter_mut().zip(&forces) {
            pos.x += fx * config.damping;
            pos.y += fy * config.damping;
        }
    }

    ids.into_iter().zip(positions).collect()
}

/// Bands by difficulty tier, centred on the origin.
///
/// With the default spacing the bands sit at `y = -300, -100, 100, 300`.
pub fn hierarchical(snapshot: &GraphSnapshot, config: &LayoutConfig) -> Layout {
    let mut bands: BTreeMap<Difficulty, Vec<ConceptId>> = BTreeMap::new();
    for concept in snapshot.concepts_in_order() {
        bands.entry(concept.difficulty).or_default().push(concept.id);
    }

    let centre = (Difficulty::ALL.len() as f64 - 1.0) / 2.0;
    let mut layout = Layout::new();
    for (difficulty, members) in bands {
        let y = (difficulty.rank() as f64 - centre) * config.tier_spacing;
        let start_x = -(members.len() as f64 * config.node_spacing) / 2.0;
        for (i, id) in members.into_iter().enumerate() {
            layout.insert(id, Point::new(start_x + i as f64 * config.node_spacing, y));
        }
    }
    layout
}

/// Nodes evenly spaced on a circle, in load order starting at angle 0.
pub fn circular(snapshot: &GraphSnapshot, config: &LayoutConfig) -> Layout {
    let n = snapshot.len();
    snapshot
        .ordered_ids()
        .iter()
        .enumerate()
        .map(|(i, &id)| {
            let angle = 2.0 * PI * i as f64 / n as f64;
            (
                id,
                Point::new(config.radius * angle.cos(), config.radius * angle.sin()),
            )
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Concept, Relation, RelationKind};

    fn sample_snapshot() -> GraphSnapshot {
        let concepts = vec![
            Concept::new(1, "Array").with_importance(0.9),
            Concept::new(2, "Stack").with_importance(0.8),
            Concept::new(3, "Graph")
                .with_importance(0.7)
                .with_difficulty(Difficulty::Intermediate),
            Concept::new(4, "Dijkstra")
                .with_importance(0.6)
                .with_difficulty(Difficulty::Advanced),
        ];
        let relations = vec![
            Relation::prerequisite(1, 2),
            Relation::prerequisite(3, 4).with_strength(0.9),
            Relation::new(2, 3, RelationKind::Related),
        ];
        GraphSnapshot::from_parts(concepts, relations).0
    }

    fn assert_covers(snapshot: &GraphSnapshot, layout: &Layout) {
        assert_eq!(layout.len(), snapshot.len());
        for id in snapshot.concepts().keys() {
            assert!(layout.contains_key(id), "missing coordinate for {id}");
        }
    }

    #[test]
    fn test_every_strategy_covers_all_nodes() {
        let snapshot = sample_snapshot();
        let config = LayoutConfig::default();
        for strategy in LayoutStrategy::ALL {
            let layout = compute_layout(&snapshot, strategy, &config, 7);
            assert_covers(&snapshot, &layout);
            assert!(layout.values().all(|p| p.x.is_finite() && p.y.is_finite()));
        }
    }

    #[test]
    fn test_force_directed_same_seed_same_output() {
        let snapshot = sample_snapshot();
        let config = LayoutConfig::default();
        let a = compute_layout(&snapshot, LayoutStrategy::ForceDirected, &config, 42);
        let b = compute_layout(&snapshot, LayoutStrategy::ForceDirected, &config, 42);
        assert_eq!(a, b);

        let c = compute_layout(&snapshot, LayoutStrategy::ForceDirected, &config, 43);
        assert_ne!(a, c);
    }

    #[test]
    fn test_force_directed_zero_iterations_keeps_initial_extent() {
        let snapshot = sample_snapshot();
        let config = LayoutConfig {
            iterations: 0,
            init_extent: 10.0,
            ..LayoutConfig::default()
        };
        let layout = compute_layout(&snapshot, LayoutStrategy::ForceDirected, &config, 1);
        assert!(
            layout
                .values()
                .all(|p| p.x.abs() <= 10.0 && p.y.abs() <= 10.0)
        );
    }

    #[test]
    fn test_force_directed_coincident_nodes_stay_finite() {
        let (snapshot, _) = GraphSnapshot::from_parts(
            vec![Concept::new(1, "A"), Concept::new(2, "B")],
            vec![Relation::prerequisite(1, 2)],
        );
        let config = LayoutConfig {
            init_extent: 0.0,
            ..LayoutConfig::default()
        };
        let layout = compute_layout(&snapshot, LayoutStrategy::ForceDirected, &config, 0);
        assert!(layout.values().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn test_hierarchical_bands() {
        let snapshot = sample_snapshot();
        let layout = hierarchical(&snapshot, &LayoutConfig::default());

        // Two beginners share the top band in load order.
        assert_eq!(layout[&ConceptId(1)], Point::new(-150.0, -300.0));
        assert_eq!(layout[&ConceptId(2)], Point::new(0.0, -300.0));
        assert_eq!(layout[&ConceptId(3)], Point::new(-75.0, -100.0));
        assert_eq!(layout[&ConceptId(4)], Point::new(-75.0, 100.0));
    }

    #[test]
    fn test_hierarchical_and_circular_repeatable() {
        let snapshot = sample_snapshot();
        let config = LayoutConfig::default();
        assert_eq!(hierarchical(&snapshot, &config), hierarchical(&snapshot, &config));
        assert_eq!(circular(&snapshot, &config), circular(&snapshot, &config));
    }

    #[test]
    fn test_circular_positions() {
        let snapshot = sample_snapshot();
        let layout = circular(&snapshot, &LayoutConfig::default());

        let first = layout[&ConceptId(1)];
        assert!((first.x - 300.0).abs() < 1e-9);
        assert!(first.y.abs() < 1e-9);

        for point in layout.values() {
            let r = (point.x * point.x + point.y * point.y).sqrt();
            assert!((r - 300.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_snapshot_layouts() {
        let snapshot = GraphSnapshot::empty();
        for strategy in LayoutStrategy::ALL {
            assert!(compute_layout(&snapshot, strategy, &LayoutConfig::default(), 0).is_empty());
        }
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(
            "hierarchical".parse::<LayoutStrategy>().unwrap(),
            LayoutStrategy::Hierarchical
        );
        assert!("spiral".parse::<LayoutStrategy>().is_err());
        assert_eq!(LayoutStrategy::default().to_string(), "force_directed");
    }
}
