// Node placement for the diagram view

use ratatui::layout::Rect;
use repograph_core::graph::{MAIN_NODE_ID, NodeGroup};
use repograph_core::RepoGraph;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Size of the drawing surface in world units.
///
/// World space is centered on the origin, so x runs from `-width / 2` to
/// `width / 2` and y likewise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Braille canvas cells are twice as tall as they are wide, so one cell
    /// is one unit across and two units down.
    pub fn from_area(area: Rect) -> Self {
        Self {
            width: f64::from(area.width),
            height: f64::from(area.height) * 2.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::new(80.0, 48.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
    pub pinned: bool,
}

impl NodePosition {
    fn origin() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            pinned: false,
        }
    }
}

/// Positions the nodes of a [`RepoGraph`]. Positions are indexed like
/// `graph.nodes`.
///
/// The view only ever talks to this trait; swap in another engine with
/// [`crate::run_with_layout`].
pub trait LayoutEngine: Send {
    /// Replace whatever was laid out before with `graph`
    fn load(&mut self, graph: &RepoGraph, dimensions: Dimensions);

    fn resize(&mut self, dimensions: Dimensions);

    /// Advance one animation step. Returns `true` while anything still moves.
    fn tick(&mut self) -> bool;

    fn positions(&self) -> &[NodePosition];

    /// Fix a node at a world position; ticks no longer move it
    fn pin(&mut self, index: usize, x: f64, y: f64);

    fn unpin_all(&mut self);

    /// Drop all nodes
    fn clear(&mut self);

    /// The node closest to `(x, y)`, if any lies within `radius`
    fn node_at(&self, x: f64, y: f64, radius: f64) -> Option<usize> {
        self.positions()
            .iter()
            .enumerate()
            .map(|(i, p)| (i, (p.x - x).hypot(p.y - y)))
            .filter(|(_, distance)| *distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }
}

const RING_BRANCH: f64 = 0.45;
const RING_HUB_COMMITS: f64 = 0.2;
const RING_OUTER: f64 = 0.95;
const MAX_FAN: f64 = 0.6;
const MARGIN: f64 = 0.85;

/// Hub in the middle, branches on a ring around it, each branch's commits
/// fanned outward along its spoke. Nodes start at the center and ease
/// toward their slot.
#[derive(Debug)]
pub struct RadialLayout {
    dimensions: Dimensions,
    /// Slot of each node in unit space, `[-1, 1]` on both axes
    slots: Vec<(f64, f64)>,
    positions: Vec<NodePosition>,
    easing: f64,
    settle_distance: f64,
}

impl Default for RadialLayout {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl RadialLayout {
    /// `easing` is the fraction of the remaining distance covered per tick
    pub fn new(easing: f64) -> Self {
        Self {
            dimensions: Dimensions::default(),
            slots: Vec::new(),
            positions: Vec::new(),
            easing: easing.clamp(0.01, 1.0),
            settle_distance: 0.05,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// World position a node is heading for
    pub fn target(&self, index: usize) -> Option<(f64, f64)> {
        self.slots.get(index).map(|&(ux, uy)| self.to_world(ux, uy))
    }

    fn to_world(&self, ux: f64, uy: f64) -> (f64, f64) {
        (
            ux * self.dimensions.width / 2.0 * MARGIN,
            uy * self.dimensions.height / 2.0 * MARGIN,
        )
    }

    fn compute_slots(graph: &RepoGraph) -> Vec<(f64, f64)> {
        let mut slots = vec![(0.0, 0.0); graph.nodes.len()];
        if graph.index_of(MAIN_NODE_ID).is_none() {
            return slots;
        }

        let hub_children = graph.children(MAIN_NODE_ID);
        let branches: Vec<&str> = hub_children
            .iter()
            .filter(|n| n.group == NodeGroup::Branch)
            .map(|n| n.id.as_str())
            .collect();
        let hub_commits: Vec<&str> = hub_children
            .iter()
            .filter(|n| n.group == NodeGroup::Commit)
            .map(|n| n.id.as_str())
            .collect();

        let spokes = branches.len().max(1) as f64;
        let fan = (PI / spokes * 0.8).min(MAX_FAN);

        for (k, branch) in branches.iter().enumerate() {
            // First spoke points straight up
            let angle = FRAC_PI_2 + TAU * k as f64 / spokes;
            if let Some(i) = graph.index_of(branch) {
                slots[i] = polar(RING_BRANCH, angle);
            }

            let commits = graph.children(branch);
            let count = commits.len();
            for (j, commit) in commits.iter().enumerate() {
                let Some(i) = graph.index_of(&commit.id) else {
                    continue;
                };
                let radius = RING_BRANCH + (RING_OUTER - RING_BRANCH) * (j + 1) as f64 / count as f64;
                let spread = if count > 1 {
                    fan * (j as f64 / (count - 1) as f64 - 0.5)
                } else {
                    0.0
                };
                slots[i] = polar(radius, angle + spread);
            }
        }

        // Hub commits sit on an inner ring, offset half a spoke so they fall
        // between the branches
        let offset = PI / spokes;
        let count = hub_commits.len().max(1) as f64;
        for (k, commit) in hub_commits.iter().enumerate() {
            if let Some(i) = graph.index_of(commit) {
                slots[i] = polar(RING_HUB_COMMITS, FRAC_PI_2 + offset + TAU * k as f64 / count);
            }
        }

        slots
    }
}

fn polar(radius: f64, angle: f64) -> (f64, f64) {
    (radius * angle.cos(), radius * angle.sin())
}

impl LayoutEngine for RadialLayout {
    fn load(&mut self, graph: &RepoGraph, dimensions: Dimensions) {
        self.dimensions = dimensions;
        self.slots = Self::compute_slots(graph);
        self.positions = vec![NodePosition::origin(); graph.nodes.len()];
    }

    fn resize(&mut self, dimensions: Dimensions) {
        if dimensions == self.dimensions || dimensions.is_empty() {
            return;
        }

        // Scale everything, pinned nodes included, so the picture keeps its shape
        let sx = if self.dimensions.width > 0.0 {
            dimensions.width / self.dimensions.width
        } else {
            1.0
        };
        let sy = if self.dimensions.height > 0.0 {
            dimensions.height / self.dimensions.height
        } else {
            1.0
        };
        for position in &mut self.positions {
            position.x *= sx;
            position.y *= sy;
        }
        self.dimensions = dimensions;
    }

    fn tick(&mut self) -> bool {
        let mut moving = false;

        for (i, &(ux, uy)) in self.slots.iter().enumerate() {
            let (tx, ty) = self.to_world(ux, uy);
            let position = &mut self.positions[i];
            if position.pinned {
                continue;
            }

            let dx = tx - position.x;
            let dy = ty - position.y;
            if dx.hypot(dy) <= self.settle_distance {
                position.x = tx;
                position.y = ty;
                continue;
            }

            position.x += dx * self.easing;
            position.y += dy * self.easing;
            moving = true;
        }

        moving
    }

    fn positions(&self) -> &[NodePosition] {
        &self.positions
    }

    fn pin(&mut self, index: usize, x: f64, y: f64) {
        if let Some(position) = self.positions.get_mut(index) {
            *position = NodePosition { x, y, pinned: true };
        }
    }

    fn unpin_all(&mut self) {
        for position in &mut self.positions {
            position.pinned = false;
        }
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.positions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repograph_core::shape_graph;
    use repograph_fetcher::{BranchCommits, Commit};

    fn sample_graph() -> RepoGraph {
        let branches = vec![
            BranchCommits::new("main", vec![Commit::new("a1", "Initial commit")]),
            BranchCommits::new(
                "dev",
                vec![Commit::new("b1", "Add feature"), Commit::new("b2", "Fix typo")],
            ),
            BranchCommits::new("release", vec![]),
        ];
        shape_graph(&branches, "main")
    }

    fn settle(layout: &mut RadialLayout) {
        for _ in 0..500 {
            if !layout.tick() {
                break;
            }
        }
    }

    #[test]
    fn test_load_starts_every_node_at_origin() {
        let graph = sample_graph();
        let mut layout = RadialLayout::default();
        layout.load(&graph, Dimensions::new(100.0, 100.0));

        assert_eq!(layout.positions().len(), graph.nodes.len());
        assert!(layout.positions().iter().all(|p| p.x == 0.0 && p.y == 0.0));
    }

    #[test]
    fn test_settles_on_targets() {
        let graph = sample_graph();
        let mut layout = RadialLayout::default();
        layout.load(&graph, Dimensions::new(100.0, 100.0));
        settle(&mut layout);

        assert!(!layout.tick());
        for (i, position) in layout.positions().iter().enumerate() {
            let (tx, ty) = layout.target(i).unwrap();
            assert!((position.x - tx).abs() < 1e-9);
            assert!((position.y - ty).abs() < 1e-9);
        }
    }

    #[test]
    fn test_hub_centered_and_branches_on_ring() {
        let graph = sample_graph();
        let mut layout = RadialLayout::default();
        layout.load(&graph, Dimensions::new(100.0, 100.0));

        let hub = graph.index_of("main").unwrap();
        assert_eq!(layout.target(hub), Some((0.0, 0.0)));

        let dev = layout.target(graph.index_of("dev").unwrap()).unwrap();
        let release = layout.target(graph.index_of("release").unwrap()).unwrap();
        let expected = RING_BRANCH * 50.0 * MARGIN;
        assert!((dev.0.hypot(dev.1) - expected).abs() < 1e-9);
        assert!((release.0.hypot(release.1) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_commits_lie_beyond_their_branch() {
        let graph = sample_graph();
        let mut layout = RadialLayout::default();
        layout.load(&graph, Dimensions::new(100.0, 100.0));

        let branch = layout.target(graph.index_of("dev").unwrap()).unwrap();
        let commit = layout.target(graph.index_of("dev-commit-1").unwrap()).unwrap();
        assert!(commit.0.hypot(commit.1) > branch.0.hypot(branch.1));
    }

    #[test]
    fn test_pinned_node_stays_put() {
        let graph = sample_graph();
        let mut layout = RadialLayout::default();
        layout.load(&graph, Dimensions::new(100.0, 100.0));
        layout.pin(1, 12.0, -7.0);
        settle(&mut layout);

        assert_eq!(
            layout.positions()[1],
            NodePosition {
                x: 12.0,
                y: -7.0,
                pinned: true
            }
        );

        layout.unpin_all();
        assert!(layout.tick());
    }

    #[test]
    fn test_resize_scales_positions() {
        let graph = sample_graph();
        let mut layout = RadialLayout::default();
        layout.load(&graph, Dimensions::new(100.0, 100.0));
        layout.pin(1, 10.0, 10.0);

        layout.resize(Dimensions::new(200.0, 50.0));

        assert_eq!(layout.dimensions(), Dimensions::new(200.0, 50.0));
        assert_eq!(layout.positions()[1].x, 20.0);
        assert_eq!(layout.positions()[1].y, 5.0);
    }

    #[test]
    fn test_node_at_picks_nearest_within_radius() {
        let graph = sample_graph();
        let mut layout = RadialLayout::default();
        layout.load(&graph, Dimensions::new(100.0, 100.0));
        settle(&mut layout);

        let hub = graph.index_of("main").unwrap();
        assert_eq!(layout.node_at(0.5, 0.5, 2.0), Some(hub));
        assert_eq!(layout.node_at(49.0, -49.0, 1.0), None);
    }

    #[test]
    fn test_clear_drops_nodes() {
        let mut layout = RadialLayout::default();
        layout.load(&sample_graph(), Dimensions::default());
        layout.clear();
        assert!(layout.positions().is_empty());
        assert!(!layout.tick());
    }
}
