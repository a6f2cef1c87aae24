// Canvas rendering of a laid-out graph

use crate::layout::{Dimensions, NodePosition};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Line,
    widgets::{
        Block, Borders,
        canvas::{Canvas, Circle, Line as CanvasLine},
    },
};
use repograph_core::report::group_color;
use repograph_core::{NodeGroup, RepoGraph};

pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 8.0;
const ZOOM_STEP: f64 = 1.25;
/// Fraction of the visible span moved per pan step
const PAN_STEP: f64 = 0.1;
/// World units per unit of node `size`
const RADIUS_SCALE: f64 = 0.125;

/// Which part of world space is visible
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            center_x: 0.0,
            center_y: 0.0,
        }
    }
}

impl Viewport {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Move the view by `dx`/`dy` steps; positive is right/up
    pub fn pan(&mut self, dx: f64, dy: f64, dimensions: Dimensions) {
        self.center_x += dx * PAN_STEP * dimensions.width / self.zoom;
        self.center_y += dy * PAN_STEP * dimensions.height / self.zoom;
    }

    pub fn x_bounds(&self, dimensions: Dimensions) -> [f64; 2] {
        let half = dimensions.width / 2.0 / self.zoom;
        [self.center_x - half, self.center_x + half]
    }

    pub fn y_bounds(&self, dimensions: Dimensions) -> [f64; 2] {
        let half = dimensions.height / 2.0 / self.zoom;
        [self.center_y - half, self.center_y + half]
    }

    /// World coordinates under a terminal cell, or `None` outside `area`
    pub fn screen_to_world(&self, area: Rect, column: u16, row: u16) -> Option<(f64, f64)> {
        if area.width == 0
            || area.height == 0
            || column < area.x
            || row < area.y
            || column >= area.x + area.width
            || row >= area.y + area.height
        {
            return None;
        }

        let dimensions = Dimensions::from_area(area);
        let [x_min, x_max] = self.x_bounds(dimensions);
        let [y_min, y_max] = self.y_bounds(dimensions);

        // Cell centers; rows count down from the top
        let fx = (f64::from(column - area.x) + 0.5) / f64::from(area.width);
        let fy = (f64::from(row - area.y) + 0.5) / f64::from(area.height);

        Some((x_min + fx * (x_max - x_min), y_max - fy * (y_max - y_min)))
    }

    /// Pick radius around a click, in world units
    pub fn hit_radius(&self) -> f64 {
        2.0 / self.zoom
    }
}

pub fn node_radius(size: f64) -> f64 {
    size * RADIUS_SCALE
}

pub fn node_color(group: NodeGroup) -> Color {
    group_color(group).parse().unwrap_or(Color::White)
}

/// Draw `graph` at `positions` into `area`
pub fn render_diagram(
    f: &mut Frame,
    area: Rect,
    title: &str,
    graph: &RepoGraph,
    positions: &[NodePosition],
    viewport: &Viewport,
    selected: Option<usize>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .border_style(Style::default().fg(Color::Cyan));
    let dimensions = Dimensions::from_area(block.inner(area));

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(viewport.x_bounds(dimensions))
        .y_bounds(viewport.y_bounds(dimensions))
        .paint(|ctx| {
            for edge in &graph.edges {
                let (Some(a), Some(b)) = (graph.index_of(&edge.source), graph.index_of(&edge.target)) else {
                    continue;
                };
                let (Some(from), Some(to)) = (positions.get(a), positions.get(b)) else {
                    continue;
                };
                ctx.draw(&CanvasLine {
                    x1: from.x,
                    y1: from.y,
                    x2: to.x,
                    y2: to.y,
                    color: Color::DarkGray,
                });
            }

            ctx.layer();

            for (i, (node, position)) in graph.nodes.iter().zip(positions).enumerate() {
                let color = if Some(i) == selected {
                    Color::Yellow
                } else {
                    node_color(node.group)
                };
                ctx.draw(&Circle {
                    x: position.x,
                    y: position.y,
                    radius: node_radius(node.size),
                    color,
                });
            }

            ctx.layer();

            for (i, (node, position)) in graph.nodes.iter().zip(positions).enumerate() {
                let label = node.label.as_deref().unwrap_or(&node.id).replace('\n', " ");
                let mut style = Style::default().fg(Color::Gray);
                if node.group != NodeGroup::Commit {
                    style = style.fg(Color::White).add_modifier(Modifier::BOLD);
                }
                if Some(i) == selected {
                    style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
                }
                ctx.print(
                    position.x + node_radius(node.size) + 0.5,
                    position.y,
                    Line::styled(label, style),
                );
            }
        });

    f.render_widget(canvas, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_is_clamped() {
        let mut viewport = Viewport::default();
        for _ in 0..50 {
            viewport.zoom_in();
        }
        assert_eq!(viewport.zoom, MAX_ZOOM);

        for _ in 0..50 {
            viewport.zoom_out();
        }
        assert_eq!(viewport.zoom, MIN_ZOOM);

        viewport.reset();
        assert_eq!(viewport, Viewport::default());
    }

    #[test]
    fn test_bounds_follow_zoom_and_center() {
        let dimensions = Dimensions::new(100.0, 40.0);
        let mut viewport = Viewport::default();
        assert_eq!(viewport.x_bounds(dimensions), [-50.0, 50.0]);
        assert_eq!(viewport.y_bounds(dimensions), [-20.0, 20.0]);

        viewport.zoom = 2.0;
        viewport.center_x = 10.0;
        assert_eq!(viewport.x_bounds(dimensions), [-15.0, 35.0]);
        assert_eq!(viewport.y_bounds(dimensions), [-10.0, 10.0]);
    }

    #[test]
    fn test_pan_moves_center() {
        let dimensions = Dimensions::new(100.0, 40.0);
        let mut viewport = Viewport::default();
        viewport.pan(1.0, -1.0, dimensions);
        assert!((viewport.center_x - 10.0).abs() < 1e-9);
        assert!((viewport.center_y + 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_screen_to_world_maps_center_and_rejects_outside() {
        let area = Rect::new(10, 5, 20, 10);
        let viewport = Viewport::default();

        // Width 20 cells, height 10 cells = 20 world units
        let (x, y) = viewport.screen_to_world(area, 10, 5).unwrap();
        assert!((x + 9.5).abs() < 1e-9);
        assert!((y - 9.0).abs() < 1e-9);

        let (x, y) = viewport.screen_to_world(area, 29, 14).unwrap();
        assert!((x - 9.5).abs() < 1e-9);
        assert!((y + 9.0).abs() < 1e-9);

        assert!(viewport.screen_to_world(area, 9, 5).is_none());
        assert!(viewport.screen_to_world(area, 30, 5).is_none());
        assert!(viewport.screen_to_world(area, 10, 15).is_none());
    }

    #[test]
    fn test_node_colors_match_report_palette() {
        assert_eq!(node_color(NodeGroup::Main), Color::Rgb(0xfd, 0x8d, 0x3c));
        assert_eq!(node_color(NodeGroup::Branch), Color::Rgb(0x56, 0xb4, 0xe9));
        assert_eq!(node_color(NodeGroup::Commit), Color::Rgb(0x9e, 0xca, 0xe1));
    }

    #[test]
    fn test_node_radius_scales_with_size() {
        assert_eq!(node_radius(8.0), 1.0);
        assert!(node_radius(20.0) > node_radius(15.0));
    }
}
