//! The topology-builder projection.
//!
//! A read-only re-layout of the connection graph on a second, bounded
//! canvas. Node positions come from the main canvas (uniformly fitted
//! into the bounds) unless the user has dragged the node here before —
//! the position memory wins, and it persists under its own project-file
//! key, independent of the connection records. Edges are always straight
//! device-to-device lines; waypoints belong to the main canvas only.

use serde_json::Value;
use std::collections::HashMap;
use wp_core::{ConnectionId, DeviceId, DeviceQuery, Point, TopologyGraph};

/// Project-file key the position map is stored under.
pub const POSITIONS_KEY: &str = "topologyPositions";

/// The secondary canvas extents. All projected positions stay inside,
/// inset by `margin`.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margin: 40.0,
        }
    }

    fn clamp(&self, point: Point) -> Point {
        // Bounds smaller than twice the margin (thumbnail canvases)
        // collapse the usable band to the midline instead of inverting it.
        let mx = self.margin.min(self.width / 2.0);
        let my = self.margin.min(self.height / 2.0);
        Point::new(
            point.x.clamp(mx, self.width - mx),
            point.y.clamp(my, self.height - my),
        )
    }
}

/// Resolves a device-type token to a drawable icon asset.
pub trait IconSource {
    fn icon_for(&self, type_token: &str) -> Option<String>;
}

/// What to draw for a node. A missing icon asset degrades to the
/// placeholder glyph; the graph still projects in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeGlyph {
    Icon(String),
    Placeholder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopoNode {
    pub device: DeviceId,
    pub at: Point,
    pub glyph: NodeGlyph,
    pub label: String,
}

/// A straight edge between two projected node positions.
#[derive(Debug, Clone, PartialEq)]
pub struct TopoEdge {
    pub connection: ConnectionId,
    pub from: Point,
    pub to: Point,
    pub color: String,
}

/// One full projection pass, ready for the host to draw.
#[derive(Debug, Default)]
pub struct TopoScene {
    pub nodes: Vec<TopoNode>,
    pub edges: Vec<TopoEdge>,
}

/// The projection state: bounds plus the per-device position memory.
#[derive(Debug)]
pub struct TopologyView {
    bounds: Bounds,
    positions: HashMap<DeviceId, Point>,
}

impl TopologyView {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            positions: HashMap::new(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Remember where the user dragged a node on this canvas. Clamped to
    /// the bounds; overrides the fitted position from then on.
    pub fn set_position(&mut self, device: DeviceId, at: Point) {
        self.positions.insert(device, self.bounds.clamp(at));
    }

    pub fn position(&self, device: DeviceId) -> Option<Point> {
        self.positions.get(&device).copied()
    }

    pub fn forget_position(&mut self, device: DeviceId) {
        self.positions.remove(&device);
    }

    /// The position map as the JSON value stored under [`POSITIONS_KEY`].
    pub fn positions_json(&self) -> Value {
        let mut map = serde_json::Map::with_capacity(self.positions.len());
        for (device, at) in &self.positions {
            map.insert(
                device.to_string(),
                serde_json::json!({ "x": at.x, "y": at.y }),
            );
        }
        Value::Object(map)
    }

    /// Restore the position map from a project file. Tolerant of partial
    /// data: entries that are not `{x, y}` objects are skipped.
    pub fn load_positions(&mut self, value: &Value) {
        self.positions.clear();
        let Some(map) = value.as_object() else {
            return;
        };
        for (device, entry) in map {
            let (Some(x), Some(y)) = (
                entry.get("x").and_then(Value::as_f64),
                entry.get("y").and_then(Value::as_f64),
            ) else {
                log::warn!("skipping malformed topology position for {device}");
                continue;
            };
            self.positions.insert(
                DeviceId::intern(device),
                self.bounds.clamp(Point::new(x, y)),
            );
        }
    }

    /// Project the graph onto the bounded canvas.
    ///
    /// Devices with a remembered position use it; the rest are mapped
    /// from their live main-canvas centers by a uniform fit into the
    /// bounds. A device whose center cannot be resolved is skipped with
    /// a warning, along with its edges.
    pub fn project(
        &self,
        graph: &TopologyGraph,
        devices: &impl DeviceQuery,
        icons: &impl IconSource,
    ) -> TopoScene {
        // Only devices without a remembered position participate in the
        // fit; a pinned node must not stretch the fit box for the rest.
        let mut remembered: Vec<DeviceId> = Vec::new();
        let mut to_fit: Vec<(DeviceId, Point)> = Vec::new();
        for device in graph.devices() {
            if self.positions.contains_key(&device.id) {
                remembered.push(device.id);
            } else if let Some(center) = devices.center(device.id) {
                to_fit.push((device.id, center));
            } else {
                log::warn!("no position for device {}, skipping", device.id);
            }
        }

        let fit = FitMap::over(to_fit.iter().map(|(_, c)| *c), self.bounds);

        let mut placed: HashMap<DeviceId, Point> =
            HashMap::with_capacity(remembered.len() + to_fit.len());
        for id in remembered {
            placed.insert(id, self.positions[&id]);
        }
        for (id, center) in to_fit {
            placed.insert(id, self.bounds.clamp(fit.apply(center)));
        }

        let mut nodes: Vec<TopoNode> = placed
            .iter()
            .map(|(id, at)| {
                let device = graph.find_device_by_id(*id);
                let token = device.map(|d| d.type_token.as_str()).unwrap_or_default();
                let glyph = match icons.icon_for(token) {
                    Some(asset) => NodeGlyph::Icon(asset),
                    None => {
                        log::warn!("no icon for device type {token:?}, using placeholder");
                        NodeGlyph::Placeholder
                    }
                };
                TopoNode {
                    device: *id,
                    at: *at,
                    glyph,
                    label: device
                        .map(|d| d.display_label().to_string())
                        .unwrap_or_else(|| id.to_string()),
                }
            })
            .collect();
        nodes.sort_by_key(|n| n.device);

        let mut edges: Vec<TopoEdge> = graph
            .connections()
            .filter_map(|connection| {
                let from = placed.get(&connection.device1)?;
                let to = placed.get(&connection.device2)?;
                Some(TopoEdge {
                    connection: connection.id,
                    from: *from,
                    to: *to,
                    color: connection.props.color.clone(),
                })
            })
            .collect();
        edges.sort_by_key(|e| e.connection);

        TopoScene { nodes, edges }
    }
}

/// Uniform scale-and-translate from the main canvas into the bounds.
struct FitMap {
    scale: f64,
    offset: Point,
    origin: Point,
}

impl FitMap {
    fn over(centers: impl Iterator<Item = Point>, bounds: Bounds) -> Self {
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for c in centers {
            min = Point::new(min.x.min(c.x), min.y.min(c.y));
            max = Point::new(max.x.max(c.x), max.y.max(c.y));
        }

        let mx = bounds.margin.min(bounds.width / 2.0);
        let my = bounds.margin.min(bounds.height / 2.0);
        let avail_w = bounds.width - 2.0 * mx;
        let avail_h = bounds.height - 2.0 * my;
        let (span_w, span_h) = (max.x - min.x, max.y - min.y);

        // Degenerate spread (one node, or all stacked): pin to the center.
        if !span_w.is_finite() || (span_w <= 0.0 && span_h <= 0.0) {
            return Self {
                scale: 0.0,
                offset: Point::new(bounds.width / 2.0, bounds.height / 2.0),
                origin: min,
            };
        }

        let scale = f64::min(
            if span_w > 0.0 { avail_w / span_w } else { f64::INFINITY },
            if span_h > 0.0 { avail_h / span_h } else { f64::INFINITY },
        );
        // Center the fitted content inside the margins
        let offset = Point::new(
            mx + (avail_w - span_w * scale) / 2.0,
            my + (avail_h - span_h * scale) / 2.0,
        );
        Self {
            scale,
            offset,
            origin: min,
        }
    }

    fn apply(&self, p: Point) -> Point {
        Point::new(
            self.offset.x + (p.x - self.origin.x) * self.scale,
            self.offset.y + (p.y - self.origin.y) * self.scale,
        )
    }
}
