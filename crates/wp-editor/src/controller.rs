//! The editor controller: scene events in, graph mutations and renders out.
//!
//! Owns the connection graph, the render sync, and the highlight state,
//! and enforces the ordering contracts: cascading deletes run
//! synchronously before any later render in the same turn, and the
//! scene's own `object:removed` echoes never re-enter removal.

use crate::guard::Suppression;
use crate::highlight::Highlight;
use crate::input::{HitTarget, SceneEvent};
use std::collections::HashSet;
use wp_core::{
    ConnectionId, CreateError, CreateOptions, DeviceId, DeviceQuery, DeviceRef, DeviceResolver,
    TopologyEvent, TopologyGraph,
};
use wp_render::RenderSync;

pub struct EditorController {
    graph: TopologyGraph,
    render: RenderSync,
    highlight: Highlight,
    /// Connections currently being bulk-removed. The scene fires a
    /// `removed` event per artifact we delete; ids in here must not
    /// re-trigger removal.
    removing: HashSet<ConnectionId>,
    /// Shared with the host's undo system so it can ignore our
    /// housekeeping adds/removes during imports and cascades.
    suppression: Suppression,
}

impl EditorController {
    pub fn new(pixels_per_meter: f64) -> Self {
        Self::with_graph(TopologyGraph::new(), pixels_per_meter)
    }

    pub fn with_graph(graph: TopologyGraph, pixels_per_meter: f64) -> Self {
        Self {
            graph,
            render: RenderSync::new(pixels_per_meter),
            highlight: Highlight::None,
            removing: HashSet::new(),
            suppression: Suppression::new(),
        }
    }

    pub fn graph(&self) -> &TopologyGraph {
        &self.graph
    }

    pub fn render(&self) -> &RenderSync {
        &self.render
    }

    pub fn highlight(&self) -> Highlight {
        self.highlight
    }

    /// The suppression counter, shared with the undo system.
    pub fn suppression(&self) -> Suppression {
        self.suppression.clone()
    }

    /// Drain pending graph notifications for the host's listeners.
    pub fn take_events(&mut self) -> Vec<TopologyEvent> {
        self.graph.take_events()
    }

    // ─── Public operations ───────────────────────────────────────────────

    /// Connect two resolved devices and render the new connection.
    pub fn connect(
        &mut self,
        device1: &DeviceRef,
        device2: &DeviceRef,
        kind: Option<&str>,
        devices: &impl DeviceQuery,
    ) -> Result<ConnectionId, CreateError> {
        let id =
            self.graph
                .create_connection(device1, device2, kind, CreateOptions::default())?;
        self.render_one(id, devices);
        Ok(id)
    }

    /// Remove a connection and all its visual artifacts. Idempotent and
    /// re-entrant-safe: a scene `removed` echo for an id already in
    /// flight is a no-op.
    pub fn remove_connection(&mut self, id: ConnectionId) {
        if !self.removing.insert(id) {
            return;
        }
        self.graph.remove_connection(id);
        self.render.remove_connection(id);
        if self.highlight == Highlight::Connection(id) {
            self.highlight = Highlight::None;
        }
        self.removing.remove(&id);
    }

    /// Bulk clear, with cascade side effects suppressed.
    pub fn clear_all(&mut self) {
        let _suppressed = self.suppression.scope();
        let ids: Vec<ConnectionId> = self.render.store().connections().collect();
        for id in ids {
            self.render.remove_connection(id);
        }
        self.graph.clear_all();
        self.highlight = Highlight::None;
    }

    /// Serialized form of the whole graph, for the save system.
    pub fn export_records(&self) -> Vec<wp_core::ConnectionRecord> {
        self.graph.export_records()
    }

    /// Replace the graph from save-file records and re-render everything.
    /// Records whose devices are gone are skipped by the bridge.
    pub fn load_records(
        &mut self,
        records: &[wp_core::ConnectionRecord],
        resolver: &impl DeviceResolver,
        devices: &impl DeviceQuery,
    ) {
        let _suppressed = self.suppression.scope();
        let existing: Vec<ConnectionId> = self.render.store().connections().collect();
        for id in existing {
            self.render.remove_connection(id);
        }
        let imported = self.graph.import_records(records, resolver);
        self.highlight = Highlight::None;
        for id in imported {
            self.render_one(id, devices);
        }
    }

    /// Propagate a canvas scale change to every distance label, in place.
    pub fn update_labels_for_scale_change(&mut self, pixels_per_meter: f64) {
        self.render.update_labels_for_scale_change(pixels_per_meter);
    }

    // ─── Scene events ────────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: SceneEvent, devices: &impl DeviceQuery) {
        match event {
            SceneEvent::DeviceMoving(device) => self.on_device_moving(device, devices),
            SceneEvent::DeviceRemoved(device) => self.on_device_removed(device),
            SceneEvent::ObjectRemoved(target) => self.on_object_removed(target, devices),
            SceneEvent::PointerDown {
                at,
                hit: Some(HitTarget::Segment { connection, index }),
                double_click: true,
            } => {
                // Double-click on a segment inserts a waypoint there and
                // keeps the connection highlighted.
                if self
                    .graph
                    .add_waypoint(connection, at, Some(index), devices)
                    .is_some()
                {
                    self.render_one(connection, devices);
                    self.highlight = Highlight::Connection(connection);
                    self.restyle_all();
                }
            }
            SceneEvent::ScaleChanged(pixels_per_meter) => {
                self.update_labels_for_scale_change(pixels_per_meter)
            }
            _ => {
                let next = self.highlight.transition(&event);
                if next != self.highlight {
                    self.highlight = next;
                    self.restyle_all();
                }
            }
        }
    }

    /// A tracked device moved: re-render every touching connection from
    /// its *current* center. Positions are never cached, so this is the
    /// whole synchronization contract.
    fn on_device_moving(&mut self, device: DeviceId, devices: &impl DeviceQuery) {
        for id in self.graph.connections_of(device) {
            self.render_one(id, devices);
        }
    }

    /// Cascade: every connection touching the destroyed device goes,
    /// synchronously, before any later render pass can observe a dangling
    /// endpoint.
    fn on_device_removed(&mut self, device: DeviceId) {
        let _suppressed = self.suppression.scope();
        let removed = self.graph.remove_connections_for_device(device);
        for id in removed {
            self.removing.insert(id);
            self.render.remove_connection(id);
            self.removing.remove(&id);
            if self.highlight == Highlight::Connection(id) {
                self.highlight = Highlight::None;
            }
        }
        if self.highlight == Highlight::Device(device)
            || self.highlight == (Highlight::All { dragging: device })
        {
            self.highlight = Highlight::None;
        }
    }

    /// The scene removed a primitive. Our own housekeeping removals are
    /// filtered by the suppression scope and the in-flight set; what is
    /// left is the user deleting a rendered artifact directly.
    fn on_object_removed(&mut self, target: HitTarget, devices: &impl DeviceQuery) {
        if self.suppression.active() {
            return;
        }
        let Some(connection) = target.connection() else {
            return;
        };
        if self.removing.contains(&connection) {
            return;
        }
        match target {
            // Deleting any rendered segment deletes the connection.
            HitTarget::Segment { .. } => self.remove_connection(connection),
            HitTarget::Waypoint { index, .. } => {
                if self.graph.remove_waypoint(connection, index) {
                    self.render_one(connection, devices);
                }
            }
            HitTarget::Device(_) => {}
        }
    }

    // ─── Rendering helpers ───────────────────────────────────────────────

    fn render_one(&mut self, id: ConnectionId, devices: &impl DeviceQuery) {
        if let Some(connection) = self.graph.get(id) {
            let flags = self.highlight.flags_for(connection);
            self.render.render_connection(connection, devices, flags);
        }
    }

    /// Restyle every rendered connection for the current highlight state
    /// without regenerating geometry.
    fn restyle_all(&mut self) {
        let ids: Vec<ConnectionId> = self.render.store().connections().collect();
        for id in ids {
            if let Some(connection) = self.graph.get(id) {
                let flags = self.highlight.flags_for(connection);
                self.render
                    .store_mut()
                    .apply_highlight(id, flags.highlighted, flags.waypoints_visible);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wp_core::Point;

    struct Centers(HashMap<DeviceId, Point>);

    impl DeviceQuery for Centers {
        fn center(&self, id: DeviceId) -> Option<Point> {
            self.0.get(&id).copied()
        }
    }

    fn camera(id: &str) -> DeviceRef {
        DeviceRef::new(DeviceId::intern(id), "fixed-camera.png")
    }

    #[test]
    fn connect_renders_artifacts() {
        let (a, b) = (camera("ct_a"), camera("ct_b"));
        let centers = Centers(HashMap::from([
            (a.id, Point::new(0.0, 0.0)),
            (b.id, Point::new(100.0, 0.0)),
        ]));
        let mut controller = EditorController::new(10.0);
        let id = controller.connect(&a, &b, None, &centers).unwrap();
        assert!(!controller.render().store().artifacts(id).is_empty());
    }

    #[test]
    fn moving_rerenders_from_live_centers() {
        let (a, b) = (camera("mv_a"), camera("mv_b"));
        let mut centers = Centers(HashMap::from([
            (a.id, Point::new(0.0, 0.0)),
            (b.id, Point::new(100.0, 0.0)),
        ]));
        let mut controller = EditorController::new(10.0);
        let id = controller.connect(&a, &b, None, &centers).unwrap();

        // The device drags to a new spot; the graph stores only the id
        centers.0.insert(a.id, Point::new(0.0, 80.0));
        controller.handle_event(SceneEvent::DeviceMoving(a.id), &centers);

        let from = controller
            .render()
            .store()
            .artifacts(id)
            .iter()
            .find_map(|artifact| match artifact {
                wp_render::Artifact::Segment { from, .. } => Some(*from),
                _ => None,
            })
            .unwrap();
        assert_eq!(from, Point::new(0.0, 80.0));
    }

    #[test]
    fn object_removed_echo_does_not_reenter() {
        let (a, b) = (camera("echo_a"), camera("echo_b"));
        let centers = Centers(HashMap::from([
            (a.id, Point::new(0.0, 0.0)),
            (b.id, Point::new(50.0, 0.0)),
        ]));
        let mut controller = EditorController::new(10.0);
        let id = controller.connect(&a, &b, None, &centers).unwrap();

        // User deletes a segment: connection goes
        controller.handle_event(
            SceneEvent::ObjectRemoved(HitTarget::Segment {
                connection: id,
                index: 0,
            }),
            &centers,
        );
        assert!(controller.graph().get(id).is_none());

        // A late echo for the same id is a no-op
        controller.handle_event(
            SceneEvent::ObjectRemoved(HitTarget::Segment {
                connection: id,
                index: 0,
            }),
            &centers,
        );
    }
}
