//! The connection graph core.
//!
//! [`TopologyGraph`] owns the connection map, the per-panel channel
//! registry, device move-tracking registrations, and the adjacency index.
//! The adjacency is a petgraph `UnGraphMap`, which structurally allows at
//! most one edge per unordered device pair — the same invariant the
//! sorted-pair [`ConnectionId`] encodes, kept as a defensive double-check.
//!
//! The graph is pure state: rendering and scene-event plumbing live in
//! `wp-render` / `wp-editor`. All mutation happens synchronously inside
//! the caller's event turn.

use crate::category::{Category, compatible};
use crate::geometry::{self, Point};
use crate::id::{ConnectionId, DeviceId};
use crate::model::{Channel, Connection, CustomTextLabel, DeviceQuery, DeviceRef};
use petgraph::graphmap::UnGraphMap;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use thiserror::Error;

/// How long after a successful creation the same unordered pair is
/// rejected, absorbing duplicate UI events from a single gesture.
pub const CREATE_DEBOUNCE_MS: u64 = 600;

/// Monotonic milliseconds source. Injected so tests drive time directly
/// instead of sleeping through the debounce window.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall-clock backed [`Clock`] used outside tests.
pub struct SystemClock {
    epoch: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

/// Why a connection could not be created. Never a panic — rejection is an
/// expected outcome of user gestures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateError {
    #[error("cannot connect a device to itself")]
    SameDevice,
    #[error("devices of categories {a} and {b} cannot be connected")]
    Incompatible { a: Category, b: Category },
    #[error("a connection between this device pair already exists")]
    DuplicatePair,
    #[error("this device pair was connected moments ago")]
    Debounced,
}

/// Notifications emitted by the core, drained by the host after each
/// event turn (the original surfaced these as DOM custom events).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyEvent {
    ConnectionCreated {
        id: ConnectionId,
    },
    ConnectionBlocked {
        category_a: Category,
        category_b: Category,
        message: String,
    },
}

/// Options for [`TopologyGraph::create_connection`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateOptions {
    /// Skip the category compatibility check (used by the import path,
    /// which must accept whatever the save file contains).
    pub skip_validation: bool,
}

/// A device's wiring into a panel, for the info popover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub channel: u32,
    pub panel_device_id: DeviceId,
    pub panel_label: String,
}

/// One row of a panel's wiring list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConnection {
    pub channel: u32,
    pub device_id: DeviceId,
    pub device_label: String,
}

/// Ordered channel bookkeeping for one panel device.
///
/// `next` is a per-session high-water mark: removal takes an id out of
/// `order` but never lowers `next`, so channel numbers are not reused
/// (and existing entries are never renumbered).
#[derive(Debug, Default)]
struct PanelChannels {
    order: Vec<ConnectionId>,
    next: u32,
}

impl PanelChannels {
    fn assign(&mut self, id: ConnectionId) -> u32 {
        self.next += 1;
        self.order.push(id);
        self.next
    }

    fn release(&mut self, id: ConnectionId) {
        self.order.retain(|c| *c != id);
    }
}

/// The in-memory connection graph. See module docs.
pub struct TopologyGraph {
    connections: HashMap<ConnectionId, Connection>,
    adjacency: UnGraphMap<DeviceId, ConnectionId>,
    devices: HashMap<DeviceId, DeviceRef>,
    /// Devices with an active move-tracking registration. Registration is
    /// idempotent: a tracked device is never re-hooked.
    tracked: HashSet<DeviceId>,
    channels: HashMap<DeviceId, PanelChannels>,
    /// Creation timestamps for the debounce window.
    recent: HashMap<ConnectionId, u64>,
    events: Vec<TopologyEvent>,
    clock: Box<dyn Clock>,
}

impl Default for TopologyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock::default()))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            connections: HashMap::new(),
            adjacency: UnGraphMap::new(),
            devices: HashMap::new(),
            tracked: HashSet::new(),
            channels: HashMap::new(),
            recent: HashMap::new(),
            events: Vec::new(),
            clock,
        }
    }

    // ─── Creation ────────────────────────────────────────────────────────

    /// Create a connection between two resolved devices.
    ///
    /// Rejects self-connections, incompatible category pairs (unless
    /// `skip_validation`), existing pairs, and pairs re-attempted inside
    /// the debounce window. On success the connection exists with default
    /// properties, a channel is assigned when an endpoint is a panel, and
    /// both devices are indexed and move-tracked.
    pub fn create_connection(
        &mut self,
        device1: &DeviceRef,
        device2: &DeviceRef,
        kind: Option<&str>,
        options: CreateOptions,
    ) -> Result<ConnectionId, CreateError> {
        if device1.id == device2.id {
            return Err(CreateError::SameDevice);
        }

        if !options.skip_validation {
            let (a, b) = (device1.category(), device2.category());
            if !compatible(a, b) {
                let message = format!("Cannot connect a {a} device to a {b} device");
                log::debug!("connection blocked: {message}");
                self.events.push(TopologyEvent::ConnectionBlocked {
                    category_a: a,
                    category_b: b,
                    message,
                });
                return Err(CreateError::Incompatible { a, b });
            }
        }

        let id = ConnectionId::for_pair(device1.id, device2.id);
        if self.connections.contains_key(&id) {
            return Err(CreateError::DuplicatePair);
        }
        // Defensive double-check against the adjacency index.
        if self.adjacency.contains_edge(device1.id, device2.id) {
            return Err(CreateError::DuplicatePair);
        }

        let now = self.clock.now_ms();
        if let Some(&created) = self.recent.get(&id)
            && now.saturating_sub(created) < CREATE_DEBOUNCE_MS
        {
            return Err(CreateError::Debounced);
        }

        let mut connection = Connection::new(device1.id, device2.id, kind);
        connection.props.channel = self.assign_channel(id, device1, device2);

        self.register_device(device1.clone());
        self.register_device(device2.clone());
        self.adjacency.add_edge(device1.id, device2.id, id);
        self.connections.insert(id, connection);
        self.recent.insert(id, now);
        self.events.push(TopologyEvent::ConnectionCreated { id });
        Ok(id)
    }

    /// Left-biased panel tie-break: when both endpoints are panels,
    /// `device1` is *the* panel. Downstream channel-label placement
    /// assumes exactly one panel per connection.
    fn assign_channel(
        &mut self,
        id: ConnectionId,
        device1: &DeviceRef,
        device2: &DeviceRef,
    ) -> Option<Channel> {
        let panel = if device1.is_panel {
            device1.id
        } else if device2.is_panel {
            device2.id
        } else {
            return None;
        };
        let number = self.channels.entry(panel).or_default().assign(id);
        Some(Channel { number, panel })
    }

    /// Index a device descriptor and register move-tracking. Idempotent;
    /// a re-registration refreshes the descriptor (re-binding after
    /// undo/redo or reload).
    pub fn register_device(&mut self, device: DeviceRef) {
        self.tracked.insert(device.id);
        self.devices.insert(device.id, device);
    }

    // ─── Removal ─────────────────────────────────────────────────────────

    /// Remove a connection. Idempotent: unknown ids are a no-op. The
    /// panel registry entry is released without renumbering survivors.
    pub fn remove_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        let connection = self.connections.remove(&id)?;
        self.adjacency.remove_edge(connection.device1, connection.device2);
        if let Some(channel) = connection.props.channel
            && let Some(panel) = self.channels.get_mut(&channel.panel)
        {
            panel.release(id);
        }
        // An explicit delete may legitimately be followed by a fresh
        // connect gesture, so the debounce entry goes too.
        self.recent.remove(&id);
        Some(connection)
    }

    /// Cascade: remove every connection touching the destroyed device,
    /// then drop its index and tracking entries. Returns the removed
    /// connection ids so the caller can clear their visual artifacts.
    pub fn remove_connections_for_device(&mut self, device: DeviceId) -> Vec<ConnectionId> {
        let ids: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| c.touches(device))
            .map(|c| c.id)
            .collect();
        for id in &ids {
            self.remove_connection(*id);
        }
        self.adjacency.remove_node(device);
        self.tracked.remove(&device);
        self.devices.remove(&device);
        ids
    }

    /// Bulk clear. Channel counters reset with the registry — a cleared
    /// project starts numbering from 1 again.
    pub fn clear_all(&mut self) {
        self.connections.clear();
        self.adjacency = UnGraphMap::new();
        self.channels.clear();
        self.recent.clear();
        self.tracked.clear();
    }

    // ─── Waypoints ───────────────────────────────────────────────────────

    /// Insert a waypoint at `point`. With `segment_hint` the waypoint goes
    /// into that segment (segment `i` spans path point `i` → `i + 1`);
    /// otherwise the geometrically closest segment of the current path is
    /// used. Returns the waypoint's index, or `None` if the connection is
    /// unknown or the path cannot be resolved.
    pub fn add_waypoint(
        &mut self,
        id: ConnectionId,
        point: Point,
        segment_hint: Option<usize>,
        devices: &impl DeviceQuery,
    ) -> Option<usize> {
        let path = self.connections.get(&id)?.path(devices)?;
        let segment = match segment_hint {
            Some(i) => i.min(path.len().saturating_sub(2)),
            None => geometry::nearest_segment(&path, point)?.0,
        };
        let connection = self.connections.get_mut(&id)?;
        let index = segment.min(connection.waypoints.len());
        connection.waypoints.insert(index, point);
        Some(index)
    }

    /// Remove the waypoint at `index`. Out-of-range is a no-op. Removing
    /// the last waypoint leaves a direct device-to-device line.
    pub fn remove_waypoint(&mut self, id: ConnectionId, index: usize) -> bool {
        match self.connections.get_mut(&id) {
            Some(c) if index < c.waypoints.len() => {
                c.waypoints.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Remove the waypoint closest to `point`.
    pub fn remove_waypoint_near(&mut self, id: ConnectionId, point: Point) -> bool {
        let Some(connection) = self.connections.get(&id) else {
            return false;
        };
        let nearest = connection
            .waypoints
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.distance(point).total_cmp(&b.distance(point)))
            .map(|(i, _)| i);
        match nearest {
            Some(i) => self.remove_waypoint(id, i),
            None => false,
        }
    }

    /// Drag a waypoint to a new position.
    pub fn move_waypoint(&mut self, id: ConnectionId, index: usize, point: Point) -> bool {
        match self.connections.get_mut(&id) {
            Some(c) if index < c.waypoints.len() => {
                c.waypoints[index] = point;
                true
            }
            _ => false,
        }
    }

    // ─── Property edits ──────────────────────────────────────────────────

    pub fn set_color(&mut self, id: ConnectionId, color: impl Into<String>) -> bool {
        self.with_connection(id, |c| c.props.color = color.into())
    }

    pub fn set_label(&mut self, id: ConnectionId, label: impl Into<String>) -> bool {
        self.with_connection(id, |c| c.props.label = label.into())
    }

    pub fn add_custom_label(&mut self, id: ConnectionId, label: CustomTextLabel) -> bool {
        self.with_connection(id, |c| c.props.custom_labels.push(label))
    }

    /// Re-anchor a custom label along the path.
    pub fn move_custom_label(&mut self, id: ConnectionId, label_id: &str, ratio: f64) -> bool {
        self.with_connection(id, |c| {
            if let Some(l) = c.props.custom_labels.iter_mut().find(|l| l.id == label_id) {
                l.path_ratio = ratio.clamp(0.0, 1.0);
            }
        })
    }

    pub fn remove_custom_label(&mut self, id: ConnectionId, label_id: &str) -> bool {
        self.with_connection(id, |c| {
            c.props.custom_labels.retain(|l| l.id != label_id)
        })
    }

    fn with_connection(&mut self, id: ConnectionId, f: impl FnOnce(&mut Connection)) -> bool {
        match self.connections.get_mut(&id) {
            Some(c) => {
                f(c);
                true
            }
            None => false,
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Connections touching a device, for highlight and move re-renders.
    pub fn connections_of(&self, device: DeviceId) -> Vec<ConnectionId> {
        self.adjacency
            .edges(device)
            .map(|(_, _, id)| *id)
            .collect()
    }

    pub fn find_device_by_id(&self, id: DeviceId) -> Option<&DeviceRef> {
        self.devices.get(&id)
    }

    /// Every device indexed by the graph (both ends of every connection
    /// it has seen).
    pub fn devices(&self) -> impl Iterator<Item = &DeviceRef> {
        self.devices.values()
    }

    pub fn is_tracked(&self, device: DeviceId) -> bool {
        self.tracked.contains(&device)
    }

    /// The panel wiring of a non-panel device, for the info popover.
    /// Returns the lowest-channel entry when wired into several panels.
    pub fn channel_info(&self, device: DeviceId) -> Option<ChannelInfo> {
        self.connections
            .values()
            .filter(|c| c.touches(device))
            .filter_map(|c| c.props.channel)
            .filter(|ch| ch.panel != device)
            .min_by_key(|ch| ch.number)
            .map(|ch| ChannelInfo {
                channel: ch.number,
                panel_device_id: ch.panel,
                panel_label: self
                    .devices
                    .get(&ch.panel)
                    .map(|d| d.display_label().to_string())
                    .unwrap_or_else(|| ch.panel.to_string()),
            })
    }

    /// Everything wired into a panel, sorted by channel ascending.
    pub fn panel_connections(&self, panel: DeviceId) -> Vec<PanelConnection> {
        let Some(registry) = self.channels.get(&panel) else {
            return Vec::new();
        };
        let mut rows: Vec<PanelConnection> = registry
            .order
            .iter()
            .filter_map(|id| self.connections.get(id))
            .filter_map(|c| {
                let channel = c.props.channel?;
                let other = c.other_end(panel)?;
                Some(PanelConnection {
                    channel: channel.number,
                    device_id: other,
                    device_label: self
                        .devices
                        .get(&other)
                        .map(|d| d.display_label().to_string())
                        .unwrap_or_else(|| other.to_string()),
                })
            })
            .collect();
        rows.sort_by_key(|r| r.channel);
        rows
    }

    /// Drain pending notifications. The host forwards them to listeners.
    pub fn take_events(&mut self) -> Vec<TopologyEvent> {
        std::mem::take(&mut self.events)
    }

    // ─── Import support (used by the serialization bridge) ───────────────

    /// Overwrite a connection's waypoints and properties wholesale, as the
    /// import path does after creating through the normal path.
    pub(crate) fn overwrite(&mut self, id: ConnectionId, f: impl FnOnce(&mut Connection)) -> bool {
        self.with_connection(id, f)
    }

    /// Rebuild the panel registry from the connections currently in the
    /// map, ordered by channel number. The old in-memory registry is not
    /// trusted; counters resume past the highest imported channel.
    pub(crate) fn rebuild_channel_registry(&mut self) {
        self.channels.clear();
        let mut assigned: Vec<(u32, DeviceId, ConnectionId)> = self
            .connections
            .values()
            .filter_map(|c| c.props.channel.map(|ch| (ch.number, ch.panel, c.id)))
            .collect();
        assigned.sort_by_key(|&(number, panel, _)| (panel, number));
        for (number, panel, id) in assigned {
            let registry = self.channels.entry(panel).or_default();
            registry.order.push(id);
            registry.next = registry.next.max(number);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct TestClock(Rc<Cell<u64>>);

    impl Clock for TestClock {
        fn now_ms(&self) -> u64 {
            self.0.get()
        }
    }

    fn graph_with_clock() -> (TopologyGraph, TestClock) {
        let clock = TestClock::default();
        (TopologyGraph::with_clock(Box::new(clock.clone())), clock)
    }

    fn camera(id: &str) -> DeviceRef {
        DeviceRef::new(DeviceId::intern(id), "fixed-camera.png")
    }

    fn nvr_panel(id: &str) -> DeviceRef {
        DeviceRef::new(DeviceId::intern(id), "nvr.png").panel()
    }

    #[test]
    fn pair_uniqueness_in_both_orders() {
        let (mut graph, _) = graph_with_clock();
        let (a, b) = (camera("uniq_a"), camera("uniq_b"));

        let id = graph
            .create_connection(&a, &b, None, CreateOptions::default())
            .unwrap();
        assert_eq!(
            graph.create_connection(&a, &b, None, CreateOptions::default()),
            Err(CreateError::DuplicatePair)
        );
        assert_eq!(
            graph.create_connection(&b, &a, None, CreateOptions::default()),
            Err(CreateError::DuplicatePair)
        );
        assert_eq!(graph.len(), 1);
        assert_eq!(id, ConnectionId::for_pair(b.id, a.id));
    }

    #[test]
    fn debounce_window_absorbs_duplicate_gestures() {
        let (mut graph, clock) = graph_with_clock();
        let (a, b) = (camera("deb_a"), camera("deb_b"));

        let id = graph
            .create_connection(&a, &b, None, CreateOptions::default())
            .unwrap();
        graph.remove_connection(id);
        // Explicit delete clears the debounce entry
        assert!(
            graph
                .create_connection(&a, &b, None, CreateOptions::default())
                .is_ok()
        );

        // Rapid re-create of a *live* pair hits DuplicatePair, but a
        // removal via cascade keeps the window closed for the raw repeat.
        let (c, d) = (camera("deb_c"), camera("deb_d"));
        graph
            .create_connection(&c, &d, None, CreateOptions::default())
            .unwrap();
        graph.connections.remove(&ConnectionId::for_pair(c.id, d.id));
        graph.adjacency.remove_edge(c.id, d.id);
        assert_eq!(
            graph.create_connection(&c, &d, None, CreateOptions::default()),
            Err(CreateError::Debounced)
        );

        clock.0.set(CREATE_DEBOUNCE_MS + 1);
        assert!(
            graph
                .create_connection(&c, &d, None, CreateOptions::default())
                .is_ok()
        );
    }

    #[test]
    fn blocked_pair_emits_event_with_both_categories() {
        let (mut graph, _) = graph_with_clock();
        let cam = camera("blk_cam");
        let alarm = DeviceRef::new(DeviceId::intern("blk_fire"), "fire-alarm.png");

        let result = graph.create_connection(&cam, &alarm, None, CreateOptions::default());
        assert_eq!(
            result,
            Err(CreateError::Incompatible {
                a: Category::Cctv,
                b: Category::Fire
            })
        );
        assert_eq!(graph.len(), 0);

        let events = graph.take_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            TopologyEvent::ConnectionBlocked {
                category_a,
                category_b,
                message,
            } => {
                assert_eq!(*category_a, Category::Cctv);
                assert_eq!(*category_b, Category::Fire);
                assert!(message.contains("cctv") && message.contains("fire"));
            }
            other => panic!("expected ConnectionBlocked, got {other:?}"),
        }
    }

    #[test]
    fn skip_validation_allows_blocked_pairs() {
        let (mut graph, _) = graph_with_clock();
        let cam = camera("skip_cam");
        let alarm = DeviceRef::new(DeviceId::intern("skip_fire"), "fire-alarm.png");
        let options = CreateOptions {
            skip_validation: true,
        };
        assert!(graph.create_connection(&cam, &alarm, None, options).is_ok());
    }

    #[test]
    fn channels_are_monotonic_and_never_reused() {
        let (mut graph, _) = graph_with_clock();
        let panel = nvr_panel("chan_p");
        let opts = CreateOptions::default();

        let c1 = graph
            .create_connection(&panel, &camera("chan_1"), None, opts)
            .unwrap();
        let c2 = graph
            .create_connection(&panel, &camera("chan_2"), None, opts)
            .unwrap();
        let c3 = graph
            .create_connection(&panel, &camera("chan_3"), None, opts)
            .unwrap();
        let number = |g: &TopologyGraph, id| g.get(id).unwrap().props.channel.unwrap().number;
        assert_eq!(number(&graph, c1), 1);
        assert_eq!(number(&graph, c2), 2);
        assert_eq!(number(&graph, c3), 3);

        // Removal does not renumber survivors, and the freed number is
        // never handed out again this session.
        graph.remove_connection(c2);
        assert_eq!(number(&graph, c1), 1);
        assert_eq!(number(&graph, c3), 3);
        let c4 = graph
            .create_connection(&panel, &camera("chan_4"), None, opts)
            .unwrap();
        assert_eq!(number(&graph, c4), 4);

        let rows = graph.panel_connections(panel.id);
        assert_eq!(
            rows.iter().map(|r| r.channel).collect::<Vec<_>>(),
            vec![1, 3, 4]
        );
    }

    #[test]
    fn both_panels_tie_breaks_to_device1() {
        let (mut graph, _) = graph_with_clock();
        let p1 = nvr_panel("tie_p1");
        let p2 = nvr_panel("tie_p2");
        let id = graph
            .create_connection(&p1, &p2, None, CreateOptions::default())
            .unwrap();
        let channel = graph.get(id).unwrap().props.channel.unwrap();
        assert_eq!(channel.panel, p1.id);
        assert_eq!(channel.number, 1);
    }

    #[test]
    fn channel_info_resolves_panel_label() {
        let (mut graph, _) = graph_with_clock();
        let panel = nvr_panel("info_p").with_label("Rack NVR");
        let cam = camera("info_c");
        graph
            .create_connection(&panel, &cam, None, CreateOptions::default())
            .unwrap();

        let info = graph.channel_info(cam.id).unwrap();
        assert_eq!(info.channel, 1);
        assert_eq!(info.panel_device_id, panel.id);
        assert_eq!(info.panel_label, "Rack NVR");
        // The panel itself is not "wired into" anything
        assert!(graph.channel_info(panel.id).is_none());
    }

    #[test]
    fn cascade_removes_only_touching_connections() {
        let (mut graph, _) = graph_with_clock();
        let (a, b, c) = (camera("cas_a"), camera("cas_b"), camera("cas_c"));
        let opts = CreateOptions::default();
        let c1 = graph.create_connection(&a, &b, None, opts).unwrap();
        let c2 = graph.create_connection(&a, &c, None, opts).unwrap();

        let removed = graph.remove_connections_for_device(b.id);
        assert_eq!(removed, vec![c1]);
        assert!(graph.get(c1).is_none());
        assert!(graph.get(c2).is_some());
        assert!(graph.find_device_by_id(b.id).is_none());
        assert!(graph.find_device_by_id(a.id).is_some());
    }

    #[test]
    fn waypoint_edits() {
        use std::collections::HashMap as Map;
        struct Centers(Map<DeviceId, Point>);
        impl DeviceQuery for Centers {
            fn center(&self, id: DeviceId) -> Option<Point> {
                self.0.get(&id).copied()
            }
        }

        let (mut graph, _) = graph_with_clock();
        let (a, b) = (camera("wp_a"), camera("wp_b"));
        let id = graph
            .create_connection(&a, &b, None, CreateOptions::default())
            .unwrap();
        let centers = Centers(Map::from([
            (a.id, Point::new(0.0, 0.0)),
            (b.id, Point::new(100.0, 0.0)),
        ]));

        // Nearest-segment insert on a direct line: index 0
        assert_eq!(
            graph.add_waypoint(id, Point::new(50.0, 10.0), None, &centers),
            Some(0)
        );
        // Explicit hint for the second segment (waypoint → device2)
        assert_eq!(
            graph.add_waypoint(id, Point::new(75.0, 5.0), Some(1), &centers),
            Some(1)
        );
        assert_eq!(graph.get(id).unwrap().waypoints.len(), 2);

        assert!(graph.move_waypoint(id, 0, Point::new(50.0, 20.0)));
        assert!(graph.remove_waypoint_near(id, Point::new(76.0, 5.0)));
        assert_eq!(graph.get(id).unwrap().waypoints[0], Point::new(50.0, 20.0));

        // Out-of-range removal is a no-op
        assert!(!graph.remove_waypoint(id, 5));
        // Removing the last waypoint leaves a direct line, never an error
        assert!(graph.remove_waypoint(id, 0));
        assert!(graph.get(id).unwrap().waypoints.is_empty());
        assert!(!graph.remove_waypoint(id, 0));
    }

    #[test]
    fn remove_is_idempotent() {
        let (mut graph, _) = graph_with_clock();
        let (a, b) = (camera("idem_a"), camera("idem_b"));
        let id = graph
            .create_connection(&a, &b, None, CreateOptions::default())
            .unwrap();
        assert!(graph.remove_connection(id).is_some());
        assert!(graph.remove_connection(id).is_none());
    }
}
