//! Connection data model.
//!
//! Connections are the only entities the graph core owns. Devices belong
//! to the placement subsystem; the core keeps a small registered
//! descriptor per device and queries live centers through [`DeviceQuery`]
//! at render time — positions are never cached here.

use crate::category::{Category, category_for_type};
use crate::geometry::Point;
use crate::id::{ConnectionId, DeviceId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Default stroke color for connection segments.
pub const DEFAULT_COLOR: &str = "#2F74D0";

/// Default connection kind when the caller does not specify one.
pub const DEFAULT_KIND: &str = "network";

/// What the graph core knows about a placed device: identity, type token,
/// and whether it is a channel-numbering panel. Registered on first
/// reference, looked up by id afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRef {
    pub id: DeviceId,
    /// Free-form type token (historically the icon path).
    pub type_token: String,
    /// Panel devices assign sequential channel numbers to their wiring.
    pub is_panel: bool,
    /// Human-readable label shown in popovers. Falls back to the id.
    pub label: Option<String>,
}

impl DeviceRef {
    pub fn new(id: DeviceId, type_token: impl Into<String>) -> Self {
        Self {
            id,
            type_token: type_token.into(),
            is_panel: false,
            label: None,
        }
    }

    pub fn panel(mut self) -> Self {
        self.is_panel = true;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn category(&self) -> Category {
        category_for_type(&self.type_token)
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Live device geometry, answered by the host scene.
///
/// The graph stores device *ids* only; every render queries the current
/// center through this trait so a mid-drag device is drawn where it is,
/// not where it was.
pub trait DeviceQuery {
    fn center(&self, id: DeviceId) -> Option<Point>;
}

/// A user-positioned text label anchored to the path by length ratio, so
/// it tracks waypoint edits without storing an absolute position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTextLabel {
    pub id: String,
    pub text: String,
    /// Position along the polyline as a fraction of total length, [0, 1].
    pub path_ratio: f64,
}

/// Channel assignment on a connection wired into a panel device.
///
/// Number and panel are a single `Option` on [`ConnectionProps`]: they are
/// either both present or both absent, structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// 1-based, monotonically increasing per panel, never reused.
    pub number: u32,
    pub panel: DeviceId,
}

/// Mutable per-connection properties, edited in place by the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProps {
    pub bandwidth: String,
    pub protocol: String,
    pub status: String,
    pub color: String,
    /// Free-text label rendered at the path's length midpoint when
    /// non-empty.
    pub label: String,
    pub show_distance: bool,
    pub custom_labels: SmallVec<[CustomTextLabel; 2]>,
    pub channel: Option<Channel>,
}

impl Default for ConnectionProps {
    fn default() -> Self {
        Self {
            bandwidth: "1Gbps".into(),
            protocol: "Ethernet".into(),
            status: "active".into(),
            color: DEFAULT_COLOR.into(),
            label: String::new(),
            show_distance: true,
            custom_labels: SmallVec::new(),
            channel: None,
        }
    }
}

/// A cabling connection between two devices, with optional waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Sorted-pair id — see [`ConnectionId::for_pair`].
    pub id: ConnectionId,
    /// Endpoints in creation order (distinct from the sorted id).
    pub device1: DeviceId,
    pub device2: DeviceId,
    /// Free-form kind string, not interpreted by the core.
    pub kind: String,
    /// Ordered waypoints: the path runs device1 → waypoints → device2.
    pub waypoints: SmallVec<[Point; 4]>,
    pub props: ConnectionProps,
}

impl Connection {
    pub fn new(device1: DeviceId, device2: DeviceId, kind: Option<&str>) -> Self {
        Self {
            id: ConnectionId::for_pair(device1, device2),
            device1,
            device2,
            kind: kind.unwrap_or(DEFAULT_KIND).to_string(),
            waypoints: SmallVec::new(),
            props: ConnectionProps::default(),
        }
    }

    /// Does this connection touch the given device?
    pub fn touches(&self, device: DeviceId) -> bool {
        self.device1 == device || self.device2 == device
    }

    /// Given one endpoint, the other one.
    pub fn other_end(&self, device: DeviceId) -> Option<DeviceId> {
        if self.device1 == device {
            Some(self.device2)
        } else if self.device2 == device {
            Some(self.device1)
        } else {
            None
        }
    }

    /// The full polyline from live device centers. `None` when either
    /// endpoint cannot be resolved — callers must have run cascading
    /// cleanup before rendering, so this is a contract violation upstream.
    pub fn path(&self, devices: &impl DeviceQuery) -> Option<Vec<Point>> {
        let c1 = devices.center(self.device1)?;
        let c2 = devices.center(self.device2)?;
        let mut path = Vec::with_capacity(self.waypoints.len() + 2);
        path.push(c1);
        path.extend(self.waypoints.iter().copied());
        path.push(c2);
        Some(path)
    }
}
