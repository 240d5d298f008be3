//! The scene-adapter event contract.
//!
//! The host canvas translates its native events (`object:moving`,
//! `selection:created`, `mouse:down`, …) into these variants and feeds
//! them to the [`EditorController`](crate::EditorController) synchronously,
//! in the same event-handling turn they occurred in.

use wp_core::{ConnectionId, DeviceId, Point};

/// What the pointer landed on, resolved by the host's hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Device(DeviceId),
    /// Segment `index` of a rendered connection.
    Segment {
        connection: ConnectionId,
        index: usize,
    },
    /// A waypoint handle.
    Waypoint {
        connection: ConnectionId,
        index: usize,
    },
}

impl HitTarget {
    /// The owning connection, for connection-primitive hits.
    pub fn connection(&self) -> Option<ConnectionId> {
        match self {
            HitTarget::Device(_) => None,
            HitTarget::Segment { connection, .. } | HitTarget::Waypoint { connection, .. } => {
                Some(*connection)
            }
        }
    }
}

/// A scene-adapter event relevant to the topology subsystem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneEvent {
    /// `object:moving` / `object:scaling` / `object:rotating` /
    /// `object:modified` on a tracked device.
    DeviceMoving(DeviceId),
    /// The device was destroyed. Cascading connection removal must run
    /// before any later render in the same turn.
    DeviceRemoved(DeviceId),
    /// An active drag gesture started / ended on a device.
    DragStarted(DeviceId),
    DragEnded(DeviceId),
    /// `selection:created` / `selection:updated`.
    Selected(HitTarget),
    /// `selection:cleared`.
    SelectionCleared,
    /// `mouse:down`, with the double-click flag from the raw event.
    PointerDown {
        at: Point,
        hit: Option<HitTarget>,
        double_click: bool,
    },
    /// The scene removed a primitive (possibly because we asked it to —
    /// the controller's guards sort that out).
    ObjectRemoved(HitTarget),
    /// The canvas's pixels-per-meter scale changed.
    ScaleChanged(f64),
}
