//! The highlight state machine.
//!
//! Exactly one highlight state is active at any instant. Transitions are
//! driven by selection and drag events; the state is transient and never
//! persisted.

use crate::input::{HitTarget, SceneEvent};
use wp_core::{Connection, ConnectionId, DeviceId};
use wp_render::HighlightFlags;

/// The single global highlight state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    /// Nothing selected: default segment styles, all waypoints hidden.
    #[default]
    None,
    /// A device is mid-drag: every waypoint on the whole graph becomes
    /// visible (so it can be grabbed during the drag), and segments
    /// touching the dragged device are additionally highlighted.
    All { dragging: DeviceId },
    /// A device is selected: its connections highlight, their waypoints
    /// show.
    Device(DeviceId),
    /// One connection is selected (via a segment or a waypoint handle).
    Connection(ConnectionId),
}

impl Highlight {
    /// Apply an event. Returns the next state; events that do not affect
    /// highlighting leave the state unchanged.
    pub fn transition(self, event: &SceneEvent) -> Highlight {
        match event {
            SceneEvent::Selected(HitTarget::Device(id)) => Highlight::Device(*id),
            SceneEvent::Selected(hit) => match hit.connection() {
                Some(connection) => Highlight::Connection(connection),
                None => self,
            },
            SceneEvent::SelectionCleared => Highlight::None,
            SceneEvent::PointerDown { hit: None, .. } => Highlight::None,
            SceneEvent::DragStarted(id) => Highlight::All { dragging: *id },
            // The dragged device stays selected when the gesture ends.
            SceneEvent::DragEnded(id) => Highlight::Device(*id),
            _ => self,
        }
    }

    /// The per-connection styling this state implies.
    pub fn flags_for(self, connection: &Connection) -> HighlightFlags {
        match self {
            Highlight::None => HighlightFlags::default(),
            Highlight::All { dragging } => HighlightFlags {
                highlighted: connection.touches(dragging),
                waypoints_visible: true,
            },
            Highlight::Device(device) => {
                let on = connection.touches(device);
                HighlightFlags {
                    highlighted: on,
                    waypoints_visible: on,
                }
            }
            Highlight::Connection(id) => {
                let on = connection.id == id;
                HighlightFlags {
                    highlighted: on,
                    waypoints_visible: on,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wp_core::Point;

    fn conn(a: &str, b: &str) -> Connection {
        Connection::new(DeviceId::intern(a), DeviceId::intern(b), None)
    }

    #[test]
    fn selection_transitions() {
        let d = DeviceId::intern("hl_dev");
        let c = conn("hl_x", "hl_y");

        let state = Highlight::None.transition(&SceneEvent::Selected(HitTarget::Device(d)));
        assert_eq!(state, Highlight::Device(d));

        // Selecting a connection replaces the device highlight entirely
        let state = state.transition(&SceneEvent::Selected(HitTarget::Segment {
            connection: c.id,
            index: 0,
        }));
        assert_eq!(state, Highlight::Connection(c.id));

        let state = state.transition(&SceneEvent::SelectionCleared);
        assert_eq!(state, Highlight::None);
    }

    #[test]
    fn empty_canvas_click_clears() {
        let d = DeviceId::intern("hl_click");
        let state = Highlight::Device(d).transition(&SceneEvent::PointerDown {
            at: Point::new(10.0, 10.0),
            hit: None,
            double_click: false,
        });
        assert_eq!(state, Highlight::None);
    }

    #[test]
    fn drag_shows_all_waypoints() {
        let dragged = DeviceId::intern("hl_dragged");
        let touching = conn("hl_dragged", "hl_other");
        let elsewhere = conn("hl_far1", "hl_far2");

        let state = Highlight::None.transition(&SceneEvent::DragStarted(dragged));
        let near = state.flags_for(&touching);
        let far = state.flags_for(&elsewhere);

        assert!(near.highlighted && near.waypoints_visible);
        assert!(!far.highlighted);
        // Waypoints are visible graph-wide during a drag
        assert!(far.waypoints_visible);

        let state = state.transition(&SceneEvent::DragEnded(dragged));
        assert_eq!(state, Highlight::Device(dragged));
        assert!(!state.flags_for(&elsewhere).waypoints_visible);
    }

    #[test]
    fn exactly_one_connection_highlighted() {
        let c1 = conn("hl_ex_a", "hl_ex_b");
        let c2 = conn("hl_ex_a", "hl_ex_c");

        // Select the shared device, then one connection: only that
        // connection stays highlighted.
        let state = Highlight::Device(DeviceId::intern("hl_ex_a")).transition(
            &SceneEvent::Selected(HitTarget::Waypoint {
                connection: c2.id,
                index: 0,
            }),
        );
        assert!(!state.flags_for(&c1).highlighted);
        assert!(state.flags_for(&c2).highlighted);
    }
}
