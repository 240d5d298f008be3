//! Graph state → visual artifacts.
//!
//! [`RenderSync`] is the only writer of connection-tagged artifacts. A
//! render pass fully regenerates one connection's artifacts from the
//! connection record and *live* device centers — there is no incremental
//! diffing, and no geometry is cached between passes. User text styling
//! survives regeneration via the store's keyed overrides.

use crate::artifact::{Artifact, ArtifactStore, TextStyle};
use kurbo::Vec2;
use wp_core::{Connection, ConnectionId, DeviceQuery, Point, geometry};

/// Offset of the channel number from the panel device, toward the wire.
const CHANNEL_LABEL_OFFSET_PX: f64 = 30.0;

/// Per-connection flags the highlight machine feeds into a render pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighlightFlags {
    pub highlighted: bool,
    pub waypoints_visible: bool,
}

/// Keeps the artifact store in sync with the connection graph.
#[derive(Debug, Default)]
pub struct RenderSync {
    store: ArtifactStore,
    pixels_per_meter: f64,
}

impl RenderSync {
    pub fn new(pixels_per_meter: f64) -> Self {
        Self {
            store: ArtifactStore::new(),
            pixels_per_meter,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ArtifactStore {
        &mut self.store
    }

    pub fn pixels_per_meter(&self) -> f64 {
        self.pixels_per_meter
    }

    /// Regenerate one connection's artifacts. Idempotent: prior artifacts
    /// are removed first; keyed text styles are re-applied by the store.
    pub fn render_connection(
        &mut self,
        connection: &Connection,
        devices: &impl DeviceQuery,
        flags: HighlightFlags,
    ) {
        self.store.remove(connection.id);
        let Some(path) = connection.path(devices) else {
            // Cascading delete runs before any render pass; reaching this
            // with a missing endpoint is an upstream ordering bug.
            log::warn!("connection {} has a missing endpoint, skipping render", connection.id);
            return;
        };
        let artifacts = build_artifacts(connection, &path, self.pixels_per_meter, flags);
        log::trace!("rendered {} artifacts for {}", artifacts.len(), connection.id);
        self.store.replace(connection.id, artifacts);
    }

    /// Remove everything tagged with this connection, styles included.
    pub fn remove_connection(&mut self, id: ConnectionId) {
        self.store.purge(id);
    }

    pub fn clear(&mut self) {
        self.store = ArtifactStore::new();
    }

    /// Recompute every distance label for a new canvas scale, in place.
    /// Positions, ids, and styling are untouched — no re-render.
    pub fn update_labels_for_scale_change(&mut self, pixels_per_meter: f64) {
        self.pixels_per_meter = pixels_per_meter;
        for artifact in self.store.iter_mut() {
            if let Artifact::DistanceLabel { px_len, text, .. } = artifact {
                *text = format_distance(*px_len, pixels_per_meter);
            }
        }
    }
}

/// `"12.34 m"` from a pixel length and scale.
pub fn format_distance(px_len: f64, pixels_per_meter: f64) -> String {
    if pixels_per_meter > 0.0 {
        format!("{:.2} m", px_len / pixels_per_meter)
    } else {
        // Unscaled canvas: meters are meaningless, show raw pixels.
        format!("{px_len:.0} px")
    }
}

fn build_artifacts(
    connection: &Connection,
    path: &[Point],
    pixels_per_meter: f64,
    flags: HighlightFlags,
) -> Vec<Artifact> {
    let id = connection.id;
    let props = &connection.props;
    let mut artifacts = Vec::with_capacity(path.len() * 2 + 3);

    for (index, pair) in path.windows(2).enumerate() {
        let (from, to) = (pair[0], pair[1]);
        artifacts.push(Artifact::Segment {
            connection: id,
            index,
            from,
            to,
            color: props.color.clone(),
            highlighted: flags.highlighted,
        });
        if props.show_distance {
            let px_len = from.distance(to);
            artifacts.push(Artifact::DistanceLabel {
                connection: id,
                index,
                at: from.midpoint(to),
                px_len,
                text: format_distance(px_len, pixels_per_meter),
                style: TextStyle::default(),
            });
        }
    }

    for (index, waypoint) in connection.waypoints.iter().enumerate() {
        artifacts.push(Artifact::WaypointHandle {
            connection: id,
            index,
            at: *waypoint,
            visible: flags.waypoints_visible,
        });
    }

    // The free-text label sits at 50% of total path length — the
    // cumulative midpoint, not the bounding-box center.
    if !props.label.is_empty()
        && let Some(at) = geometry::point_at_ratio(path, 0.5)
    {
        artifacts.push(Artifact::PathLabel {
            connection: id,
            at,
            text: props.label.clone(),
            style: TextStyle::default(),
        });
    }

    for label in &props.custom_labels {
        if let Some(at) = geometry::point_at_ratio(path, label.path_ratio) {
            artifacts.push(Artifact::TextLabel {
                connection: id,
                label_id: label.id.clone(),
                at,
                text: label.text.clone(),
                style: TextStyle::default(),
            });
        }
    }

    if let Some(channel) = props.channel {
        let at = channel_label_anchor(connection, path, channel.panel);
        artifacts.push(Artifact::ChannelLabel {
            connection: id,
            at,
            text: channel.number.to_string(),
            style: TextStyle {
                bold: true,
                ..TextStyle::default()
            },
        });
    }

    artifacts
}

/// A fixed offset from the panel endpoint, along the first path segment
/// toward the other device.
fn channel_label_anchor(
    connection: &Connection,
    path: &[Point],
    panel: wp_core::DeviceId,
) -> Point {
    let (anchor, toward) = if connection.device1 == panel {
        (path[0], path[1])
    } else {
        (path[path.len() - 1], path[path.len() - 2])
    };
    let direction = Vec2::new(toward.x - anchor.x, toward.y - anchor.y);
    if direction.hypot() == 0.0 {
        return anchor;
    }
    let unit = direction / direction.hypot();
    Point::new(
        anchor.x + unit.x * CHANNEL_LABEL_OFFSET_PX,
        anchor.y + unit.y * CHANNEL_LABEL_OFFSET_PX,
    )
}
