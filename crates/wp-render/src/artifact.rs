//! Tagged visual artifacts and their side index.
//!
//! Every primitive drawn for a connection is a variant of [`Artifact`],
//! carrying its owning connection id. Artifacts live in the
//! [`ArtifactStore`], keyed by connection id, so removal and restyling
//! never scan ad hoc flags on generic scene objects. The store is derived
//! state: the graph is always the source of truth, and a connection's
//! artifacts are fully regenerated on every render.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wp_core::{ConnectionId, Point};

/// Draw layers, back to front. Devices are painted by the host between
/// `Segments` and `Labels`; waypoint handles stay on top so they remain
/// grabbable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ZLayer {
    Segments,
    Labels,
    Handles,
}

/// User-applied text styling that must survive re-renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_size: f64,
    pub color: Option<String>,
    pub bold: bool,
    pub background: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            color: None,
            bold: false,
            background: None,
        }
    }
}

/// Stable sub-identifier for a text artifact within one connection.
/// Styling overrides are keyed by this, so they survive regeneration
/// triggered by an unrelated device move.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextKey {
    /// Distance label of segment `i`.
    Distance(usize),
    /// The `properties.label` text at the path midpoint.
    PathLabel,
    /// A custom text label, by its id.
    Custom(String),
    Channel,
}

/// One visual primitive owned by a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Artifact {
    /// One line per consecutive path point pair.
    Segment {
        connection: ConnectionId,
        index: usize,
        from: Point,
        to: Point,
        color: String,
        highlighted: bool,
    },
    /// Draggable handle over waypoint `index`.
    WaypointHandle {
        connection: ConnectionId,
        index: usize,
        at: Point,
        visible: bool,
    },
    /// Real-world length of segment `index`, at its midpoint.
    DistanceLabel {
        connection: ConnectionId,
        index: usize,
        at: Point,
        /// Pixel length, kept so a scale change can relabel in place.
        px_len: f64,
        text: String,
        style: TextStyle,
    },
    /// `properties.label` at 50% of total path length.
    PathLabel {
        connection: ConnectionId,
        at: Point,
        text: String,
        style: TextStyle,
    },
    /// A ratio-anchored custom text label.
    TextLabel {
        connection: ConnectionId,
        label_id: String,
        at: Point,
        text: String,
        style: TextStyle,
    },
    /// Bold channel number near the panel endpoint.
    ChannelLabel {
        connection: ConnectionId,
        at: Point,
        text: String,
        style: TextStyle,
    },
}

impl Artifact {
    pub fn connection(&self) -> ConnectionId {
        match self {
            Artifact::Segment { connection, .. }
            | Artifact::WaypointHandle { connection, .. }
            | Artifact::DistanceLabel { connection, .. }
            | Artifact::PathLabel { connection, .. }
            | Artifact::TextLabel { connection, .. }
            | Artifact::ChannelLabel { connection, .. } => *connection,
        }
    }

    pub fn layer(&self) -> ZLayer {
        match self {
            Artifact::Segment { .. } => ZLayer::Segments,
            Artifact::WaypointHandle { .. } => ZLayer::Handles,
            _ => ZLayer::Labels,
        }
    }

    /// The styling key, for text-bearing artifacts.
    pub fn text_key(&self) -> Option<TextKey> {
        match self {
            Artifact::DistanceLabel { index, .. } => Some(TextKey::Distance(*index)),
            Artifact::PathLabel { .. } => Some(TextKey::PathLabel),
            Artifact::TextLabel { label_id, .. } => Some(TextKey::Custom(label_id.clone())),
            Artifact::ChannelLabel { .. } => Some(TextKey::Channel),
            _ => None,
        }
    }
}

/// Side index of all connection artifacts plus the persisted text styles.
#[derive(Debug, Default)]
pub struct ArtifactStore {
    artifacts: HashMap<ConnectionId, Vec<Artifact>>,
    text_styles: HashMap<(ConnectionId, TextKey), TextStyle>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a freshly rendered artifact list, re-applying any saved
    /// text styles by key.
    pub fn replace(&mut self, connection: ConnectionId, mut artifacts: Vec<Artifact>) {
        for artifact in &mut artifacts {
            if let Some(key) = artifact.text_key()
                && let Some(saved) = self.text_styles.get(&(connection, key))
            {
                apply_style(artifact, saved.clone());
            }
        }
        self.artifacts.insert(connection, artifacts);
    }

    /// Drop every artifact tagged with this connection. Styles are kept:
    /// a removal during re-render must not lose user styling.
    pub fn remove(&mut self, connection: ConnectionId) -> Vec<Artifact> {
        self.artifacts.remove(&connection).unwrap_or_default()
    }

    /// Drop the styles too — the connection is gone for good.
    pub fn purge(&mut self, connection: ConnectionId) -> Vec<Artifact> {
        self.text_styles.retain(|(c, _), _| *c != connection);
        self.artifacts.remove(&connection).unwrap_or_default()
    }

    pub fn artifacts(&self, connection: ConnectionId) -> &[Artifact] {
        self.artifacts
            .get(&connection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.artifacts.keys().copied()
    }

    /// Everything, back to front: segments, then labels, then handles.
    pub fn draw_order(&self) -> Vec<&Artifact> {
        let mut all: Vec<&Artifact> = self.artifacts.values().flatten().collect();
        all.sort_by_key(|a| a.layer());
        all
    }

    /// Persist a user styling override and apply it to the live artifact.
    pub fn set_text_style(&mut self, connection: ConnectionId, key: TextKey, style: TextStyle) {
        if let Some(artifacts) = self.artifacts.get_mut(&connection) {
            for artifact in artifacts.iter_mut() {
                if artifact.text_key().as_ref() == Some(&key) {
                    apply_style(artifact, style.clone());
                }
            }
        }
        self.text_styles.insert((connection, key), style);
    }

    /// Restyle a connection's segments and waypoint handles in place,
    /// without regenerating geometry.
    pub fn apply_highlight(
        &mut self,
        connection: ConnectionId,
        highlight: bool,
        waypoints_visible: bool,
    ) {
        let Some(artifacts) = self.artifacts.get_mut(&connection) else {
            return;
        };
        for artifact in artifacts.iter_mut() {
            match artifact {
                Artifact::Segment { highlighted, .. } => *highlighted = highlight,
                Artifact::WaypointHandle { visible, .. } => *visible = waypoints_visible,
                _ => {}
            }
        }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Artifact> {
        self.artifacts.values_mut().flatten()
    }
}

fn apply_style(artifact: &mut Artifact, new: TextStyle) {
    match artifact {
        Artifact::DistanceLabel { style, .. }
        | Artifact::PathLabel { style, .. }
        | Artifact::TextLabel { style, .. }
        | Artifact::ChannelLabel { style, .. } => *style = new,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(conn: ConnectionId, index: usize) -> Artifact {
        Artifact::Segment {
            connection: conn,
            index,
            from: Point::new(0.0, 0.0),
            to: Point::new(1.0, 0.0),
            color: "#000000".into(),
            highlighted: false,
        }
    }

    fn distance(conn: ConnectionId, index: usize) -> Artifact {
        Artifact::DistanceLabel {
            connection: conn,
            index,
            at: Point::new(0.5, 0.0),
            px_len: 1.0,
            text: "0.06 m".into(),
            style: TextStyle::default(),
        }
    }

    #[test]
    fn draw_order_is_layered() {
        let conn = ConnectionId::intern("store_a__store_b");
        let mut store = ArtifactStore::new();
        store.replace(conn, vec![
            Artifact::WaypointHandle {
                connection: conn,
                index: 0,
                at: Point::new(0.0, 0.0),
                visible: false,
            },
            distance(conn, 0),
            segment(conn, 0),
        ]);

        let layers: Vec<ZLayer> = store.draw_order().iter().map(|a| a.layer()).collect();
        assert_eq!(layers, vec![ZLayer::Segments, ZLayer::Labels, ZLayer::Handles]);
    }

    #[test]
    fn text_styles_survive_replacement() {
        let conn = ConnectionId::intern("style_a__style_b");
        let mut store = ArtifactStore::new();
        store.replace(conn, vec![distance(conn, 0)]);

        let custom = TextStyle {
            font_size: 18.0,
            color: Some("#FF0000".into()),
            ..TextStyle::default()
        };
        store.set_text_style(conn, TextKey::Distance(0), custom.clone());

        // A re-render replaces the artifact list wholesale
        store.replace(conn, vec![distance(conn, 0), segment(conn, 0)]);
        match &store.artifacts(conn)[0] {
            Artifact::DistanceLabel { style, .. } => assert_eq!(*style, custom),
            other => panic!("expected DistanceLabel, got {other:?}"),
        }

        // Purge drops the style; a later replace gets the default back
        store.purge(conn);
        store.replace(conn, vec![distance(conn, 0)]);
        match &store.artifacts(conn)[0] {
            Artifact::DistanceLabel { style, .. } => assert_eq!(*style, TextStyle::default()),
            other => panic!("expected DistanceLabel, got {other:?}"),
        }
    }

    #[test]
    fn highlight_flips_segments_and_handles_only() {
        let conn = ConnectionId::intern("hl_a__hl_b");
        let mut store = ArtifactStore::new();
        store.replace(conn, vec![
            segment(conn, 0),
            Artifact::WaypointHandle {
                connection: conn,
                index: 0,
                at: Point::new(0.0, 0.0),
                visible: false,
            },
            distance(conn, 0),
        ]);

        store.apply_highlight(conn, true, true);
        for artifact in store.artifacts(conn) {
            match artifact {
                Artifact::Segment { highlighted, .. } => assert!(*highlighted),
                Artifact::WaypointHandle { visible, .. } => assert!(*visible),
                Artifact::DistanceLabel { style, .. } => {
                    assert_eq!(*style, TextStyle::default())
                }
                _ => {}
            }
        }
    }
}
