//! Serialization bridge: connections ↔ plain save-file records.
//!
//! The record shape is the host project file's `connections` array. Import
//! tolerates partial and legacy data: every property field has a defensive
//! default, loosely-typed fields (`showDistance`, `channel`) are coerced,
//! and records referencing since-deleted devices are skipped with a
//! warning rather than failing the load.

use crate::geometry::Point;
use crate::graph::{CreateOptions, TopologyGraph};
use crate::id::{ConnectionId, DeviceId};
use crate::model::{Channel, ConnectionProps, CustomTextLabel, DEFAULT_COLOR, DeviceRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

/// Resolves a persisted device id back to a live device. Implemented by
/// the host over its device-placement subsystem.
pub trait DeviceResolver {
    fn resolve(&self, id: DeviceId) -> Option<DeviceRef>;
}

/// One persisted custom text label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRecord {
    pub id: String,
    pub text: String,
    #[serde(default = "default_ratio")]
    pub path_ratio: f64,
}

fn default_ratio() -> f64 {
    0.5
}

/// Persisted connection properties. Loose typing on the fields legacy
/// files are known to mangle; absent and null keys are dropped on export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropsRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Legacy files store booleans as the strings "true"/"false".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_distance: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_text_labels: Vec<LabelRecord>,
    /// Positive integer, numeric string, or junk — coerced on import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel_device_id: Option<String>,
}

/// One persisted connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub id: String,
    pub device1_id: DeviceId,
    pub device2_id: DeviceId,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub properties: PropsRecord,
    #[serde(default)]
    pub split_points: Vec<Point>,
}

impl TopologyGraph {
    /// Serialize every connection, ordered by id so the save file is
    /// stable across runs.
    pub fn export_records(&self) -> Vec<ConnectionRecord> {
        let mut records: Vec<ConnectionRecord> =
            self.connections().map(export_record).collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }

    /// Replace the whole graph with the given records.
    ///
    /// Existing connections are cleared first. Each record is created
    /// through the normal path with validation skipped, then its
    /// properties and waypoints are overwritten with coerced record data.
    /// The panel registry is rebuilt from the imported channels — the old
    /// in-memory registry is not trusted. Returns the ids actually
    /// imported so the caller can re-render them.
    pub fn import_records(
        &mut self,
        records: &[ConnectionRecord],
        resolver: &impl DeviceResolver,
    ) -> Vec<ConnectionId> {
        self.clear_all();

        let mut imported = Vec::with_capacity(records.len());
        for record in records {
            let Some(device1) = resolver.resolve(record.device1_id) else {
                log::warn!("skipping connection {}: device {} is gone", record.id, record.device1_id);
                continue;
            };
            let Some(device2) = resolver.resolve(record.device2_id) else {
                log::warn!("skipping connection {}: device {} is gone", record.id, record.device2_id);
                continue;
            };

            let options = CreateOptions {
                skip_validation: true,
            };
            let id = match self.create_connection(&device1, &device2, record.kind.as_deref(), options)
            {
                Ok(id) => id,
                Err(err) => {
                    // Duplicate records in a hand-edited file land here.
                    log::warn!("skipping connection {}: {err}", record.id);
                    continue;
                }
            };

            let props = coerce_props(&record.properties);
            let waypoints: SmallVec<[Point; 4]> = record
                .split_points
                .iter()
                .copied()
                .filter(|p| p.x.is_finite() && p.y.is_finite())
                .collect();
            self.overwrite(id, |c| {
                c.props = props;
                c.waypoints = waypoints;
            });
            imported.push(id);
        }

        self.rebuild_channel_registry();
        imported
    }
}

fn export_record(connection: &crate::model::Connection) -> ConnectionRecord {
    let props = &connection.props;
    ConnectionRecord {
        id: connection.id.as_str().to_string(),
        device1_id: connection.device1,
        device2_id: connection.device2,
        kind: Some(connection.kind.clone()),
        properties: PropsRecord {
            bandwidth: Some(props.bandwidth.clone()),
            protocol: Some(props.protocol.clone()),
            status: Some(props.status.clone()),
            color: Some(props.color.clone()),
            label: (!props.label.is_empty()).then(|| props.label.clone()),
            show_distance: Some(Value::Bool(props.show_distance)),
            custom_text_labels: props
                .custom_labels
                .iter()
                .map(|l| LabelRecord {
                    id: l.id.clone(),
                    text: l.text.clone(),
                    path_ratio: if l.path_ratio.is_finite() {
                        l.path_ratio
                    } else {
                        0.5
                    },
                })
                .collect(),
            channel: props.channel.map(|ch| Value::from(ch.number)),
            panel_device_id: props.channel.map(|ch| ch.panel.as_str().to_string()),
        },
        split_points: connection.waypoints.to_vec(),
    }
}

/// Apply the defensive defaults of the import path.
fn coerce_props(record: &PropsRecord) -> ConnectionProps {
    let defaults = ConnectionProps::default();

    let panel = record
        .panel_device_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(DeviceId::intern);
    // Channel and panel stand or fall together.
    let channel = panel.and_then(|panel| {
        coerce_channel(record.channel.as_ref()).map(|number| Channel { number, panel })
    });

    ConnectionProps {
        bandwidth: non_empty(&record.bandwidth).unwrap_or(defaults.bandwidth),
        protocol: non_empty(&record.protocol).unwrap_or(defaults.protocol),
        status: non_empty(&record.status).unwrap_or(defaults.status),
        color: record
            .color
            .as_deref()
            .map(str::trim)
            .filter(|c| is_valid_color(c))
            .map(str::to_string)
            .unwrap_or(defaults.color),
        label: non_empty(&record.label).unwrap_or_default(),
        show_distance: coerce_show_distance(record.show_distance.as_ref()),
        custom_labels: record
            .custom_text_labels
            .iter()
            .map(|l| CustomTextLabel {
                id: l.id.clone(),
                text: l.text.clone(),
                path_ratio: if l.path_ratio.is_finite() {
                    l.path_ratio.clamp(0.0, 1.0)
                } else {
                    0.5
                },
            })
            .collect(),
        channel,
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A usable stroke color: `#RGB`/`#RRGGBB`/`#RRGGBBAA` hex, or a CSS
/// color name (left to the canvas to interpret).
fn is_valid_color(color: &str) -> bool {
    if let Some(hex) = color.strip_prefix('#') {
        matches!(hex.len(), 3 | 6 | 8) && hex.bytes().all(|b| b.is_ascii_hexdigit())
    } else {
        !color.is_empty() && color.bytes().all(|b| b.is_ascii_alphabetic())
    }
}

fn coerce_show_distance(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.trim().eq_ignore_ascii_case("false"),
        _ => true,
    }
}

fn coerce_channel(value: Option<&Value>) -> Option<u32> {
    let number = match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    (number > 0).then_some(u32::try_from(number).ok()?)
}
