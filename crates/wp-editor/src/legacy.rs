//! Best-effort migration of pre-graph-model save files.
//!
//! Old versions drew connections as plain, non-interactive lines with a
//! hard-coded stroke and no connection tag. After importing a legacy
//! project the canvas can still hold those orphans; this pass picks out
//! the ones that are provably not ours so the host can delete them.

use wp_core::{ConnectionId, DEFAULT_COLOR};

/// A plain line primitive as enumerated by the host canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasLine {
    /// The host's own object identifier.
    pub object_id: String,
    pub stroke: String,
    pub selectable: bool,
    pub evented: bool,
    /// Set when the line is tagged as a known connection segment or
    /// waypoint.
    pub connection: Option<ConnectionId>,
}

/// Which of these lines are legacy leftovers?
///
/// A leftover matches the old hard-coded connection stroke, is
/// non-interactive, and carries no tag for a connection we know about.
pub fn sweep_legacy_lines<'a>(
    lines: &'a [CanvasLine],
    is_known: impl Fn(ConnectionId) -> bool,
) -> Vec<&'a str> {
    lines
        .iter()
        .filter(|line| {
            line.stroke.eq_ignore_ascii_case(DEFAULT_COLOR) && !line.selectable && !line.evented
        })
        .filter(|line| !line.connection.is_some_and(&is_known))
        .map(|line| {
            log::debug!("sweeping legacy line {}", line.object_id);
            line.object_id.as_str()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, stroke: &str, interactive: bool, conn: Option<ConnectionId>) -> CanvasLine {
        CanvasLine {
            object_id: id.into(),
            stroke: stroke.into(),
            selectable: interactive,
            evented: interactive,
            connection: conn,
        }
    }

    #[test]
    fn sweeps_only_untagged_legacy_strokes() {
        let known = ConnectionId::intern("leg_a__leg_b");
        let lines = vec![
            // Legacy orphan: old stroke, inert, no tag
            line("orphan", DEFAULT_COLOR, false, None),
            // Tagged and known: ours, keep
            line("tagged", DEFAULT_COLOR, false, Some(known)),
            // Tagged but unknown (stale tag): sweep
            line("stale", DEFAULT_COLOR, false, Some(ConnectionId::intern("x__y"))),
            // Interactive line the user drew: keep
            line("drawn", DEFAULT_COLOR, true, None),
            // Different stroke: keep
            line("wall", "#000000", false, None),
        ];

        let swept = sweep_legacy_lines(&lines, |id| id == known);
        assert_eq!(swept, vec!["orphan", "stale"]);
    }
}
