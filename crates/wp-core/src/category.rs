//! Device categories and the connection compatibility predicate.
//!
//! Devices carry a free-form type token (historically the icon file name,
//! e.g. `icons/cctv/fixed-camera.png`). The token maps to a coarse
//! category, and two devices may be wired together only when their
//! categories are compatible: identical categories always are, and the
//! universal-bridge categories (`networks`, `custom`) connect to anything.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse device classification used to gate connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cctv,
    Access,
    Intruder,
    Fire,
    Networks,
    Custom,
}

impl Category {
    /// Bridge categories may connect to any other category.
    pub fn is_bridge(self) -> bool {
        matches!(self, Category::Networks | Category::Custom)
    }

    pub const ALL: [Category; 6] = [
        Category::Cctv,
        Category::Access,
        Category::Intruder,
        Category::Fire,
        Category::Networks,
        Category::Custom,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Cctv => "cctv",
            Category::Access => "access",
            Category::Intruder => "intruder",
            Category::Fire => "fire",
            Category::Networks => "networks",
            Category::Custom => "custom",
        };
        write!(f, "{name}")
    }
}

/// Exact type-token stems from the device catalog.
const TYPE_TABLE: &[(&str, Category)] = &[
    ("fixed-camera", Category::Cctv),
    ("ptz-camera", Category::Cctv),
    ("dome-camera", Category::Cctv),
    ("bullet-camera", Category::Cctv),
    ("nvr", Category::Networks),
    ("dvr", Category::Networks),
    ("card-reader", Category::Access),
    ("keypad", Category::Access),
    ("door-contact", Category::Access),
    ("maglock", Category::Access),
    ("electric-strike", Category::Access),
    ("access-panel", Category::Access),
    ("motion-sensor", Category::Intruder),
    ("pir", Category::Intruder),
    ("glass-break", Category::Intruder),
    ("shock-sensor", Category::Intruder),
    ("alarm-panel", Category::Intruder),
    ("siren", Category::Intruder),
    ("fire-alarm", Category::Fire),
    ("smoke-detector", Category::Fire),
    ("heat-detector", Category::Fire),
    ("call-point", Category::Fire),
    ("fire-panel", Category::Fire),
    ("sounder", Category::Fire),
    ("switch", Category::Networks),
    ("router", Category::Networks),
    ("access-point", Category::Networks),
    ("patch-panel", Category::Networks),
    ("server", Category::Networks),
];

/// Keyword fallback for tokens not in the exact table (e.g. a vendor
/// variant like `ptz-camera-03`).
const KEYWORD_TABLE: &[(&str, Category)] = &[
    ("camera", Category::Cctv),
    ("cctv", Category::Cctv),
    ("fire", Category::Fire),
    ("smoke", Category::Fire),
    ("access", Category::Access),
    ("door", Category::Access),
    ("reader", Category::Access),
    ("intruder", Category::Intruder),
    ("alarm", Category::Intruder),
    ("sensor", Category::Intruder),
    ("network", Category::Networks),
    ("switch", Category::Networks),
];

/// Map a device type token to its category.
///
/// The token is matched case-insensitively with any directory prefix and
/// file extension stripped. Unmatched tokens fall back to `Custom`, which
/// is a universal bridge — an unknown device never blocks a connection.
pub fn category_for_type(type_token: &str) -> Category {
    let stem = strip_token(type_token);
    for &(name, cat) in TYPE_TABLE {
        if stem == name {
            return cat;
        }
    }
    for &(keyword, cat) in KEYWORD_TABLE {
        if stem.contains(keyword) {
            return cat;
        }
    }
    Category::Custom
}

/// Lowercased file stem of a type token: directories and the last
/// extension removed.
fn strip_token(token: &str) -> String {
    let base = token.rsplit(['/', '\\']).next().unwrap_or(token);
    let stem = match base.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => base,
    };
    stem.trim().to_ascii_lowercase()
}

/// May devices of these categories be wired together?
pub fn compatible(a: Category, b: Category) -> bool {
    a == b || a.is_bridge() || b.is_bridge()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_lookup_strips_path_and_extension() {
        assert_eq!(category_for_type("icons/cctv/fixed-camera.png"), Category::Cctv);
        assert_eq!(category_for_type("FIRE-ALARM.PNG"), Category::Fire);
        assert_eq!(category_for_type("door-contact"), Category::Access);
    }

    #[test]
    fn keyword_fallback_catches_variants() {
        assert_eq!(category_for_type("ptz-camera-03.png"), Category::Cctv);
        assert_eq!(category_for_type("smoke-vent.svg"), Category::Fire);
    }

    #[test]
    fn unknown_tokens_default_to_custom() {
        assert_eq!(category_for_type("beverage-fridge.png"), Category::Custom);
        assert_eq!(category_for_type(""), Category::Custom);
    }

    #[test]
    fn identical_categories_are_compatible() {
        for cat in Category::ALL {
            assert!(compatible(cat, cat));
        }
    }

    #[test]
    fn bridges_connect_to_everything() {
        for cat in Category::ALL {
            assert!(compatible(Category::Networks, cat));
            assert!(compatible(cat, Category::Custom));
        }
    }

    #[test]
    fn compatibility_is_symmetric() {
        for a in Category::ALL {
            for b in Category::ALL {
                assert_eq!(compatible(a, b), compatible(b, a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn cross_subsystem_pairs_are_blocked() {
        assert!(!compatible(Category::Cctv, Category::Fire));
        assert!(!compatible(Category::Access, Category::Intruder));
    }
}
