//! Damage-state resolution from named world flags.
//!
//! Characters with tracked wear (Batman and Catwoman) pick a damage level
//! from a family of boolean world flags named
//! `"{internal_name}DamageLevel{N}"`. Levels are scanned from
//! [`MAX_DAMAGE_LEVEL`] down to 0 and the first set flag wins.

use crate::registry::CharacterInfo;

/// Highest wear level a skin can show.
pub const MAX_DAMAGE_LEVEL: u8 = 9;

// ---------------------------------------------------------------------------
// FlagSource
// ---------------------------------------------------------------------------

/// Read-only access to named global boolean flags owned by the host.
pub trait FlagSource {
    /// Whether the named flag is set. Unknown flags read as `false`.
    fn flag(&self, name: &str) -> bool;
}

impl<F: Fn(&str) -> bool> FlagSource for F {
    fn flag(&self, name: &str) -> bool {
        self(name)
    }
}

/// Name of the world flag for `level` on `info`.
pub fn damage_flag_name(info: &CharacterInfo, level: u8) -> String {
    format!("{}DamageLevel{level}", info.internal_name)
}

/// Resolve the damage level for `info`, in `0..=MAX_DAMAGE_LEVEL`.
///
/// Returns 0 without reading any flag for characters that do not track
/// wear, and 0 when no level flag is set.
pub fn resolve_damage_level(info: &CharacterInfo, flags: &(impl FlagSource + ?Sized)) -> u8 {
    if !info.identity.tracks_damage() {
        return 0;
    }

    let level = (0..=MAX_DAMAGE_LEVEL)
        .rev()
        .find(|&level| flags.flag(&damage_flag_name(info, level)))
        .unwrap_or(0);

    tracing::trace!(character = info.internal_name, level, "resolved damage level");
    level
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
