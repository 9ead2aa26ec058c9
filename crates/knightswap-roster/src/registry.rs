//! The static character registry.
//!
//! Each [`CharacterIdentity`] maps to exactly one [`CharacterInfo`]. The
//! table is a `static` array indexed by [`CharacterIdentity::index`], so
//! [`lookup`] is total over the closed set and cannot fail.
//!
//! Package and skin identifiers are derived on demand from the stored
//! fields:
//!
//! | derived              | rule                                                        |
//! |----------------------|-------------------------------------------------------------|
//! | `base_package`       | `asset_base + "_SF"`                                        |
//! | `skin_id`            | `asset_base + "_" + skin_variant`                           |
//! | `skin_package`       | `skin_id + "_SF"`                                           |
//! | `dlc_base_package`   | `dlc_asset_base + "_SF"`, else `base_package`               |
//! | `dlc_skin_id`        | `dlc_asset_base + "_" + skin_variant` if default skin, else `skin_id` |
//! | `dlc_skin_package`   | `dlc_skin_id + "_SF"`                                       |

use serde::Serialize;

use crate::identity::CharacterIdentity;

/// Suffix appended to an asset name to form its content package name.
pub const PACKAGE_SUFFIX: &str = "_SF";

/// The skin variant every character ships with.
pub const DEFAULT_SKIN_VARIANT: &str = "Standard";

// ---------------------------------------------------------------------------
// CharacterInfo
// ---------------------------------------------------------------------------

/// Immutable asset metadata for one playable character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterInfo {
    /// The identity this record belongs to.
    pub identity: CharacterIdentity,
    /// Name the engine uses to recognize the loaded character.
    pub internal_name: &'static str,
    /// Prefix for normal-mode packages.
    pub asset_base: &'static str,
    /// Skin variant, e.g. `"Standard"` or `"Animated"`.
    pub skin_variant: &'static str,
    /// Prefix used only inside the story-DLC content. `None` reuses the
    /// normal-mode assets unchanged.
    pub dlc_asset_base: Option<&'static str>,
}

impl CharacterInfo {
    /// Build a record. Used for the static table and for custom rosters in
    /// tests.
    pub const fn new(
        identity: CharacterIdentity,
        internal_name: &'static str,
        asset_base: &'static str,
        skin_variant: &'static str,
        dlc_asset_base: Option<&'static str>,
    ) -> Self {
        Self {
            identity,
            internal_name,
            asset_base,
            skin_variant,
            dlc_asset_base,
        }
    }

    /// Base content package, e.g. `Playable_Batman_SF`.
    pub fn base_package(&self) -> String {
        format!("{}{PACKAGE_SUFFIX}", self.asset_base)
    }

    /// Skin identifier, e.g. `Playable_Batman_Standard`.
    pub fn skin_id(&self) -> String {
        format!("{}_{}", self.asset_base, self.skin_variant)
    }

    /// Skin content package, e.g. `Playable_Batman_Standard_SF`.
    pub fn skin_package(&self) -> String {
        format!("{}{PACKAGE_SUFFIX}", self.skin_id())
    }

    /// Whether the skin is the default variant.
    pub fn is_default_skin(&self) -> bool {
        self.skin_variant == DEFAULT_SKIN_VARIANT
    }

    pub fn dlc_base_package(&self) -> String {
        match self.dlc_asset_base {
            Some(dlc_base) => format!("{dlc_base}{PACKAGE_SUFFIX}"),
            None => self.base_package(),
        }
    }

    /// Skin identifier inside the story-DLC content.
    ///
    /// Only the default skin has a DLC-specific asset; every other skin
    /// falls back to [`skin_id`](Self::skin_id).
    pub fn dlc_skin_id(&self) -> String {
        match self.dlc_asset_base {
            Some(dlc_base) if self.is_default_skin() => {
                format!("{dlc_base}_{}", self.skin_variant)
            }
            _ => self.skin_id(),
        }
    }

    pub fn dlc_skin_package(&self) -> String {
        format!("{}{PACKAGE_SUFFIX}", self.dlc_skin_id())
    }
}

// ---------------------------------------------------------------------------
// Roster table
// ---------------------------------------------------------------------------

static ROSTER: [CharacterInfo; 5] = [
    CharacterInfo::new(
        CharacterIdentity::BruceWayne,
        "BruceWayne",
        "Playable_BruceWayne",
        DEFAULT_SKIN_VARIANT,
        None,
    ),
    CharacterInfo::new(
        CharacterIdentity::Batman,
        "Batman",
        "Playable_Batman",
        DEFAULT_SKIN_VARIANT,
        Some("Playable_Batman_HQ"),
    ),
    CharacterInfo::new(
        CharacterIdentity::Catwoman,
        "Catwoman",
        "Playable_Catwoman",
        DEFAULT_SKIN_VARIANT,
        None,
    ),
    CharacterInfo::new(
        CharacterIdentity::Robin,
        "Robin",
        "Playable_Robin",
        DEFAULT_SKIN_VARIANT,
        Some("Playable_Robin_HQ"),
    ),
    CharacterInfo::new(
        CharacterIdentity::Nightwing,
        "Nightwing",
        "Playable_Nightwing",
        DEFAULT_SKIN_VARIANT,
        None,
    ),
];

/// Look up the metadata for `identity`.
pub fn lookup(identity: CharacterIdentity) -> &'static CharacterInfo {
    let info = &ROSTER[identity.index()];
    debug_assert_eq!(info.identity, identity, "roster table out of order");
    info
}

/// The whole roster, in identity order.
pub fn roster() -> &'static [CharacterInfo] {
    &ROSTER
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
