//! Knightswap Roster -- the fixed playable roster and its asset metadata.
//!
//! This crate holds the pure-data half of the character swap controller:
//!
//! - [`CharacterIdentity`](identity::CharacterIdentity): the closed set of
//!   playable characters, used only as a lookup key.
//! - [`CharacterInfo`](registry::CharacterInfo): per-character asset metadata
//!   with derived package and skin identifiers (normal and story-DLC).
//! - [`resolve_damage_level`](damage::resolve_damage_level): maps named world
//!   flags to the wear level of a character's skin.
//!
//! Nothing in here mutates state. The roster table is a `static` fixed at
//! compile time.
//!
//! # Quick Start
//!
//! ```
//! use knightswap_roster::prelude::*;
//!
//! let info = lookup(CharacterIdentity::Catwoman);
//! assert_eq!(info.internal_name, "Catwoman");
//! assert_eq!(info.base_package(), "Playable_Catwoman_SF");
//! assert_eq!(info.skin_id(), "Playable_Catwoman_Standard");
//! assert_eq!(info.skin_package(), "Playable_Catwoman_Standard_SF");
//! ```

#![deny(unsafe_code)]

pub mod damage;
pub mod identity;
pub mod registry;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced when converting raw values into roster types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RosterError {
    /// A numeric identity outside the closed roster was supplied.
    #[error("character index {index} is not in the roster (valid: 0..{len})")]
    UnknownIdentity {
        index: u8,
        len: usize,
    },

    /// A character name that does not match any roster entry.
    #[error("unknown character name '{name}'. Known characters: [{known}]")]
    UnknownName {
        name: String,
        known: String,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::damage::{damage_flag_name, resolve_damage_level, FlagSource, MAX_DAMAGE_LEVEL};
    pub use crate::identity::CharacterIdentity;
    pub use crate::registry::{lookup, roster, CharacterInfo, DEFAULT_SKIN_VARIANT, PACKAGE_SUFFIX};
    pub use crate::RosterError;
}
