//! The closed set of playable characters.
//!
//! [`CharacterIdentity`] is a lookup key into the roster table. Its numeric
//! value is the index into that table and carries no other meaning.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RosterError;

// ---------------------------------------------------------------------------
// CharacterIdentity
// ---------------------------------------------------------------------------

/// One of the five playable characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CharacterIdentity {
    /// The default/base identity, Bruce Wayne out of costume.
    BruceWayne = 0,
    Batman = 1,
    Catwoman = 2,
    Robin = 3,
    Nightwing = 4,
}

impl CharacterIdentity {
    /// Every identity, in roster order.
    pub const ALL: [CharacterIdentity; 5] = [
        CharacterIdentity::BruceWayne,
        CharacterIdentity::Batman,
        CharacterIdentity::Catwoman,
        CharacterIdentity::Robin,
        CharacterIdentity::Nightwing,
    ];

    /// Index of this identity in the roster table.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The variant name, e.g. `"BruceWayne"`.
    pub const fn name(self) -> &'static str {
        match self {
            CharacterIdentity::BruceWayne => "BruceWayne",
            CharacterIdentity::Batman => "Batman",
            CharacterIdentity::Catwoman => "Catwoman",
            CharacterIdentity::Robin => "Robin",
            CharacterIdentity::Nightwing => "Nightwing",
        }
    }

    /// Whether this character's skin has tracked wear states.
    pub const fn tracks_damage(self) -> bool {
        matches!(self, CharacterIdentity::Batman | CharacterIdentity::Catwoman)
    }
}

impl fmt::Display for CharacterIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for CharacterIdentity {
    type Error = RosterError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        CharacterIdentity::ALL
            .get(value as usize)
            .copied()
            .ok_or(RosterError::UnknownIdentity {
                index: value,
                len: CharacterIdentity::ALL.len(),
            })
    }
}

impl FromStr for CharacterIdentity {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CharacterIdentity::ALL
            .iter()
            .copied()
            .find(|id| id.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| RosterError::UnknownName {
                name: s.to_owned(),
                known: CharacterIdentity::ALL
                    .iter()
                    .map(|id| id.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
