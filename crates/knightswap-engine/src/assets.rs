//! Asset loading for the swap target.
//!
//! [`AssetPlan::resolve`] picks the normal or story-DLC package names from
//! a [`CharacterInfo`]. [`AssetPlan::load`] requests both packages from the
//! engine, and [`AssetPlan::spawn`] instantiates the character from the
//! resolved skin.

use knightswap_roster::registry::CharacterInfo;
use serde::{Deserialize, Serialize};

use crate::host::{ActorHandle, HostEngine, Transform};
use crate::EngineError;

// ---------------------------------------------------------------------------
// AssetPlan
// ---------------------------------------------------------------------------

/// The packages and skin identifier to request for one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPlan {
    pub base_package: String,
    pub skin_package: String,
    pub skin_id: String,
}

impl AssetPlan {
    /// Select DLC or normal asset names for `info`.
    pub fn resolve(info: &CharacterInfo, is_story_dlc: bool) -> Self {
        if is_story_dlc {
            Self {
                base_package: info.dlc_base_package(),
                skin_package: info.dlc_skin_package(),
                skin_id: info.dlc_skin_id(),
            }
        } else {
            Self {
                base_package: info.base_package(),
                skin_package: info.skin_package(),
                skin_id: info.skin_id(),
            }
        }
    }

    /// Load the base package, then the skin package.
    pub fn load<E: HostEngine + ?Sized>(&self, engine: &mut E) -> Result<(), EngineError> {
        for package in [&self.base_package, &self.skin_package] {
            tracing::trace!(package = %package, "loading package");
            engine.load_package(package)?;
        }
        Ok(())
    }

    /// Instantiate the character at `at` with the given wear level.
    pub fn spawn<E: HostEngine + ?Sized>(
        &self,
        engine: &mut E,
        damage_level: u8,
        at: Transform,
    ) -> Result<ActorHandle, EngineError> {
        engine.spawn_character(&self.skin_id, damage_level, at)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
