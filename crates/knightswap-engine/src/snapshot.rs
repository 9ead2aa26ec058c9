//! Player-state snapshot and restore across a character swap.
//!
//! [`PlayerStateSnapshot::capture`] reads everything that must survive the
//! swap from the outgoing character and the persistent save data. After the
//! engine has put the new character under the controller,
//! [`PlayerStateSnapshot::restore`] writes it back in three ordered steps:
//!
//! 1. **Movement** -- body transform onto the new character, camera
//!    transform onto the controller. The engine's own possession step does
//!    not keep either reliably, so both are always overwritten.
//! 2. **Health and armor** -- persistent vitals written back, then the armor
//!    pool matching the new character's archetype applied to its live armor,
//!    then a HUD health-bar refresh.
//! 3. **Detective vision** -- always written to the controller: the
//!    captured value when the new character's forensics device is usable,
//!    `false` otherwise.
//!
//! Restore takes the snapshot by value: one snapshot serves exactly one
//! swap.
//!
//! # What Is NOT Captured
//!
//! - Gadgets and inventory. Swapping can duplicate gadgets; that is a known
//!   gap, not something this module guarantees.
//! - Movement state beyond position and rotation (velocity, traversal
//!   mode).

use knightswap_roster::identity::CharacterIdentity;
use knightswap_roster::registry::lookup;
use serde::{Deserialize, Serialize};

use crate::gate::SessionRefs;
use crate::host::{ActorHandle, ArmorPool, ControllerHandle, HostEngine, PersistentVitals, Transform};
use crate::EngineError;

// ---------------------------------------------------------------------------
// PlayerStateSnapshot
// ---------------------------------------------------------------------------

/// Player state captured immediately before a swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStateSnapshot {
    /// Controller (camera) transform.
    pub camera: Transform,
    /// Controlled character (body) transform.
    pub body: Transform,
    /// Health shared by every character.
    pub health: i32,
    /// Armor pool for every character except Catwoman.
    pub armor: ArmorPool,
    /// Catwoman's separate armor pool.
    pub catwoman_armor: ArmorPool,
    pub detective_vision: bool,
}

impl PlayerStateSnapshot {
    /// Read the outgoing character's state. Mutates nothing.
    pub fn capture<E: HostEngine + ?Sized>(
        engine: &E,
        refs: &SessionRefs,
    ) -> Result<Self, EngineError> {
        let camera = engine.controller_transform(refs.controller);
        let body = engine.actor_transform(refs.character)?;
        let vitals = engine.persistent_vitals(refs.save);
        let detective_vision = engine.detective_vision(refs.controller);

        Ok(Self {
            camera,
            body,
            health: vitals.health,
            armor: vitals.armor,
            catwoman_armor: vitals.catwoman_armor,
            detective_vision,
        })
    }

    /// The persistent vitals this snapshot writes back.
    pub fn vitals(&self) -> PersistentVitals {
        PersistentVitals {
            health: self.health,
            armor: self.armor,
            catwoman_armor: self.catwoman_armor,
        }
    }

    /// The armor pool for a character with the given internal name.
    pub fn armor_for(&self, internal_name: &str) -> ArmorPool {
        if internal_name == lookup(CharacterIdentity::Catwoman).internal_name {
            self.catwoman_armor
        } else {
            self.armor
        }
    }

    /// Reapply the snapshot to the controller's new character.
    ///
    /// Must run after the engine-level switch: every step targets whatever
    /// character the controller controls now.
    pub fn restore<E: HostEngine + ?Sized>(
        self,
        engine: &mut E,
        refs: &SessionRefs,
    ) -> Result<(), EngineError> {
        let character = engine
            .controlled_character(refs.controller)
            .ok_or(EngineError::NoControlledCharacter)?;

        self.restore_movement(engine, refs.controller, character)?;
        self.restore_vitals(engine, refs, character)?;
        self.restore_detective_vision(engine, refs.controller)
    }

    fn restore_movement<E: HostEngine + ?Sized>(
        &self,
        engine: &mut E,
        controller: ControllerHandle,
        character: ActorHandle,
    ) -> Result<(), EngineError> {
        engine.set_actor_transform(character, self.body)?;
        engine.set_controller_transform(controller, self.camera)
    }

    fn restore_vitals<E: HostEngine + ?Sized>(
        &self,
        engine: &mut E,
        refs: &SessionRefs,
        character: ActorHandle,
    ) -> Result<(), EngineError> {
        engine.set_persistent_vitals(refs.save, self.vitals())?;

        let name = engine.character_name(character)?;
        let armor = self.armor_for(&name);
        tracing::trace!(character = %name, ?armor, "applying armor pool");
        engine.apply_armor(character, armor)?;

        engine.refresh_health_bar(refs.controller)
    }

    fn restore_detective_vision<E: HostEngine + ?Sized>(
        &self,
        engine: &mut E,
        controller: ControllerHandle,
    ) -> Result<(), EngineError> {
        let enabled = self.detective_vision && engine.forensics_usable(controller);
        if self.detective_vision && !enabled {
            tracing::debug!("no usable forensics device, forcing detective vision off");
        }
        engine.set_detective_vision(controller, enabled)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
