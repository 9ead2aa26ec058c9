//! The narrow interface to the host game engine.
//!
//! The swap controller never owns the world, actors or content. Everything
//! it needs is reached through [`HostEngine`]:
//!
//! - **Session objects** (controller, controlled character, world, game
//!   info, game state, persistent save data) come back as [`Validity`] so
//!   every use is preceded by an explicit validity check.
//! - **Reads** of controller state, transforms and persistent vitals are
//!   immediate.
//! - **Writes** (package loads, spawns, possession, transforms, vitals,
//!   HUD refresh) return `Result<_, EngineError>`. A failed write after
//!   validation is fatal for that swap attempt.
//!
//! The trait extends [`FlagSource`] so damage-level world flags are read
//! through the same object.

use std::fmt;

use knightswap_roster::damage::FlagSource;
use serde::{Deserialize, Serialize};

use crate::EngineError;

// ---------------------------------------------------------------------------
// Validity
// ---------------------------------------------------------------------------

/// Result of querying an engine object that may be absent or stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity<T> {
    Valid(T),
    Invalid,
}

impl<T> Validity<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid(_))
    }

    /// Convert to `Option`, dropping the `Invalid` case.
    pub fn valid(self) -> Option<T> {
        match self {
            Validity::Valid(value) => Some(value),
            Validity::Invalid => None,
        }
    }

    /// Convert to `Result`, reporting `Invalid` as `err`.
    pub fn ok_or<E>(self, err: E) -> Result<T, E> {
        self.valid().ok_or(err)
    }
}

impl<T> From<Option<T>> for Validity<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Validity::Valid(v),
            None => Validity::Invalid,
        }
    }
}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Opaque handle to the player controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControllerHandle(pub u64);

/// Opaque handle to a spawned actor (a character body).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameInfoHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameStateHandle(pub u64);

/// Opaque handle to the persistent (cross-respawn) save data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SaveDataHandle(pub u64);

/// A loaded engine object found by qualified path (e.g. an effect template).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef(pub u64);

/// The session objects a swap depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionObject {
    Controller,
    ControlledCharacter,
    World,
    GameInfo,
    GameState,
    PersistentData,
}

impl fmt::Display for SessionObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionObject::Controller => "controller",
            SessionObject::ControlledCharacter => "controlled character",
            SessionObject::World => "world",
            SessionObject::GameInfo => "game info",
            SessionObject::GameState => "game state",
            SessionObject::PersistentData => "persistent data",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Engine rotation in fixed-point units (65536 per full turn).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rotator {
    pub pitch: i32,
    pub yaw: i32,
    pub roll: i32,
}

impl Rotator {
    pub const fn new(pitch: i32, yaw: i32, roll: i32) -> Self {
        Self { pitch, yaw, roll }
    }
}

/// Position plus rotation of a controller or actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub location: Vec3,
    pub rotation: Rotator,
}

impl Transform {
    pub const fn new(location: Vec3, rotation: Rotator) -> Self {
        Self { location, rotation }
    }
}

// ---------------------------------------------------------------------------
// Vitals
// ---------------------------------------------------------------------------

/// One armor pool: ballistic and melee sub-types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorPool {
    pub ballistic: i32,
    pub melee: i32,
}

impl ArmorPool {
    pub const fn new(ballistic: i32, melee: i32) -> Self {
        Self { ballistic, melee }
    }
}

/// Health and armor held by the persistent save data.
///
/// Catwoman's armor is tracked in its own pool; every other character
/// shares the default pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentVitals {
    pub health: i32,
    pub armor: ArmorPool,
    pub catwoman_armor: ArmorPool,
}

// ---------------------------------------------------------------------------
// ControllerState
// ---------------------------------------------------------------------------

/// Controller flags that make a swap unsafe when set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerState {
    pub cinematic_mode: bool,
    pub forced_cinematic_mode: bool,
    pub has_cinematic_handle: bool,
    pub has_cutscene_handle: bool,
    pub full_screen_movie: bool,
    pub ignore_look_input: bool,
    pub ignore_move_input: bool,
}

// ---------------------------------------------------------------------------
// HostEngine
// ---------------------------------------------------------------------------

/// Capabilities the swap controller consumes from the host engine.
///
/// All calls happen on the engine's game thread, synchronously, inside a
/// single key-press or tick callback.
pub trait HostEngine: FlagSource {
    // -- session objects ----------------------------------------------------

    fn controller(&self) -> Validity<ControllerHandle>;

    /// The character the controller currently controls.
    fn controlled_character(&self, controller: ControllerHandle) -> Validity<ActorHandle>;

    fn world(&self) -> Validity<WorldHandle>;

    fn game_info(&self) -> Validity<GameInfoHandle>;

    fn game_state(&self) -> Validity<GameStateHandle>;

    fn persistent_data(&self) -> Validity<SaveDataHandle>;

    // -- queries ------------------------------------------------------------

    fn controller_state(&self, controller: ControllerHandle) -> ControllerState;

    /// Whether the running content is the story-DLC variant.
    fn is_story_dlc(&self) -> bool;

    /// The engine-side internal name of a character actor.
    fn character_name(&self, actor: ActorHandle) -> Result<String, EngineError>;

    // -- content ------------------------------------------------------------

    /// Load a content package. Loading an already-loaded package is a no-op.
    fn load_package(&mut self, name: &str) -> Result<(), EngineError>;

    /// Find a loaded object by qualified path.
    fn find_object(&self, path: &str) -> Option<ObjectRef>;

    /// Instantiate a character by skin identifier and damage level.
    fn spawn_character(
        &mut self,
        skin_id: &str,
        damage_level: u8,
        at: Transform,
    ) -> Result<ActorHandle, EngineError>;

    // -- actor replacement --------------------------------------------------

    /// Detach HUD bindings before the controlled character changes.
    fn prepare_for_switch(&mut self, controller: ControllerHandle) -> Result<(), EngineError>;

    /// Make `character` the controller's controlled character.
    fn possess(
        &mut self,
        controller: ControllerHandle,
        character: ActorHandle,
    ) -> Result<(), EngineError>;

    fn destroy_actor(&mut self, actor: ActorHandle) -> Result<(), EngineError>;

    // -- transforms ---------------------------------------------------------

    fn controller_transform(&self, controller: ControllerHandle) -> Transform;

    fn set_controller_transform(
        &mut self,
        controller: ControllerHandle,
        transform: Transform,
    ) -> Result<(), EngineError>;

    fn actor_transform(&self, actor: ActorHandle) -> Result<Transform, EngineError>;

    fn set_actor_transform(
        &mut self,
        actor: ActorHandle,
        transform: Transform,
    ) -> Result<(), EngineError>;

    // -- vitals and HUD -----------------------------------------------------

    fn persistent_vitals(&self, save: SaveDataHandle) -> PersistentVitals;

    fn set_persistent_vitals(
        &mut self,
        save: SaveDataHandle,
        vitals: PersistentVitals,
    ) -> Result<(), EngineError>;

    /// Write an armor pool into a character's live armor sub-systems.
    fn apply_armor(&mut self, actor: ActorHandle, armor: ArmorPool) -> Result<(), EngineError>;

    fn refresh_health_bar(&mut self, controller: ControllerHandle) -> Result<(), EngineError>;

    // -- detective vision ---------------------------------------------------

    fn detective_vision(&self, controller: ControllerHandle) -> bool;

    fn set_detective_vision(
        &mut self,
        controller: ControllerHandle,
        enabled: bool,
    ) -> Result<(), EngineError>;

    /// Whether the controller's equipped forensics device is directly usable.
    fn forensics_usable(&self, controller: ControllerHandle) -> bool;

    // -- effects ------------------------------------------------------------

    fn spawn_effect(
        &mut self,
        template: ObjectRef,
        at: Transform,
        scale: f32,
    ) -> Result<(), EngineError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_conversions() {
        assert_eq!(Validity::Valid(3).valid(), Some(3));
        assert_eq!(Validity::<u8>::Invalid.valid(), None);
        assert_eq!(Validity::from(Some(1)), Validity::Valid(1));
        assert_eq!(Validity::<u8>::from(None), Validity::Invalid);
        assert_eq!(Validity::<u8>::Invalid.ok_or("gone"), Err("gone"));
        assert!(Validity::Valid(()).is_valid());
    }

    #[test]
    fn session_object_display() {
        assert_eq!(SessionObject::PersistentData.to_string(), "persistent data");
        assert_eq!(SessionObject::ControlledCharacter.to_string(), "controlled character");
    }

    #[test]
    fn transform_serialization_roundtrip() {
        let t = Transform::new(Vec3::new(1.5, -2.0, 300.25), Rotator::new(0, 16384, -10));
        let json = serde_json::to_string(&t).unwrap();
        let back: Transform = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
