//! In-memory host engine for tests and demos.
//!
//! [`HeadlessEngine`] implements [`HostEngine`] without a game process. It
//! keeps a tiny world (one controller, a map of character actors, loaded
//! package names, persistent vitals and world flags) and records every
//! mutating call as a [`HostCall`] so tests can assert on ordering.
//!
//! It behaves like the real engine where the swap protocol depends on it:
//!
//! - A character can only be spawned once its skin package is loaded.
//! - Possessing a character snaps the camera to the new body and turns
//!   detective vision off, so restore has to put both back.
//! - Destroying the controlled character leaves the controller empty.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use knightswap_roster::damage::FlagSource;
use knightswap_roster::identity::CharacterIdentity;
use knightswap_roster::registry::{lookup, roster, PACKAGE_SUFFIX};

use crate::config::DEFAULT_EFFECT_PATH;
use crate::host::{
    ActorHandle, ArmorPool, ControllerHandle, ControllerState, GameInfoHandle, GameStateHandle,
    HostEngine, ObjectRef, PersistentVitals, Rotator, SaveDataHandle, SessionObject, Transform,
    Validity, Vec3, WorldHandle,
};
use crate::EngineError;

// ---------------------------------------------------------------------------
// HostCall
// ---------------------------------------------------------------------------

/// A mutating call made against the [`HeadlessEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    LoadPackage(String),
    SpawnCharacter { skin_id: String, damage_level: u8 },
    PrepareForSwitch,
    Possess(ActorHandle),
    DestroyActor(ActorHandle),
    SetActorTransform(ActorHandle),
    SetControllerTransform,
    SetPersistentVitals,
    ApplyArmor(ActorHandle, ArmorPool),
    RefreshHealthBar,
    SetDetectiveVision(bool),
    SpawnEffect { template: ObjectRef, scale: f32 },
}

// ---------------------------------------------------------------------------
// HeadlessActor
// ---------------------------------------------------------------------------

/// A character body living in the headless world.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessActor {
    pub internal_name: String,
    pub skin_id: String,
    pub damage_level: u8,
    pub transform: Transform,
    /// Live armor, once a pool has been applied.
    pub armor: Option<ArmorPool>,
}

/// An effect instance spawned by [`HostEngine::spawn_effect`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedEffect {
    pub path: String,
    pub at: Transform,
    pub scale: f32,
}

// ---------------------------------------------------------------------------
// HeadlessEngine
// ---------------------------------------------------------------------------

const CONTROLLER: ControllerHandle = ControllerHandle(1);

/// Where the starting character stands.
const START_BODY: Transform = Transform::new(Vec3::new(1024.0, -512.0, 96.0), Rotator::new(0, 16384, 0));

/// Where the camera sits relative to the starting character.
const START_CAMERA: Transform = Transform::new(Vec3::new(800.0, -512.0, 180.0), Rotator::new(-1200, 16384, 0));

/// An in-memory [`HostEngine`].
#[derive(Debug)]
pub struct HeadlessEngine {
    actors: BTreeMap<ActorHandle, HeadlessActor>,
    next_actor: u64,
    possessed: Option<ActorHandle>,
    camera: Transform,
    controller_state: ControllerState,
    hud_bound: bool,
    health_bar_refreshes: u32,
    detective_vision: bool,
    forensics: HashSet<String>,
    vitals: PersistentVitals,
    story_dlc: bool,
    flags: HashSet<String>,
    loaded_packages: BTreeSet<String>,
    failing_packages: HashSet<String>,
    failing_operations: HashSet<&'static str>,
    objects: Vec<String>,
    effects: Vec<SpawnedEffect>,
    invalid: HashSet<SessionObject>,
    calls: Vec<HostCall>,
}

impl HeadlessEngine {
    /// A session already controlling `start`, with full health and no armor.
    ///
    /// The starting character's packages are loaded and the default effect
    /// template is registered. Batman, Robin and Nightwing carry a usable
    /// forensics device.
    pub fn new(start: CharacterIdentity) -> Self {
        let mut engine = Self {
            actors: BTreeMap::new(),
            next_actor: 1,
            possessed: None,
            camera: START_CAMERA,
            controller_state: ControllerState::default(),
            hud_bound: true,
            health_bar_refreshes: 0,
            detective_vision: false,
            forensics: ["Batman", "Robin", "Nightwing"]
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            vitals: PersistentVitals {
                health: 100,
                ..Default::default()
            },
            story_dlc: false,
            flags: HashSet::new(),
            loaded_packages: BTreeSet::new(),
            failing_packages: HashSet::new(),
            failing_operations: HashSet::new(),
            objects: vec![DEFAULT_EFFECT_PATH.to_owned()],
            effects: Vec::new(),
            invalid: HashSet::new(),
            calls: Vec::new(),
        };

        let info = lookup(start);
        engine.loaded_packages.insert(info.base_package());
        engine.loaded_packages.insert(info.skin_package());
        let actor = engine.insert_actor(HeadlessActor {
            internal_name: info.internal_name.to_owned(),
            skin_id: info.skin_id(),
            damage_level: 0,
            transform: START_BODY,
            armor: None,
        });
        engine.possessed = Some(actor);
        engine
    }

    fn insert_actor(&mut self, actor: HeadlessActor) -> ActorHandle {
        let handle = ActorHandle(self.next_actor);
        self.next_actor += 1;
        self.actors.insert(handle, actor);
        handle
    }

    fn actor_mut(&mut self, actor: ActorHandle) -> Result<&mut HeadlessActor, EngineError> {
        self.actors
            .get_mut(&actor)
            .ok_or(EngineError::StaleActor { actor })
    }

    fn check_controller(&self, controller: ControllerHandle) -> Result<(), EngineError> {
        if controller != CONTROLLER || self.invalid.contains(&SessionObject::Controller) {
            return Err(EngineError::Rejected {
                operation: "controller access",
                details: format!("{controller:?} is not a live controller"),
            });
        }
        Ok(())
    }

    fn scripted_failure(&self, operation: &'static str) -> Result<(), EngineError> {
        if self.failing_operations.contains(operation) {
            return Err(EngineError::Rejected {
                operation,
                details: "scripted failure".to_owned(),
            });
        }
        Ok(())
    }

    fn session_object<T>(&self, object: SessionObject, handle: T) -> Validity<T> {
        if self.invalid.contains(&object) {
            Validity::Invalid
        } else {
            Validity::Valid(handle)
        }
    }

    // -- scripting ----------------------------------------------------------

    /// Make a session object report `Invalid`.
    pub fn invalidate(&mut self, object: SessionObject) {
        self.invalid.insert(object);
    }

    pub fn revalidate(&mut self, object: SessionObject) {
        self.invalid.remove(&object);
    }

    pub fn set_controller_state(&mut self, state: ControllerState) {
        self.controller_state = state;
    }

    pub fn set_story_dlc(&mut self, story_dlc: bool) {
        self.story_dlc = story_dlc;
    }

    pub fn set_world_flag(&mut self, name: &str, value: bool) {
        if value {
            self.flags.insert(name.to_owned());
        } else {
            self.flags.remove(name);
        }
    }

    pub fn set_vitals(&mut self, vitals: PersistentVitals) {
        self.vitals = vitals;
    }

    pub fn set_detective_vision_flag(&mut self, enabled: bool) {
        self.detective_vision = enabled;
    }

    /// Move the camera without recording a call.
    pub fn place_camera(&mut self, transform: Transform) {
        self.camera = transform;
    }

    /// Move the controlled character without recording a call.
    pub fn place_character(&mut self, transform: Transform) {
        if let Some(actor) = self.possessed.and_then(|h| self.actors.get_mut(&h)) {
            actor.transform = transform;
        }
    }

    /// Give (or take away) a usable forensics device for a character.
    pub fn set_forensics(&mut self, internal_name: &str, usable: bool) {
        if usable {
            self.forensics.insert(internal_name.to_owned());
        } else {
            self.forensics.remove(internal_name);
        }
    }

    /// Make every future load of `package` fail.
    pub fn fail_package(&mut self, package: &str) {
        self.failing_packages.insert(package.to_owned());
    }

    /// Make every future call of a mutating [`HostEngine`] method fail
    /// with [`EngineError::Rejected`], after it has been recorded.
    ///
    /// `operation` is the method name, e.g. `"possess"` or `"apply_armor"`.
    pub fn fail_operation(&mut self, operation: &'static str) {
        self.failing_operations.insert(operation);
    }

    /// Register a loadable object path (e.g. an effect template).
    pub fn register_object(&mut self, path: &str) -> ObjectRef {
        self.objects.push(path.to_owned());
        ObjectRef(self.objects.len() as u64 - 1)
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    // -- inspection ---------------------------------------------------------

    /// Every mutating call since construction or the last
    /// [`clear_calls`](Self::clear_calls).
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn possessed(&self) -> Option<ActorHandle> {
        self.possessed
    }

    pub fn possessed_name(&self) -> Option<String> {
        self.possessed
            .and_then(|h| self.actors.get(&h))
            .map(|a| a.internal_name.clone())
    }

    pub fn actor(&self, actor: ActorHandle) -> Option<&HeadlessActor> {
        self.actors.get(&actor)
    }

    pub fn is_alive(&self, actor: ActorHandle) -> bool {
        self.actors.contains_key(&actor)
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn camera(&self) -> Transform {
        self.camera
    }

    pub fn vitals(&self) -> PersistentVitals {
        self.vitals
    }

    pub fn is_package_loaded(&self, package: &str) -> bool {
        self.loaded_packages.contains(package)
    }

    pub fn loaded_package_count(&self) -> usize {
        self.loaded_packages.len()
    }

    pub fn effects(&self) -> &[SpawnedEffect] {
        &self.effects
    }

    pub fn hud_bound(&self) -> bool {
        self.hud_bound
    }

    pub fn health_bar_refreshes(&self) -> u32 {
        self.health_bar_refreshes
    }
}

impl FlagSource for HeadlessEngine {
    fn flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }
}

impl HostEngine for HeadlessEngine {
    fn controller(&self) -> Validity<ControllerHandle> {
        self.session_object(SessionObject::Controller, CONTROLLER)
    }

    fn controlled_character(&self, controller: ControllerHandle) -> Validity<ActorHandle> {
        if controller != CONTROLLER || self.invalid.contains(&SessionObject::ControlledCharacter) {
            return Validity::Invalid;
        }
        self.possessed.into()
    }

    fn world(&self) -> Validity<WorldHandle> {
        self.session_object(SessionObject::World, WorldHandle(1))
    }

    fn game_info(&self) -> Validity<GameInfoHandle> {
        self.session_object(SessionObject::GameInfo, GameInfoHandle(1))
    }

    fn game_state(&self) -> Validity<GameStateHandle> {
        self.session_object(SessionObject::GameState, GameStateHandle(1))
    }

    fn persistent_data(&self) -> Validity<SaveDataHandle> {
        self.session_object(SessionObject::PersistentData, SaveDataHandle(1))
    }

    fn controller_state(&self, _controller: ControllerHandle) -> ControllerState {
        self.controller_state
    }

    fn is_story_dlc(&self) -> bool {
        self.story_dlc
    }

    fn character_name(&self, actor: ActorHandle) -> Result<String, EngineError> {
        self.actors
            .get(&actor)
            .map(|a| a.internal_name.clone())
            .ok_or(EngineError::StaleActor { actor })
    }

    fn load_package(&mut self, name: &str) -> Result<(), EngineError> {
        self.calls.push(HostCall::LoadPackage(name.to_owned()));
        if self.failing_packages.contains(name) {
            return Err(EngineError::PackageLoad {
                package: name.to_owned(),
                details: "package is marked as failing".to_owned(),
            });
        }
        self.loaded_packages.insert(name.to_owned());
        Ok(())
    }

    fn find_object(&self, path: &str) -> Option<ObjectRef> {
        self.objects
            .iter()
            .position(|p| p == path)
            .map(|i| ObjectRef(i as u64))
    }

    fn spawn_character(
        &mut self,
        skin_id: &str,
        damage_level: u8,
        at: Transform,
    ) -> Result<ActorHandle, EngineError> {
        self.calls.push(HostCall::SpawnCharacter {
            skin_id: skin_id.to_owned(),
            damage_level,
        });

        let info = roster()
            .iter()
            .find(|info| info.skin_id() == skin_id || info.dlc_skin_id() == skin_id)
            .ok_or_else(|| EngineError::SpawnFailed {
                skin_id: skin_id.to_owned(),
                details: "no character uses this skin".to_owned(),
            })?;

        if !self.is_package_loaded(&format!("{skin_id}{PACKAGE_SUFFIX}")) {
            return Err(EngineError::SpawnFailed {
                skin_id: skin_id.to_owned(),
                details: "skin package is not loaded".to_owned(),
            });
        }

        Ok(self.insert_actor(HeadlessActor {
            internal_name: info.internal_name.to_owned(),
            skin_id: skin_id.to_owned(),
            damage_level,
            transform: at,
            armor: None,
        }))
    }

    fn prepare_for_switch(&mut self, controller: ControllerHandle) -> Result<(), EngineError> {
        self.calls.push(HostCall::PrepareForSwitch);
        self.scripted_failure("prepare_for_switch")?;
        self.check_controller(controller)?;
        self.hud_bound = false;
        Ok(())
    }

    fn possess(
        &mut self,
        controller: ControllerHandle,
        character: ActorHandle,
    ) -> Result<(), EngineError> {
        self.calls.push(HostCall::Possess(character));
        self.scripted_failure("possess")?;
        self.check_controller(controller)?;
        let body = self.actor_mut(character)?.transform;

        self.possessed = Some(character);
        self.camera = body;
        self.detective_vision = false;
        self.hud_bound = true;
        Ok(())
    }

    fn destroy_actor(&mut self, actor: ActorHandle) -> Result<(), EngineError> {
        self.calls.push(HostCall::DestroyActor(actor));
        self.scripted_failure("destroy_actor")?;
        self.actors
            .remove(&actor)
            .ok_or(EngineError::StaleActor { actor })?;
        if self.possessed == Some(actor) {
            self.possessed = None;
        }
        Ok(())
    }

    fn controller_transform(&self, _controller: ControllerHandle) -> Transform {
        self.camera
    }

    fn set_controller_transform(
        &mut self,
        controller: ControllerHandle,
        transform: Transform,
    ) -> Result<(), EngineError> {
        self.calls.push(HostCall::SetControllerTransform);
        self.scripted_failure("set_controller_transform")?;
        self.check_controller(controller)?;
        self.camera = transform;
        Ok(())
    }

    fn actor_transform(&self, actor: ActorHandle) -> Result<Transform, EngineError> {
        self.actors
            .get(&actor)
            .map(|a| a.transform)
            .ok_or(EngineError::StaleActor { actor })
    }

    fn set_actor_transform(
        &mut self,
        actor: ActorHandle,
        transform: Transform,
    ) -> Result<(), EngineError> {
        self.calls.push(HostCall::SetActorTransform(actor));
        self.scripted_failure("set_actor_transform")?;
        self.actor_mut(actor)?.transform = transform;
        Ok(())
    }

    fn persistent_vitals(&self, _save: SaveDataHandle) -> PersistentVitals {
        self.vitals
    }

    fn set_persistent_vitals(
        &mut self,
        _save: SaveDataHandle,
        vitals: PersistentVitals,
    ) -> Result<(), EngineError> {
        self.calls.push(HostCall::SetPersistentVitals);
        self.scripted_failure("set_persistent_vitals")?;
        self.vitals = vitals;
        Ok(())
    }

    fn apply_armor(&mut self, actor: ActorHandle, armor: ArmorPool) -> Result<(), EngineError> {
        self.calls.push(HostCall::ApplyArmor(actor, armor));
        self.scripted_failure("apply_armor")?;
        self.actor_mut(actor)?.armor = Some(armor);
        Ok(())
    }

    fn refresh_health_bar(&mut self, controller: ControllerHandle) -> Result<(), EngineError> {
        self.calls.push(HostCall::RefreshHealthBar);
        self.scripted_failure("refresh_health_bar")?;
        self.check_controller(controller)?;
        self.health_bar_refreshes += 1;
        Ok(())
    }

    fn detective_vision(&self, _controller: ControllerHandle) -> bool {
        self.detective_vision
    }

    fn set_detective_vision(
        &mut self,
        controller: ControllerHandle,
        enabled: bool,
    ) -> Result<(), EngineError> {
        self.calls.push(HostCall::SetDetectiveVision(enabled));
        self.scripted_failure("set_detective_vision")?;
        self.check_controller(controller)?;
        self.detective_vision = enabled;
        Ok(())
    }

    fn forensics_usable(&self, _controller: ControllerHandle) -> bool {
        self.possessed_name()
            .is_some_and(|name| self.forensics.contains(&name))
    }

    fn spawn_effect(
        &mut self,
        template: ObjectRef,
        at: Transform,
        scale: f32,
    ) -> Result<(), EngineError> {
        self.calls.push(HostCall::SpawnEffect { template, scale });
        self.scripted_failure("spawn_effect")?;
        let path = self
            .objects
            .get(template.0 as usize)
            .cloned()
            .ok_or_else(|| EngineError::ObjectNotFound {
                path: format!("{template:?}"),
            })?;
        self.effects.push(SpawnedEffect { path, at, scale });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_possessing_requested_character() {
        let engine = HeadlessEngine::new(CharacterIdentity::Nightwing);
        assert_eq!(engine.possessed_name().as_deref(), Some("Nightwing"));
        assert!(engine.is_package_loaded("Playable_Nightwing_SF"));
        assert!(engine.is_package_loaded("Playable_Nightwing_Standard_SF"));
        assert_eq!(engine.actor_count(), 1);
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn spawn_resolves_dlc_skins() {
        let mut engine = HeadlessEngine::new(CharacterIdentity::BruceWayne);
        engine.load_package("Playable_Robin_HQ_Standard_SF").unwrap();
        let actor = engine
            .spawn_character("Playable_Robin_HQ_Standard", 0, Transform::default())
            .unwrap();
        assert_eq!(engine.character_name(actor).unwrap(), "Robin");
    }

    #[test]
    fn spawn_unknown_skin_fails() {
        let mut engine = HeadlessEngine::new(CharacterIdentity::BruceWayne);
        let err = engine
            .spawn_character("Playable_Joker_Standard", 0, Transform::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::SpawnFailed { .. }));
    }

    #[test]
    fn possess_snaps_camera_and_clears_detective_vision() {
        let mut engine = HeadlessEngine::new(CharacterIdentity::Batman);
        engine.set_detective_vision_flag(true);
        engine.load_package("Playable_Robin_Standard_SF").unwrap();
        let spot = Transform::new(Vec3::new(1.0, 2.0, 3.0), Rotator::default());
        let robin = engine
            .spawn_character("Playable_Robin_Standard", 0, spot)
            .unwrap();

        engine.prepare_for_switch(CONTROLLER).unwrap();
        assert!(!engine.hud_bound());

        engine.possess(CONTROLLER, robin).unwrap();
        assert_eq!(engine.camera(), spot);
        assert!(!engine.detective_vision(CONTROLLER));
        assert!(engine.hud_bound());
    }

    #[test]
    fn scripted_failure_is_recorded_then_rejected() {
        let mut engine = HeadlessEngine::new(CharacterIdentity::Batman);
        let actor = engine.possessed().unwrap();
        engine.fail_operation("apply_armor");
        engine.clear_calls();

        let err = engine.apply_armor(actor, ArmorPool::new(1, 1)).unwrap_err();
        assert_eq!(
            err,
            EngineError::Rejected {
                operation: "apply_armor",
                details: "scripted failure".to_owned(),
            }
        );
        assert_eq!(engine.calls(), &[HostCall::ApplyArmor(actor, ArmorPool::new(1, 1))]);
        assert_eq!(engine.actor(actor).unwrap().armor, None);
        // Other operations are unaffected.
        engine.refresh_health_bar(CONTROLLER).unwrap();
    }

    #[test]
    fn destroying_possessed_actor_empties_controller() {
        let mut engine = HeadlessEngine::new(CharacterIdentity::Batman);
        let actor = engine.possessed().unwrap();
        engine.destroy_actor(actor).unwrap();
        assert_eq!(engine.controlled_character(CONTROLLER), Validity::Invalid);
        assert!(matches!(
            engine.destroy_actor(actor),
            Err(EngineError::StaleActor { .. })
        ));
    }

    #[test]
    fn invalid_controller_rejects_writes() {
        let mut engine = HeadlessEngine::new(CharacterIdentity::Batman);
        engine.invalidate(SessionObject::Controller);
        assert!(engine.refresh_health_bar(CONTROLLER).is_err());
        engine.revalidate(SessionObject::Controller);
        engine.refresh_health_bar(CONTROLLER).unwrap();
        assert_eq!(engine.health_bar_refreshes(), 1);
    }

    #[test]
    fn world_flags_feed_flag_source() {
        let mut engine = HeadlessEngine::new(CharacterIdentity::Batman);
        engine.set_world_flag("BatmanDamageLevel2", true);
        assert!(engine.flag("BatmanDamageLevel2"));
        engine.set_world_flag("BatmanDamageLevel2", false);
        assert!(!engine.flag("BatmanDamageLevel2"));
    }

    #[test]
    fn forensics_follow_possessed_character() {
        let engine = HeadlessEngine::new(CharacterIdentity::Catwoman);
        assert!(!engine.forensics_usable(CONTROLLER));
        let engine = HeadlessEngine::new(CharacterIdentity::Robin);
        assert!(engine.forensics_usable(CONTROLLER));
    }
}
