//! Safety gate and session-object validation.
//!
//! A swap is only legal when the player is in free gameplay: no cinematic
//! mode, no cutscene, no full-screen movie and no input lock. The gate is a
//! pure function of [`ControllerState`].
//!
//! [`SessionRefs::resolve`] is the other half of validation: every engine
//! object the swap touches must be valid before anything is read or
//! written.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::host::{
    ActorHandle, ControllerHandle, ControllerState, GameInfoHandle, GameStateHandle, HostEngine,
    SaveDataHandle, SessionObject, WorldHandle,
};

// ---------------------------------------------------------------------------
// UnsafeCondition
// ---------------------------------------------------------------------------

/// The reason the safety gate refused a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnsafeCondition {
    CinematicMode,
    ForcedCinematicMode,
    ActiveCinematicHandle,
    CutsceneHandle,
    FullScreenMovie,
    LookInputIgnored,
    MoveInputIgnored,
}

impl fmt::Display for UnsafeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UnsafeCondition::CinematicMode => "cinematic mode active",
            UnsafeCondition::ForcedCinematicMode => "cinematic mode forced",
            UnsafeCondition::ActiveCinematicHandle => "cinematic handle present",
            UnsafeCondition::CutsceneHandle => "cutscene playing",
            UnsafeCondition::FullScreenMovie => "full-screen movie playing",
            UnsafeCondition::LookInputIgnored => "look input ignored",
            UnsafeCondition::MoveInputIgnored => "move input ignored",
        };
        f.write_str(text)
    }
}

/// Check every unsafe condition, returning the first one that holds.
pub fn check_safety(state: &ControllerState) -> Result<(), UnsafeCondition> {
    let checks = [
        (state.cinematic_mode, UnsafeCondition::CinematicMode),
        (state.forced_cinematic_mode, UnsafeCondition::ForcedCinematicMode),
        (state.has_cinematic_handle, UnsafeCondition::ActiveCinematicHandle),
        (state.has_cutscene_handle, UnsafeCondition::CutsceneHandle),
        (state.full_screen_movie, UnsafeCondition::FullScreenMovie),
        (state.ignore_look_input, UnsafeCondition::LookInputIgnored),
        (state.ignore_move_input, UnsafeCondition::MoveInputIgnored),
    ];

    match checks.into_iter().find(|(set, _)| *set) {
        Some((_, condition)) => Err(condition),
        None => Ok(()),
    }
}

/// Whether a swap may happen in this controller state.
pub fn is_safe_to_switch(state: &ControllerState) -> bool {
    check_safety(state).is_ok()
}

// ---------------------------------------------------------------------------
// SessionRefs
// ---------------------------------------------------------------------------

/// Valid handles to every session object a swap touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRefs {
    pub controller: ControllerHandle,
    pub character: ActorHandle,
    pub world: WorldHandle,
    pub game_info: GameInfoHandle,
    pub game_state: GameStateHandle,
    pub save: SaveDataHandle,
}

impl SessionRefs {
    /// Query every session object, reporting the first invalid one.
    pub fn resolve<E: HostEngine + ?Sized>(engine: &E) -> Result<Self, SessionObject> {
        let controller = engine.controller().ok_or(SessionObject::Controller)?;
        let character = engine
            .controlled_character(controller)
            .ok_or(SessionObject::ControlledCharacter)?;
        let world = engine.world().ok_or(SessionObject::World)?;
        let game_info = engine.game_info().ok_or(SessionObject::GameInfo)?;
        let game_state = engine.game_state().ok_or(SessionObject::GameState)?;
        let save = engine.persistent_data().ok_or(SessionObject::PersistentData)?;

        Ok(Self {
            controller,
            character,
            world,
            game_info,
            game_state,
            save,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessEngine;
    use knightswap_roster::identity::CharacterIdentity;

    #[test]
    fn default_state_is_safe() {
        assert!(is_safe_to_switch(&ControllerState::default()));
    }

    #[test]
    fn cutscene_is_unsafe() {
        let state = ControllerState {
            has_cutscene_handle: true,
            ..Default::default()
        };
        assert_eq!(check_safety(&state), Err(UnsafeCondition::CutsceneHandle));
    }

    #[test]
    fn first_condition_in_order_is_reported() {
        let state = ControllerState {
            full_screen_movie: true,
            cinematic_mode: true,
            ignore_move_input: true,
            ..Default::default()
        };
        assert_eq!(check_safety(&state), Err(UnsafeCondition::CinematicMode));
    }

    #[test]
    fn input_locks_are_unsafe() {
        let look = ControllerState {
            ignore_look_input: true,
            ..Default::default()
        };
        let movement = ControllerState {
            ignore_move_input: true,
            ..Default::default()
        };
        assert_eq!(check_safety(&look), Err(UnsafeCondition::LookInputIgnored));
        assert_eq!(check_safety(&movement), Err(UnsafeCondition::MoveInputIgnored));
    }

    #[test]
    fn resolve_succeeds_on_fresh_session() {
        let engine = HeadlessEngine::new(CharacterIdentity::Batman);
        let refs = SessionRefs::resolve(&engine).unwrap();
        assert_eq!(Some(refs.character), engine.possessed());
    }

    #[test]
    fn resolve_reports_first_invalid_object() {
        let mut engine = HeadlessEngine::new(CharacterIdentity::Batman);
        engine.invalidate(SessionObject::GameState);
        engine.invalidate(SessionObject::PersistentData);
        assert_eq!(SessionRefs::resolve(&engine), Err(SessionObject::GameState));
    }

    #[test]
    fn resolve_reports_missing_controller_first() {
        let mut engine = HeadlessEngine::new(CharacterIdentity::Batman);
        engine.invalidate(SessionObject::World);
        engine.invalidate(SessionObject::Controller);
        assert_eq!(SessionRefs::resolve(&engine), Err(SessionObject::Controller));
    }
}
