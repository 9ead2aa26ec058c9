//! The character switch orchestrator.
//!
//! [`SwitchController`] owns the cooldown and runs each swap request as a
//! synchronous state machine:
//!
//! ```text
//! Idle -> Validating -> Capturing -> LoadingAssets -> Switching
//!      -> Restoring -> [PlayingEffect] -> Idle (cooldown reset)
//! ```
//!
//! Validation failures are expected and silent: they return
//! [`SwitchOutcome::Rejected`] with no side effects. Once validation has
//! passed, an engine failure aborts the attempt with a [`SwitchError`].
//! Nothing is rolled back.
//!
//! # Example
//!
//! ```
//! use knightswap_engine::prelude::*;
//!
//! let mut engine = HeadlessEngine::new(CharacterIdentity::BruceWayne);
//! let config = SwapConfig { cooldown_secs: 1.0, ..Default::default() };
//! let mut controller = SwitchController::new(config).unwrap();
//!
//! controller.on_key_down(&mut engine, "Two").unwrap();
//! assert_eq!(engine.possessed_name().as_deref(), Some("Batman"));
//!
//! // A second and a half of simulated frames later the cooldown has elapsed.
//! for _ in 0..90 {
//!     controller.on_tick(1.0 / 60.0);
//! }
//! controller.on_key_down(&mut engine, "Four").unwrap();
//! assert_eq!(engine.possessed_name().as_deref(), Some("Robin"));
//! ```

use std::fmt;

use knightswap_roster::damage::resolve_damage_level;
use knightswap_roster::identity::CharacterIdentity;
use knightswap_roster::registry::lookup;
use serde::{Deserialize, Serialize};

use crate::assets::AssetPlan;
use crate::config::{KeyBindings, SwapConfig};
use crate::cooldown::Cooldown;
use crate::gate::{check_safety, SessionRefs, UnsafeCondition};
use crate::host::{ActorHandle, HostEngine, SessionObject, Transform};
use crate::snapshot::PlayerStateSnapshot;
use crate::{ConfigError, EngineError, SwitchError};

// ---------------------------------------------------------------------------
// SwitchPhase
// ---------------------------------------------------------------------------

/// A step of the swap state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwitchPhase {
    Idle,
    Validating,
    Capturing,
    LoadingAssets,
    Switching,
    Restoring,
    PlayingEffect,
}

impl fmt::Display for SwitchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SwitchPhase::Idle => "idle",
            SwitchPhase::Validating => "validating",
            SwitchPhase::Capturing => "capturing player state",
            SwitchPhase::LoadingAssets => "loading assets",
            SwitchPhase::Switching => "switching characters",
            SwitchPhase::Restoring => "restoring player state",
            SwitchPhase::PlayingEffect => "playing transition effect",
        };
        f.write_str(text)
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Why a swap request was turned away during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The previous swap's cooldown has not elapsed.
    CooldownActive { remaining: f32 },
    /// A session object is missing or stale.
    InvalidReference(SessionObject),
    /// The safety gate refused.
    Unsafe(UnsafeCondition),
    /// The target is already the controlled character.
    AlreadyActive(CharacterIdentity),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::CooldownActive { remaining } => {
                write!(f, "cooldown active ({remaining:.2}s remaining)")
            }
            RejectReason::InvalidReference(object) => write!(f, "{object} is not valid"),
            RejectReason::Unsafe(condition) => write!(f, "unsafe: {condition}"),
            RejectReason::AlreadyActive(id) => write!(f, "{id} is already active"),
        }
    }
}

/// What a completed swap did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchReport {
    /// Internal name of the character that was replaced.
    pub from: String,
    pub to: CharacterIdentity,
    pub plan: AssetPlan,
    pub damage_level: u8,
    pub effect_played: bool,
    /// Every phase entered, in order.
    pub phases: Vec<SwitchPhase>,
}

/// Result of a swap request that did not fail mid-switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SwitchOutcome {
    Completed(SwitchReport),
    Rejected(RejectReason),
}

impl SwitchOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SwitchOutcome::Completed(_))
    }

    pub fn report(&self) -> Option<&SwitchReport> {
        match self {
            SwitchOutcome::Completed(report) => Some(report),
            SwitchOutcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&RejectReason> {
        match self {
            SwitchOutcome::Rejected(reason) => Some(reason),
            SwitchOutcome::Completed(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SwitchController
// ---------------------------------------------------------------------------

/// Drives character swaps for one game session.
///
/// Holds no engine state between calls: each request starts from
/// [`SwitchPhase::Idle`] and runs to completion (or rejection) before
/// returning. The only state carried across requests is the cooldown.
#[derive(Debug, Clone)]
pub struct SwitchController {
    config: SwapConfig,
    bindings: KeyBindings,
    cooldown: Cooldown,
}

impl SwitchController {
    /// Create a controller with the default key bindings.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found by [`SwapConfig::validate`].
    pub fn new(config: SwapConfig) -> Result<Self, ConfigError> {
        Self::with_bindings(config, KeyBindings::default())
    }

    pub fn with_bindings(config: SwapConfig, bindings: KeyBindings) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            cooldown: Cooldown::new(config.cooldown_secs),
            config,
            bindings,
        })
    }

    // -- host callbacks -----------------------------------------------------

    /// Per-frame callback: count the cooldown down by `dt` seconds.
    pub fn on_tick(&mut self, dt: f32) {
        self.cooldown.tick(dt);
    }

    /// Key-down callback. Unbound keys are ignored and return `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Propagates the [`SwitchError`] of a swap that failed mid-switch.
    pub fn on_key_down<E: HostEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        key: &str,
    ) -> Result<Option<SwitchOutcome>, SwitchError> {
        let Some(target) = self.bindings.resolve(key) else {
            tracing::trace!(key, "key not bound to a character");
            return Ok(None);
        };
        self.request_switch(engine, target).map(Some)
    }

    /// Swap the controlled character to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchError`] if an engine call fails after validation
    /// passed. Packages already loaded stay loaded, and a destroyed
    /// character is not brought back.
    pub fn request_switch<E: HostEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        target: CharacterIdentity,
    ) -> Result<SwitchOutcome, SwitchError> {
        let span = tracing::info_span!("character_switch", %target);
        let _enter = span.enter();

        let mut phases = Vec::with_capacity(6);
        let mut enter = |phase: SwitchPhase| {
            tracing::trace!(%phase, "entering phase");
            phases.push(phase);
        };

        // Validating
        enter(SwitchPhase::Validating);
        let (refs, from) = match self.validate(&*engine, target) {
            Ok(valid) => valid,
            Err(reason) => {
                tracing::debug!(%reason, "switch rejected");
                return Ok(SwitchOutcome::Rejected(reason));
            }
        };

        // Capturing
        enter(SwitchPhase::Capturing);
        let snapshot = PlayerStateSnapshot::capture(&*engine, &refs)
            .map_err(fail(target, SwitchPhase::Capturing))?;
        let effect_at: Transform = snapshot.body;

        // LoadingAssets
        enter(SwitchPhase::LoadingAssets);
        let info = lookup(target);
        let plan = AssetPlan::resolve(info, engine.is_story_dlc());
        let damage_level = resolve_damage_level(info, &*engine);
        plan.load(engine)
            .map_err(fail(target, SwitchPhase::LoadingAssets))?;
        let new_character = plan
            .spawn(engine, damage_level, snapshot.body)
            .map_err(fail(target, SwitchPhase::LoadingAssets))?;

        // Switching
        enter(SwitchPhase::Switching);
        Self::replace_character(engine, &refs, new_character)
            .map_err(fail(target, SwitchPhase::Switching))?;

        // Restoring
        enter(SwitchPhase::Restoring);
        snapshot
            .restore(engine, &refs)
            .map_err(fail(target, SwitchPhase::Restoring))?;

        // PlayingEffect
        let effect_played = self.config.effect_enabled;
        if effect_played {
            enter(SwitchPhase::PlayingEffect);
            self.play_effect(engine, effect_at)
                .map_err(fail(target, SwitchPhase::PlayingEffect))?;
        }

        enter(SwitchPhase::Idle);
        self.cooldown.reset();

        tracing::info!(
            from = %from,
            to = info.internal_name,
            damage_level,
            base_package = %plan.base_package,
            skin_package = %plan.skin_package,
            "character switched"
        );

        Ok(SwitchOutcome::Completed(SwitchReport {
            from,
            to: target,
            plan,
            damage_level,
            effect_played,
            phases,
        }))
    }

    // -- phases -------------------------------------------------------------

    /// Run every precondition. Reads only.
    fn validate<E: HostEngine + ?Sized>(
        &self,
        engine: &E,
        target: CharacterIdentity,
    ) -> Result<(SessionRefs, String), RejectReason> {
        if !self.cooldown.is_ready() {
            return Err(RejectReason::CooldownActive {
                remaining: self.cooldown.remaining(),
            });
        }

        let refs = SessionRefs::resolve(engine).map_err(RejectReason::InvalidReference)?;

        check_safety(&engine.controller_state(refs.controller)).map_err(RejectReason::Unsafe)?;

        let current = engine
            .character_name(refs.character)
            .map_err(|_| RejectReason::InvalidReference(SessionObject::ControlledCharacter))?;
        if current == lookup(target).internal_name {
            return Err(RejectReason::AlreadyActive(target));
        }

        Ok((refs, current))
    }

    /// Put `new_character` under the controller and destroy the old body.
    ///
    /// The HUD binding is released first and the old character is destroyed
    /// last, so nothing references a half-replaced character.
    fn replace_character<E: HostEngine + ?Sized>(
        engine: &mut E,
        refs: &SessionRefs,
        new_character: ActorHandle,
    ) -> Result<(), EngineError> {
        engine.prepare_for_switch(refs.controller)?;
        engine.possess(refs.controller, new_character)?;
        engine.destroy_actor(refs.character)
    }

    fn play_effect<E: HostEngine + ?Sized>(
        &self,
        engine: &mut E,
        at: Transform,
    ) -> Result<(), EngineError> {
        let template = engine
            .find_object(&self.config.effect_path)
            .ok_or_else(|| EngineError::ObjectNotFound {
                path: self.config.effect_path.clone(),
            })?;
        engine.spawn_effect(template, at, self.config.effect_scale)
    }

    // -- accessors ----------------------------------------------------------

    pub fn config(&self) -> &SwapConfig {
        &self.config
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Seconds until the next swap is allowed.
    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown.remaining()
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown.is_ready()
    }
}

/// Wrap an engine failure in the phase it happened in.
fn fail(target: CharacterIdentity, phase: SwitchPhase) -> impl FnOnce(EngineError) -> SwitchError {
    move |source| {
        tracing::error!(%target, %phase, error = %source, "character switch aborted");
        SwitchError {
            target,
            phase,
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
