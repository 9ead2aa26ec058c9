//! Knightswap Engine -- runtime character swap controller.
//!
//! This crate builds on [`knightswap_roster`] to hot-swap the controlled
//! character during live gameplay. A swap request runs a fixed sequence:
//!
//! 1. **Validate** the cooldown, the session objects, the
//!    [safety gate](gate) and the target (no swap to the active character).
//! 2. **Capture** a [`PlayerStateSnapshot`](snapshot::PlayerStateSnapshot)
//!    of transforms, health, armor and detective vision.
//! 3. **Load** the target's packages through the [asset adapter](assets)
//!    and spawn the new character.
//! 4. **Switch** the controller onto the new character and destroy the old
//!    one.
//! 5. **Restore** the snapshot onto the new character.
//! 6. Optionally **play** the cosmetic transition effect, then reset the
//!    cooldown.
//!
//! The host game is reached only through the [`HostEngine`](host::HostEngine)
//! trait. [`HeadlessEngine`](headless::HeadlessEngine) is an in-memory host
//! for tests and demos.
//!
//! # Quick Start
//!
//! ```
//! use knightswap_engine::prelude::*;
//!
//! let mut engine = HeadlessEngine::new(CharacterIdentity::Batman);
//! let mut controller = SwitchController::new(SwapConfig::default()).unwrap();
//!
//! let outcome = controller
//!     .request_switch(&mut engine, CharacterIdentity::Catwoman)
//!     .unwrap();
//! assert!(outcome.is_completed());
//! assert_eq!(engine.possessed_name().as_deref(), Some("Catwoman"));
//!
//! // The cooldown blocks an immediate second swap.
//! let again = controller
//!     .request_switch(&mut engine, CharacterIdentity::Robin)
//!     .unwrap();
//! assert!(!again.is_completed());
//! ```

#![deny(unsafe_code)]

pub mod assets;
pub mod config;
pub mod cooldown;
pub mod gate;
pub mod headless;
pub mod host;
pub mod snapshot;
pub mod switch;

use knightswap_roster::identity::CharacterIdentity;

use crate::host::ActorHandle;
use crate::switch::SwitchPhase;

/// Re-export the roster crate for convenience.
pub use knightswap_roster;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures reported by the host engine.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum EngineError {
    /// A content package could not be loaded.
    #[error("failed to load package '{package}': {details}")]
    PackageLoad {
        package: String,
        details: String,
    },

    /// No loaded object exists at the qualified path.
    #[error("no loaded object at '{path}'")]
    ObjectNotFound {
        path: String,
    },

    /// The engine refused to instantiate a character.
    #[error("failed to spawn character skin '{skin_id}': {details}")]
    SpawnFailed {
        skin_id: String,
        details: String,
    },

    /// The actor handle no longer refers to a live actor.
    #[error("actor {actor:?} is not alive")]
    StaleActor {
        actor: ActorHandle,
    },

    /// The controller is not controlling any character.
    #[error("controller has no controlled character")]
    NoControlledCharacter,

    /// Any other engine-side refusal.
    #[error("engine rejected {operation}: {details}")]
    Rejected {
        operation: &'static str,
        details: String,
    },
}

/// A swap that failed after validation passed.
///
/// Nothing is rolled back: packages stay loaded and an already-destroyed
/// character stays destroyed.
#[derive(Debug, thiserror::Error)]
#[error("switch to {target} failed while {phase}: {source}")]
pub struct SwitchError {
    /// The character being switched to.
    pub target: CharacterIdentity,
    /// The phase the engine call failed in.
    pub phase: SwitchPhase,
    #[source]
    pub source: EngineError,
}

/// Invalid [`SwapConfig`](config::SwapConfig) values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cooldown_secs must be finite and non-negative, got {0}")]
    InvalidCooldown(f32),

    #[error("effect_scale must be positive and finite, got {0}")]
    InvalidEffectScale(f32),

    #[error("effect_path must not be empty while effects are enabled")]
    EmptyEffectPath,

    #[error("key '{key}' is bound more than once")]
    DuplicateKey {
        key: String,
    },

    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use knightswap_roster::prelude::*;

    pub use crate::assets::AssetPlan;
    pub use crate::config::{KeyBindings, SwapConfig};
    pub use crate::cooldown::Cooldown;
    pub use crate::gate::{check_safety, is_safe_to_switch, SessionRefs, UnsafeCondition};
    pub use crate::headless::{HeadlessEngine, HostCall};
    pub use crate::host::{
        ActorHandle, ArmorPool, ControllerHandle, ControllerState, GameInfoHandle,
        GameStateHandle, HostEngine, ObjectRef, PersistentVitals, Rotator, SaveDataHandle,
        SessionObject, Transform, Validity, Vec3, WorldHandle,
    };
    pub use crate::snapshot::PlayerStateSnapshot;
    pub use crate::switch::{RejectReason, SwitchController, SwitchOutcome, SwitchPhase, SwitchReport};
    pub use crate::{ConfigError, EngineError, SwitchError};
}
