//! Swap controller configuration and key bindings.
//!
//! [`SwapConfig`] holds the tunables read once when the
//! [`SwitchController`](crate::switch::SwitchController) is built. The
//! defaults are the shipped constants; a JSON override may be parsed with
//! [`SwapConfig::from_json_str`]. Nothing is reloaded at runtime.

use std::collections::HashSet;

use knightswap_roster::identity::CharacterIdentity;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Seconds between two swaps.
pub const DEFAULT_COOLDOWN_SECS: f32 = 3.0;

/// Whether the transition effect plays by default.
pub const DEFAULT_EFFECT_ENABLED: bool = true;

/// Qualified path of the transition effect template.
pub const DEFAULT_EFFECT_PATH: &str = "FX_Gadgets.Smoke.P_SmokePellet_Burst";

pub const DEFAULT_EFFECT_SCALE: f32 = 1.0;

// ---------------------------------------------------------------------------
// SwapConfig
// ---------------------------------------------------------------------------

/// Tunables for the swap controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapConfig {
    /// Cooldown duration in seconds. Must be finite and non-negative.
    pub cooldown_secs: f32,
    /// Play the cosmetic transition effect after each swap.
    pub effect_enabled: bool,
    /// Qualified path of the effect template.
    pub effect_path: String,
    /// Uniform scale applied to the effect. Must be positive and finite.
    pub effect_scale: f32,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            effect_enabled: DEFAULT_EFFECT_ENABLED,
            effect_path: DEFAULT_EFFECT_PATH.to_owned(),
            effect_scale: DEFAULT_EFFECT_SCALE,
        }
    }
}

impl SwapConfig {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidCooldown`] for a negative or non-finite cooldown.
    /// - [`ConfigError::InvalidEffectScale`] for a non-positive or non-finite scale.
    /// - [`ConfigError::EmptyEffectPath`] when effects are on but no path is set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cooldown_secs.is_finite() && self.cooldown_secs >= 0.0) {
            return Err(ConfigError::InvalidCooldown(self.cooldown_secs));
        }
        if !(self.effect_scale.is_finite() && self.effect_scale > 0.0) {
            return Err(ConfigError::InvalidEffectScale(self.effect_scale));
        }
        if self.effect_enabled && self.effect_path.trim().is_empty() {
            return Err(ConfigError::EmptyEffectPath);
        }
        Ok(())
    }

    /// Parse a JSON override. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SwapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// KeyBindings
// ---------------------------------------------------------------------------

/// Engine key names mapped to swap targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    bindings: Vec<(String, CharacterIdentity)>,
}

impl Default for KeyBindings {
    /// `One` through `Five`, one per character in roster order.
    fn default() -> Self {
        let keys = ["One", "Two", "Three", "Four", "Five"];
        Self {
            bindings: keys
                .iter()
                .zip(CharacterIdentity::ALL)
                .map(|(key, id)| ((*key).to_owned(), id))
                .collect(),
        }
    }
}

impl KeyBindings {
    /// Build a custom binding table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateKey`] if a key appears twice.
    pub fn new(
        bindings: impl IntoIterator<Item = (String, CharacterIdentity)>,
    ) -> Result<Self, ConfigError> {
        let bindings: Vec<_> = bindings.into_iter().collect();
        let mut seen = HashSet::new();
        for (key, _) in &bindings {
            if !seen.insert(key.as_str()) {
                return Err(ConfigError::DuplicateKey { key: key.clone() });
            }
        }
        Ok(Self { bindings })
    }

    /// The character bound to `key`, if any.
    pub fn resolve(&self, key: &str) -> Option<CharacterIdentity> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == key)
            .map(|(_, id)| *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, CharacterIdentity)> {
        self.bindings.iter().map(|(key, id)| (key.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
