//! Configuration records for entities, agents, and snap zones.
//!
//! Every record implements `Default` with the documented defaults and is
//! `#[serde(default)]`, so hosts may load partial JSON documents.

use crate::policy::{
    AllowedAgents, DropPolicy, GrabAttach, Hand, SecondaryAction, SnapMode, ValidityPolicy,
};
use crate::pose::Pose;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be finite and non-negative, got {value}")]
    NegativeOrNonFinite { field: &'static str, value: f32 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeOrNonFinite { field, value })
    }
}

/// Per-entity interaction policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    /// Whether agents may grab the entity.
    pub grabbable: bool,
    /// Whether agents may use the entity.
    pub usable: bool,
    /// Grab lasts while the button is held; otherwise presses toggle.
    pub hold_to_grab: bool,
    /// Use lasts while the button is held; otherwise presses toggle.
    pub hold_to_use: bool,
    /// Use is rejected unless the entity is grabbed.
    pub use_only_if_grabbed: bool,
    /// Which button releases are honoured.
    pub drop_policy: DropPolicy,
    /// Sleep the entity whenever nothing interacts with it.
    pub disable_when_idle: bool,
    /// Behaviour of a second grabbing agent.
    pub secondary_action: SecondaryAction,
    pub allowed_near_touch: AllowedAgents,
    pub allowed_touch: AllowedAgents,
    pub allowed_grab: AllowedAgents,
    pub allowed_use: AllowedAgents,
    /// Parenting behaviour for primary grabs.
    pub grab_attach: GrabAttach,
    /// Entity-side factor applied to throw velocity on release.
    pub throw_multiplier: f32,
    /// Keep holding the entity across a teleport of its holder.
    pub stay_grabbed_on_teleport: bool,
    /// Seconds to suspend the entity's collision detection after a grab.
    pub collision_pause_secs: f32,
    /// Free-form tags consulted by snap-zone validity policies.
    pub tags: Vec<String>,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            grabbable: true,
            usable: false,
            hold_to_grab: true,
            hold_to_use: true,
            use_only_if_grabbed: false,
            drop_policy: DropPolicy::DropAnywhere,
            disable_when_idle: false,
            secondary_action: SecondaryAction::None,
            allowed_near_touch: AllowedAgents::Both,
            allowed_touch: AllowedAgents::Both,
            allowed_grab: AllowedAgents::Both,
            allowed_use: AllowedAgents::Both,
            grab_attach: GrabAttach::TrackObject,
            throw_multiplier: 1.0,
            stay_grabbed_on_teleport: true,
            collision_pause_secs: 0.0,
            tags: Vec::new(),
        }
    }
}

impl EntityConfig {
    /// Checks numeric fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("throw_multiplier", self.throw_multiplier)?;
        non_negative("collision_pause_secs", self.collision_pause_secs)
    }

    /// Swappable entities hand off between agents on a second grab.
    pub fn is_swappable(&self) -> bool {
        self.secondary_action.is_swappable()
    }
}

/// Per-agent settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Agent class used by allowed-agent policies.
    pub hand: Hand,
    /// Agent-side factor applied to throw velocity on release.
    pub throw_multiplier: f32,
    /// Lead time in seconds during which a held grab button still grabs an
    /// entity that arrives into contact. Zero disables the window.
    pub grab_precognition_secs: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            hand: Hand::Right,
            throw_multiplier: 1.0,
            grab_precognition_secs: 0.0,
        }
    }
}

impl AgentConfig {
    /// Convenience constructor for a given hand with default settings.
    pub fn for_hand(hand: Hand) -> Self {
        Self {
            hand,
            ..Self::default()
        }
    }

    /// Checks numeric fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("throw_multiplier", self.throw_multiplier)?;
        non_negative("grab_precognition_secs", self.grab_precognition_secs)
    }
}

/// Snap zone settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapZoneConfig {
    /// Pinning applied once the occupant reaches the zone pose.
    pub mode: SnapMode,
    /// Seconds spent moving the occupant from its release pose to `pose`.
    pub transition_secs: f32,
    /// Pose the occupant is snapped to.
    pub pose: Pose,
    /// Which entities the zone accepts.
    pub policy: ValidityPolicy,
}

impl Default for SnapZoneConfig {
    fn default() -> Self {
        Self {
            mode: SnapMode::Kinematic,
            transition_secs: 0.1,
            pose: Pose::IDENTITY,
            policy: ValidityPolicy::AcceptAll,
        }
    }
}

impl SnapZoneConfig {
    /// Checks numeric fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("transition_secs", self.transition_secs)
    }
}
