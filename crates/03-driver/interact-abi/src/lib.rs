//! Interaction ABI types shared between the per-entity state machine, the
//! coordinators, and the host loop.
//!
//! This crate defines the boundary that collaborators (touch detectors, input
//! layers, highlight/haptics observers, the physics host) compile against. It
//! carries no behaviour beyond small policy predicates and pose helpers.

/// Runtime configuration records with serde defaults.
pub mod config;
/// Transition notifications fed to observers.
pub mod event;
/// Identity newtypes for agents, entities, zones, and attach points.
pub mod ids;
/// Result shapes returned by every public operation.
pub mod outcome;
/// Body state and commands exchanged with the physics host.
pub mod physics;
/// Interaction policies (allowed agents, drop, secondary action, snapping).
pub mod policy;
/// Rigid transforms built on `glam`.
pub mod pose;

pub use crate::config::{AgentConfig, ConfigError, EntityConfig, SnapZoneConfig};
pub use crate::event::{TransitionEvent, TransitionKind};
pub use crate::ids::{AgentId, AttachPointId, EntityId, ZoneId};
pub use crate::outcome::{GrabOutcome, GrabRole, Outcome, Rejection, SnapOutcome, UseOutcome};
pub use crate::physics::{Body, ParentRef, PhysicsCmd};
pub use crate::policy::{
    AllowedAgents, DropPolicy, GrabAttach, Hand, SecondaryAction, SnapMode, ValidityPolicy,
};
pub use crate::pose::Pose;
pub use glam::{Quat, Vec3};
