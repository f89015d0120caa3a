//! Outcome shapes for public operations.
//!
//! No operation raises; refusals come back as a [`Rejection`] wrapped in the
//! operation's outcome so callers can log or ignore them.

use crate::ids::{AgentId, EntityId, ZoneId};
use thiserror::Error;

/// Reason an operation degraded to a no-op.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("unknown {0}")]
    UnknownEntity(EntityId),
    #[error("unknown {0}")]
    UnknownAgent(AgentId),
    #[error("unknown {0}")]
    UnknownZone(ZoneId),
    #[error("{entity} is disabled")]
    EntityDisabled { entity: EntityId },
    #[error("{agent} is disabled")]
    AgentDisabled { agent: AgentId },
    #[error("{0} is already in the requested state")]
    AgentInState(AgentId),
    #[error("{agent} is not allowed to interact with {entity}")]
    AgentNotAllowed { entity: EntityId, agent: AgentId },
    #[error("{0} is not grabbable")]
    NotGrabbable(EntityId),
    #[error("{0} is not usable")]
    NotUsable(EntityId),
    #[error("{0} can only be used while grabbed")]
    RequiresGrab(EntityId),
    #[error("{0} is not touching anything")]
    NothingTouched(AgentId),
    #[error("{agent} is not touching {entity}")]
    NotTouching { entity: EntityId, agent: AgentId },
    #[error("{agent} already holds something")]
    AlreadyHolding { agent: AgentId },
    #[error("{entity} is already held by {agent}")]
    AlreadyHeld { entity: EntityId, agent: AgentId },
    #[error("{0} accepts no further holders")]
    NoFreeGrabSlot(EntityId),
    #[error("{0} holds nothing")]
    NotHolding(AgentId),
    #[error("{entity} may not be dropped here")]
    NotDroppable { entity: EntityId },
    #[error("{0} has no active use session")]
    NoUseSession(AgentId),
    #[error("{0} is already in the requested state")]
    AlreadyInState(EntityId),
    #[error("{0} is occupied")]
    ZoneOccupied(ZoneId),
    #[error("{zone} refuses {entity}")]
    ZonePolicy { zone: ZoneId, entity: EntityId },
    #[error("{entity} is already snapped into {zone}")]
    AlreadySnapped { entity: EntityId, zone: ZoneId },
    #[error("{0} is empty")]
    ZoneEmpty(ZoneId),
    #[error("{0} is still held")]
    StillGrabbed(EntityId),
}

/// Result of a transition request that either applies or degrades to a no-op.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored(Rejection),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    /// Returns the rejection, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Applied => None,
            Outcome::Ignored(reason) => Some(reason),
        }
    }
}

impl From<Result<(), Rejection>> for Outcome {
    fn from(result: Result<(), Rejection>) -> Self {
        match result {
            Ok(()) => Outcome::Applied,
            Err(reason) => Outcome::Ignored(reason),
        }
    }
}

/// Slot an accepted grab occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrabRole {
    /// Index 0: the authoritative holder.
    Primary,
    /// Index 1: auxiliary manipulation alongside the primary.
    Secondary,
}

/// Result of `AttemptGrab`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GrabOutcome {
    Accepted { entity: EntityId, role: GrabRole },
    Rejected(Rejection),
}

impl GrabOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, GrabOutcome::Accepted { .. })
    }
}

/// Result of `AttemptUse` / `AttemptStopUse`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UseOutcome {
    Started(EntityId),
    Stopped(EntityId),
    Ignored(Rejection),
}

/// Result of a programmatic snap request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnapOutcome {
    /// The entity was captured in this call.
    Captured,
    /// The entity was force-released and is captured on the next tick.
    Deferred,
    Rejected(Rejection),
}
