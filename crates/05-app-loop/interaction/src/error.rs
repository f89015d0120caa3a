use interact_abi::{AgentId, EntityId};
use thiserror::Error;

/// State that should be impossible but was observed anyway.
///
/// Never propagated to callers: the owner logs it, forces a full stop, and
/// restores defaults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Inconsistency {
    #[error("{entity} was grabbed without a saved pre-grab snapshot")]
    MissingSnapshot { entity: EntityId },
    #[error("{entity} is used by {agent} while ungrabbed but requires a grab")]
    UseWithoutGrab { entity: EntityId, agent: AgentId },
    #[error("{entity} holds {attach_points} attach points for {grabbers} grabbers")]
    AttachPointLeak {
        entity: EntityId,
        attach_points: usize,
        grabbers: usize,
    },
    #[error("{agent} believes it holds {entity}, which does not list it")]
    StaleGrab { agent: AgentId, entity: EntityId },
    #[error("{agent} believes it uses {entity}, which does not list it")]
    StaleUse { agent: AgentId, entity: EntityId },
}

impl Inconsistency {
    /// Entity whose state must be recovered.
    pub fn entity(&self) -> EntityId {
        match self {
            Inconsistency::MissingSnapshot { entity }
            | Inconsistency::UseWithoutGrab { entity, .. }
            | Inconsistency::AttachPointLeak { entity, .. }
            | Inconsistency::StaleGrab { entity, .. }
            | Inconsistency::StaleUse { entity, .. } => *entity,
        }
    }
}
