use crate::error::Inconsistency;
use interact_abi::{AgentId, EntityId, TransitionEvent, TransitionKind};
use smallvec::SmallVec;

/// Work another actor must do after an entity transition.
///
/// Effects only update bookkeeping outside the entity; none of them calls
/// back into the entity that produced it.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// The agent no longer holds the entity (forced release, swap, or
    /// secondary dropped with its primary).
    ReleaseAgent { entity: EntityId, agent: AgentId },
    /// The agent's use session on the entity ended without its involvement.
    ResetUsing { entity: EntityId, agent: AgentId },
    /// The agent's touch on the entity was cleared.
    ClearTouch { entity: EntityId, agent: AgentId },
    /// The agent's near-touch on the entity was cleared.
    ClearNearTouch { entity: EntityId, agent: AgentId },
    /// Toggle collision between the entity and the agent.
    IgnoreCollision {
        entity: EntityId,
        agent: AgentId,
        ignore: bool,
    },
    /// Suspend collision detection on the entity for `secs`.
    PauseCollisions { entity: EntityId, secs: f32 },
    /// Resume collision detection on the entity.
    UnpauseCollisions { entity: EntityId },
    /// An inconsistency was detected and recovered locally.
    Recovered(Inconsistency),
}

/// Output of one or more entity transitions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FollowUps {
    /// Notifications for the transition feed, in emission order.
    pub events: SmallVec<[TransitionEvent; 4]>,
    /// Bookkeeping for other actors, in emission order.
    pub effects: SmallVec<[Effect; 4]>,
}

impl FollowUps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_event(&mut self, event: TransitionEvent) {
        self.events.push(event);
    }

    /// Adds an agent-driven transition event.
    pub fn emit(&mut self, entity: EntityId, agent: AgentId, kind: TransitionKind) {
        self.events.push(TransitionEvent::new(entity, agent, kind));
    }

    pub fn push_effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Moves everything out of `other`, keeping order.
    pub fn append(&mut self, other: &mut FollowUps) {
        self.events.extend(other.events.drain(..));
        self.effects.extend(other.effects.drain(..));
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.effects.is_empty()
    }

    /// Kinds of the recorded events, mostly for assertions.
    pub fn kinds(&self) -> Vec<TransitionKind> {
        self.events.iter().map(|event| event.kind).collect()
    }
}
