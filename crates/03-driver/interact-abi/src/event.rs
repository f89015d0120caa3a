use crate::ids::{AgentId, EntityId, ZoneId};
use serde::{Deserialize, Serialize};

/// Kind of state transition reported on the event feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionKind {
    NearTouchBegin,
    NearTouchEnd,
    TouchBegin,
    TouchEnd,
    GrabBegin,
    GrabEnd,
    UseBegin,
    UseEnd,
    SnapBegin,
    SnapEnd,
    /// A snap zone started highlighting a hovering entity.
    ZoneHighlightBegin,
    /// A snap zone stopped highlighting without capturing.
    ZoneHighlightEnd,
}

impl TransitionKind {
    /// Every kind, in declaration order.
    pub const ALL: [TransitionKind; 12] = [
        TransitionKind::NearTouchBegin,
        TransitionKind::NearTouchEnd,
        TransitionKind::TouchBegin,
        TransitionKind::TouchEnd,
        TransitionKind::GrabBegin,
        TransitionKind::GrabEnd,
        TransitionKind::UseBegin,
        TransitionKind::UseEnd,
        TransitionKind::SnapBegin,
        TransitionKind::SnapEnd,
        TransitionKind::ZoneHighlightBegin,
        TransitionKind::ZoneHighlightEnd,
    ];

    /// Returns whether the kind opens an interaction rather than closing one.
    pub fn is_begin(self) -> bool {
        matches!(
            self,
            TransitionKind::NearTouchBegin
                | TransitionKind::TouchBegin
                | TransitionKind::GrabBegin
                | TransitionKind::UseBegin
                | TransitionKind::SnapBegin
                | TransitionKind::ZoneHighlightBegin
        )
    }
}

/// One transition notification: `(entity, affecting agent, kind)`.
///
/// Snap and highlight transitions also name the zone. The agent is absent
/// for transitions not driven by an agent, such as a programmatic snap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub entity: EntityId,
    pub agent: Option<AgentId>,
    pub kind: TransitionKind,
    pub zone: Option<ZoneId>,
}

impl TransitionEvent {
    /// Creates an agent-driven transition.
    pub fn new(entity: EntityId, agent: AgentId, kind: TransitionKind) -> Self {
        Self {
            entity,
            agent: Some(agent),
            kind,
            zone: None,
        }
    }

    /// Creates a zone transition, optionally attributed to an agent.
    pub fn zone(
        entity: EntityId,
        zone: ZoneId,
        agent: Option<AgentId>,
        kind: TransitionKind,
    ) -> Self {
        Self {
            entity,
            agent,
            kind,
            zone: Some(zone),
        }
    }
}
