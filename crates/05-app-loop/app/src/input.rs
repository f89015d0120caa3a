use hub::{AgentId, EntityId, Pose, Vec3, ZoneId};
use serde::{Deserialize, Serialize};

/// Queue class of an input event.
///
/// Contact reports are applied before grab edges so a press in the same tick
/// sees the touch; grab edges go before use edges so a use targets what was
/// just picked up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputPriority {
    Contact,
    Grab,
    Use,
}

impl InputPriority {
    /// Every class, most urgent first.
    pub const ALL: [InputPriority; 3] = [InputPriority::Contact, InputPriority::Grab, InputPriority::Use];

    pub const fn index(self) -> usize {
        match self {
            InputPriority::Contact => 0,
            InputPriority::Grab => 1,
            InputPriority::Use => 2,
        }
    }
}

/// One host-reported input, as queued by the scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    NearTouchBegin {
        entity: EntityId,
        agent: AgentId,
    },
    NearTouchEnd {
        entity: EntityId,
        agent: AgentId,
    },
    TouchBegin {
        entity: EntityId,
        agent: AgentId,
    },
    TouchEnd {
        entity: EntityId,
        agent: AgentId,
    },
    ZoneEnter {
        zone: ZoneId,
        entity: EntityId,
    },
    ZoneExit {
        zone: ZoneId,
        entity: EntityId,
    },
    AgentMotion {
        agent: AgentId,
        grip: Pose,
        #[serde(default)]
        velocity: Vec3,
        #[serde(default)]
        angular_velocity: Vec3,
    },
    GrabPressed {
        agent: AgentId,
    },
    GrabReleased {
        agent: AgentId,
    },
    TeleportBegin {
        agent: AgentId,
    },
    TeleportEnd {
        agent: AgentId,
        grip: Pose,
    },
    UsePressed {
        agent: AgentId,
    },
    UseReleased {
        agent: AgentId,
    },
}

impl InputEvent {
    pub fn priority(&self) -> InputPriority {
        match self {
            InputEvent::NearTouchBegin { .. }
            | InputEvent::NearTouchEnd { .. }
            | InputEvent::TouchBegin { .. }
            | InputEvent::TouchEnd { .. }
            | InputEvent::ZoneEnter { .. }
            | InputEvent::ZoneExit { .. }
            | InputEvent::AgentMotion { .. } => InputPriority::Contact,
            InputEvent::GrabPressed { .. }
            | InputEvent::GrabReleased { .. }
            | InputEvent::TeleportBegin { .. }
            | InputEvent::TeleportEnd { .. } => InputPriority::Grab,
            InputEvent::UsePressed { .. } | InputEvent::UseReleased { .. } => InputPriority::Use,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_outranks_grab_outranks_use() {
        let agent = AgentId(0);
        let touch = InputEvent::TouchBegin {
            entity: EntityId(0),
            agent,
        };
        let grab = InputEvent::GrabPressed { agent };
        let use_ = InputEvent::UsePressed { agent };
        assert!(touch.priority().index() < grab.priority().index());
        assert!(grab.priority().index() < use_.priority().index());
    }

    /// Scripted sessions are stored as JSON lines of tagged events.
    #[test]
    fn parses_tagged_json() {
        let event: InputEvent =
            serde_json::from_str(r#"{"kind":"touch_begin","entity":3,"agent":1}"#).unwrap();
        assert_eq!(
            event,
            InputEvent::TouchBegin {
                entity: EntityId(3),
                agent: AgentId(1)
            }
        );
    }
}
