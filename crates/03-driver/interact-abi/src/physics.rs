//! Body state shared with the opaque physics host.

use crate::ids::{AgentId, EntityId, ZoneId};
use crate::pose::Pose;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Transform parent of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentRef {
    /// Child of an agent's grip.
    Agent(AgentId),
    /// Child of a snap zone.
    Zone(ZoneId),
    /// Child of some host scene node.
    Scene(u32),
}

/// Rigid body state of an entity as seen by the interaction core.
///
/// The host copies simulated pose/velocity in and reads flag changes out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pose: Pose,
    /// `None` means the entity sits at the scene root.
    pub parent: Option<ParentRef>,
    pub kinematic: bool,
    /// Zone joint the body is attached to, if any.
    pub joint: Option<ZoneId>,
    pub scale: Vec3,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl Body {
    /// Dynamic, unparented body at `pose`.
    pub fn at(pose: Pose) -> Self {
        Self {
            pose,
            ..Self::default()
        }
    }

    /// Clears linear and angular velocity.
    pub fn zero_velocity(&mut self) {
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }
}

impl Default for Body {
    fn default() -> Self {
        Self {
            pose: Pose::IDENTITY,
            parent: None,
            kinematic: false,
            joint: None,
            scale: Vec3::ONE,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }
}

/// Command for the physics host, drained once per frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PhysicsCmd {
    /// Toggle collision between the entity and the agent's volumes.
    IgnoreCollision {
        entity: EntityId,
        agent: AgentId,
        ignore: bool,
    },
    /// Toggle collision detection on the entity's body.
    DetectCollisions { entity: EntityId, enabled: bool },
    /// Impart velocity, typically a throw on release.
    SetVelocity {
        entity: EntityId,
        linear: Vec3,
        angular: Vec3,
    },
}
