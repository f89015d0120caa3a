//! Per-agent grab coordination.
//!
//! The coordinator tracks what its agent holds, the grab button, the
//! precognition window, and whether a disable/enable cycle should re-grab an
//! undroppable entity. Entity-side rules live in [`Interactable`]; this type
//! only decides whether to ask.

use interact_abi::{
    AgentId, DropPolicy, EntityId, GrabOutcome, GrabRole, Hand, PhysicsCmd, Pose, Rejection, Vec3,
};
use interaction::{FollowUps, Interactable};
use log::debug;

#[derive(Clone, Debug, PartialEq)]
pub struct GrabCoordinator {
    agent: AgentId,
    grabbed: Option<EntityId>,
    button_held: bool,
    precognition_until: Option<f64>,
    /// The held entity refused button drops when it was grabbed.
    undroppable: bool,
    reacquire: Option<EntityId>,
}

impl GrabCoordinator {
    pub fn new(agent: AgentId) -> Self {
        Self {
            agent,
            grabbed: None,
            button_held: false,
            precognition_until: None,
            undroppable: false,
            reacquire: None,
        }
    }

    pub fn grabbed(&self) -> Option<EntityId> {
        self.grabbed
    }

    pub fn is_button_held(&self) -> bool {
        self.button_held
    }

    pub fn is_undroppable(&self) -> bool {
        self.undroppable
    }

    /// Entity to re-grab once both sides are enabled again.
    pub fn reacquire_target(&self) -> Option<EntityId> {
        self.reacquire
    }

    pub(crate) fn set_button(&mut self, held: bool) {
        self.button_held = held;
        if !held {
            self.precognition_until = None;
        }
    }

    /// Opens the precognition window until `now + secs`.
    pub(crate) fn arm_precognition(&mut self, now: f64, secs: f32) {
        if secs > 0.0 {
            self.precognition_until = Some(now + f64::from(secs));
        }
    }

    /// Whether a grab should still be attempted on contact at `now`.
    pub fn precognition_open(&self, now: f64) -> bool {
        self.button_held
            && self.grabbed.is_none()
            && self.precognition_until.is_some_and(|until| now <= until)
    }

    /// Asks `entity` to accept this agent as a holder.
    ///
    /// The agent must be touching the entity; precognition only changes when
    /// the world calls this, not what is required.
    pub fn attempt_grab(
        &mut self,
        hand: Hand,
        grip: &Pose,
        entity: &mut Interactable,
        out: &mut FollowUps,
    ) -> GrabOutcome {
        if self.grabbed.is_some() {
            return GrabOutcome::Rejected(Rejection::AlreadyHolding { agent: self.agent });
        }
        if !entity.state().is_touched_by(self.agent) {
            return GrabOutcome::Rejected(Rejection::NotTouching {
                entity: entity.id(),
                agent: self.agent,
            });
        }
        match entity.grab(self.agent, hand, grip, out) {
            Ok(role) => {
                self.grabbed = Some(entity.id());
                self.precognition_until = None;
                self.undroppable = entity.config().drop_policy == DropPolicy::NoDrop;
                if self.reacquire == Some(entity.id()) {
                    self.reacquire = None;
                }
                GrabOutcome::Accepted {
                    entity: entity.id(),
                    role,
                }
            }
            Err(reason) => GrabOutcome::Rejected(reason),
        }
    }

    /// Releases the held entity.
    ///
    /// `throw` carries the agent-side impulse; it is scaled by the entity's
    /// multiplier and applied only when the entity ends up free and dynamic.
    pub fn release(
        &mut self,
        entity: &mut Interactable,
        throw: Option<(Vec3, Vec3)>,
        out: &mut FollowUps,
    ) -> Result<Option<PhysicsCmd>, Rejection> {
        if self.grabbed != Some(entity.id()) {
            return Err(Rejection::NotHolding(self.agent));
        }
        let role = entity.ungrab(self.agent, out)?;
        self.clear_hold();
        debug!("{} let go of {} ({role:?})", self.agent, entity.id());

        let Some((linear, angular)) = throw else {
            return Ok(None);
        };
        if role != GrabRole::Primary || entity.state().is_grabbed() || entity.body.kinematic {
            return Ok(None);
        }
        let k = entity.config().throw_multiplier;
        let (linear, angular) = (linear * k, angular * k);
        entity.body.linear_velocity = linear;
        entity.body.angular_velocity = angular;
        Ok(Some(PhysicsCmd::SetVelocity {
            entity: entity.id(),
            linear,
            angular,
        }))
    }

    /// Whether a button release may let go of `entity` right now.
    pub fn may_drop(&self, entity: &Interactable, in_valid_zone: bool) -> Result<(), Rejection> {
        let allowed = match entity.config().drop_policy {
            DropPolicy::NoDrop => false,
            DropPolicy::DropAnywhere => true,
            DropPolicy::DropOnlyInValidZone => in_valid_zone,
        };
        if allowed {
            Ok(())
        } else {
            Err(Rejection::NotDroppable {
                entity: entity.id(),
            })
        }
    }

    /// Bookkeeping for a release that happened entity-side.
    pub(crate) fn note_released(&mut self, entity: EntityId) {
        if self.grabbed == Some(entity) {
            self.clear_hold();
        }
    }

    /// Records the held entity for re-acquisition if it is undroppable.
    pub(crate) fn remember_undroppable(&mut self) -> Option<EntityId> {
        if self.undroppable {
            self.reacquire = self.grabbed;
        }
        self.reacquire
    }

    pub(crate) fn forget_reacquire(&mut self, entity: EntityId) {
        if self.reacquire == Some(entity) {
            self.reacquire = None;
        }
    }

    fn clear_hold(&mut self) {
        self.grabbed = None;
        self.undroppable = false;
    }
}
