//! Interactable entity and its transitions.
//!
//! Every transition takes a `&mut FollowUps` sink and returns
//! `Result<_, Rejection>`. A rejection means nothing about the entity's
//! interaction sets changed, although a rejected grab may still clear the
//! rejected agent's touch and report that through the sink.

use crate::error::Inconsistency;
use crate::follow_ups::{Effect, FollowUps};
use crate::secondary::SecondaryInfluence;
use crate::state::{InteractionState, Snapshot};
use interact_abi::{
    AgentId, Body, EntityConfig, EntityId, GrabAttach, GrabRole, Hand, ParentRef, Pose, Rejection,
    TransitionKind, ZoneId,
};
use log::{debug, trace, warn};

/// Activation state of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Active,
    /// Idle and deactivated by `disable_when_idle`; wakes on any transition.
    Sleeping,
    /// Deactivated by the host; transitions are refused until re-enabled.
    Disabled,
}

/// An interactable entity: policy, body, and interaction state.
#[derive(Clone, Debug, PartialEq)]
pub struct Interactable {
    id: EntityId,
    config: EntityConfig,
    /// Physics-facing body state.
    pub body: Body,
    grabbable: bool,
    lifecycle: Lifecycle,
    snapped_in: Option<ZoneId>,
    pending_force_stop: bool,
    defaults: Snapshot,
    state: InteractionState,
}

impl Interactable {
    pub fn new(id: EntityId, config: EntityConfig, body: Body) -> Self {
        let defaults = Snapshot {
            parent: body.parent,
            was_kinematic: body.kinematic,
            was_grabbable: config.grabbable,
        };
        Self {
            id,
            grabbable: config.grabbable,
            config,
            body,
            lifecycle: Lifecycle::Active,
            snapped_in: None,
            pending_force_stop: false,
            defaults,
            state: InteractionState::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn config(&self) -> &EntityConfig {
        &self.config
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Current grabbability; suspended while held (unless swappable) or snapped.
    pub fn is_grabbable(&self) -> bool {
        self.grabbable
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    pub fn is_disabled(&self) -> bool {
        self.lifecycle == Lifecycle::Disabled
    }

    /// Zone currently holding the entity.
    pub fn snapped_in(&self) -> Option<ZoneId> {
        self.snapped_in
    }

    /// A `force_stop_all` is waiting for the entity to be re-enabled.
    pub fn has_pending_force_stop(&self) -> bool {
        self.pending_force_stop
    }

    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    fn wake(&mut self) -> Result<(), Rejection> {
        match self.lifecycle {
            Lifecycle::Active => Ok(()),
            Lifecycle::Sleeping => {
                debug!("{} woke from idle sleep", self.id);
                self.lifecycle = Lifecycle::Active;
                Ok(())
            }
            Lifecycle::Disabled => Err(Rejection::EntityDisabled { entity: self.id }),
        }
    }

    /// Sleeps the entity if it is idle and configured to do so.
    pub fn try_sleep(&mut self) -> bool {
        if self.config.disable_when_idle
            && self.lifecycle == Lifecycle::Active
            && self.state.is_idle()
        {
            debug!("{} idle, sleeping", self.id);
            self.lifecycle = Lifecycle::Sleeping;
            true
        } else {
            false
        }
    }

    pub fn begin_near_touch(
        &mut self,
        agent: AgentId,
        hand: Hand,
        out: &mut FollowUps,
    ) -> Result<(), Rejection> {
        self.wake()?;
        if !self.config.allowed_near_touch.allows(hand) {
            return Err(self.not_allowed(agent));
        }
        if !self.state.near_touchers.insert(agent) {
            return Err(Rejection::AlreadyInState(self.id));
        }
        trace!("{} near-touched by {agent}", self.id);
        out.emit(self.id, agent, TransitionKind::NearTouchBegin);
        Ok(())
    }

    pub fn end_near_touch(&mut self, agent: AgentId, out: &mut FollowUps) -> Result<(), Rejection> {
        self.wake()?;
        if !self.state.near_touchers.remove(&agent) {
            return Err(Rejection::AlreadyInState(self.id));
        }
        out.emit(self.id, agent, TransitionKind::NearTouchEnd);
        Ok(())
    }

    pub fn begin_touch(
        &mut self,
        agent: AgentId,
        hand: Hand,
        out: &mut FollowUps,
    ) -> Result<(), Rejection> {
        self.wake()?;
        if !self.config.allowed_touch.allows(hand) {
            return Err(self.not_allowed(agent));
        }
        if !self.state.touchers.insert(agent) {
            return Err(Rejection::AlreadyInState(self.id));
        }
        debug!("{} touched by {agent}", self.id);
        out.emit(self.id, agent, TransitionKind::TouchBegin);
        Ok(())
    }

    /// Ends a touch; a hold-to-use session owned by the agent ends with it.
    pub fn end_touch(&mut self, agent: AgentId, out: &mut FollowUps) -> Result<(), Rejection> {
        self.wake()?;
        if !self.state.touchers.remove(&agent) {
            return Err(Rejection::AlreadyInState(self.id));
        }
        if self.config.hold_to_use && self.state.user == Some(agent) {
            self.end_use_session(agent, out);
            out.push_effect(Effect::ResetUsing {
                entity: self.id,
                agent,
            });
        }
        debug!("{} untouched by {agent}", self.id);
        out.emit(self.id, agent, TransitionKind::TouchEnd);
        Ok(())
    }

    /// Adds `agent` as primary or secondary holder.
    ///
    /// The agent becomes primary when nothing holds the entity or when it is
    /// swappable (the previous primary is force-released first). Otherwise it
    /// becomes secondary if the secondary action accepts one.
    pub fn grab(
        &mut self,
        agent: AgentId,
        hand: Hand,
        grip: &Pose,
        out: &mut FollowUps,
    ) -> Result<GrabRole, Rejection> {
        self.wake()?;
        if !self.config.allowed_grab.allows(hand) {
            if self.state.touchers.remove(&agent) {
                out.emit(self.id, agent, TransitionKind::TouchEnd);
                out.push_effect(Effect::ClearTouch {
                    entity: self.id,
                    agent,
                });
            }
            return Err(self.not_allowed(agent));
        }
        if self.state.role_of(agent).is_some() {
            return Err(Rejection::AlreadyHeld {
                entity: self.id,
                agent,
            });
        }

        if !self.state.is_grabbed() || self.config.is_swappable() {
            if !self.grabbable {
                return Err(Rejection::NotGrabbable(self.id));
            }
            self.primary_grab(agent, grip, out);
            Ok(GrabRole::Primary)
        } else if self.config.secondary_action.accepts_secondary() && self.state.grabbers.len() < 2
        {
            self.secondary_grab(agent, grip, out);
            Ok(GrabRole::Secondary)
        } else {
            Err(Rejection::NoFreeGrabSlot(self.id))
        }
    }

    fn primary_grab(&mut self, agent: AgentId, grip: &Pose, out: &mut FollowUps) {
        if let Some(previous) = self.state.primary() {
            debug!("{} handed off from {previous} to {agent}", self.id);
            self.release_primary(previous, out);
            out.push_effect(Effect::ReleaseAgent {
                entity: self.id,
                agent: previous,
            });
        }

        self.state.snapshot = Some(Snapshot {
            parent: self.body.parent,
            was_kinematic: self.body.kinematic,
            was_grabbable: self.grabbable,
        });
        if !self.config.is_swappable() {
            self.grabbable = false;
        }
        self.body.kinematic = false;
        if self.config.grab_attach == GrabAttach::ChildOfAgent {
            self.body.parent = Some(ParentRef::Agent(agent));
        }

        let attach =
            self.state
                .attach_points
                .create(self.id, agent, GrabRole::Primary, grip, &self.body.pose);
        self.state.push_grabber(agent, attach);

        out.push_effect(Effect::IgnoreCollision {
            entity: self.id,
            agent,
            ignore: true,
        });
        if self.config.collision_pause_secs > 0.0 {
            out.push_effect(Effect::PauseCollisions {
                entity: self.id,
                secs: self.config.collision_pause_secs,
            });
        }
        debug!("{} grabbed by {agent} (primary)", self.id);
        out.emit(self.id, agent, TransitionKind::GrabBegin);
    }

    fn secondary_grab(&mut self, agent: AgentId, grip: &Pose, out: &mut FollowUps) {
        let attach =
            self.state
                .attach_points
                .create(self.id, agent, GrabRole::Secondary, grip, &self.body.pose);
        let primary_attach = self.state.grabbers[0].attach;
        self.state.push_grabber(agent, attach);

        let primary_grip = self
            .state
            .attach_points
            .get(primary_attach)
            .map(|point| self.body.pose.compose(&point.offset.inverse()))
            .unwrap_or(self.body.pose);
        self.state.influence = SecondaryInfluence::initialise(
            self.config.secondary_action,
            primary_attach,
            attach,
            &primary_grip,
            grip,
            &self.body,
        );

        out.push_effect(Effect::IgnoreCollision {
            entity: self.id,
            agent,
            ignore: true,
        });
        debug!("{} grabbed by {agent} (secondary)", self.id);
        out.emit(self.id, agent, TransitionKind::GrabBegin);
    }

    /// Removes `agent` from the grabbers.
    ///
    /// A secondary only gives up its slot. A primary ends the whole grab
    /// session: the secondary is dropped too and the pre-grab snapshot is
    /// restored.
    pub fn ungrab(&mut self, agent: AgentId, out: &mut FollowUps) -> Result<GrabRole, Rejection> {
        self.wake()?;
        match self.state.role_of(agent) {
            Some(GrabRole::Secondary) => {
                self.release_secondary(agent, out);
                Ok(GrabRole::Secondary)
            }
            Some(GrabRole::Primary) => {
                self.release_primary(agent, out);
                Ok(GrabRole::Primary)
            }
            None => Err(Rejection::NotHolding(agent)),
        }
    }

    fn release_secondary(&mut self, agent: AgentId, out: &mut FollowUps) {
        if let Some(index) = self.state.grabbers.iter().position(|g| g.agent == agent) {
            let grabber = self.state.grabbers.remove(index);
            self.state.attach_points.destroy(grabber.attach);
        }
        if let Some(influence) = self.state.influence.take() {
            influence.reset(&mut self.body);
        }
        out.push_effect(Effect::IgnoreCollision {
            entity: self.id,
            agent,
            ignore: false,
        });
        debug!("{} released by {agent} (secondary)", self.id);
        out.emit(self.id, agent, TransitionKind::GrabEnd);
    }

    fn release_primary(&mut self, agent: AgentId, out: &mut FollowUps) {
        out.push_effect(Effect::UnpauseCollisions { entity: self.id });
        out.push_effect(Effect::IgnoreCollision {
            entity: self.id,
            agent,
            ignore: false,
        });
        if let Some(grabber) = self.state.grabbers.first().copied() {
            self.state.attach_points.destroy(grabber.attach);
        }

        if self.config.hold_to_use && self.state.user == Some(agent) {
            self.end_use_session(agent, out);
            out.push_effect(Effect::ResetUsing {
                entity: self.id,
                agent,
            });
        }

        if let Some(secondary) = self.state.secondary() {
            if let Some(influence) = self.state.influence.take() {
                influence.reset(&mut self.body);
            }
            let attach = self.state.grabbers[1].attach;
            self.state.attach_points.destroy(attach);
            out.push_effect(Effect::IgnoreCollision {
                entity: self.id,
                agent: secondary,
                ignore: false,
            });
            debug!("{} dropped secondary {secondary} with its primary", self.id);
            out.emit(self.id, secondary, TransitionKind::GrabEnd);
            out.push_effect(Effect::ReleaseAgent {
                entity: self.id,
                agent: secondary,
            });
        }
        self.state.grabbers.clear();

        if self.config.use_only_if_grabbed {
            if let Some(user) = self.state.user {
                self.end_use_session(user, out);
                out.push_effect(Effect::ResetUsing {
                    entity: self.id,
                    agent: user,
                });
            }
        }

        let restored = self.state.snapshot.take();
        debug!("{} released by {agent} (primary)", self.id);
        out.emit(self.id, agent, TransitionKind::GrabEnd);
        match restored {
            Some(snapshot) => self.restore(&snapshot),
            None => self.recover(Inconsistency::MissingSnapshot { entity: self.id }, out),
        }
    }

    fn restore(&mut self, snapshot: &Snapshot) {
        self.body.parent = snapshot.parent;
        self.body.kinematic = snapshot.was_kinematic;
        if !self.config.is_swappable() {
            self.grabbable = snapshot.was_grabbable;
        }
    }

    /// Starts a use session for `agent`, replacing any other user.
    pub fn start_use(
        &mut self,
        agent: AgentId,
        hand: Hand,
        out: &mut FollowUps,
    ) -> Result<(), Rejection> {
        self.wake()?;
        self.use_allowed(agent, hand)?;
        match self.state.user {
            Some(current) if current == agent => {
                return Err(Rejection::AlreadyInState(self.id));
            }
            Some(current) => {
                debug!("{} use moves from {current} to {agent}", self.id);
                self.end_use_session(current, out);
                out.push_effect(Effect::ResetUsing {
                    entity: self.id,
                    agent: current,
                });
            }
            None => {}
        }
        self.state.user = Some(agent);
        self.state.using_counter = if self.config.hold_to_use { 0 } else { 1 };
        debug!("{} used by {agent}", self.id);
        out.emit(self.id, agent, TransitionKind::UseBegin);
        Ok(())
    }

    /// Policy checks for a new use session by `agent`; changes nothing.
    pub fn use_allowed(&self, agent: AgentId, hand: Hand) -> Result<(), Rejection> {
        if self.lifecycle == Lifecycle::Disabled {
            return Err(Rejection::EntityDisabled { entity: self.id });
        }
        if !self.config.usable {
            return Err(Rejection::NotUsable(self.id));
        }
        if self.config.use_only_if_grabbed && !self.state.is_grabbed() {
            return Err(Rejection::RequiresGrab(self.id));
        }
        if !self.config.allowed_use.allows(hand) {
            return Err(self.not_allowed(agent));
        }
        Ok(())
    }

    /// Ends `agent`'s use session.
    pub fn stop_use(&mut self, agent: AgentId, out: &mut FollowUps) -> Result<(), Rejection> {
        self.wake()?;
        if self.state.user != Some(agent) {
            return Err(Rejection::NoUseSession(agent));
        }
        self.end_use_session(agent, out);
        Ok(())
    }

    fn end_use_session(&mut self, agent: AgentId, out: &mut FollowUps) {
        self.state.user = None;
        self.state.using_counter = 0;
        debug!("{} unused by {agent}", self.id);
        out.emit(self.id, agent, TransitionKind::UseEnd);
    }

    /// Ends every interaction: grabs, use, touches, and near-touches.
    ///
    /// On a disabled entity the stop is queued until it is re-enabled.
    pub fn force_stop_all(&mut self, out: &mut FollowUps) {
        if self.lifecycle == Lifecycle::Disabled {
            trace!("{} disabled, queueing force stop", self.id);
            self.pending_force_stop = true;
            return;
        }
        if self.lifecycle == Lifecycle::Sleeping {
            self.lifecycle = Lifecycle::Active;
        }

        if let Some(primary) = self.state.primary() {
            self.release_primary(primary, out);
            out.push_effect(Effect::ReleaseAgent {
                entity: self.id,
                agent: primary,
            });
        }
        if let Some(user) = self.state.user {
            self.end_use_session(user, out);
            out.push_effect(Effect::ResetUsing {
                entity: self.id,
                agent: user,
            });
        }
        for agent in std::mem::take(&mut self.state.touchers) {
            out.emit(self.id, agent, TransitionKind::TouchEnd);
            out.push_effect(Effect::ClearTouch {
                entity: self.id,
                agent,
            });
        }
        for agent in std::mem::take(&mut self.state.near_touchers) {
            out.emit(self.id, agent, TransitionKind::NearTouchEnd);
            out.push_effect(Effect::ClearNearTouch {
                entity: self.id,
                agent,
            });
        }
    }

    /// Host deactivation: interactions stop, transitions are refused.
    pub fn disable(&mut self, out: &mut FollowUps) {
        if self.lifecycle == Lifecycle::Disabled {
            return;
        }
        self.force_stop_all(out);
        self.lifecycle = Lifecycle::Disabled;
        debug!("{} disabled", self.id);
    }

    /// Host reactivation; runs a queued force stop.
    pub fn enable(&mut self, out: &mut FollowUps) {
        if self.lifecycle != Lifecycle::Disabled {
            return;
        }
        self.lifecycle = Lifecycle::Active;
        debug!("{} enabled", self.id);
        if std::mem::take(&mut self.pending_force_stop) {
            self.force_stop_all(out);
        }
    }

    /// Suspends grabbability for a snap zone and returns the state to restore.
    ///
    /// A sleeping entity is woken first; a disabled one is refused.
    pub fn enter_snap(&mut self, zone: ZoneId) -> Result<Snapshot, Rejection> {
        self.wake()?;
        let saved = Snapshot {
            parent: self.body.parent,
            was_kinematic: self.body.kinematic,
            was_grabbable: self.grabbable,
        };
        self.snapped_in = Some(zone);
        self.grabbable = false;
        Ok(saved)
    }

    /// Undoes [`enter_snap`](Self::enter_snap) and any pin the zone applied.
    pub fn leave_snap(&mut self, saved: &Snapshot) {
        self.snapped_in = None;
        self.body.joint = None;
        self.body.parent = saved.parent;
        self.body.kinematic = saved.was_kinematic;
        self.grabbable = saved.was_grabbable;
    }

    /// Keeps a held entity aligned with its holders' grips.
    pub fn follow_grips(&mut self, primary_grip: &Pose, secondary_grip: Option<&Pose>) {
        let Some(primary) = self.state.grabbers.first() else {
            return;
        };
        if let Some(point) = self.state.attach_points.get(primary.attach) {
            self.body.pose = point.entity_pose(primary_grip);
        }
        if let (Some(influence), Some(secondary_grip)) = (&self.state.influence, secondary_grip) {
            influence.process(&mut self.body, primary_grip, secondary_grip);
        }
    }

    /// Checks internal invariants.
    pub fn audit(&self) -> Option<Inconsistency> {
        let grabbers = self.state.grabbers.len();
        if grabbers > 0 && self.state.snapshot.is_none() {
            return Some(Inconsistency::MissingSnapshot { entity: self.id });
        }
        if self.state.attach_points.len() != grabbers {
            return Some(Inconsistency::AttachPointLeak {
                entity: self.id,
                attach_points: self.state.attach_points.len(),
                grabbers,
            });
        }
        match self.state.user {
            Some(agent) if self.config.use_only_if_grabbed && grabbers == 0 => {
                Some(Inconsistency::UseWithoutGrab {
                    entity: self.id,
                    agent,
                })
            }
            _ => None,
        }
    }

    /// Loud local recovery: full stop, then policy defaults.
    pub fn recover(&mut self, reason: Inconsistency, out: &mut FollowUps) {
        warn!("{}: {reason}; forcing full stop", self.id);
        if self.lifecycle == Lifecycle::Disabled {
            self.lifecycle = Lifecycle::Active;
            self.force_stop_all(out);
            self.lifecycle = Lifecycle::Disabled;
        } else {
            self.force_stop_all(out);
        }
        let leaked = self.state.attach_points.clear();
        if leaked > 0 {
            warn!("{}: destroyed {leaked} orphaned attach points", self.id);
        }
        self.state.influence = None;
        self.state.snapshot = None;
        self.snapped_in = None;
        self.body.joint = None;
        self.body.parent = self.defaults.parent;
        self.body.kinematic = self.defaults.was_kinematic;
        self.grabbable = self.defaults.was_grabbable;
        out.push_effect(Effect::Recovered(reason));
    }

    fn not_allowed(&self, agent: AgentId) -> Rejection {
        trace!("{} refuses {agent} by allowed-agent policy", self.id);
        Rejection::AgentNotAllowed {
            entity: self.id,
            agent,
        }
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut InteractionState {
        &mut self.state
    }
}
