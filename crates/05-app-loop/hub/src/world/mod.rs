//! The interaction world: explicit owner of entities, agents, and zones.
//!
//! Every public operation runs to completion on the caller's thread. Entity
//! transitions hand back [`FollowUps`]; the world applies their effects to
//! the coordinators it owns and publishes their events, so no actor ever
//! calls back into the entity that produced a follow-up.

mod contact;
mod frame;
mod grab_ops;
mod lifecycle;
mod snap_ops;
mod use_ops;

pub use frame::FrameReport;

use crate::agent::Agent;
use crate::deferred::DeferredQueue;
use crate::events::{EventBus, KindFilter, TransitionObserver};
use crate::registry::Registry;
use crate::snap_zone::SnapZone;
use crossbeam_channel::Receiver;
use interact_abi::{
    AgentConfig, AgentId, Body, ConfigError, EntityConfig, EntityId, Hand, Outcome, PhysicsCmd,
    Pose, Rejection, SnapZoneConfig, TransitionEvent, TransitionKind, Vec3, ZoneId,
};
use interaction::{CollisionIgnoreSet, Effect, FollowUps, Interactable};
use log::{debug, trace};
use smallvec::SmallVec;

/// Running counters, read by the host's health tracking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub events: u64,
    pub rejections: u64,
    pub recoveries: u64,
}

#[derive(Debug, Default)]
pub struct World {
    entities: Registry<EntityId, Interactable>,
    agents: Registry<AgentId, Agent>,
    zones: Registry<ZoneId, SnapZone>,
    collisions: CollisionIgnoreSet,
    bus: EventBus,
    deferred: DeferredQueue,
    physics: Vec<PhysicsCmd>,
    frame: u64,
    now: f64,
    stats: WorldStats,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_entity(&mut self, config: EntityConfig, body: Body) -> Result<EntityId, ConfigError> {
        config.validate()?;
        let id = self
            .entities
            .insert_with(|id| Interactable::new(id, config, body));
        debug!("spawned {id}");
        Ok(id)
    }

    pub fn spawn_agent(&mut self, config: AgentConfig) -> Result<AgentId, ConfigError> {
        config.validate()?;
        let id = self.agents.insert_with(|id| Agent::new(id, config));
        debug!("spawned {id}");
        Ok(id)
    }

    pub fn spawn_zone(&mut self, config: SnapZoneConfig) -> Result<ZoneId, ConfigError> {
        config.validate()?;
        let id = self.zones.insert_with(|id| SnapZone::new(id, config));
        debug!("spawned {id}");
        Ok(id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Interactable> {
        self.entities.get(id)
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn zone(&self, id: ZoneId) -> Option<&SnapZone> {
        self.zones.get(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Interactable> {
        self.entities.values()
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn zones(&self) -> impl Iterator<Item = &SnapZone> {
        self.zones.values()
    }

    pub fn collisions(&self) -> &CollisionIgnoreSet {
        &self.collisions
    }

    pub fn deferred(&self) -> &DeferredQueue {
        &self.deferred
    }

    pub fn stats(&self) -> WorldStats {
        self.stats
    }

    /// Frames completed by [`update`](Self::update).
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Registers an observer; it is wired at the end of the current frame.
    pub fn subscribe(&mut self, filter: KindFilter, observer: impl TransitionObserver + 'static) {
        self.bus.subscribe(filter, observer);
    }

    /// Opens a live channel of transition events.
    pub fn feed(&mut self) -> Receiver<TransitionEvent> {
        self.bus.feed()
    }

    /// Hands the accumulated physics commands to the host.
    pub fn drain_physics(&mut self) -> Vec<PhysicsCmd> {
        std::mem::take(&mut self.physics)
    }

    /// Updates an agent's tracked grip pose and motion.
    pub fn set_agent_motion(
        &mut self,
        agent: AgentId,
        grip: Pose,
        velocity: Vec3,
        angular_velocity: Vec3,
    ) -> Outcome {
        let Some(a) = self.agents.get_mut(agent) else {
            return self.outcome(Err(Rejection::UnknownAgent(agent)));
        };
        a.grip = grip;
        a.velocity = velocity;
        a.angular_velocity = angular_velocity;
        Outcome::Applied
    }

    /// Copies simulated body state in from the physics host.
    pub fn sync_body(&mut self, entity: EntityId, pose: Pose, linear: Vec3, angular: Vec3) -> Outcome {
        let Some(e) = self.entities.get_mut(entity) else {
            return self.outcome(Err(Rejection::UnknownEntity(entity)));
        };
        e.body.pose = pose;
        e.body.linear_velocity = linear;
        e.body.angular_velocity = angular;
        Outcome::Applied
    }

    /// Hand and grip of an enabled agent.
    fn agent_ready(&self, agent: AgentId) -> Result<(Hand, Pose), Rejection> {
        let a = self.agents.get(agent).ok_or(Rejection::UnknownAgent(agent))?;
        if !a.is_enabled() {
            return Err(Rejection::AgentDisabled { agent });
        }
        Ok((a.hand(), a.grip))
    }

    fn outcome(&mut self, result: Result<(), Rejection>) -> Outcome {
        if let Err(reason) = &result {
            self.note_rejection(reason);
        }
        result.into()
    }

    fn note_rejection(&mut self, reason: &Rejection) {
        self.stats.rejections += 1;
        trace!("ignored: {reason}");
    }

    fn publish(&mut self, event: &TransitionEvent) {
        self.stats.events += 1;
        self.bus.publish(event);
    }

    /// Applies effects to world bookkeeping, then publishes events in order.
    ///
    /// A grab begin refreshes zone highlights; a primary release that leaves
    /// the entity free lets a highlighting zone capture it.
    fn apply(&mut self, mut out: FollowUps) {
        for effect in out.effects.drain(..) {
            self.apply_effect(effect);
        }
        let mut grabbed: SmallVec<[EntityId; 2]> = SmallVec::new();
        let mut released: SmallVec<[(EntityId, AgentId); 2]> = SmallVec::new();
        for event in out.events.drain(..) {
            match (event.kind, event.agent) {
                (TransitionKind::GrabBegin, _) => grabbed.push(event.entity),
                (TransitionKind::GrabEnd, Some(agent)) => released.push((event.entity, agent)),
                _ => {}
            }
            self.publish(&event);
        }
        for entity in grabbed {
            self.refresh_highlights(entity);
        }
        for (entity, agent) in released {
            self.settle_release(entity, agent);
        }
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ReleaseAgent { entity, agent } => {
                if let Some(a) = self.agents.get_mut(agent) {
                    a.grab.note_released(entity);
                }
            }
            Effect::ResetUsing { entity, agent } => {
                if let Some(a) = self.agents.get_mut(agent) {
                    a.use_ctl.reset_if(entity);
                }
            }
            Effect::ClearTouch { entity, agent } => {
                if let Some(a) = self.agents.get_mut(agent) {
                    a.forget_touch(entity);
                }
            }
            Effect::ClearNearTouch { entity, agent } => {
                if let Some(a) = self.agents.get_mut(agent) {
                    a.forget_near(entity);
                }
            }
            Effect::IgnoreCollision {
                entity,
                agent,
                ignore,
            } => {
                let cmd = if ignore {
                    self.collisions.ignore(entity, agent)
                } else {
                    self.collisions.restore(entity, agent)
                };
                self.physics.extend(cmd);
            }
            Effect::PauseCollisions { entity, secs } => {
                let cmd = self.collisions.pause(entity, secs);
                self.physics.extend(cmd);
            }
            Effect::UnpauseCollisions { entity } => {
                let cmd = self.collisions.unpause(entity);
                self.physics.extend(cmd);
            }
            Effect::Recovered(reason) => {
                self.stats.recoveries += 1;
                let entity = reason.entity();
                for zone in self.zones.values_mut() {
                    zone.vacate(entity);
                }
            }
        }
    }

    fn refresh_highlights(&mut self, entity: EntityId) {
        let Some(e) = self.entities.get(entity) else {
            return;
        };
        let mut events: SmallVec<[TransitionEvent; 2]> = SmallVec::new();
        for zone in self.zones.values_mut() {
            events.extend(zone.refresh_highlight(e));
        }
        for event in &events {
            self.publish(event);
        }
    }

    fn settle_release(&mut self, entity: EntityId, agent: AgentId) {
        let Some(e) = self.entities.get_mut(entity) else {
            return;
        };
        if e.state().is_grabbed() || !e.is_active() {
            return;
        }
        let target = self
            .zones
            .values()
            .find(|z| z.highlighted() == Some(entity))
            .map(|z| z.id());
        let mut out = FollowUps::new();
        for zone in self.zones.values_mut() {
            if Some(zone.id()) == target {
                if let Err(reason) = zone.capture(e, Some(agent), &mut out) {
                    debug!("{} did not capture {entity}: {reason}", zone.id());
                }
            } else if let Some(event) = zone.unhighlight(entity) {
                out.push_event(event);
            }
        }
        if !out.is_empty() {
            self.apply(out);
        }
    }
}
