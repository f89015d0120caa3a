use crate::grab::GrabCoordinator;
use crate::use_ctl::UseCoordinator;
use interact_abi::{AgentConfig, AgentId, EntityId, Hand, Pose, Vec3};
use std::collections::BTreeSet;

/// An interacting actor: grip pose, motion, contact sets, and coordinators.
#[derive(Clone, Debug)]
pub struct Agent {
    id: AgentId,
    config: AgentConfig,
    pub(crate) grip: Pose,
    pub(crate) velocity: Vec3,
    pub(crate) angular_velocity: Vec3,
    pub(crate) enabled: bool,
    /// Touched entities in contact order; the last one is the grab target.
    pub(crate) touching: Vec<EntityId>,
    pub(crate) near: BTreeSet<EntityId>,
    pub(crate) grab: GrabCoordinator,
    pub(crate) use_ctl: UseCoordinator,
}

impl Agent {
    pub(crate) fn new(id: AgentId, config: AgentConfig) -> Self {
        Self {
            id,
            config,
            grip: Pose::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            enabled: true,
            touching: Vec::new(),
            near: BTreeSet::new(),
            grab: GrabCoordinator::new(id),
            use_ctl: UseCoordinator::new(id),
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn hand(&self) -> Hand {
        self.config.hand
    }

    pub fn grip(&self) -> &Pose {
        &self.grip
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Most recently touched entity.
    pub fn touched(&self) -> Option<EntityId> {
        self.touching.last().copied()
    }

    pub fn touching(&self) -> &[EntityId] {
        &self.touching
    }

    pub fn near_touching(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.near.iter().copied()
    }

    pub fn grabbed(&self) -> Option<EntityId> {
        self.grab.grabbed()
    }

    pub fn using(&self) -> Option<EntityId> {
        self.use_ctl.using()
    }

    pub fn grab_coordinator(&self) -> &GrabCoordinator {
        &self.grab
    }

    /// Agent-side throw impulse before the entity's own multiplier.
    pub(crate) fn throw_impulse(&self) -> (Vec3, Vec3) {
        let k = self.config.throw_multiplier;
        (self.velocity * k, self.angular_velocity * k)
    }

    pub(crate) fn note_touch(&mut self, entity: EntityId) {
        if !self.touching.contains(&entity) {
            self.touching.push(entity);
        }
    }

    pub(crate) fn forget_touch(&mut self, entity: EntityId) {
        self.touching.retain(|e| *e != entity);
    }

    pub(crate) fn forget_near(&mut self, entity: EntityId) {
        self.near.remove(&entity);
    }
}
