//! Authoritative interaction sets of a single entity.
//!
//! `InteractionState` is plain data plus queries; the transitions that mutate
//! it live on [`Interactable`](crate::Interactable) because they also touch
//! the entity's body and policy.

use crate::attach::AttachPointRegistry;
use crate::secondary::SecondaryInfluence;
use interact_abi::{AgentId, AttachPointId, GrabRole, ParentRef};
use smallvec::SmallVec;
use std::collections::BTreeSet;

/// Body/policy values captured on the not-grabbed → grabbed edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub parent: Option<ParentRef>,
    pub was_kinematic: bool,
    pub was_grabbable: bool,
}

/// One entry of the ordered grabber list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grabber {
    pub agent: AgentId,
    pub attach: AttachPointId,
    /// Monotonic grab sequence number; index 0 always carries the smaller one.
    pub since: u64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionState {
    pub(crate) near_touchers: BTreeSet<AgentId>,
    pub(crate) touchers: BTreeSet<AgentId>,
    pub(crate) grabbers: SmallVec<[Grabber; 2]>,
    pub(crate) user: Option<AgentId>,
    pub(crate) using_counter: u8,
    pub(crate) snapshot: Option<Snapshot>,
    pub(crate) attach_points: AttachPointRegistry,
    pub(crate) influence: Option<SecondaryInfluence>,
    grab_seq: u64,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Near-touch is only reported while no agent is touching.
    pub fn is_near_touched(&self) -> bool {
        self.touchers.is_empty() && !self.near_touchers.is_empty()
    }

    pub fn is_touched(&self) -> bool {
        !self.touchers.is_empty()
    }

    pub fn is_grabbed(&self) -> bool {
        !self.grabbers.is_empty()
    }

    pub fn is_used(&self) -> bool {
        self.user.is_some()
    }

    /// No near-touching, touching, grabbing, or using agent remains.
    pub fn is_idle(&self) -> bool {
        self.near_touchers.is_empty()
            && self.touchers.is_empty()
            && self.grabbers.is_empty()
            && self.user.is_none()
    }

    pub fn is_near_touched_by(&self, agent: AgentId) -> bool {
        self.near_touchers.contains(&agent)
    }

    pub fn is_touched_by(&self, agent: AgentId) -> bool {
        self.touchers.contains(&agent)
    }

    pub fn near_touchers(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.near_touchers.iter().copied()
    }

    pub fn touchers(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.touchers.iter().copied()
    }

    /// Grabbers in slot order (primary first).
    pub fn grabbers(&self) -> &[Grabber] {
        &self.grabbers
    }

    pub fn grabbing_agents(&self) -> SmallVec<[AgentId; 2]> {
        self.grabbers.iter().map(|g| g.agent).collect()
    }

    pub fn primary(&self) -> Option<AgentId> {
        self.grabbers.first().map(|g| g.agent)
    }

    pub fn secondary(&self) -> Option<AgentId> {
        self.grabbers.get(1).map(|g| g.agent)
    }

    /// Slot held by `agent`, if any.
    pub fn role_of(&self, agent: AgentId) -> Option<GrabRole> {
        match self.grabbers.iter().position(|g| g.agent == agent) {
            Some(0) => Some(GrabRole::Primary),
            Some(_) => Some(GrabRole::Secondary),
            None => None,
        }
    }

    pub fn user(&self) -> Option<AgentId> {
        self.user
    }

    /// Toggle-use reference count: 1 while a toggled session is active.
    pub fn using_counter(&self) -> u8 {
        self.using_counter
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn attach_points(&self) -> &AttachPointRegistry {
        &self.attach_points
    }

    pub fn influence(&self) -> Option<&SecondaryInfluence> {
        self.influence.as_ref()
    }

    pub(crate) fn push_grabber(&mut self, agent: AgentId, attach: AttachPointId) {
        debug_assert!(self.grabbers.len() < 2, "at most two grabbers");
        self.grab_seq += 1;
        self.grabbers.push(Grabber {
            agent,
            attach,
            since: self.grab_seq,
        });
    }
}
