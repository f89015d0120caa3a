//! Snap drop zones.
//!
//! A zone highlights a valid, held entity hovering inside it, captures that
//! entity when it is released, eases it to the zone pose over the transition
//! time, then pins it according to the zone's [`SnapMode`].

use interact_abi::{
    AgentId, EntityId, ParentRef, Pose, Rejection, SnapMode, SnapZoneConfig, TransitionEvent,
    TransitionKind, ValidityPolicy, ZoneId,
};
use interaction::{FollowUps, Interactable, Snapshot};
use log::debug;
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneState {
    Empty,
    Highlighting(EntityId),
    Occupied(EntityId),
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Transition {
    from: Pose,
    elapsed: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SnapZone {
    id: ZoneId,
    config: SnapZoneConfig,
    state: ZoneState,
    hovering: BTreeSet<EntityId>,
    saved: Option<Snapshot>,
    transition: Option<Transition>,
}

impl SnapZone {
    pub fn new(id: ZoneId, config: SnapZoneConfig) -> Self {
        Self {
            id,
            config,
            state: ZoneState::Empty,
            hovering: BTreeSet::new(),
            saved: None,
            transition: None,
        }
    }

    pub fn id(&self) -> ZoneId {
        self.id
    }

    pub fn config(&self) -> &SnapZoneConfig {
        &self.config
    }

    pub fn state(&self) -> ZoneState {
        self.state
    }

    pub fn occupant(&self) -> Option<EntityId> {
        match self.state {
            ZoneState::Occupied(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn highlighted(&self) -> Option<EntityId> {
        match self.state {
            ZoneState::Highlighting(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn is_hovering(&self, entity: EntityId) -> bool {
        self.hovering.contains(&entity)
    }

    /// The occupant is still easing towards the zone pose.
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Grabbability the occupant had before it was captured.
    pub fn occupant_was_grabbable(&self) -> bool {
        self.saved.is_some_and(|s| s.was_grabbable)
    }

    pub fn accepts(&self, entity: &Interactable) -> bool {
        self.config.policy.accepts(&entity.config().tags)
    }

    pub(crate) fn set_policy(&mut self, policy: ValidityPolicy) {
        self.config.policy = policy;
    }

    pub(crate) fn hover_enter(&mut self, entity: EntityId) -> bool {
        self.hovering.insert(entity)
    }

    pub(crate) fn hover_exit(&mut self, entity: EntityId) -> bool {
        self.hovering.remove(&entity)
    }

    /// Starts highlighting `entity` if the zone is empty and the entity is a
    /// valid, held, unsnapped hover.
    pub(crate) fn refresh_highlight(&mut self, entity: &Interactable) -> Option<TransitionEvent> {
        if self.state != ZoneState::Empty
            || !self.hovering.contains(&entity.id())
            || !entity.is_active()
            || !entity.state().is_grabbed()
            || entity.snapped_in().is_some()
            || !self.accepts(entity)
        {
            return None;
        }
        self.state = ZoneState::Highlighting(entity.id());
        Some(TransitionEvent::zone(
            entity.id(),
            self.id,
            entity.state().primary(),
            TransitionKind::ZoneHighlightBegin,
        ))
    }

    /// Drops the highlight on `entity`, if any.
    pub(crate) fn unhighlight(&mut self, entity: EntityId) -> Option<TransitionEvent> {
        if self.state != ZoneState::Highlighting(entity) {
            return None;
        }
        self.state = ZoneState::Empty;
        Some(TransitionEvent::zone(
            entity,
            self.id,
            None,
            TransitionKind::ZoneHighlightEnd,
        ))
    }

    /// Takes `entity` in. The entity must be free and acceptable.
    pub(crate) fn capture(
        &mut self,
        entity: &mut Interactable,
        agent: Option<AgentId>,
        out: &mut FollowUps,
    ) -> Result<(), Rejection> {
        let id = entity.id();
        match self.state {
            ZoneState::Occupied(other) if other != id => return Err(Rejection::ZoneOccupied(self.id)),
            ZoneState::Occupied(_) => {
                return Err(Rejection::AlreadySnapped {
                    entity: id,
                    zone: self.id,
                })
            }
            _ => {}
        }
        if let Some(zone) = entity.snapped_in() {
            return Err(Rejection::AlreadySnapped { entity: id, zone });
        }
        if entity.state().is_grabbed() {
            return Err(Rejection::StillGrabbed(id));
        }
        if !self.accepts(entity) {
            return Err(Rejection::ZonePolicy {
                zone: self.id,
                entity: id,
            });
        }

        let saved = entity.enter_snap(self.id)?;
        if let Some(highlight) = self.highlighted().filter(|h| *h == id) {
            out.push_event(TransitionEvent::zone(
                highlight,
                self.id,
                None,
                TransitionKind::ZoneHighlightEnd,
            ));
        }
        self.saved = Some(saved);
        entity.body.zero_velocity();
        self.state = ZoneState::Occupied(id);
        self.transition = Some(Transition {
            from: entity.body.pose,
            elapsed: 0.0,
        });
        if self.config.transition_secs <= 0.0 {
            self.finish(entity);
        }
        debug!("{} captured {id}", self.id);
        out.push_event(TransitionEvent::zone(
            id,
            self.id,
            agent,
            TransitionKind::SnapBegin,
        ));
        Ok(())
    }

    /// Eases the occupant towards the zone pose; pins it on arrival.
    pub(crate) fn advance(&mut self, entity: &mut Interactable, dt: f32) {
        if self.occupant() != Some(entity.id()) {
            return;
        }
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        transition.elapsed += dt;
        let t = transition.elapsed / self.config.transition_secs;
        if t >= 1.0 {
            self.finish(entity);
        } else {
            entity.body.pose = transition.from.lerp(&self.config.pose, t);
        }
    }

    fn finish(&mut self, entity: &mut Interactable) {
        self.transition = None;
        entity.body.pose = self.config.pose;
        match self.config.mode {
            SnapMode::Kinematic => entity.body.kinematic = true,
            SnapMode::Joint => entity.body.joint = Some(self.id),
            SnapMode::Parenting => entity.body.parent = Some(ParentRef::Zone(self.id)),
        }
        debug!("{} pinned {} ({:?})", self.id, entity.id(), self.config.mode);
    }

    /// Lets the occupant go and restores what capture changed.
    pub(crate) fn release(
        &mut self,
        entity: &mut Interactable,
        agent: Option<AgentId>,
        out: &mut FollowUps,
    ) -> Result<(), Rejection> {
        if self.occupant() != Some(entity.id()) {
            return Err(Rejection::ZoneEmpty(self.id));
        }
        if let Some(saved) = self.saved.take() {
            entity.leave_snap(&saved);
        }
        self.state = ZoneState::Empty;
        self.transition = None;
        debug!("{} released {}", self.id, entity.id());
        out.push_event(TransitionEvent::zone(
            entity.id(),
            self.id,
            agent,
            TransitionKind::SnapEnd,
        ));
        Ok(())
    }

    /// Forgets `entity` without touching it (despawned or recovered).
    pub(crate) fn vacate(&mut self, entity: EntityId) -> bool {
        match self.state {
            ZoneState::Occupied(e) | ZoneState::Highlighting(e) if e == entity => {
                self.state = ZoneState::Empty;
                self.saved = None;
                self.transition = None;
                true
            }
            _ => false,
        }
    }
}
