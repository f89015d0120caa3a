use super::World;
use crate::deferred::DeferredTask;
use interact_abi::{EntityId, Outcome, Rejection, SnapOutcome, ValidityPolicy, ZoneId};
use interaction::FollowUps;
use log::debug;

impl World {
    /// An entity's volume entered the zone.
    pub fn zone_enter(&mut self, zone: ZoneId, entity: EntityId) -> Outcome {
        let result = self.hover(zone, entity, true);
        self.outcome(result)
    }

    /// An entity's volume left the zone.
    pub fn zone_exit(&mut self, zone: ZoneId, entity: EntityId) -> Outcome {
        let result = self.hover(zone, entity, false);
        self.outcome(result)
    }

    fn hover(&mut self, zone: ZoneId, entity: EntityId, enter: bool) -> Result<(), Rejection> {
        if !self.entities.contains(entity) {
            return Err(Rejection::UnknownEntity(entity));
        }
        let z = self.zones.get_mut(zone).ok_or(Rejection::UnknownZone(zone))?;
        if enter {
            if !z.hover_enter(entity) {
                return Err(Rejection::AlreadyInState(entity));
            }
            self.refresh_highlights(entity);
        } else {
            if !z.hover_exit(entity) {
                return Err(Rejection::AlreadyInState(entity));
            }
            if let Some(event) = z.unhighlight(entity) {
                self.publish(&event);
            }
        }
        Ok(())
    }

    /// Snaps `entity` into `zone` programmatically.
    ///
    /// A held entity is force-released first and captured one frame later.
    pub fn force_snap(&mut self, zone: ZoneId, entity: EntityId) -> SnapOutcome {
        match self.try_force_snap(zone, entity) {
            Ok(outcome) => outcome,
            Err(reason) => {
                self.note_rejection(&reason);
                SnapOutcome::Rejected(reason)
            }
        }
    }

    fn try_force_snap(&mut self, zone: ZoneId, entity: EntityId) -> Result<SnapOutcome, Rejection> {
        let e = self
            .entities
            .get(entity)
            .ok_or(Rejection::UnknownEntity(entity))?;
        let z = self.zones.get(zone).ok_or(Rejection::UnknownZone(zone))?;
        if e.is_disabled() {
            return Err(Rejection::EntityDisabled { entity });
        }
        if let Some(current) = e.snapped_in() {
            return Err(Rejection::AlreadySnapped {
                entity,
                zone: current,
            });
        }
        if z.occupant().is_some() {
            return Err(Rejection::ZoneOccupied(zone));
        }
        if !z.accepts(e) {
            return Err(Rejection::ZonePolicy { zone, entity });
        }

        if !e.state().is_grabbed() {
            let mut out = FollowUps::new();
            let (Some(z), Some(e)) = (self.zones.get_mut(zone), self.entities.get_mut(entity)) else {
                return Err(Rejection::UnknownZone(zone));
            };
            let result = z.capture(e, None, &mut out);
            self.apply(out);
            return result.map(|()| SnapOutcome::Captured);
        }

        debug!("{entity} held; releasing before snapping into {zone}");
        let holders = e.state().grabbing_agents();
        let mut out = FollowUps::new();
        for z in self.zones.values_mut() {
            out.events.extend(z.unhighlight(entity));
        }
        self.apply(out);
        // Releasing the primary also lets go of the secondary.
        if let Some(primary) = holders.first() {
            self.release_held(*primary, entity, false)?;
        }
        let due = self.frame + 1;
        self.deferred
            .schedule(entity, due, DeferredTask::ForceSnap { zone, entity });
        Ok(SnapOutcome::Deferred)
    }

    /// Frame task: finish a deferred snap if it is still possible.
    pub(super) fn run_force_snap(&mut self, zone: ZoneId, entity: EntityId) {
        let (Some(z), Some(e)) = (self.zones.get_mut(zone), self.entities.get_mut(entity)) else {
            return;
        };
        if e.is_disabled() || e.state().is_grabbed() {
            debug!("deferred snap of {entity} into {zone} dropped");
            return;
        }
        let mut out = FollowUps::new();
        if let Err(reason) = z.capture(e, None, &mut out) {
            debug!("deferred snap of {entity} into {zone} refused: {reason}");
        }
        self.apply(out);
    }

    /// Releases the zone's occupant.
    pub fn force_unsnap(&mut self, zone: ZoneId) -> Outcome {
        let result = self.unsnap(zone);
        self.outcome(result)
    }

    pub(super) fn unsnap(&mut self, zone: ZoneId) -> Result<(), Rejection> {
        let z = self.zones.get_mut(zone).ok_or(Rejection::UnknownZone(zone))?;
        let occupant = z.occupant().ok_or(Rejection::ZoneEmpty(zone))?;
        let e = self
            .entities
            .get_mut(occupant)
            .ok_or(Rejection::UnknownEntity(occupant))?;
        let mut out = FollowUps::new();
        z.release(e, None, &mut out)?;
        self.apply(out);
        Ok(())
    }

    /// Replaces the zone's validity policy; an occupant it now refuses is let go.
    pub fn set_zone_policy(&mut self, zone: ZoneId, policy: ValidityPolicy) -> Outcome {
        let Some(z) = self.zones.get_mut(zone) else {
            return self.outcome(Err(Rejection::UnknownZone(zone)));
        };
        z.set_policy(policy);

        let mut out = FollowUps::new();
        let refused = |id: EntityId| self.entities.get(id).is_some_and(|e| !z.accepts(e));
        let drop_occupant = z.occupant().filter(|id| refused(*id));
        let drop_highlight = z.highlighted().filter(|id| refused(*id));
        if let Some(entity) = drop_highlight {
            out.events.extend(z.unhighlight(entity));
        }
        if let (Some(entity), Some(e)) = (
            drop_occupant,
            drop_occupant.and_then(|id| self.entities.get_mut(id)),
        ) {
            debug!("{zone} no longer accepts {entity}");
            if let Err(reason) = z.release(e, None, &mut out) {
                debug!("{zone} could not drop {entity}: {reason}");
            }
        }
        self.apply(out);
        Outcome::Applied
    }
}
