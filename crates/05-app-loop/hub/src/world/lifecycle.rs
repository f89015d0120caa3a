use super::World;
use crate::deferred::DeferredTask;
use interact_abi::{AgentId, EntityId, Outcome, Pose, Rejection, ZoneId};
use interaction::FollowUps;
use log::{debug, info};

impl World {
    /// Ends every interaction on `entity`; queued if it is disabled.
    pub fn force_stop_all(&mut self, entity: EntityId) -> Outcome {
        let Some(e) = self.entities.get_mut(entity) else {
            return self.outcome(Err(Rejection::UnknownEntity(entity)));
        };
        let mut out = FollowUps::new();
        e.force_stop_all(&mut out);
        self.apply(out);
        Outcome::Applied
    }

    pub fn set_entity_enabled(&mut self, entity: EntityId, enabled: bool) -> Outcome {
        let result = if enabled {
            self.enable_entity(entity)
        } else {
            self.disable_entity(entity)
        };
        self.outcome(result)
    }

    fn disable_entity(&mut self, entity: EntityId) -> Result<(), Rejection> {
        let e = self
            .entities
            .get_mut(entity)
            .ok_or(Rejection::UnknownEntity(entity))?;
        if e.is_disabled() {
            return Err(Rejection::AlreadyInState(entity));
        }
        for agent in e.state().grabbing_agents() {
            if let Some(a) = self.agents.get_mut(agent) {
                a.grab.remember_undroppable();
            }
        }

        let mut out = FollowUps::new();
        if let Some(z) = e.snapped_in().and_then(|z| self.zones.get_mut(z)) {
            if let Err(reason) = z.release(e, None, &mut out) {
                debug!("{entity} disabled, {} kept it: {reason}", z.id());
            }
        }
        for z in self.zones.values_mut() {
            out.events.extend(z.unhighlight(entity));
        }
        e.disable(&mut out);
        let cancelled = self.deferred.cancel_owner(entity);
        if cancelled > 0 {
            debug!("{entity} disabled, cancelled {cancelled} deferred tasks");
        }
        self.apply(out);
        let cmds = self.collisions.restore_entity(entity);
        self.physics.extend(cmds);
        Ok(())
    }

    fn enable_entity(&mut self, entity: EntityId) -> Result<(), Rejection> {
        let e = self
            .entities
            .get_mut(entity)
            .ok_or(Rejection::UnknownEntity(entity))?;
        if !e.is_disabled() {
            return Err(Rejection::AlreadyInState(entity));
        }
        let mut out = FollowUps::new();
        e.enable(&mut out);
        self.apply(out);
        self.schedule_reacquire_for_entity(entity);
        Ok(())
    }

    fn schedule_reacquire_for_entity(&mut self, entity: EntityId) {
        let due = self.frame + 1;
        let waiting: Vec<AgentId> = self
            .agents
            .values()
            .filter(|a| a.is_enabled() && a.grab.reacquire_target() == Some(entity))
            .map(|a| a.id())
            .collect();
        for agent in waiting {
            self.deferred
                .schedule(entity, due, DeferredTask::Reacquire { agent, entity });
        }
    }

    pub fn set_agent_enabled(&mut self, agent: AgentId, enabled: bool) -> Outcome {
        let result = if enabled {
            self.enable_agent(agent)
        } else {
            self.disable_agent(agent)
        };
        self.outcome(result)
    }

    fn disable_agent(&mut self, agent: AgentId) -> Result<(), Rejection> {
        let a = self
            .agents
            .get_mut(agent)
            .ok_or(Rejection::UnknownAgent(agent))?;
        if !a.is_enabled() {
            return Err(Rejection::AgentInState(agent));
        }
        a.grab.remember_undroppable();
        a.grab.set_button(false);
        let held = a.grabbed();
        let using = a.using();
        let touching = a.touching.clone();
        let near: Vec<EntityId> = a.near_touching().collect();

        if let Some(entity) = held {
            let _ = self.release_held(agent, entity, false);
        }
        if using.is_some() {
            self.force_stop_using(agent);
        }
        for entity in touching {
            let _ = self.end_touch(entity, agent);
        }
        for entity in near {
            let _ = self.end_near_touch(entity, agent);
        }
        if let Some(a) = self.agents.get_mut(agent) {
            a.enabled = false;
        }
        let cmds = self.collisions.restore_agent(agent);
        self.physics.extend(cmds);
        info!("{agent} disabled");
        Ok(())
    }

    fn enable_agent(&mut self, agent: AgentId) -> Result<(), Rejection> {
        let a = self
            .agents
            .get_mut(agent)
            .ok_or(Rejection::UnknownAgent(agent))?;
        if a.is_enabled() {
            return Err(Rejection::AgentInState(agent));
        }
        a.enabled = true;
        let target = a.grab.reacquire_target();
        info!("{agent} enabled");
        if let Some(entity) = target {
            let active = self.entities.get(entity).is_some_and(|e| !e.is_disabled());
            if active {
                let due = self.frame + 1;
                self.deferred
                    .schedule(entity, due, DeferredTask::Reacquire { agent, entity });
            }
        }
        Ok(())
    }

    /// Frame task: re-grab an undroppable entity after a disable/enable cycle.
    pub(super) fn run_reacquire(&mut self, agent: AgentId, entity: EntityId) {
        let Ok((hand, _)) = self.agent_ready(agent) else {
            return;
        };
        let Some(a) = self.agents.get_mut(agent) else {
            return;
        };
        if a.grab.reacquire_target() != Some(entity) {
            return;
        }
        if a.grabbed().is_some() {
            // Already holding it again, or holding something else instead.
            a.grab.forget_reacquire(entity);
            return;
        }
        let Some(e) = self.entities.get_mut(entity) else {
            a.grab.forget_reacquire(entity);
            return;
        };
        if e.is_disabled() {
            return;
        }

        let mut out = FollowUps::new();
        match e.begin_touch(agent, hand, &mut out) {
            Ok(()) | Err(Rejection::AlreadyInState(_)) => a.note_touch(entity),
            Err(reason) => {
                debug!("{agent} cannot re-acquire {entity}: {reason}");
                a.grab.forget_reacquire(entity);
                self.apply(out);
                return;
            }
        }
        self.apply(out);

        let outcome = self.grab_entity(agent, entity);
        debug!("{agent} re-acquire of {entity}: {outcome:?}");
        if let Some(a) = self.agents.get_mut(agent) {
            a.grab.forget_reacquire(entity);
        }
    }

    /// Teleport started: drops held entities that must not travel along.
    pub fn teleport_begin(&mut self, agent: AgentId) -> Outcome {
        let Some(a) = self.agents.get(agent) else {
            return self.outcome(Err(Rejection::UnknownAgent(agent)));
        };
        let Some(entity) = a.grabbed() else {
            return Outcome::Applied;
        };
        let Some(e) = self.entities.get_mut(entity) else {
            return self.outcome(Err(Rejection::UnknownEntity(entity)));
        };
        if e.config().stay_grabbed_on_teleport {
            return Outcome::Applied;
        }
        e.body.zero_velocity();
        debug!("{agent} teleporting, dropping {entity}");
        self.force_stop_all(entity)
    }

    /// Teleport finished: moves the agent and brings a still-held entity along.
    pub fn teleport_end(&mut self, agent: AgentId, grip: Pose) -> Outcome {
        let Some(a) = self.agents.get_mut(agent) else {
            return self.outcome(Err(Rejection::UnknownAgent(agent)));
        };
        a.grip = grip;
        let Some(e) = a.grabbed().and_then(|id| self.entities.get_mut(id)) else {
            return Outcome::Applied;
        };
        if e.state().primary() == Some(agent) {
            let secondary_grip = e
                .state()
                .secondary()
                .and_then(|s| self.agents.get(s))
                .map(|s| s.grip);
            e.follow_grips(&grip, secondary_grip.as_ref());
            e.body.zero_velocity();
        }
        Outcome::Applied
    }

    pub fn despawn_entity(&mut self, entity: EntityId) -> Outcome {
        let Some(e) = self.entities.get_mut(entity) else {
            return self.outcome(Err(Rejection::UnknownEntity(entity)));
        };
        let mut out = FollowUps::new();
        if let Some(z) = e.snapped_in().and_then(|z| self.zones.get_mut(z)) {
            if let Err(reason) = z.release(e, None, &mut out) {
                debug!("despawning {entity}, {} kept it: {reason}", z.id());
            }
        }
        if e.is_disabled() {
            // Run the stop now rather than queueing it.
            e.enable(&mut out);
        }
        e.force_stop_all(&mut out);
        self.apply(out);

        for z in self.zones.values_mut() {
            z.vacate(entity);
            z.hover_exit(entity);
        }
        for a in self.agents.values_mut() {
            a.grab.forget_reacquire(entity);
            a.grab.note_released(entity);
            a.use_ctl.reset_if(entity);
            a.forget_touch(entity);
            a.forget_near(entity);
        }
        self.deferred.cancel_owner(entity);
        let cmds = self.collisions.restore_entity(entity);
        self.physics.extend(cmds);
        self.entities.remove(entity);
        debug!("despawned {entity}");
        Outcome::Applied
    }

    pub fn despawn_agent(&mut self, agent: AgentId) -> Outcome {
        if !self.agents.contains(agent) {
            return self.outcome(Err(Rejection::UnknownAgent(agent)));
        }
        let _ = self.disable_agent(agent);
        self.agents.remove(agent);
        debug!("despawned {agent}");
        Outcome::Applied
    }

    pub fn despawn_zone(&mut self, zone: ZoneId) -> Outcome {
        if !self.zones.contains(zone) {
            return self.outcome(Err(Rejection::UnknownZone(zone)));
        }
        let _ = self.unsnap(zone);
        if let Some(z) = self.zones.get_mut(zone) {
            if let Some(entity) = z.highlighted() {
                if let Some(event) = z.unhighlight(entity) {
                    self.publish(&event);
                }
            }
        }
        self.zones.remove(zone);
        debug!("despawned {zone}");
        Outcome::Applied
    }
}
