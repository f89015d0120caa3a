use super::World;
use interact_abi::{AgentId, EntityId, GrabOutcome, Outcome, Rejection};
use interaction::FollowUps;
use log::debug;

impl World {
    /// Grabs whatever the agent is touching.
    pub fn attempt_grab(&mut self, agent: AgentId) -> GrabOutcome {
        match self.grab_target(agent) {
            Ok(entity) => self.grab_entity(agent, entity),
            Err(reason) => {
                self.note_rejection(&reason);
                GrabOutcome::Rejected(reason)
            }
        }
    }

    fn grab_target(&self, agent: AgentId) -> Result<EntityId, Rejection> {
        self.agent_ready(agent)?;
        let a = self.agents.get(agent).ok_or(Rejection::UnknownAgent(agent))?;
        if a.grabbed().is_some() {
            return Err(Rejection::AlreadyHolding { agent });
        }
        a.touched().ok_or(Rejection::NothingTouched(agent))
    }

    /// Grabs `entity`, first letting a snap zone give it up if it is pinned.
    pub(crate) fn grab_entity(&mut self, agent: AgentId, entity: EntityId) -> GrabOutcome {
        let (hand, grip) = match self.agent_ready(agent) {
            Ok(ready) => ready,
            Err(reason) => {
                self.note_rejection(&reason);
                return GrabOutcome::Rejected(reason);
            }
        };
        let (Some(a), Some(e)) = (self.agents.get_mut(agent), self.entities.get_mut(entity)) else {
            let reason = Rejection::UnknownEntity(entity);
            self.note_rejection(&reason);
            return GrabOutcome::Rejected(reason);
        };

        let mut out = FollowUps::new();
        if let Some(zone) = e.snapped_in().and_then(|z| self.zones.get_mut(z)) {
            let may_take = a.grabbed().is_none()
                && e.state().is_touched_by(agent)
                && e.config().allowed_grab.allows(hand)
                && zone.occupant_was_grabbable();
            if may_take {
                debug!("{agent} pulls {entity} out of {}", zone.id());
                if let Err(reason) = zone.release(e, Some(agent), &mut out) {
                    debug!("{} kept {entity}: {reason}", zone.id());
                }
            }
        }

        let outcome = a.grab.attempt_grab(hand, &grip, e, &mut out);
        self.apply(out);
        if let GrabOutcome::Rejected(reason) = &outcome {
            self.note_rejection(reason);
        }
        outcome
    }

    /// Programmatic release of whatever the agent holds.
    pub fn force_release(&mut self, agent: AgentId, apply_throw: bool) -> Outcome {
        let held = match self.agents.get(agent) {
            None => Err(Rejection::UnknownAgent(agent)),
            Some(a) => a.grabbed().ok_or(Rejection::NotHolding(agent)),
        };
        let result = held.and_then(|entity| self.release_held(agent, entity, apply_throw));
        self.outcome(result)
    }

    pub(crate) fn release_held(
        &mut self,
        agent: AgentId,
        entity: EntityId,
        apply_throw: bool,
    ) -> Result<(), Rejection> {
        let a = self
            .agents
            .get_mut(agent)
            .ok_or(Rejection::UnknownAgent(agent))?;
        let Some(e) = self.entities.get_mut(entity) else {
            a.grab.note_released(entity);
            return Err(Rejection::UnknownEntity(entity));
        };
        let impulse = apply_throw.then(|| a.throw_impulse());
        let mut out = FollowUps::new();
        let result = a.grab.release(e, impulse, &mut out);
        if let Ok(Some(cmd)) = &result {
            self.physics.push(*cmd);
        }
        self.apply(out);
        result.map(|_| ())
    }

    /// Grab button pressed: grab the touched entity, toggle-release a held
    /// toggle-grab entity, or open the precognition window.
    pub fn grab_pressed(&mut self, agent: AgentId) -> Outcome {
        if let Err(reason) = self.agent_ready(agent) {
            return self.outcome(Err(reason));
        }
        let now = self.now;
        let Some(a) = self.agents.get_mut(agent) else {
            return self.outcome(Err(Rejection::UnknownAgent(agent)));
        };
        a.grab.set_button(true);

        if let Some(held) = a.grabbed() {
            let toggles = self
                .entities
                .get(held)
                .is_some_and(|e| !e.config().hold_to_grab);
            return if toggles {
                let result = self.button_drop(agent, held);
                self.outcome(result)
            } else {
                self.outcome(Err(Rejection::AlreadyHolding { agent }))
            };
        }
        if a.touched().is_none() {
            let secs = a.config().grab_precognition_secs;
            a.grab.arm_precognition(now, secs);
            return self.outcome(Err(Rejection::NothingTouched(agent)));
        }
        match self.attempt_grab(agent) {
            GrabOutcome::Accepted { .. } => Outcome::Applied,
            GrabOutcome::Rejected(reason) => Outcome::Ignored(reason),
        }
    }

    /// Grab button released: drop a hold-to-grab entity if its policy allows.
    pub fn grab_released(&mut self, agent: AgentId) -> Outcome {
        let Some(a) = self.agents.get_mut(agent) else {
            return self.outcome(Err(Rejection::UnknownAgent(agent)));
        };
        a.grab.set_button(false);
        let Some(held) = a.grabbed() else {
            return self.outcome(Err(Rejection::NotHolding(agent)));
        };
        let holds = self
            .entities
            .get(held)
            .is_some_and(|e| e.config().hold_to_grab);
        let result = if holds {
            self.button_drop(agent, held)
        } else {
            Err(Rejection::AlreadyInState(held))
        };
        self.outcome(result)
    }

    fn button_drop(&mut self, agent: AgentId, held: EntityId) -> Result<(), Rejection> {
        let in_valid_zone = self.zones.values().any(|z| z.highlighted() == Some(held));
        let a = self.agents.get(agent).ok_or(Rejection::UnknownAgent(agent))?;
        let e = self.entities.get(held).ok_or(Rejection::UnknownEntity(held))?;
        a.grab.may_drop(e, in_valid_zone)?;
        self.release_held(agent, held, true)
    }
}
