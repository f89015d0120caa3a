use super::World;
use interact_abi::{AgentId, EntityId, Hand, Outcome, Rejection, UseOutcome};
use interaction::FollowUps;

impl World {
    /// Use button pressed.
    ///
    /// Targets the touched entity when it is usable, else the held one. A
    /// session on a different entity is stopped once the new target is known
    /// to accept the agent; pressing again on a toggle session stops it.
    pub fn attempt_use(&mut self, agent: AgentId) -> UseOutcome {
        let (target, hand) = match self.use_target(agent) {
            Ok(found) => found,
            Err(reason) => return self.use_rejected(reason),
        };
        let previous = self.agents.get(agent).and_then(|a| a.using());
        if previous.is_some_and(|p| p != target) {
            let allowed = self
                .entities
                .get(target)
                .ok_or(Rejection::UnknownEntity(target))
                .and_then(|e| e.use_allowed(agent, hand));
            if let Err(reason) = allowed {
                return self.use_rejected(reason);
            }
            self.force_stop_using(agent);
        }

        let (Some(a), Some(e)) = (self.agents.get_mut(agent), self.entities.get_mut(target)) else {
            return self.use_rejected(Rejection::UnknownEntity(target));
        };
        let mut out = FollowUps::new();
        let outcome = a.use_ctl.attempt_use(hand, e, &mut out);
        self.apply(out);
        self.use_result(outcome)
    }

    fn use_target(&self, agent: AgentId) -> Result<(EntityId, Hand), Rejection> {
        let (hand, _) = self.agent_ready(agent)?;
        let a = self.agents.get(agent).ok_or(Rejection::UnknownAgent(agent))?;
        let usable = |id: &EntityId| self.entities.get(*id).is_some_and(|e| e.config().usable);
        let target = a
            .touched()
            .filter(usable)
            .or_else(|| a.grabbed().filter(usable))
            .or_else(|| a.touched().or(a.grabbed()))
            .ok_or(Rejection::NothingTouched(agent))?;
        Ok((target, hand))
    }

    /// Use button released; ends hold-to-use sessions only.
    pub fn attempt_stop_use(&mut self, agent: AgentId) -> UseOutcome {
        let using = match self.agents.get(agent) {
            None => Err(Rejection::UnknownAgent(agent)),
            Some(a) => a.using().ok_or(Rejection::NoUseSession(agent)),
        };
        let entity = match using {
            Ok(entity) => entity,
            Err(reason) => return self.use_rejected(reason),
        };
        let (Some(a), Some(e)) = (self.agents.get_mut(agent), self.entities.get_mut(entity)) else {
            return self.use_rejected(Rejection::UnknownEntity(entity));
        };
        let mut out = FollowUps::new();
        let outcome = a.use_ctl.attempt_stop_use(e, &mut out);
        self.apply(out);
        self.use_result(outcome)
    }

    /// Ends the agent's session whatever its mode.
    pub fn force_stop_using(&mut self, agent: AgentId) -> UseOutcome {
        let Some(a) = self.agents.get_mut(agent) else {
            return self.use_rejected(Rejection::UnknownAgent(agent));
        };
        let Some(entity) = a.using() else {
            return self.use_rejected(Rejection::NoUseSession(agent));
        };
        let Some(e) = self.entities.get_mut(entity) else {
            a.use_ctl.reset();
            return UseOutcome::Stopped(entity);
        };
        let mut out = FollowUps::new();
        let outcome = a.use_ctl.force_stop(e, &mut out);
        self.apply(out);
        self.use_result(outcome)
    }

    /// Clears the agent's use record without notifying the entity.
    pub fn force_reset_using(&mut self, agent: AgentId) -> Outcome {
        let result = match self.agents.get_mut(agent) {
            None => Err(Rejection::UnknownAgent(agent)),
            Some(a) => a
                .use_ctl
                .reset()
                .map(|_| ())
                .ok_or(Rejection::NoUseSession(agent)),
        };
        self.outcome(result)
    }

    fn use_rejected(&mut self, reason: Rejection) -> UseOutcome {
        self.note_rejection(&reason);
        UseOutcome::Ignored(reason)
    }

    fn use_result(&mut self, outcome: UseOutcome) -> UseOutcome {
        if let UseOutcome::Ignored(reason) = &outcome {
            self.note_rejection(reason);
        }
        outcome
    }
}
