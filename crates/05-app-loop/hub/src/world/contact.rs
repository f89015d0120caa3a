use super::World;
use interact_abi::{AgentId, EntityId, Outcome, Rejection};
use interaction::FollowUps;

impl World {
    pub fn begin_near_touch(&mut self, entity: EntityId, agent: AgentId) -> Outcome {
        let result = self.near_touch(entity, agent, true);
        self.outcome(result)
    }

    pub fn end_near_touch(&mut self, entity: EntityId, agent: AgentId) -> Outcome {
        let result = self.near_touch(entity, agent, false);
        self.outcome(result)
    }

    pub fn begin_touch(&mut self, entity: EntityId, agent: AgentId) -> Outcome {
        let result = self.touch(entity, agent, true);
        self.outcome(result)
    }

    pub fn end_touch(&mut self, entity: EntityId, agent: AgentId) -> Outcome {
        let result = self.touch(entity, agent, false);
        self.outcome(result)
    }

    fn near_touch(&mut self, entity: EntityId, agent: AgentId, begin: bool) -> Result<(), Rejection> {
        let hand = if begin {
            self.agent_ready(agent)?.0
        } else {
            self.agents
                .get(agent)
                .ok_or(Rejection::UnknownAgent(agent))?
                .hand()
        };
        let e = self
            .entities
            .get_mut(entity)
            .ok_or(Rejection::UnknownEntity(entity))?;
        let mut out = FollowUps::new();
        let result = if begin {
            e.begin_near_touch(agent, hand, &mut out)
        } else {
            e.end_near_touch(agent, &mut out)
        };
        if result.is_ok() {
            if let Some(a) = self.agents.get_mut(agent) {
                if begin {
                    a.near.insert(entity);
                } else {
                    a.forget_near(entity);
                }
            }
        }
        self.apply(out);
        result
    }

    fn touch(&mut self, entity: EntityId, agent: AgentId, begin: bool) -> Result<(), Rejection> {
        let hand = if begin {
            self.agent_ready(agent)?.0
        } else {
            self.agents
                .get(agent)
                .ok_or(Rejection::UnknownAgent(agent))?
                .hand()
        };
        let e = self
            .entities
            .get_mut(entity)
            .ok_or(Rejection::UnknownEntity(entity))?;
        let mut out = FollowUps::new();
        let result = if begin {
            e.begin_touch(agent, hand, &mut out)
        } else {
            e.end_touch(agent, &mut out)
        };
        if result.is_ok() {
            if let Some(a) = self.agents.get_mut(agent) {
                if begin {
                    a.note_touch(entity);
                } else {
                    a.forget_touch(entity);
                }
            }
        }
        self.apply(out);
        result
    }
}
