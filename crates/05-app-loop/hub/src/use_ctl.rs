use interact_abi::{AgentId, EntityId, Hand, Rejection, UseOutcome};
use interaction::{FollowUps, Interactable};
use log::debug;

/// Tracks the single entity an agent is using.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UseCoordinator {
    agent: AgentId,
    using: Option<EntityId>,
}

impl UseCoordinator {
    pub fn new(agent: AgentId) -> Self {
        Self { agent, using: None }
    }

    pub fn using(&self) -> Option<EntityId> {
        self.using
    }

    /// Starts using `entity`, or stops a toggle session the agent already owns.
    ///
    /// The caller stops any session on a different entity first.
    pub fn attempt_use(
        &mut self,
        hand: Hand,
        entity: &mut Interactable,
        out: &mut FollowUps,
    ) -> UseOutcome {
        let id = entity.id();
        if entity.state().user() == Some(self.agent) && !entity.config().hold_to_use {
            return match entity.stop_use(self.agent, out) {
                Ok(()) => {
                    self.using = None;
                    debug!("{} toggled off {id}", self.agent);
                    UseOutcome::Stopped(id)
                }
                Err(reason) => UseOutcome::Ignored(reason),
            };
        }
        match entity.start_use(self.agent, hand, out) {
            Ok(()) => {
                self.using = Some(id);
                UseOutcome::Started(id)
            }
            Err(reason) => UseOutcome::Ignored(reason),
        }
    }

    /// Button-release stop; only hold-to-use sessions end this way.
    pub fn attempt_stop_use(&mut self, entity: &mut Interactable, out: &mut FollowUps) -> UseOutcome {
        if self.using != Some(entity.id()) {
            return UseOutcome::Ignored(Rejection::NoUseSession(self.agent));
        }
        if !entity.config().hold_to_use {
            return UseOutcome::Ignored(Rejection::AlreadyInState(entity.id()));
        }
        self.stop(entity, out)
    }

    /// Ends the session regardless of hold/toggle mode.
    pub fn force_stop(&mut self, entity: &mut Interactable, out: &mut FollowUps) -> UseOutcome {
        if self.using != Some(entity.id()) {
            return UseOutcome::Ignored(Rejection::NoUseSession(self.agent));
        }
        self.stop(entity, out)
    }

    fn stop(&mut self, entity: &mut Interactable, out: &mut FollowUps) -> UseOutcome {
        let id = entity.id();
        let result = entity.stop_use(self.agent, out);
        // The coordinator lets go even if the entity had already ended it.
        self.using = None;
        match result {
            Ok(()) => UseOutcome::Stopped(id),
            Err(reason) => UseOutcome::Ignored(reason),
        }
    }

    /// Clears the local record without touching the entity.
    pub fn reset(&mut self) -> Option<EntityId> {
        self.using.take()
    }

    /// Clears the record if it names `entity`.
    pub(crate) fn reset_if(&mut self, entity: EntityId) {
        if self.using == Some(entity) {
            self.using = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interact_abi::{Body, EntityConfig};

    const A: AgentId = AgentId(2);

    fn usable(hold_to_use: bool) -> Interactable {
        let config = EntityConfig {
            usable: true,
            hold_to_use,
            ..EntityConfig::default()
        };
        Interactable::new(EntityId(5), config, Body::default())
    }

    #[test]
    fn toggle_press_twice_stops() {
        let mut coordinator = UseCoordinator::new(A);
        let mut entity = usable(false);
        let mut out = FollowUps::new();

        assert_eq!(
            coordinator.attempt_use(Hand::Right, &mut entity, &mut out),
            UseOutcome::Started(EntityId(5))
        );
        assert!(matches!(
            coordinator.attempt_stop_use(&mut entity, &mut out),
            UseOutcome::Ignored(_)
        ));
        assert_eq!(
            coordinator.attempt_use(Hand::Right, &mut entity, &mut out),
            UseOutcome::Stopped(EntityId(5))
        );
        assert_eq!(coordinator.using(), None);
    }

    #[test]
    fn hold_release_stops() {
        let mut coordinator = UseCoordinator::new(A);
        let mut entity = usable(true);
        let mut out = FollowUps::new();

        coordinator.attempt_use(Hand::Right, &mut entity, &mut out);
        assert_eq!(
            coordinator.attempt_stop_use(&mut entity, &mut out),
            UseOutcome::Stopped(EntityId(5))
        );
        assert!(!entity.state().is_used());
    }

    #[test]
    fn reset_forgets_without_entity() {
        let mut coordinator = UseCoordinator::new(A);
        let mut entity = usable(true);
        coordinator.attempt_use(Hand::Right, &mut entity, &mut FollowUps::new());
        assert_eq!(coordinator.reset(), Some(EntityId(5)));
        assert!(entity.state().is_used());
    }
}
