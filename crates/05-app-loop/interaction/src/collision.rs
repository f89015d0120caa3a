//! Collision-ignore bookkeeping for (entity, agent) pairs.
//!
//! Each toggle yields the [`PhysicsCmd`] the host must apply, and only the
//! first ignore / first restore of a pair produces one, so unwinding happens
//! exactly once no matter how many release paths run.

use interact_abi::{AgentId, EntityId, PhysicsCmd};
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionIgnoreSet {
    pairs: BTreeSet<(EntityId, AgentId)>,
    paused: BTreeMap<EntityId, f32>,
}

impl CollisionIgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts ignoring collisions between `entity` and `agent`.
    pub fn ignore(&mut self, entity: EntityId, agent: AgentId) -> Option<PhysicsCmd> {
        self.pairs
            .insert((entity, agent))
            .then_some(PhysicsCmd::IgnoreCollision {
                entity,
                agent,
                ignore: true,
            })
    }

    /// Stops ignoring the pair.
    pub fn restore(&mut self, entity: EntityId, agent: AgentId) -> Option<PhysicsCmd> {
        self.pairs
            .remove(&(entity, agent))
            .then_some(PhysicsCmd::IgnoreCollision {
                entity,
                agent,
                ignore: false,
            })
    }

    /// Unwinds every pair and pause involving `entity`.
    pub fn restore_entity(&mut self, entity: EntityId) -> SmallVec<[PhysicsCmd; 4]> {
        let agents: SmallVec<[AgentId; 4]> = self
            .pairs
            .iter()
            .filter(|(e, _)| *e == entity)
            .map(|(_, a)| *a)
            .collect();
        let mut cmds: SmallVec<[PhysicsCmd; 4]> = agents
            .into_iter()
            .filter_map(|agent| self.restore(entity, agent))
            .collect();
        cmds.extend(self.unpause(entity));
        cmds
    }

    /// Unwinds every pair involving `agent`.
    pub fn restore_agent(&mut self, agent: AgentId) -> SmallVec<[PhysicsCmd; 4]> {
        let entities: SmallVec<[EntityId; 4]> = self
            .pairs
            .iter()
            .filter(|(_, a)| *a == agent)
            .map(|(e, _)| *e)
            .collect();
        entities
            .into_iter()
            .filter_map(|entity| self.restore(entity, agent))
            .collect()
    }

    /// Suspends collision detection on `entity` for `secs` seconds.
    ///
    /// A repeated pause only extends the remaining time.
    pub fn pause(&mut self, entity: EntityId, secs: f32) -> Option<PhysicsCmd> {
        match self.paused.get_mut(&entity) {
            Some(remaining) => {
                *remaining = remaining.max(secs);
                None
            }
            None => {
                self.paused.insert(entity, secs);
                Some(PhysicsCmd::DetectCollisions {
                    entity,
                    enabled: false,
                })
            }
        }
    }

    /// Re-enables collision detection if it was paused.
    pub fn unpause(&mut self, entity: EntityId) -> Option<PhysicsCmd> {
        self.paused
            .remove(&entity)
            .map(|_| PhysicsCmd::DetectCollisions {
                entity,
                enabled: true,
            })
    }

    /// Advances pause timers by `dt`, unpausing the ones that expire.
    pub fn advance(&mut self, dt: f32) -> SmallVec<[PhysicsCmd; 4]> {
        let mut expired: SmallVec<[EntityId; 4]> = SmallVec::new();
        for (entity, remaining) in self.paused.iter_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                expired.push(*entity);
            }
        }
        expired
            .into_iter()
            .filter_map(|entity| self.unpause(entity))
            .collect()
    }

    pub fn is_ignored(&self, entity: EntityId, agent: AgentId) -> bool {
        self.pairs.contains(&(entity, agent))
    }

    pub fn is_paused(&self, entity: EntityId) -> bool {
        self.paused.contains_key(&entity)
    }

    /// Number of ignored pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.paused.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const E: EntityId = EntityId(1);
    const A: AgentId = AgentId(7);

    #[test]
    fn restore_unwinds_exactly_once() {
        let mut set = CollisionIgnoreSet::new();
        assert!(set.ignore(E, A).is_some());
        assert!(set.ignore(E, A).is_none(), "second ignore is a no-op");

        assert_eq!(
            set.restore(E, A),
            Some(PhysicsCmd::IgnoreCollision {
                entity: E,
                agent: A,
                ignore: false
            })
        );
        assert!(set.restore(E, A).is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn pause_expires_after_advance() {
        let mut set = CollisionIgnoreSet::new();
        assert!(set.pause(E, 0.2).is_some());
        assert!(set.pause(E, 0.1).is_none());

        assert!(set.advance(0.15).is_empty());
        assert!(set.is_paused(E));
        let cmds = set.advance(0.1);
        assert_eq!(
            cmds.as_slice(),
            &[PhysicsCmd::DetectCollisions {
                entity: E,
                enabled: true
            }]
        );
        assert!(set.unpause(E).is_none());
    }

    #[test]
    fn restore_entity_clears_pairs_and_pause() {
        let mut set = CollisionIgnoreSet::new();
        set.ignore(E, A);
        set.ignore(E, AgentId(8));
        set.ignore(EntityId(2), A);
        set.pause(E, 1.0);

        let cmds = set.restore_entity(E);
        assert_eq!(cmds.len(), 3);
        assert!(set.is_ignored(EntityId(2), A));
        assert_eq!(set.len(), 1);
    }
}
