//! Attach points: named anchors created at grab time and destroyed at ungrab.
//!
//! An attach point records where the entity sat relative to the grabbing
//! agent's grip when the grab began, so the entity can be kept aligned with
//! the grip for the rest of the session. Each registry belongs to exactly one
//! entity's interaction state.

use interact_abi::{AgentId, AttachPointId, EntityId, GrabRole, Pose};
use std::collections::BTreeMap;

/// Anchor aligning an entity to an agent's grip pose.
#[derive(Clone, Debug, PartialEq)]
pub struct AttachPoint {
    pub id: AttachPointId,
    pub name: String,
    pub agent: AgentId,
    pub role: GrabRole,
    /// Entity pose expressed in the grip frame at creation time.
    pub offset: Pose,
}

impl AttachPoint {
    /// World pose of the entity for the agent's current `grip`.
    pub fn entity_pose(&self, grip: &Pose) -> Pose {
        grip.compose(&self.offset)
    }
}

/// Owner of the attach points of a single entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttachPointRegistry {
    next_id: u32,
    points: BTreeMap<AttachPointId, AttachPoint>,
}

impl AttachPointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an attach point capturing `entity_pose` relative to `grip`.
    pub fn create(
        &mut self,
        entity: EntityId,
        agent: AgentId,
        role: GrabRole,
        grip: &Pose,
        entity_pose: &Pose,
    ) -> AttachPointId {
        let id = AttachPointId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let label = match role {
            GrabRole::Primary => "primary",
            GrabRole::Secondary => "secondary",
        };
        let point = AttachPoint {
            id,
            name: format!("{label}-attach[{entity}/{agent}]"),
            agent,
            role,
            offset: entity_pose.relative_to(grip),
        };
        self.points.insert(id, point);
        id
    }

    /// Destroys an attach point. Returns the record if it existed.
    pub fn destroy(&mut self, id: AttachPointId) -> Option<AttachPoint> {
        self.points.remove(&id)
    }

    /// Destroys every attach point, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.points.len();
        self.points.clear();
        count
    }

    pub fn get(&self, id: AttachPointId) -> Option<&AttachPoint> {
        self.points.get(&id)
    }

    /// Finds the attach point owned by `agent`.
    pub fn for_agent(&self, agent: AgentId) -> Option<&AttachPoint> {
        self.points.values().find(|point| point.agent == agent)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttachPoint> {
        self.points.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interact_abi::Vec3;

    #[test]
    fn create_names_and_stores_offset() {
        let mut registry = AttachPointRegistry::new();
        let grip = Pose::from_position(Vec3::new(0.0, 1.0, 0.0));
        let entity_pose = Pose::from_position(Vec3::new(0.0, 1.0, -0.2));

        let id = registry.create(EntityId(4), AgentId(1), GrabRole::Primary, &grip, &entity_pose);
        let point = registry.get(id).unwrap();

        assert_eq!(point.name, "primary-attach[entity#4/agent#1]");
        assert!((point.offset.position - Vec3::new(0.0, 0.0, -0.2)).length() < 1e-6);

        let moved = Pose::from_position(Vec3::new(1.0, 1.0, 0.0));
        assert!((point.entity_pose(&moved).position - Vec3::new(1.0, 1.0, -0.2)).length() < 1e-6);
    }

    #[test]
    fn destroy_is_single_shot() {
        let mut registry = AttachPointRegistry::new();
        let id = registry.create(
            EntityId(0),
            AgentId(0),
            GrabRole::Secondary,
            &Pose::IDENTITY,
            &Pose::IDENTITY,
        );

        assert!(registry.destroy(id).is_some());
        assert!(registry.destroy(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn ids_are_not_reused_after_destroy() {
        let mut registry = AttachPointRegistry::new();
        let a = registry.create(EntityId(0), AgentId(0), GrabRole::Primary, &Pose::IDENTITY, &Pose::IDENTITY);
        registry.destroy(a);
        let b = registry.create(EntityId(0), AgentId(0), GrabRole::Primary, &Pose::IDENTITY, &Pose::IDENTITY);
        assert_ne!(a, b);
    }
}
