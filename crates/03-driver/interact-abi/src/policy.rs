use serde::{Deserialize, Serialize};

/// Which hand an agent represents; the class used by allowed-agent policies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

/// Allowed-controller policy for one interaction kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllowedAgents {
    /// Either hand may interact.
    #[default]
    Both,
    /// Only left-hand agents may interact.
    LeftOnly,
    /// Only right-hand agents may interact.
    RightOnly,
}

impl AllowedAgents {
    /// Returns whether an agent of class `hand` passes this policy.
    pub fn allows(self, hand: Hand) -> bool {
        match self {
            AllowedAgents::Both => true,
            AllowedAgents::LeftOnly => hand == Hand::Left,
            AllowedAgents::RightOnly => hand == Hand::Right,
        }
    }
}

/// Whether a held entity may be let go by a button release.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropPolicy {
    /// Button releases are ignored; only forced releases drop the entity.
    NoDrop,
    /// The entity can be dropped anywhere.
    #[default]
    DropAnywhere,
    /// The entity can only be dropped while a snap zone is highlighting it.
    DropOnlyInValidZone,
}

/// What a second grabbing agent does to an already held entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecondaryAction {
    /// Secondary grabs are rejected.
    #[default]
    None,
    /// The second agent takes over as primary; the first is force-released.
    Swap,
    /// Scale the entity by the change in distance between the two grips.
    AxisScale,
    /// Orient the entity from the primary grip toward the secondary grip.
    ControlDirection,
}

impl SecondaryAction {
    /// Swappable entities hand off instead of accepting a secondary holder.
    pub fn is_swappable(self) -> bool {
        matches!(self, SecondaryAction::Swap)
    }

    /// Returns whether a second agent may hold the entity alongside the primary.
    pub fn accepts_secondary(self) -> bool {
        matches!(
            self,
            SecondaryAction::AxisScale | SecondaryAction::ControlDirection
        )
    }
}

/// How a primary grab positions the entity relative to the grabbing agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrabAttach {
    /// The entity follows the attach point without changing its parent.
    #[default]
    TrackObject,
    /// The entity is re-parented under the grabbing agent for the grab session.
    ChildOfAgent,
}

/// How a snap zone pins its occupant once the transition completes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapMode {
    /// The occupant's body is made kinematic.
    #[default]
    Kinematic,
    /// The occupant is attached to the zone through a physics joint.
    Joint,
    /// The occupant is re-parented under the zone.
    Parenting,
}

/// Predicate deciding which entities a snap zone accepts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidityPolicy {
    #[default]
    AcceptAll,
    /// Only entities carrying this tag are accepted.
    RequireTag(String),
    /// Entities carrying this tag are refused.
    ExcludeTag(String),
}

impl ValidityPolicy {
    /// Evaluates the policy against an entity's tag list.
    pub fn accepts<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        let has = |wanted: &str| tags.iter().any(|tag| tag.as_ref() == wanted);
        match self {
            ValidityPolicy::AcceptAll => true,
            ValidityPolicy::RequireTag(tag) => has(tag),
            ValidityPolicy::ExcludeTag(tag) => !has(tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_agents_filters_by_hand() {
        assert!(AllowedAgents::Both.allows(Hand::Left));
        assert!(AllowedAgents::LeftOnly.allows(Hand::Left));
        assert!(!AllowedAgents::LeftOnly.allows(Hand::Right));
        assert!(!AllowedAgents::RightOnly.allows(Hand::Left));
    }

    #[test]
    fn only_scaling_and_direction_take_a_secondary() {
        assert!(SecondaryAction::Swap.is_swappable());
        assert!(!SecondaryAction::Swap.accepts_secondary());
        assert!(!SecondaryAction::None.accepts_secondary());
        assert!(SecondaryAction::AxisScale.accepts_secondary());
    }

    #[test]
    fn validity_policy_matches_tags() {
        let tags = vec!["tool".to_string()];
        assert!(ValidityPolicy::AcceptAll.accepts(&tags));
        assert!(ValidityPolicy::RequireTag("tool".into()).accepts(&tags));
        assert!(!ValidityPolicy::RequireTag("key".into()).accepts(&tags));
        assert!(!ValidityPolicy::ExcludeTag("tool".into()).accepts(&tags));
    }
}
