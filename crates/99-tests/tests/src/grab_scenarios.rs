#![cfg(test)]
//! Grab and release scenarios: throw, hand-off, and pre-grab restoration.

use crate::support::Rig;
use app::InputEvent;
use hub::{
    AgentConfig, Body, DropPolicy, EntityConfig, GrabAttach, Hand, ParentRef, PhysicsCmd, Pose,
    SecondaryAction, TransitionKind, Vec3,
};

/// Touch, grab, and a thrown release carrying the agent's velocity.
#[test]
fn basic_grab_and_throw() {
    let mut rig = Rig::with_left(AgentConfig {
        throw_multiplier: 1.5,
        ..AgentConfig::for_hand(Hand::Left)
    });
    let entity = rig.spawn(EntityConfig {
        drop_policy: DropPolicy::DropAnywhere,
        ..EntityConfig::default()
    });
    let left = rig.left;

    rig.touch(entity, left);
    rig.press_grab(left);
    assert_eq!(rig.scheduler.world().agent(left).unwrap().grabbed(), Some(entity));

    let report = rig.frame([
        InputEvent::AgentMotion {
            agent: left,
            grip: Pose::IDENTITY,
            velocity: Vec3::new(2.0, 0.0, 0.0),
            angular_velocity: Vec3::ZERO,
        },
        InputEvent::GrabReleased { agent: left },
    ]);

    let thrown = Vec3::new(3.0, 0.0, 0.0);
    assert!(report.physics.contains(&PhysicsCmd::SetVelocity {
        entity,
        linear: thrown,
        angular: Vec3::ZERO,
    }));
    let e = rig.scheduler.world().entity(entity).unwrap();
    assert!(!e.state().is_grabbed());
    assert_eq!(e.body.linear_velocity, thrown);
    assert_eq!(
        rig.kinds(),
        [
            TransitionKind::TouchBegin,
            TransitionKind::GrabBegin,
            TransitionKind::GrabEnd
        ]
    );
}

/// Grab followed by ungrab puts parent, kinematic, and grabbable back.
#[test]
fn grab_round_trip_restores_body() {
    let mut rig = Rig::new();
    let body = Body {
        parent: Some(ParentRef::Scene(7)),
        kinematic: true,
        ..Body::default()
    };
    let entity = rig.spawn_body(
        EntityConfig {
            grab_attach: GrabAttach::ChildOfAgent,
            ..EntityConfig::default()
        },
        body,
    );
    let left = rig.left;

    rig.touch(entity, left);
    rig.press_grab(left);
    {
        let e = rig.scheduler.world().entity(entity).unwrap();
        assert_eq!(e.body.parent, Some(ParentRef::Agent(left)));
        assert!(!e.body.kinematic);
        assert!(!e.is_grabbable());
    }

    rig.release_grab(left);
    let e = rig.scheduler.world().entity(entity).unwrap();
    assert_eq!(e.body.parent, Some(ParentRef::Scene(7)));
    assert!(e.body.kinematic);
    assert!(e.is_grabbable());
}

/// A second hand on a swappable entity takes over as the only holder.
#[test]
fn swap_hands_off_to_second_agent() {
    let mut rig = Rig::new();
    let entity = rig.spawn(EntityConfig {
        secondary_action: SecondaryAction::Swap,
        ..EntityConfig::default()
    });
    let (left, right) = (rig.left, rig.right);

    rig.touch(entity, left);
    rig.press_grab(left);
    rig.touch(entity, right);
    rig.transitions();
    rig.press_grab(right);

    let world = rig.scheduler.world();
    let holders: Vec<_> = world
        .entity(entity)
        .unwrap()
        .state()
        .grabbers()
        .iter()
        .map(|g| g.agent)
        .collect();
    assert_eq!(holders, [right]);
    assert_eq!(world.agent(left).unwrap().grabbed(), None);
    assert_eq!(world.agent(right).unwrap().grabbed(), Some(entity));

    let handoff: Vec<_> = rig
        .transitions()
        .into_iter()
        .map(|t| (t.kind, t.agent))
        .collect();
    assert_eq!(
        handoff,
        [
            (TransitionKind::GrabEnd, Some(left)),
            (TransitionKind::GrabBegin, Some(right))
        ]
    );
}

/// Without a secondary policy the second hand is refused.
#[test]
fn second_hand_refused_without_secondary_action() {
    let mut rig = Rig::new();
    let entity = rig.spawn(EntityConfig::default());
    let (left, right) = (rig.left, rig.right);

    rig.touch(entity, left);
    rig.press_grab(left);
    rig.touch(entity, right);
    let report = rig.press_grab(right);

    assert_eq!(report.inputs_rejected, 1);
    let state = rig.scheduler.world().entity(entity).unwrap().state().clone();
    assert_eq!(state.primary(), Some(left));
    assert_eq!(state.secondary(), None);
}

/// A toggle grab survives the button release and ends on the next press.
#[test]
fn toggle_grab_releases_on_second_press() {
    let mut rig = Rig::new();
    let entity = rig.spawn(EntityConfig {
        hold_to_grab: false,
        ..EntityConfig::default()
    });
    let left = rig.left;

    rig.touch(entity, left);
    rig.press_grab(left);
    rig.release_grab(left);
    assert!(rig.scheduler.world().entity(entity).unwrap().state().is_grabbed());

    rig.press_grab(left);
    assert!(!rig.scheduler.world().entity(entity).unwrap().state().is_grabbed());
}

/// Undroppable entities stay in hand on button release.
#[test]
fn no_drop_ignores_release() {
    let mut rig = Rig::new();
    let entity = rig.spawn(EntityConfig {
        drop_policy: DropPolicy::NoDrop,
        ..EntityConfig::default()
    });
    let left = rig.left;

    rig.touch(entity, left);
    rig.press_grab(left);
    let report = rig.release_grab(left);
    assert_eq!(report.inputs_rejected, 1);
    assert_eq!(rig.scheduler.world().agent(left).unwrap().grabbed(), Some(entity));
}
