#![cfg(test)]
//! Idle sleep, host enable/disable cycles, and teleport.

use crate::support::Rig;
use app::InputEvent;
use hub::{DropPolicy, EntityConfig, Lifecycle, Pose, Vec3};

/// An idle entity sleeps at frame end and the next near-touch wakes it first.
#[test]
fn idle_entity_sleeps_and_near_touch_wakes() {
    let mut rig = Rig::new();
    let entity = rig.spawn(EntityConfig {
        disable_when_idle: true,
        ..EntityConfig::default()
    });
    let left = rig.left;

    let report = rig.idle();
    assert_eq!(report.frame.slept, 1);
    assert_eq!(
        rig.scheduler.world().entity(entity).unwrap().lifecycle(),
        Lifecycle::Sleeping
    );

    let report = rig.frame([InputEvent::NearTouchBegin {
        entity,
        agent: left,
    }]);
    assert_eq!(report.inputs_applied, 1);
    let e = rig.scheduler.world().entity(entity).unwrap();
    assert_eq!(e.lifecycle(), Lifecycle::Active);
    assert!(e.state().is_near_touched());

    rig.frame([InputEvent::NearTouchEnd {
        entity,
        agent: left,
    }]);
    assert_eq!(
        rig.scheduler.world().entity(entity).unwrap().lifecycle(),
        Lifecycle::Sleeping
    );
}

/// An undroppable entity returns to the hand after the agent is cycled.
#[test]
fn undroppable_reacquired_after_agent_cycle() {
    let mut rig = Rig::new();
    let entity = rig.spawn(EntityConfig {
        drop_policy: DropPolicy::NoDrop,
        ..EntityConfig::default()
    });
    let left = rig.left;

    rig.touch(entity, left);
    rig.press_grab(left);

    let world = rig.scheduler.world_mut();
    assert!(world.set_agent_enabled(left, false).is_applied());
    assert!(!world.entity(entity).unwrap().state().is_grabbed());
    assert!(world.set_agent_enabled(left, true).is_applied());
    assert_eq!(world.agent(left).unwrap().grabbed(), None);

    let report = rig.idle();
    assert_eq!(report.frame.deferred_run, 1);
    let world = rig.scheduler.world();
    assert_eq!(world.agent(left).unwrap().grabbed(), Some(entity));
    assert_eq!(world.entity(entity).unwrap().state().primary(), Some(left));
}

/// Disabling the entity cancels a pending re-acquire it owns.
#[test]
fn disabled_entity_cancels_reacquire() {
    let mut rig = Rig::new();
    let entity = rig.spawn(EntityConfig {
        drop_policy: DropPolicy::NoDrop,
        ..EntityConfig::default()
    });
    let left = rig.left;

    rig.touch(entity, left);
    rig.press_grab(left);

    let world = rig.scheduler.world_mut();
    world.set_agent_enabled(left, false);
    world.set_agent_enabled(left, true);
    assert_eq!(world.deferred().len(), 1);
    world.set_entity_enabled(entity, false);
    assert!(world.deferred().is_empty());

    let report = rig.idle();
    assert_eq!(report.frame.deferred_run, 0);
    assert_eq!(rig.scheduler.world().agent(left).unwrap().grabbed(), None);
}

/// Entities that may not travel are dropped; the rest follow the grip.
#[test]
fn teleport_drops_or_carries() {
    let mut rig = Rig::new();
    let stays = rig.spawn(EntityConfig::default());
    let drops = rig.spawn(EntityConfig {
        stay_grabbed_on_teleport: false,
        ..EntityConfig::default()
    });
    let (left, right) = (rig.left, rig.right);

    rig.frame([
        InputEvent::TouchBegin {
            entity: stays,
            agent: left,
        },
        InputEvent::TouchBegin {
            entity: drops,
            agent: right,
        },
    ]);
    rig.frame([
        InputEvent::GrabPressed { agent: left },
        InputEvent::GrabPressed { agent: right },
    ]);

    let target = Pose::from_position(Vec3::new(5.0, 0.0, 0.0));
    let report = rig.frame([
        InputEvent::TeleportBegin { agent: left },
        InputEvent::TeleportBegin { agent: right },
        InputEvent::TeleportEnd {
            agent: left,
            grip: target,
        },
    ]);
    assert_eq!(report.inputs_rejected, 0);

    let world = rig.scheduler.world();
    assert_eq!(world.agent(right).unwrap().grabbed(), None);
    assert_eq!(world.agent(left).unwrap().grabbed(), Some(stays));
    let carried = world.entity(stays).unwrap().body.pose.position;
    assert!((carried - target.position).length() < 1e-4);
}
