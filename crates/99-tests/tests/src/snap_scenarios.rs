#![cfg(test)]
//! Snap zone capture, re-grab, and programmatic snapping.

use crate::support::Rig;
use app::InputEvent;
use hub::{
    DropPolicy, EntityConfig, SnapMode, SnapOutcome, SnapZoneConfig, TransitionKind, ZoneState,
};

fn instant_zone() -> Rig {
    Rig::with_zone(SnapZoneConfig {
        mode: SnapMode::Kinematic,
        transition_secs: 0.0,
        ..SnapZoneConfig::default()
    })
}

/// Hover then release captures; grabbing again empties the zone before the
/// grab begins.
#[test]
fn release_over_zone_captures_and_regrab_frees() {
    let mut rig = instant_zone();
    let zone = rig.zone.expect("zone");
    let entity = rig.spawn(EntityConfig::default());
    let left = rig.left;

    rig.touch(entity, left);
    rig.press_grab(left);
    rig.transitions();

    rig.frame([InputEvent::ZoneEnter { zone, entity }]);
    assert_eq!(
        rig.scheduler.world().zone(zone).unwrap().state(),
        ZoneState::Highlighting(entity)
    );

    rig.release_grab(left);
    {
        let world = rig.scheduler.world();
        assert_eq!(world.zone(zone).unwrap().state(), ZoneState::Occupied(entity));
        let e = world.entity(entity).unwrap();
        assert!(!e.is_grabbable());
        assert!(e.body.kinematic);
        assert_eq!(e.snapped_in(), Some(zone));
    }

    rig.press_grab(left);
    let world = rig.scheduler.world();
    assert_eq!(world.zone(zone).unwrap().state(), ZoneState::Empty);
    assert_eq!(world.agent(left).unwrap().grabbed(), Some(entity));

    let kinds = rig.kinds();
    let position = |kind| kinds.iter().position(|k| *k == kind).expect("published");
    assert!(position(TransitionKind::ZoneHighlightBegin) < position(TransitionKind::SnapBegin));
    assert!(position(TransitionKind::SnapBegin) < position(TransitionKind::SnapEnd));
    assert!(position(TransitionKind::SnapEnd) < position(TransitionKind::GrabBegin));
}

/// Leaving the zone before release cancels the highlight and the capture.
#[test]
fn exit_before_release_does_not_capture() {
    let mut rig = instant_zone();
    let zone = rig.zone.expect("zone");
    let entity = rig.spawn(EntityConfig::default());
    let left = rig.left;

    rig.touch(entity, left);
    rig.press_grab(left);
    rig.frame([InputEvent::ZoneEnter { zone, entity }]);
    rig.frame([InputEvent::ZoneExit { zone, entity }]);
    rig.release_grab(left);

    assert_eq!(rig.scheduler.world().zone(zone).unwrap().state(), ZoneState::Empty);
    assert_eq!(rig.scheduler.world().entity(entity).unwrap().snapped_in(), None);
}

/// Drop-only-in-zone entities stay in hand outside a zone and drop inside one.
#[test]
fn drop_only_in_valid_zone() {
    let mut rig = instant_zone();
    let zone = rig.zone.expect("zone");
    let entity = rig.spawn(EntityConfig {
        drop_policy: DropPolicy::DropOnlyInValidZone,
        ..EntityConfig::default()
    });
    let left = rig.left;

    rig.touch(entity, left);
    rig.press_grab(left);
    rig.release_grab(left);
    assert_eq!(rig.scheduler.world().agent(left).unwrap().grabbed(), Some(entity));

    rig.press_grab(left);
    rig.frame([InputEvent::ZoneEnter { zone, entity }]);
    rig.release_grab(left);
    assert_eq!(
        rig.scheduler.world().zone(zone).unwrap().state(),
        ZoneState::Occupied(entity)
    );
}

/// Snapping a held entity lets go of it now and captures it next frame.
#[test]
fn force_snap_of_held_entity_lands_next_frame() {
    let mut rig = instant_zone();
    let zone = rig.zone.expect("zone");
    let entity = rig.spawn(EntityConfig::default());
    let left = rig.left;

    rig.touch(entity, left);
    rig.press_grab(left);

    let outcome = rig.scheduler.world_mut().force_snap(zone, entity);
    assert_eq!(outcome, SnapOutcome::Deferred);
    assert_eq!(rig.scheduler.world().agent(left).unwrap().grabbed(), None);
    assert_eq!(rig.scheduler.world().zone(zone).unwrap().state(), ZoneState::Empty);

    let report = rig.idle();
    assert_eq!(report.frame.deferred_run, 1);
    assert_eq!(
        rig.scheduler.world().zone(zone).unwrap().state(),
        ZoneState::Occupied(entity)
    );
}
