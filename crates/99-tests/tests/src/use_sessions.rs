#![cfg(test)]

use crate::support::Rig;
use app::InputEvent;
use hub::{EntityConfig, TransitionKind};

fn usable(hold_to_use: bool) -> EntityConfig {
    EntityConfig {
        usable: true,
        hold_to_use,
        ..EntityConfig::default()
    }
}

/// A second user on a toggle entity ends the first session; one user at a time.
#[test]
fn second_user_takes_over() {
    let mut rig = Rig::new();
    let entity = rig.spawn(usable(false));
    let (left, right) = (rig.left, rig.right);

    rig.frame([
        InputEvent::TouchBegin {
            entity,
            agent: left,
        },
        InputEvent::TouchBegin {
            entity,
            agent: right,
        },
    ]);
    rig.frame([InputEvent::UsePressed { agent: left }]);
    rig.transitions();
    rig.frame([InputEvent::UsePressed { agent: right }]);

    let world = rig.scheduler.world();
    assert_eq!(world.entity(entity).unwrap().state().user(), Some(right));
    assert_eq!(world.agent(left).unwrap().using(), None);
    assert_eq!(world.agent(right).unwrap().using(), Some(entity));

    let swap: Vec<_> = rig
        .transitions()
        .into_iter()
        .map(|t| (t.kind, t.agent))
        .collect();
    assert_eq!(
        swap,
        [
            (TransitionKind::UseEnd, Some(left)),
            (TransitionKind::UseBegin, Some(right))
        ]
    );
}

/// Hold-to-use ends on release; toggle-use ignores release and ends on the next press.
#[test]
fn hold_and_toggle_use() {
    let mut rig = Rig::new();
    let held = rig.spawn(usable(true));
    let toggled = rig.spawn(usable(false));
    let left = rig.left;

    rig.touch(held, left);
    rig.frame([InputEvent::UsePressed { agent: left }]);
    assert!(rig.scheduler.world().entity(held).unwrap().state().is_used());
    rig.frame([InputEvent::UseReleased { agent: left }]);
    assert!(!rig.scheduler.world().entity(held).unwrap().state().is_used());

    rig.frame([
        InputEvent::TouchEnd {
            entity: held,
            agent: left,
        },
        InputEvent::TouchBegin {
            entity: toggled,
            agent: left,
        },
    ]);
    rig.frame([InputEvent::UsePressed { agent: left }]);
    let report = rig.frame([InputEvent::UseReleased { agent: left }]);
    assert_eq!(report.inputs_rejected, 1);
    assert!(rig.scheduler.world().entity(toggled).unwrap().state().is_used());

    rig.frame([InputEvent::UsePressed { agent: left }]);
    assert!(!rig.scheduler.world().entity(toggled).unwrap().state().is_used());
    assert_eq!(rig.scheduler.world().agent(left).unwrap().using(), None);
}

/// Grab and use queued in the same frame: the grab lands first, so the use
/// is allowed on an entity that requires being held.
#[test]
fn use_requiring_grab_sees_same_frame_grab() {
    let mut rig = Rig::new();
    let entity = rig.spawn(EntityConfig {
        usable: true,
        use_only_if_grabbed: true,
        ..EntityConfig::default()
    });
    let left = rig.left;

    let report = rig.frame([
        InputEvent::UsePressed { agent: left },
        InputEvent::GrabPressed { agent: left },
        InputEvent::TouchBegin {
            entity,
            agent: left,
        },
    ]);
    assert_eq!(report.inputs_rejected, 0);
    assert_eq!(rig.scheduler.world().entity(entity).unwrap().state().user(), Some(left));

    // Dropping the entity ends the use it was gating.
    rig.release_grab(left);
    let world = rig.scheduler.world();
    assert!(!world.entity(entity).unwrap().state().is_used());
    assert_eq!(world.agent(left).unwrap().using(), None);
}
