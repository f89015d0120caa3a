#![cfg(test)]
//! State invariants checked after every frame of generated input.

use crate::support::Rig;
use app::InputEvent;
use hub::{AgentId, EntityConfig, EntityId, SecondaryAction, World};
use proptest::collection;
use proptest::prelude::*;

fn input(code: u8, entity: EntityId, agent: AgentId) -> InputEvent {
    match code % 10 {
        0 => InputEvent::NearTouchBegin { entity, agent },
        1 => InputEvent::NearTouchEnd { entity, agent },
        2 | 3 => InputEvent::TouchBegin { entity, agent },
        4 => InputEvent::TouchEnd { entity, agent },
        5 | 6 => InputEvent::GrabPressed { agent },
        7 => InputEvent::GrabReleased { agent },
        8 => InputEvent::UsePressed { agent },
        _ => InputEvent::UseReleased { agent },
    }
}

fn secondary_action() -> impl Strategy<Value = SecondaryAction> {
    prop_oneof![
        Just(SecondaryAction::None),
        Just(SecondaryAction::Swap),
        Just(SecondaryAction::AxisScale),
        Just(SecondaryAction::ControlDirection),
    ]
}

fn check(world: &World, entity: EntityId) -> Result<(), TestCaseError> {
    let e = world.entity(entity).expect("entity alive");
    let state = e.state();

    let grabbers = state.grabbers();
    prop_assert!(grabbers.len() <= 2);
    if let [first, second] = grabbers {
        prop_assert!(first.since < second.since, "secondary predates primary");
    }

    let touched = state.touchers().next().is_some();
    let near = state.near_touchers().next().is_some();
    prop_assert_eq!(state.is_near_touched(), !touched && near);

    for a in world.agents() {
        prop_assert_eq!(a.grabbed() == Some(entity), state.role_of(a.id()).is_some());
        prop_assert_eq!(a.using() == Some(entity), state.user() == Some(a.id()));
    }
    Ok(())
}

proptest! {
    /// Grabber count, grab order, near-touch supersession, and coordinator
    /// agreement hold after every frame, for every secondary policy.
    #[test]
    fn invariants_hold_under_generated_input(
        policy in secondary_action(),
        hold_to_grab in any::<bool>(),
        hold_to_use in any::<bool>(),
        frames in collection::vec(collection::vec((any::<u8>(), any::<bool>()), 1..4), 1..120),
    ) {
        let mut rig = Rig::new();
        let entity = rig.spawn(EntityConfig {
            usable: true,
            hold_to_grab,
            hold_to_use,
            secondary_action: policy,
            ..EntityConfig::default()
        });

        for burst in frames {
            let inputs: Vec<InputEvent> = burst
                .into_iter()
                .map(|(code, right)| input(code, entity, if right { rig.right } else { rig.left }))
                .collect();
            let report = rig.frame(inputs);
            prop_assert_eq!(report.frame.recoveries, 0);
            check(rig.scheduler.world(), entity)?;
        }
    }
}
