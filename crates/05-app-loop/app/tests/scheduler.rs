//! Tick loop behaviour through the public scheduler API.

use app::{InputEvent, Scheduler, SchedulerConfig};
use hub::{AgentConfig, AgentId, Body, EntityConfig, EntityId, Hand, PhysicsCmd};

fn scheduler(config: SchedulerConfig) -> (Scheduler, AgentId, EntityId) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut scheduler = Scheduler::builder()
        .agent(AgentConfig::for_hand(Hand::Left))
        .config(config)
        .build()
        .expect("valid configs");
    let agent = scheduler.world().agents().next().unwrap().id();
    let entity = scheduler
        .world_mut()
        .spawn_entity(EntityConfig::default(), Body::default())
        .unwrap();
    (scheduler, agent, entity)
}

/// A press queued before the touch in the same tick still grabs.
#[test]
fn contact_applies_before_grab_within_a_tick() {
    let (mut s, agent, entity) = scheduler(SchedulerConfig::default());
    s.enqueue(InputEvent::GrabPressed { agent });
    s.enqueue(InputEvent::TouchBegin { entity, agent });
    assert_eq!(s.pending_inputs(), [1, 1, 0]);

    let report = s.tick(1.0 / 90.0);
    assert_eq!(report.inputs_applied, 2);
    assert_eq!(report.inputs_rejected, 0);
    assert_eq!(s.world().agent(agent).unwrap().grabbed(), Some(entity));
    assert!(report.physics.contains(&PhysicsCmd::IgnoreCollision {
        entity,
        agent,
        ignore: true,
    }));
}

/// Refused inputs are counted, not raised.
#[test]
fn rejected_inputs_are_counted() {
    let (mut s, agent, _) = scheduler(SchedulerConfig::default());
    s.enqueue(InputEvent::UsePressed { agent });
    s.enqueue(InputEvent::GrabReleased { agent });

    let report = s.tick(0.0);
    assert_eq!(report.inputs_rejected, 2);
    assert_eq!(s.health().rejections_seen, 2);
    assert_eq!(s.world().stats().rejections, 2);
}

#[test]
fn input_budget_carries_over() {
    let (mut s, agent, entity) = scheduler(SchedulerConfig {
        input_budget: 1,
        ..SchedulerConfig::default()
    });
    s.enqueue(InputEvent::NearTouchBegin { entity, agent });
    s.enqueue(InputEvent::TouchBegin { entity, agent });

    let first = s.tick(0.0);
    assert_eq!(first.inputs_applied, 1);
    assert_eq!(first.inputs_left, 1);
    assert!(s.health().flags.input_backlog);

    let second = s.tick(0.0);
    assert_eq!(second.inputs_applied, 1);
    assert!(!s.health().flags.input_backlog);
    assert_eq!(s.world().agent(agent).unwrap().touched(), Some(entity));
}

/// Long frames run at most the capped number of fixed steps.
#[test]
fn fixed_steps_are_capped() {
    let step = 0.01;
    let (mut s, _, _) = scheduler(SchedulerConfig {
        fixed_step_secs: step,
        max_fixed_steps: 4,
        ..SchedulerConfig::default()
    });

    let report = s.tick(0.1);
    assert_eq!(report.fixed_steps, 4);
    assert!(s.health().flags.falling_behind);

    let report = s.tick(step * 0.5);
    assert!(report.fixed_steps <= 1);
    assert!(!s.health().flags.falling_behind);
}

#[test]
fn frames_and_time_advance_per_tick() {
    let (mut s, _, _) = scheduler(SchedulerConfig::default());
    let a = s.tick(0.5);
    let b = s.tick(0.25);
    assert_eq!(b.frame.frame, a.frame.frame + 1);
    assert!((s.now() - 0.75).abs() < 1e-9);
    assert!((s.world().now() - 0.75).abs() < 1e-9);
}

#[test]
fn builder_rejects_zero_step() {
    let err = Scheduler::builder()
        .config(SchedulerConfig {
            fixed_step_secs: 0.0,
            ..SchedulerConfig::default()
        })
        .build()
        .err()
        .expect("zero step is invalid");
    assert!(format!("{err:#}").contains("scheduler config"));
}

/// Partial documents fill the rest from defaults.
#[test]
fn config_loads_from_partial_json() {
    let config: SchedulerConfig = serde_json::from_str(r#"{ "input_budget": 8 }"#).unwrap();
    assert_eq!(config.input_budget, 8);
    assert_eq!(config.max_fixed_steps, SchedulerConfig::default().max_fixed_steps);
    assert!(config.validate().is_ok());
}

/// A recorded session replays through the same queue.
#[test]
fn replays_json_script() {
    let (mut s, agent, entity) = scheduler(SchedulerConfig::default());
    let script = format!(
        r#"[
            {{"kind":"touch_begin","entity":{e},"agent":{a}}},
            {{"kind":"grab_pressed","agent":{a}}},
            {{"kind":"grab_released","agent":{a}}}
        ]"#,
        e = entity.raw(),
        a = agent.raw()
    );
    let events: Vec<InputEvent> = serde_json::from_str(&script).unwrap();
    s.enqueue_all(events);

    let report = s.tick(0.0);
    assert_eq!(report.inputs_applied, 3);
    assert_eq!(s.world().agent(agent).unwrap().grabbed(), None);
    assert!(!s.world().entity(entity).unwrap().state().is_grabbed());
}
