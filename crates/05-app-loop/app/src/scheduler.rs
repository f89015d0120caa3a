use anyhow::{Context, Result};
use hub::{
    AgentConfig, ConfigError, FrameReport, PhysicsCmd, SnapZoneConfig, UseOutcome, World,
    WorldBuilder,
};
use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::health::Health;
use crate::input::InputEvent;
use crate::queue::InputQueue;

/// Tick-loop tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Length of one fixed simulation step, in seconds.
    pub fixed_step_secs: f32,
    /// Cap on fixed steps per tick; simulated time beyond it is dropped.
    pub max_fixed_steps: u32,
    /// Inputs applied per tick; the rest wait for the next tick.
    pub input_budget: usize,
    /// Frames the `recovering` health flag stays up after a recovery.
    pub recovery_window_frames: u8,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fixed_step_secs: 1.0 / 90.0,
            max_fixed_steps: 4,
            input_budget: 256,
            recovery_window_frames: 30,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_step_secs.is_finite() && self.fixed_step_secs > 0.0) {
            return Err(ConfigError::NotPositive {
                field: "fixed_step_secs",
                value: self.fixed_step_secs,
            });
        }
        if self.max_fixed_steps == 0 {
            return Err(ConfigError::NotPositive {
                field: "max_fixed_steps",
                value: 0.0,
            });
        }
        if self.input_budget == 0 {
            return Err(ConfigError::NotPositive {
                field: "input_budget",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// What one [`Scheduler::tick`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub inputs_applied: usize,
    pub inputs_rejected: usize,
    /// Inputs still queued because the budget ran out.
    pub inputs_left: usize,
    pub fixed_steps: u32,
    pub frame: FrameReport,
    /// Physics commands for the host to apply this tick.
    pub physics: Vec<PhysicsCmd>,
}

#[derive(Debug)]
pub struct Scheduler {
    world: World,
    inputs: InputQueue<InputEvent>,
    config: SchedulerConfig,
    accumulator: f32,
    now: f64,
    health: Health,
}

impl Scheduler {
    /// Wraps `world` with the default tick configuration.
    pub fn new(world: World) -> Self {
        Self::with_config(world, SchedulerConfig::default())
    }

    fn with_config(world: World, config: SchedulerConfig) -> Self {
        Self {
            world,
            inputs: InputQueue::with_capacity(16),
            config,
            accumulator: 0.0,
            now: 0.0,
            health: Health::default(),
        }
    }

    pub fn builder() -> SchedulerBuilder {
        SchedulerBuilder::default()
    }

    pub fn enqueue(&mut self, event: InputEvent) {
        self.inputs.push(event.priority(), event);
    }

    pub fn enqueue_all(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        for event in events {
            self.enqueue(event);
        }
    }

    /// Queued input counts ordered as `[contact, grab, use]`.
    pub fn pending_inputs(&self) -> [usize; 3] {
        self.inputs.backlog()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn health(&self) -> Health {
        self.health
    }

    /// Seconds of simulated time since the scheduler started.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Runs one frame: queued inputs, fixed steps for `dt`, then the frame pass.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!("ignoring invalid frame delta {dt}");
            0.0
        };
        let recoveries_before = self.world.stats().recoveries;
        let mut report = TickReport::default();

        self.process_inputs(&mut report);
        report.fixed_steps = self.step_fixed(dt);

        self.now += f64::from(dt);
        report.frame = self.world.update(self.now);
        report.physics = self.world.drain_physics();

        self.health.rejections_seen += report.inputs_rejected as u64;
        let recovered = self.world.stats().recoveries.saturating_sub(recoveries_before);
        if recovered > 0 {
            self.health.recoveries_seen += recovered;
            self.health.begin_recovery(self.config.recovery_window_frames);
        } else {
            self.health.decay_one_frame();
        }
        trace!("tick done: {report:?}");
        report
    }

    fn process_inputs(&mut self, report: &mut TickReport) {
        let mut budget = self.config.input_budget;
        while budget > 0 {
            let Some(event) = self.inputs.pop() else {
                break;
            };
            budget -= 1;
            if self.dispatch(&event) {
                report.inputs_applied += 1;
            } else {
                report.inputs_rejected += 1;
            }
        }
        report.inputs_left = self.inputs.len();
        self.health.flags.input_backlog = report.inputs_left > 0;
    }

    /// Applies one input to the world; `false` when it was refused.
    fn dispatch(&mut self, event: &InputEvent) -> bool {
        let w = &mut self.world;
        let applied = match *event {
            InputEvent::NearTouchBegin { entity, agent } => {
                w.begin_near_touch(entity, agent).is_applied()
            }
            InputEvent::NearTouchEnd { entity, agent } => w.end_near_touch(entity, agent).is_applied(),
            InputEvent::TouchBegin { entity, agent } => w.begin_touch(entity, agent).is_applied(),
            InputEvent::TouchEnd { entity, agent } => w.end_touch(entity, agent).is_applied(),
            InputEvent::ZoneEnter { zone, entity } => w.zone_enter(zone, entity).is_applied(),
            InputEvent::ZoneExit { zone, entity } => w.zone_exit(zone, entity).is_applied(),
            InputEvent::AgentMotion {
                agent,
                grip,
                velocity,
                angular_velocity,
            } => w
                .set_agent_motion(agent, grip, velocity, angular_velocity)
                .is_applied(),
            InputEvent::GrabPressed { agent } => w.grab_pressed(agent).is_applied(),
            InputEvent::GrabReleased { agent } => w.grab_released(agent).is_applied(),
            InputEvent::TeleportBegin { agent } => w.teleport_begin(agent).is_applied(),
            InputEvent::TeleportEnd { agent, grip } => w.teleport_end(agent, grip).is_applied(),
            InputEvent::UsePressed { agent } => use_applied(w.attempt_use(agent)),
            InputEvent::UseReleased { agent } => use_applied(w.attempt_stop_use(agent)),
        };
        if !applied {
            trace!("input refused: {event:?}");
        }
        applied
    }

    fn step_fixed(&mut self, dt: f32) -> u32 {
        let step = self.config.fixed_step_secs;
        self.accumulator += dt;
        let mut steps = 0;
        while self.accumulator >= step && steps < self.config.max_fixed_steps {
            self.world.fixed_update(step);
            self.accumulator -= step;
            steps += 1;
        }
        let behind = self.accumulator >= step;
        if behind {
            warn!(
                "fixed step capped at {steps}; dropping {:.3}s of simulated time",
                self.accumulator - self.accumulator % step
            );
            self.accumulator %= step;
        }
        self.health.flags.falling_behind = behind;
        steps
    }
}

fn use_applied(outcome: UseOutcome) -> bool {
    !matches!(outcome, UseOutcome::Ignored(_))
}

/// Builder for a [`Scheduler`] and the world it drives.
#[derive(Debug, Default)]
pub struct SchedulerBuilder {
    world: WorldBuilder,
    config: SchedulerConfig,
}

impl SchedulerBuilder {
    pub fn agent(mut self, config: AgentConfig) -> Self {
        self.world = self.world.agent(config);
        self
    }

    pub fn zone(mut self, config: SnapZoneConfig) -> Self {
        self.world = self.world.zone(config);
        self
    }

    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Scheduler> {
        self.config.validate().context("scheduler config")?;
        let world = self.world.build().context("building interaction world")?;
        Ok(Scheduler::with_config(world, self.config))
    }
}
