//! Tick driver for the interaction world.
//!
//! Hosts push [`InputEvent`]s as they arrive from tracking and controller
//! polling; [`Scheduler::tick`] drains them in priority order, steps the
//! fixed-rate simulation, and runs the world's frame pass.

pub mod health;
pub mod input;
pub mod queue;
pub mod scheduler;

pub use health::{Health, HealthFlags};
pub use input::{InputEvent, InputPriority};
pub use queue::InputQueue;
pub use scheduler::{Scheduler, SchedulerBuilder, SchedulerConfig, TickReport};
