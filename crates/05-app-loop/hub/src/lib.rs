//! Interaction world orchestration.
//!
//! Owns the entity, agent, and zone registries, routes entity follow-ups to
//! the per-agent coordinators, and runs the per-frame and fixed-step passes.

use anyhow::{Context, Result};

pub mod agent;
pub mod deferred;
pub mod events;
pub mod grab;
pub mod registry;
pub mod snap_zone;
pub mod use_ctl;
pub mod world;

pub use crate::agent::Agent;
pub use crate::deferred::{DeferredQueue, DeferredTask};
pub use crate::events::{EventBus, KindFilter, TransitionObserver};
pub use crate::grab::GrabCoordinator;
pub use crate::registry::Registry;
pub use crate::snap_zone::{SnapZone, ZoneState};
pub use crate::use_ctl::UseCoordinator;
pub use crate::world::{FrameReport, World, WorldStats};

pub use interact_abi::*;
pub use interaction::{Inconsistency, Interactable, InteractionState, Lifecycle, Snapshot};

/// Builder for a [`World`] pre-populated with agents and snap zones.
///
/// Entities are usually spawned at runtime; agents and zones tend to be
/// fixed by the scene and are declared up front.
#[derive(Debug, Default)]
pub struct WorldBuilder {
    agents: Vec<AgentConfig>,
    zones: Vec<SnapZoneConfig>,
}

impl WorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an agent; ids are allocated in declaration order.
    pub fn agent(mut self, config: AgentConfig) -> Self {
        self.agents.push(config);
        self
    }

    /// Adds a snap zone; ids are allocated in declaration order.
    pub fn zone(mut self, config: SnapZoneConfig) -> Self {
        self.zones.push(config);
        self
    }

    /// Builds the world, failing on the first invalid config.
    pub fn build(self) -> Result<World> {
        let mut world = World::new();
        for (index, config) in self.agents.into_iter().enumerate() {
            world
                .spawn_agent(config)
                .with_context(|| format!("agent config #{index}"))?;
        }
        for (index, config) in self.zones.into_iter().enumerate() {
            world
                .spawn_zone(config)
                .with_context(|| format!("snap zone config #{index}"))?;
        }
        Ok(world)
    }
}

impl World {
    pub fn builder() -> WorldBuilder {
        WorldBuilder::new()
    }
}
