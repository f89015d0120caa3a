use app::{InputEvent, Scheduler, SchedulerBuilder, TickReport};
use crossbeam_channel::Receiver;
use hub::{
    AgentConfig, AgentId, Body, EntityConfig, EntityId, Hand, SnapZoneConfig, TransitionEvent,
    TransitionKind, ZoneId,
};

pub const FRAME: f32 = 1.0 / 90.0;

/// Two-handed scene driven one frame at a time.
pub struct Rig {
    pub scheduler: Scheduler,
    pub left: AgentId,
    pub right: AgentId,
    pub zone: Option<ZoneId>,
    feed: Receiver<TransitionEvent>,
}

impl Rig {
    pub fn new() -> Self {
        Self::build(Scheduler::builder())
    }

    pub fn with_left(config: AgentConfig) -> Self {
        let builder = SchedulerBuilder::default()
            .agent(config)
            .agent(AgentConfig::for_hand(Hand::Right));
        Self::finish(builder)
    }

    pub fn with_zone(config: SnapZoneConfig) -> Self {
        Self::build(Scheduler::builder().zone(config))
    }

    fn build(builder: SchedulerBuilder) -> Self {
        Self::finish(
            builder
                .agent(AgentConfig::for_hand(Hand::Left))
                .agent(AgentConfig::for_hand(Hand::Right)),
        )
    }

    fn finish(builder: SchedulerBuilder) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut scheduler = builder.build().expect("valid scene");
        let feed = scheduler.world_mut().feed();
        let mut agents = scheduler.world().agents().map(|a| a.id());
        let left = agents.next().expect("left agent");
        let right = agents.next().expect("right agent");
        drop(agents);
        let zone = scheduler.world().zones().next().map(|z| z.id());
        Self {
            scheduler,
            left,
            right,
            zone,
            feed,
        }
    }

    pub fn spawn(&mut self, config: EntityConfig) -> EntityId {
        self.spawn_body(config, Body::default())
    }

    pub fn spawn_body(&mut self, config: EntityConfig, body: Body) -> EntityId {
        self.scheduler
            .world_mut()
            .spawn_entity(config, body)
            .expect("valid entity config")
    }

    /// Queues `inputs` and runs one frame.
    pub fn frame(&mut self, inputs: impl IntoIterator<Item = InputEvent>) -> TickReport {
        self.scheduler.enqueue_all(inputs);
        self.scheduler.tick(FRAME)
    }

    pub fn idle(&mut self) -> TickReport {
        self.scheduler.tick(FRAME)
    }

    pub fn touch(&mut self, entity: EntityId, agent: AgentId) -> TickReport {
        self.frame([InputEvent::TouchBegin { entity, agent }])
    }

    pub fn press_grab(&mut self, agent: AgentId) -> TickReport {
        self.frame([InputEvent::GrabPressed { agent }])
    }

    pub fn release_grab(&mut self, agent: AgentId) -> TickReport {
        self.frame([InputEvent::GrabReleased { agent }])
    }

    /// Transitions published since the last call.
    pub fn transitions(&self) -> Vec<TransitionEvent> {
        self.feed.try_iter().collect()
    }

    pub fn kinds(&self) -> Vec<TransitionKind> {
        self.transitions().into_iter().map(|t| t.kind).collect()
    }
}
