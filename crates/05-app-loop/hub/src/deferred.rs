//! One-shot tasks deferred to a later frame.
//!
//! Every task is owned by an entity; disabling or despawning the owner
//! cancels whatever it still has queued.

use interact_abi::{AgentId, EntityId, ZoneId};

/// Work that must not run in the frame it was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferredTask {
    /// Capture `entity` into `zone` once its releasing agents have finished.
    ForceSnap { zone: ZoneId, entity: EntityId },
    /// Re-grab an undroppable entity after a disable/enable cycle.
    Reacquire { agent: AgentId, entity: EntityId },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Deferred {
    owner: EntityId,
    due: u64,
    task: DeferredTask,
}

#[derive(Clone, Debug, Default)]
pub struct DeferredQueue {
    tasks: Vec<Deferred>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `task` to run on frame `due`. Identical pending tasks collapse.
    pub fn schedule(&mut self, owner: EntityId, due: u64, task: DeferredTask) {
        if self.tasks.iter().any(|d| d.task == task) {
            return;
        }
        self.tasks.push(Deferred { owner, due, task });
    }

    /// Drops every task owned by `owner`, returning how many were cancelled.
    pub fn cancel_owner(&mut self, owner: EntityId) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|d| d.owner != owner);
        before - self.tasks.len()
    }

    /// Removes and returns the tasks due at or before `frame`, in queue order.
    pub fn take_due(&mut self, frame: u64) -> Vec<DeferredTask> {
        let mut due = Vec::new();
        self.tasks.retain(|d| {
            if d.due <= frame {
                due.push(d.task);
                false
            } else {
                true
            }
        });
        due
    }

    pub fn pending_for(&self, owner: EntityId) -> usize {
        self.tasks.iter().filter(|d| d.owner == owner).count()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
