use super::World;
use crate::deferred::DeferredTask;
use interact_abi::{AgentId, EntityId, GrabOutcome, Pose};
use interaction::{FollowUps, Inconsistency};
use log::{trace, warn};

/// What one [`World::update`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    pub deferred_run: usize,
    pub precognition_grabs: usize,
    pub recoveries: usize,
    pub slept: usize,
    pub observers_wired: usize,
}

impl World {
    /// Per-frame housekeeping, run once after the frame's input.
    ///
    /// Order: deferred tasks, precognition grabs, zone highlights, audit,
    /// idle sleep, then observers registered this frame are wired.
    pub fn update(&mut self, now: f64) -> FrameReport {
        self.now = now;
        self.frame += 1;
        let mut report = FrameReport {
            frame: self.frame,
            ..FrameReport::default()
        };

        for task in self.deferred.take_due(self.frame) {
            report.deferred_run += 1;
            match task {
                DeferredTask::ForceSnap { zone, entity } => self.run_force_snap(zone, entity),
                DeferredTask::Reacquire { agent, entity } => self.run_reacquire(agent, entity),
            }
        }

        report.precognition_grabs = self.precognition_grabs();
        for entity in self.entities.ids() {
            self.refresh_highlights(entity);
        }
        report.recoveries = self.audit();
        for e in self.entities.values_mut() {
            if e.try_sleep() {
                report.slept += 1;
            }
        }
        report.observers_wired = self.bus.wire_pending();
        trace!("frame {} done: {report:?}", self.frame);
        report
    }

    fn precognition_grabs(&mut self) -> usize {
        let now = self.now;
        let ready: Vec<AgentId> = self
            .agents
            .values()
            .filter(|a| a.is_enabled() && a.touched().is_some() && a.grab.precognition_open(now))
            .map(|a| a.id())
            .collect();
        ready
            .into_iter()
            .filter(|agent| matches!(self.attempt_grab(*agent), GrabOutcome::Accepted { .. }))
            .count()
    }

    /// Cross-checks coordinators against entities, then entities against
    /// themselves. Every finding is recovered locally.
    fn audit(&mut self) -> usize {
        let mut findings: Vec<Inconsistency> = Vec::new();
        for a in self.agents.values() {
            let agent = a.id();
            if let Some(entity) = a.grabbed() {
                let listed = self
                    .entities
                    .get(entity)
                    .is_some_and(|e| e.state().role_of(agent).is_some());
                if !listed {
                    findings.push(Inconsistency::StaleGrab { agent, entity });
                }
            }
            if let Some(entity) = a.using() {
                let listed = self
                    .entities
                    .get(entity)
                    .is_some_and(|e| e.state().user() == Some(agent));
                if !listed {
                    findings.push(Inconsistency::StaleUse { agent, entity });
                }
            }
        }
        for e in self.entities.values() {
            findings.extend(e.audit());
        }

        let count = findings.len();
        for finding in findings {
            self.recover(finding);
        }
        count
    }

    fn recover(&mut self, reason: Inconsistency) {
        match &reason {
            Inconsistency::StaleGrab { agent, entity } => {
                if let Some(a) = self.agents.get_mut(*agent) {
                    a.grab.note_released(*entity);
                }
            }
            Inconsistency::StaleUse { agent, entity } => {
                if let Some(a) = self.agents.get_mut(*agent) {
                    a.use_ctl.reset_if(*entity);
                }
            }
            _ => {}
        }
        let entity: EntityId = reason.entity();
        let Some(e) = self.entities.get_mut(entity) else {
            warn!("{reason}; entity gone, coordinator reset");
            self.stats.recoveries += 1;
            return;
        };
        let mut out = FollowUps::new();
        e.recover(reason, &mut out);
        self.apply(out);
    }

    /// Fixed-step simulation: collision pauses, held entities following
    /// their grips, and snap transitions.
    pub fn fixed_update(&mut self, dt: f32) {
        let cmds = self.collisions.advance(dt);
        self.physics.extend(cmds);

        for e in self.entities.values_mut() {
            let (Some(primary), secondary) = (e.state().primary(), e.state().secondary()) else {
                continue;
            };
            let grip_of = |agent: AgentId| -> Option<Pose> { self.agents.get(agent).map(|a| a.grip) };
            let Some(primary_grip) = grip_of(primary) else {
                continue;
            };
            let secondary_grip = secondary.and_then(grip_of);
            e.follow_grips(&primary_grip, secondary_grip.as_ref());
        }

        for z in self.zones.values_mut() {
            if let Some(e) = z.occupant().and_then(|id| self.entities.get_mut(id)) {
                z.advance(e, dt);
            }
        }
    }
}
