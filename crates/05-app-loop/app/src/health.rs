//! Coarse health indicators for the interaction loop.
//!
//! The scheduler raises these from tick results so hosts can surface them
//! (debug overlays, telemetry) without inspecting the world directly.

/// Latch-style health indicators.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HealthFlags {
    /// True while a recovery window is open after an inconsistency was repaired.
    pub recovering: bool,
    /// True when the input budget ran out with events still queued.
    pub input_backlog: bool,
    /// True when the fixed step hit its per-tick cap and dropped simulated time.
    pub falling_behind: bool,
}

/// Aggregates health flags with recovery-window bookkeeping.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub flags: HealthFlags,
    /// Remaining frames before `recovering` clears.
    pub recovery_frames: u8,
    /// Recoveries observed since the scheduler was built.
    pub recoveries_seen: u64,
    /// Rejected inputs observed since the scheduler was built.
    pub rejections_seen: u64,
}

impl Health {
    /// Starts or extends a recovery window.
    pub fn begin_recovery(&mut self, frames: u8) {
        self.flags.recovering = true;
        if frames > self.recovery_frames {
            self.recovery_frames = frames;
        }
    }

    /// Decrements the recovery window by one frame, clearing the flag at zero.
    pub fn decay_one_frame(&mut self) {
        if self.recovery_frames > 0 {
            self.recovery_frames -= 1;
        }
        if self.recovery_frames == 0 {
            self.flags.recovering = false;
        }
    }

    /// True when no flag is raised.
    pub fn is_nominal(&self) -> bool {
        self.flags == HealthFlags::default()
    }
}
