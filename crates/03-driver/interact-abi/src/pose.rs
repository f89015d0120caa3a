use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Rigid transform: world-space position plus orientation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// World-space position in metres.
    pub position: Vec3,
    /// World-space orientation.
    pub rotation: Quat,
}

impl Pose {
    /// Identity pose at the origin.
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Creates a pose from a position and orientation.
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Creates an unrotated pose at `position`.
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Expresses `self` in the local frame of `anchor`.
    pub fn relative_to(&self, anchor: &Pose) -> Pose {
        let inv = anchor.rotation.inverse();
        Pose {
            position: inv * (self.position - anchor.position),
            rotation: (inv * self.rotation).normalize(),
        }
    }

    /// Applies a local `offset` in the frame of `self`, yielding a world pose.
    pub fn compose(&self, offset: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * offset.position,
            rotation: (self.rotation * offset.rotation).normalize(),
        }
    }

    /// Inverse transform, so that `p.compose(&p.inverse())` is the identity.
    pub fn inverse(&self) -> Pose {
        let inv = self.rotation.inverse();
        Pose {
            position: -(inv * self.position),
            rotation: inv,
        }
    }

    /// Interpolates between two poses; `t` is clamped to `[0, 1]`.
    pub fn lerp(&self, to: &Pose, t: f32) -> Pose {
        let t = t.clamp(0.0, 1.0);
        Pose {
            position: self.position.lerp(to.position, t),
            rotation: self.rotation.slerp(to.rotation, t).normalize(),
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}
