//! Secondary-influence handlers for two-handed manipulation.

use interact_abi::{AttachPointId, Body, Pose, Quat, SecondaryAction, Vec3};

const MIN_GRIP_SPAN: f32 = 1e-4;

/// Active two-handed manipulation session.
///
/// Initialised with both attach points when a secondary grab lands, processed
/// on every fixed step while both agents hold the entity, and reset when
/// either lets go.
#[derive(Clone, Debug, PartialEq)]
pub struct SecondaryInfluence {
    pub action: SecondaryAction,
    pub primary_attach: AttachPointId,
    pub secondary_attach: AttachPointId,
    initial_span: f32,
    initial_scale: Vec3,
    initial_rotation: Quat,
}

impl SecondaryInfluence {
    /// Starts a session. Returns `None` for actions without an influence.
    pub fn initialise(
        action: SecondaryAction,
        primary_attach: AttachPointId,
        secondary_attach: AttachPointId,
        primary_grip: &Pose,
        secondary_grip: &Pose,
        body: &Body,
    ) -> Option<Self> {
        if !action.accepts_secondary() {
            return None;
        }
        Some(Self {
            action,
            primary_attach,
            secondary_attach,
            initial_span: primary_grip.position.distance(secondary_grip.position),
            initial_scale: body.scale,
            initial_rotation: body.pose.rotation,
        })
    }

    /// Applies the influence for the agents' current grips.
    pub fn process(&self, body: &mut Body, primary_grip: &Pose, secondary_grip: &Pose) {
        let span = secondary_grip.position - primary_grip.position;
        match self.action {
            SecondaryAction::AxisScale => {
                if self.initial_span > MIN_GRIP_SPAN {
                    let ratio = span.length() / self.initial_span;
                    body.scale = self.initial_scale * ratio;
                }
            }
            SecondaryAction::ControlDirection => {
                if span.length() > MIN_GRIP_SPAN {
                    body.pose.rotation = Quat::from_rotation_arc(Vec3::NEG_Z, span.normalize());
                }
            }
            SecondaryAction::None | SecondaryAction::Swap => {}
        }
    }

    /// Ends the session, either because the secondary let go or because the
    /// primary dropped the entity. Aiming is undone; a scale change is kept.
    pub fn reset(self, body: &mut Body) {
        if self.action == SecondaryAction::ControlDirection {
            body.pose.rotation = self.initial_rotation;
        }
    }
}
