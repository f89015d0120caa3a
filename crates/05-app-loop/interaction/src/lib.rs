//! Per-entity interaction state machine.
//!
//! The `interaction` crate owns everything that belongs to a single
//! interactable entity: its near-touch/touch/grab/use sets, the pre-grab
//! snapshot, attach points, and secondary-influence handling. Transitions are
//! pure with respect to the rest of the world: they mutate the entity and
//! report what other actors must do through [`FollowUps`].

/// Attach point records aligning a grabbed entity to a grip.
pub mod attach;
/// (entity, agent) collision-ignore bookkeeping.
pub mod collision;
/// Inconsistent-state taxonomy.
pub mod error;
/// Events and cross-actor effects produced by transitions.
pub mod follow_ups;
/// Entity container and its transition operations.
pub mod interactable;
/// Two-handed manipulation handlers.
pub mod secondary;
/// Authoritative per-entity interaction sets and snapshot.
pub mod state;

pub use crate::attach::{AttachPoint, AttachPointRegistry};
pub use crate::collision::CollisionIgnoreSet;
pub use crate::error::Inconsistency;
pub use crate::follow_ups::{Effect, FollowUps};
pub use crate::interactable::{Interactable, Lifecycle};
pub use crate::secondary::SecondaryInfluence;
pub use crate::state::{Grabber, InteractionState, Snapshot};
