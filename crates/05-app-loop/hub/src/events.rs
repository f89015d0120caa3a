//! Transition event bus.
//!
//! Two ways to listen: in-process observers filtered by kind, and channel
//! feeds handed to collaborators that poll. Observers subscribed during a
//! frame are wired at the end of that frame so they never see half of a
//! tick; feeds are live immediately.

use crossbeam_channel::{unbounded, Receiver, Sender};
use interact_abi::{TransitionEvent, TransitionKind};
use log::trace;
use std::fmt;

/// Subscriber to transition notifications (highlighting, haptics, ...).
pub trait TransitionObserver {
    fn on_transition(&mut self, event: &TransitionEvent);
}

impl<F> TransitionObserver for F
where
    F: FnMut(&TransitionEvent),
{
    fn on_transition(&mut self, event: &TransitionEvent) {
        self(event)
    }
}

/// Which transition kinds an observer receives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum KindFilter {
    #[default]
    All,
    Only(Vec<TransitionKind>),
}

impl KindFilter {
    pub fn matches(&self, kind: TransitionKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Only(kinds) => kinds.contains(&kind),
        }
    }
}

struct Subscription {
    filter: KindFilter,
    observer: Box<dyn TransitionObserver>,
}

#[derive(Default)]
pub struct EventBus {
    active: Vec<Subscription>,
    pending: Vec<Subscription>,
    feeds: Vec<Sender<TransitionEvent>>,
    published: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer; it starts receiving at the next frame boundary.
    pub fn subscribe(&mut self, filter: KindFilter, observer: impl TransitionObserver + 'static) {
        self.pending.push(Subscription {
            filter,
            observer: Box::new(observer),
        });
    }

    /// Wires observers registered since the last frame boundary.
    pub fn wire_pending(&mut self) -> usize {
        let count = self.pending.len();
        self.active.append(&mut self.pending);
        count
    }

    /// Opens a channel feed receiving every event from now on.
    pub fn feed(&mut self) -> Receiver<TransitionEvent> {
        let (tx, rx) = unbounded();
        self.feeds.push(tx);
        rx
    }

    pub fn publish(&mut self, event: &TransitionEvent) {
        trace!("transition {:?} {} {:?}", event.kind, event.entity, event.agent);
        self.published += 1;
        for sub in self.active.iter_mut() {
            if sub.filter.matches(event.kind) {
                sub.observer.on_transition(event);
            }
        }
        // Feeds whose receiver was dropped are pruned on send failure.
        self.feeds.retain(|tx| tx.send(*event).is_ok());
    }

    /// Number of events published so far.
    pub fn published(&self) -> u64 {
        self.published
    }

    pub fn observer_count(&self) -> usize {
        self.active.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("active", &self.active.len())
            .field("pending", &self.pending.len())
            .field("feeds", &self.feeds.len())
            .field("published", &self.published)
            .finish()
    }
}
