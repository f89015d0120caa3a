use std::collections::VecDeque;

use crate::input::InputPriority;

/// Pending host inputs, one FIFO per [`InputPriority`] class.
///
/// Contact updates drain before grab inputs, and grab inputs before use
/// inputs, so a press always sees the contact state reported with it.
#[derive(Debug)]
pub struct InputQueue<T> {
    buckets: [VecDeque<T>; 3],
}

impl<T> Default for InputQueue<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<T> InputQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(per_class: usize) -> Self {
        Self {
            buckets: std::array::from_fn(|_| VecDeque::with_capacity(per_class)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(VecDeque::is_empty)
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(VecDeque::len).sum()
    }

    /// Backlog per class, indexed by [`InputPriority::index`].
    pub fn backlog(&self) -> [usize; 3] {
        std::array::from_fn(|i| self.buckets[i].len())
    }

    pub fn push(&mut self, class: InputPriority, item: T) {
        self.buckets[class.index()].push_back(item);
    }

    /// Returns an item that could not be handled yet to the head of its class.
    pub fn push_front(&mut self, class: InputPriority, item: T) {
        self.buckets[class.index()].push_front(item);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.buckets.iter_mut().find_map(VecDeque::pop_front)
    }

    /// The class [`pop`](Self::pop) would serve next.
    pub fn next_class(&self) -> Option<InputPriority> {
        InputPriority::ALL
            .into_iter()
            .find(|class| !self.buckets[class.index()].is_empty())
    }

    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(VecDeque::clear);
    }
}
