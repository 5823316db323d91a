//! Per-frame event queue
//!
//! Holds the events of one pump generation. Scripts drain it front to back;
//! the next [`EventQueue::reset`] throws away whatever was left unread.

use crate::event::Event;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
    generation: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop unread events and start a new generation
    pub fn reset(&mut self) {
        if !self.events.is_empty() {
            tracing::trace!("Discarding {} unread event(s)", self.events.len());
        }
        self.events.clear();
        self.generation += 1;
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    /// Next unread event; `None` once the generation is drained
    pub fn poll(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// Unread events in delivery order
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of resets so far
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Value;

    fn custom(name: &str) -> Event {
        Event::from_parts(name, vec![]).unwrap()
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = EventQueue::new();
        queue.reset();
        queue.push(custom("a"));
        queue.push(custom("b"));
        queue.push(custom("c"));

        assert_eq!(queue.poll().unwrap().name(), "a");
        assert_eq!(queue.poll().unwrap().name(), "b");
        assert_eq!(queue.poll().unwrap().name(), "c");
        assert_eq!(queue.poll(), None);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut queue = EventQueue::new();
        queue.push(Event::Quit);
        queue.push(Event::Quit);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_exhausted_poll_is_idempotent() {
        let mut queue = EventQueue::new();
        queue.push(custom("only"));
        queue.poll();

        let generation = queue.generation();
        for _ in 0..5 {
            assert_eq!(queue.poll(), None);
        }
        assert_eq!(queue.generation(), generation);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_reset_discards_leftovers() {
        let mut queue = EventQueue::new();
        queue.push(custom("stale1"));
        queue.push(custom("stale2"));
        queue.poll();

        queue.reset();
        assert_eq!(queue.poll(), None);

        let fresh = Event::from_parts("fresh", vec![Value::Integer(1)]).unwrap();
        queue.push(fresh.clone());
        assert_eq!(queue.poll(), Some(fresh));
        assert_eq!(queue.poll(), None);
    }

    #[test]
    fn test_push_after_exhaustion_is_delivered() {
        let mut queue = EventQueue::new();
        assert_eq!(queue.poll(), None);
        queue.push(custom("late"));
        assert_eq!(queue.poll().unwrap().name(), "late");
    }

    #[test]
    fn test_generation_counts_resets() {
        let mut queue = EventQueue::new();
        assert_eq!(queue.generation(), 0);
        queue.reset();
        queue.reset();
        assert_eq!(queue.generation(), 2);
    }
}
