use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::event::Event;

/// Unbounded FIFO between one producer and one consumer.
///
/// Pushing never blocks. Taking blocks while the queue is empty, unless a
/// cancellation is pending.
#[derive(Default)]
pub(crate) struct EventQueue {
    state: Mutex<State>,
    available: Condvar,
}

#[derive(Default)]
struct State {
    events: VecDeque<Event>,
    cancelled: bool,
}

impl EventQueue {
    fn lock(&self) -> MutexGuard<'_, State> {
        // a single push or pop cannot leave the state half-updated
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn push(&self, event: Event) {
        self.lock().events.push_back(event);
        self.available.notify_one();
    }

    /// Next event in FIFO order, blocking until one arrives.
    /// Returns `None` and clears the flag when a cancellation is pending.
    pub(crate) fn take(&self) -> Option<Event> {
        let mut state = self.lock();
        loop {
            if std::mem::take(&mut state.cancelled) {
                return None;
            }
            if let Some(event) = state.events.pop_front() {
                return Some(event);
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub(crate) fn cancel(&self) {
        self.lock().cancelled = true;
        self.available.notify_all();
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().events.len()
    }
}

/// Interrupts the consumer's blocking wait, possibly from another thread.
///
/// The interrupted matcher returns `Ok(None)`, just like at the end of the
/// document. A cancellation raised while no matcher is waiting hits the
/// next one. Each cancellation is consumed by exactly one wait.
#[derive(Clone)]
pub struct CancelHandle {
    queue: Arc<EventQueue>,
}

impl CancelHandle {
    pub(crate) fn new(queue: Arc<EventQueue>) -> Self {
        CancelHandle { queue }
    }

    pub fn cancel(&self) {
        log::debug!("Cancelling pending wait");
        self.queue.cancel();
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("buffered", &self.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn fifo_across_threads() {
        let queue = Arc::new(EventQueue::default());
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..100 {
                    queue.push(Event::text(i.to_string()));
                }
                queue.push(Event::Finish);
            })
        };
        let mut received = Vec::new();
        loop {
            match queue.take() {
                Some(Event::Finish) => break,
                Some(event) => received.push(event.content().unwrap_or_default().to_owned()),
                None => panic!("nothing was cancelled"),
            }
        }
        producer.join().unwrap();
        let expected: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        assert_eq!(received, expected);
    }

    #[test]
    fn cancel_wakes_blocked_take() {
        let queue = Arc::new(EventQueue::default());
        let handle = CancelHandle::new(Arc::clone(&queue));
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            handle.cancel();
        });
        assert_eq!(queue.take(), None);
        canceller.join().unwrap();
    }

    #[test]
    fn cancellation_is_consumed_once() {
        let queue = EventQueue::default();
        queue.push(Event::end("a"));
        queue.cancel();
        assert_eq!(queue.take(), None);
        assert_eq!(queue.take(), Some(Event::end("a")));
        assert_eq!(queue.len(), 0);
    }
}
