// Task bookkeeping for the form workflows: last-value publication for the
// fetch family and a drop-on-duplicate flag for saves. No external runtime
// dependency, plain atomics.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Holds the most recently published result of a family of async invocations.
///
/// Every invocation calls [`LastValue::begin`] and keeps the returned
/// [`Attempt`]. Only the attempt whose generation is still the newest at
/// completion may write the visible slot, so a slow older fetch can never
/// overwrite the result of a fetch started after it. An attempt that is
/// dropped without publishing (error path) leaves the slot untouched.
#[derive(Debug, Default)]
pub struct LastValue<T> {
    generation: AtomicU64,
    in_flight: AtomicUsize,
    slot: Mutex<Option<T>>,
}

impl<T> LastValue<T> {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            slot: Mutex::new(None),
        }
    }

    /// Start a new invocation, superseding all earlier ones.
    pub fn begin(&self) -> Attempt<'_, T> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        Attempt {
            owner: self,
            generation,
        }
    }

    /// Whether any invocation of this family is still in flight.
    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn set(&self, value: Option<T>) {
        *self.slot.lock().expect("last-value slot poisoned") = value;
    }
}

impl<T: Clone> LastValue<T> {
    /// The currently published value, if any.
    pub fn get(&self) -> Option<T> {
        self.slot.lock().expect("last-value slot poisoned").clone()
    }
}

/// A single in-flight invocation tracked by a [`LastValue`].
#[derive(Debug)]
pub struct Attempt<'a, T> {
    owner: &'a LastValue<T>,
    generation: u64,
}

impl<T> Attempt<'_, T> {
    /// Publish this invocation's result. Ignored when a newer invocation has
    /// started in the meantime.
    pub fn publish(self, value: Option<T>) {
        if self.owner.is_current(self.generation) {
            self.owner.set(value);
        }
    }
}

impl<T> Drop for Attempt<'_, T> {
    fn drop(&mut self) {
        self.owner.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Single-slot admission flag: while one invocation holds the guard, further
/// starts are refused instead of queued. The slot is released when the guard
/// drops, on success and failure paths alike.
#[derive(Debug, Default)]
pub struct DropTask {
    active: AtomicBool,
}

impl DropTask {
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
        }
    }

    /// Claim the slot. Returns `None` while another invocation holds it.
    pub fn try_start(&self) -> Option<DropTaskGuard<'_>> {
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| DropTaskGuard { flag: &self.active })
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct DropTaskGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for DropTaskGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_attempt_does_not_publish() {
        let last = LastValue::new();
        let old = last.begin();
        let new = last.begin();
        new.publish(Some(2));
        old.publish(Some(1));
        assert_eq!(last.get(), Some(2));
    }

    #[test]
    fn newest_attempt_may_clear_the_slot() {
        let last = LastValue::new();
        last.begin().publish(Some(7));
        last.begin().publish(None);
        assert_eq!(last.get(), None);
    }

    #[test]
    fn dropped_attempt_keeps_previous_value_and_clears_in_flight() {
        let last = LastValue::new();
        last.begin().publish(Some(1));
        {
            let _failed = last.begin();
            assert!(last.is_running());
        }
        assert!(!last.is_running());
        assert_eq!(last.get(), Some(1));
    }

    #[test]
    fn drop_task_refuses_second_start() {
        let task = DropTask::new();
        let guard = task.try_start().expect("first start");
        assert!(task.try_start().is_none());
        assert!(task.is_running());
        drop(guard);
        assert!(!task.is_running());
        assert!(task.try_start().is_some());
    }
}
