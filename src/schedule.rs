//! Named, ordered execution phases
//!
//! A schedule is identified by the `Arc` it lives in: two registrations share
//! a phase only if they were given clones of the same [`ScheduleRef`].

use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Execution phase with a stateful continue predicate
pub trait Schedule: Send + Sync {
    /// Get schedule name
    fn name(&self) -> &str;

    /// Position in the phase sequence, lower runs first
    fn order(&self) -> i32;

    /// True means "run this phase now", false means "move on"
    ///
    /// Evaluated before every step, so each call may answer differently.
    fn should_run(&self) -> bool;
}

/// Shared schedule handle
pub type ScheduleRef = Arc<dyn Schedule>;

/// Identity comparison, ignoring vtable pointers
pub fn same_schedule(a: &ScheduleRef, b: &ScheduleRef) -> bool {
    schedule_key(a) == schedule_key(b)
}

fn schedule_key(schedule: &ScheduleRef) -> *const () {
    Arc::as_ptr(schedule) as *const ()
}

/// Distinct schedules in ascending `order`
///
/// Ties keep first-appearance order.
pub fn schedule_sequence<'a, I>(schedules: I) -> Vec<ScheduleRef>
where
    I: IntoIterator<Item = &'a ScheduleRef>,
{
    let mut seen = FxHashSet::default();
    let mut sequence: Vec<ScheduleRef> = schedules
        .into_iter()
        .filter(|schedule| seen.insert(schedule_key(schedule)))
        .cloned()
        .collect();
    sequence.sort_by_key(|schedule| schedule.order());
    sequence
}

/// Startup phase: order 0, runs exactly once
#[derive(Default)]
pub struct Startup {
    ran: AtomicBool,
}

impl Startup {
    pub const ORDER: i32 = 0;

    pub fn new() -> Self {
        Self::default()
    }

    /// New startup schedule behind a [`ScheduleRef`]
    pub fn shared() -> ScheduleRef {
        Arc::new(Self::new())
    }
}

impl Schedule for Startup {
    fn name(&self) -> &str {
        "Startup"
    }

    fn order(&self) -> i32 {
        Self::ORDER
    }

    fn should_run(&self) -> bool {
        !self.ran.swap(true, Ordering::Relaxed)
    }
}

/// Update phase: order 1, runs forever
#[derive(Debug, Default, Clone, Copy)]
pub struct Update;

impl Update {
    pub const ORDER: i32 = 1;

    pub fn shared() -> ScheduleRef {
        Arc::new(Self)
    }
}

impl Schedule for Update {
    fn name(&self) -> &str {
        "Update"
    }

    fn order(&self) -> i32 {
        Self::ORDER
    }

    fn should_run(&self) -> bool {
        true
    }
}

/// Phase that runs a fixed number of times, then stays done
pub struct Repeat {
    name: String,
    order: i32,
    remaining: AtomicU64,
}

impl Repeat {
    pub fn new(name: impl Into<String>, order: i32, times: u64) -> Self {
        Self {
            name: name.into(),
            order,
            remaining: AtomicU64::new(times),
        }
    }

    pub fn shared(name: impl Into<String>, order: i32, times: u64) -> ScheduleRef {
        Arc::new(Self::new(name, order, times))
    }

    /// Runs still allowed
    pub fn remaining(&self) -> u64 {
        self.remaining.load(Ordering::Relaxed)
    }
}

impl Schedule for Repeat {
    fn name(&self) -> &str {
        &self.name
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn should_run(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl fmt::Debug for dyn Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schedule")
            .field("name", &self.name())
            .field("order", &self.order())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_runs_once() {
        let startup = Startup::new();
        assert!(startup.should_run());
        assert!(!startup.should_run());
        assert!(!startup.should_run());
    }

    #[test]
    fn test_repeat_counts_down() {
        let repeat = Repeat::new("Fixed", 2, 2);
        assert!(repeat.should_run());
        assert!(repeat.should_run());
        assert!(!repeat.should_run());
        assert_eq!(repeat.remaining(), 0);
    }

    #[test]
    fn test_sequence_sorts_and_dedups() {
        let update = Update::shared();
        let startup = Startup::shared();
        let late = Repeat::shared("Late", 5, 1);

        let registered = [update.clone(), late.clone(), startup.clone(), update.clone()];
        let sequence = schedule_sequence(&registered);

        assert_eq!(sequence.len(), 3);
        assert!(same_schedule(&sequence[0], &startup));
        assert!(same_schedule(&sequence[1], &update));
        assert!(same_schedule(&sequence[2], &late));
    }

    #[test]
    fn test_distinct_instances_are_distinct_schedules() {
        let a = Update::shared();
        let b = Update::shared();
        assert!(!same_schedule(&a, &b));
        assert_eq!(schedule_sequence([&a, &b]).len(), 2);
    }
}
