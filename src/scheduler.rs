use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    CountdownTick,
    SceneTransition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Timer {
    id: TimerId,
    task: Task,
    due: Instant,
    period: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, task: Task, due: Instant, period: Option<Duration>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer { id, task, due, period });
        id
    }

    pub fn every(&mut self, now: Instant, period: Duration, task: Task) -> TimerId {
        self.add(task, now + period, Some(period))
    }

    pub fn once(&mut self, now: Instant, delay: Duration, task: Task) -> TimerId {
        self.add(task, now + delay, None)
    }

    /// Returns false if the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        before != self.timers.len()
    }

    #[cfg(test)]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    #[cfg(test)]
    pub fn next_due(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// Collects every task due at `now`, earliest first. An interval that
    /// fell several periods behind fires once and skips the missed periods.
    pub fn poll(&mut self, now: Instant) -> Vec<Task> {
        let mut due: Vec<(Instant, TimerId, Task)> = self
            .timers
            .iter()
            .filter(|t| t.due <= now)
            .map(|t| (t.due, t.id, t.task))
            .collect();
        if due.is_empty() {
            return Vec::new();
        }
        due.sort_by_key(|&(at, id, _)| (at, id.0));

        self.timers.retain_mut(|timer| {
            if timer.due > now {
                return true;
            }
            match timer.period {
                Some(period) if !period.is_zero() => {
                    while timer.due <= now {
                        timer.due += period;
                    }
                    true
                }
                _ => false,
            }
        });

        due.into_iter().map(|(_, _, task)| task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn interval_fires_once_per_period() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.every(t0, SECOND, Task::CountdownTick);

        assert!(scheduler.poll(t0 + Duration::from_millis(999)).is_empty());
        assert_eq!(scheduler.poll(t0 + SECOND), vec![Task::CountdownTick]);
        assert!(scheduler.poll(t0 + Duration::from_millis(1500)).is_empty());
        assert_eq!(scheduler.poll(t0 + 2 * SECOND), vec![Task::CountdownTick]);
    }

    #[test]
    fn late_interval_does_not_burst() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.every(t0, SECOND, Task::CountdownTick);

        assert_eq!(scheduler.poll(t0 + 5 * SECOND + Duration::from_millis(10)).len(), 1);
        assert_eq!(scheduler.next_due(), Some(t0 + 6 * SECOND));
    }

    #[test]
    fn one_shot_fires_exactly_once() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        let id = scheduler.once(t0, 3 * SECOND, Task::SceneTransition);

        assert!(scheduler.is_pending(id));
        assert!(scheduler.poll(t0 + 2 * SECOND).is_empty());
        assert_eq!(scheduler.poll(t0 + 3 * SECOND), vec![Task::SceneTransition]);
        assert!(!scheduler.is_pending(id));
        assert!(scheduler.poll(t0 + 10 * SECOND).is_empty());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        let id = scheduler.once(t0, SECOND, Task::SceneTransition);

        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert!(scheduler.poll(t0 + 2 * SECOND).is_empty());
    }

    #[test]
    fn due_tasks_come_out_in_order() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.once(t0, Duration::from_millis(1500), Task::SceneTransition);
        scheduler.every(t0, SECOND, Task::CountdownTick);

        assert_eq!(
            scheduler.poll(t0 + 2 * SECOND),
            vec![Task::CountdownTick, Task::SceneTransition]
        );
    }
}
