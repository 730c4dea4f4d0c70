//! Cancelable repeating timer driven by the simulation clock

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatingTimer {
    pub period_ms: u64,
    /// Next fire time; None once cancelled
    next_due_ms: Option<u64>,
}

impl RepeatingTimer {
    /// A timer that has not been started
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            next_due_ms: None,
        }
    }

    /// (Re)arm the timer so it first fires one period after `now_ms`.
    /// A due time past the end of the clock never arrives.
    pub fn start(&mut self, now_ms: u64) {
        self.next_due_ms = now_ms.checked_add(self.period_ms);
    }

    /// Stop the timer; it never fires again until restarted
    pub fn cancel(&mut self) {
        self.next_due_ms = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due_ms.is_some()
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.next_due_ms
    }

    /// Count the firings due at `now_ms` and advance past them
    pub fn poll(&mut self, now_ms: u64) -> u32 {
        let Some(mut due) = self.next_due_ms else {
            return 0;
        };
        let mut fired = 0;
        while due <= now_ms {
            fired += 1;
            match due.checked_add(self.period_ms) {
                Some(next) => due = next,
                None => {
                    self.next_due_ms = None;
                    return fired;
                }
            }
        }
        self.next_due_ms = Some(due);
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_per_period() {
        let mut timer = RepeatingTimer::new(1000);
        timer.start(0);
        assert_eq!(timer.poll(999), 0);
        assert_eq!(timer.poll(1000), 1);
        assert_eq!(timer.poll(1500), 0);
        assert_eq!(timer.poll(3500), 2);
        assert_eq!(timer.next_due_ms(), Some(4000));
    }

    #[test]
    fn test_unstarted_and_cancelled_never_fire() {
        let mut timer = RepeatingTimer::new(100);
        assert_eq!(timer.poll(10_000), 0);

        timer.start(0);
        timer.cancel();
        assert!(!timer.is_active());
        assert_eq!(timer.poll(10_000), 0);
    }

    #[test]
    fn test_huge_period_does_not_overflow() {
        let mut timer = RepeatingTimer::new(u64::MAX);
        timer.start(16);
        assert!(!timer.is_active());
        assert_eq!(timer.poll(u64::MAX), 0);

        let mut timer = RepeatingTimer::new(u64::MAX - 10);
        timer.start(5);
        assert_eq!(timer.poll(1000), 0);
        assert_eq!(timer.poll(u64::MAX), 1);
        assert!(!timer.is_active());
    }

    #[test]
    fn test_restart_is_relative_to_now() {
        let mut timer = RepeatingTimer::new(1000);
        timer.start(0);
        timer.cancel();
        timer.start(5200);
        assert_eq!(timer.poll(6100), 0);
        assert_eq!(timer.poll(6200), 1);
    }
}
