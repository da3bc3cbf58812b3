use std::time::Instant;

pub trait Clock {
    /// Monotonic milliseconds since some fixed point in the past.
    fn now_ms(&self) -> u64;
}

pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> MonotonicClock {
        MonotonicClock {
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Polled replacement for a sleeping frame timer. The owner asks on every
/// loop iteration whether the period has passed and does one unit of work
/// when it has.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period_ms: u64,
    last_tick: u64,
}

impl IntervalTimer {
    pub fn new(period_ms: u64) -> IntervalTimer {
        IntervalTimer {
            period_ms,
            last_tick: 0,
        }
    }

    pub fn elapsed(&mut self, now: u64) -> bool {
        if now.saturating_sub(self.last_tick) < self.period_ms {
            return false;
        }

        self.last_tick = now;
        true
    }
}
