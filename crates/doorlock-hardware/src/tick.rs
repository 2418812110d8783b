//! Tick counter and its periodic producer.
//!
//! On the reference hardware a timer interrupt increments a global counter
//! once per second and the foreground loop spins on it. Here the counter is an
//! explicit value shared between exactly one producer ([`TickSource`]) and the
//! node's foreground task. Waiting is event driven: the producer notifies
//! waiters on every tick instead of the consumer spinning.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use doorlock_hardware::tick::{TickCounter, TickSource};
//! use doorlock_hardware::traits::TickClock;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let clock = TickCounter::new();
//! let source = TickSource::new(clock.clone(), Duration::from_secs(1)).spawn();
//!
//! clock.wait_ticks(3).await;
//! assert!(clock.elapsed() >= 3);
//! source.abort();
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

use crate::traits::TickClock;

#[derive(Debug, Default)]
struct TickState {
    ticks: AtomicU32,
    notify: Notify,
}

/// Shared tick counter of one node.
///
/// Cloning yields another handle to the same counter. The counter wraps at
/// `u32::MAX`.
#[derive(Debug, Clone, Default)]
pub struct TickCounter {
    state: Arc<TickState>,
}

impl TickCounter {
    /// Create a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick and wake every waiter. Producer side only.
    pub fn advance(&self) {
        self.state.ticks.fetch_add(1, Ordering::AcqRel);
        self.state.notify.notify_waiters();
    }
}

impl TickClock for TickCounter {
    fn reset(&self) {
        self.state.ticks.store(0, Ordering::Release);
    }

    fn elapsed(&self) -> u32 {
        self.state.ticks.load(Ordering::Acquire)
    }

    async fn wait_until(&self, ticks: u32) {
        loop {
            // Register before checking so a tick between the check and the
            // await is not lost.
            let notified = self.state.notify.notified();
            if self.elapsed() >= ticks {
                return;
            }
            notified.await;
        }
    }
}

/// Periodic producer for a [`TickCounter`], standing in for the timer
/// interrupt.
#[derive(Debug)]
pub struct TickSource {
    counter: TickCounter,
    period: Duration,
}

impl TickSource {
    /// Create a source that advances `counter` once per `period`.
    pub fn new(counter: TickCounter, period: Duration) -> Self {
        Self { counter, period }
    }

    /// Tick forever. The first tick fires one period after the call.
    pub async fn run(self) {
        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

        loop {
            interval.tick().await;
            self.counter.advance();
            trace!(ticks = self.counter.elapsed(), "tick");
        }
    }

    /// Run on a new tokio task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_advance_and_reset() {
        let clock = TickCounter::new();
        clock.advance();
        clock.advance();
        assert_eq!(clock.elapsed(), 2);

        clock.reset();
        assert_eq!(clock.elapsed(), 0);
    }

    #[test]
    fn test_clones_share_state() {
        let clock = TickCounter::new();
        let producer = clock.clone();
        producer.advance();
        assert_eq!(clock.elapsed(), 1);
    }

    #[tokio::test]
    async fn test_wait_until_returns_immediately_when_reached() {
        let clock = TickCounter::new();
        clock.advance();
        clock.wait_until(1).await;
        clock.wait_until(0).await;
    }

    #[tokio::test]
    async fn test_wait_until_wakes_on_advance() {
        let clock = TickCounter::new();
        let producer = clock.clone();

        let waiter = tokio::spawn(async move {
            clock.wait_until(3).await;
            clock.elapsed()
        });

        for _ in 0..3 {
            tokio::task::yield_now().await;
            producer.advance();
        }

        assert!(waiter.await.unwrap() >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_source_ticks_once_per_period() {
        let clock = TickCounter::new();
        let source = TickSource::new(clock.clone(), Duration::from_secs(1)).spawn();

        let start = Instant::now();
        clock.wait_ticks(15).await;
        let waited = start.elapsed();

        assert!(waited >= Duration::from_secs(15));
        assert!(waited < Duration::from_secs(16));
        source.abort();
    }
}
