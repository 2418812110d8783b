//! Mock door motor and alarm buzzer.
//!
//! Both record every command together with the (tokio) instant it was
//! issued, so tests running on paused time can check phase durations.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;
use tracing::info;

use crate::{
    Result,
    traits::{AlarmDevice, DoorMotor},
    types::MotorDirection,
};

/// A recorded actuator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recorded<T> {
    pub value: T,
    pub at: Instant,
}

type Log<T> = Arc<Mutex<Vec<Recorded<T>>>>;

fn lock<T>(log: &Log<T>) -> MutexGuard<'_, Vec<Recorded<T>>> {
    log.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock DC motor driving the door.
#[derive(Debug)]
pub struct MockMotor {
    log: Log<MotorDirection>,
}

impl MockMotor {
    pub fn new() -> (Self, MockMotorHandle) {
        let log: Log<_> = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                log: Arc::clone(&log),
            },
            MockMotorHandle { log },
        )
    }
}

impl DoorMotor for MockMotor {
    async fn drive(&mut self, direction: MotorDirection) -> Result<()> {
        info!(%direction, "motor");
        lock(&self.log).push(Recorded {
            value: direction,
            at: Instant::now(),
        });
        Ok(())
    }
}

/// Inspect commands sent to a [`MockMotor`].
#[derive(Debug, Clone)]
pub struct MockMotorHandle {
    log: Log<MotorDirection>,
}

impl MockMotorHandle {
    /// Directions in the order they were commanded.
    pub fn directions(&self) -> Vec<MotorDirection> {
        lock(&self.log).iter().map(|r| r.value).collect()
    }

    /// Full command log.
    pub fn events(&self) -> Vec<Recorded<MotorDirection>> {
        lock(&self.log).clone()
    }
}

/// Mock alarm buzzer.
#[derive(Debug)]
pub struct MockBuzzer {
    log: Log<bool>,
}

impl MockBuzzer {
    pub fn new() -> (Self, MockBuzzerHandle) {
        let log: Log<_> = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                log: Arc::clone(&log),
            },
            MockBuzzerHandle { log },
        )
    }
}

impl AlarmDevice for MockBuzzer {
    async fn set_active(&mut self, active: bool) -> Result<()> {
        info!(active, "buzzer");
        lock(&self.log).push(Recorded {
            value: active,
            at: Instant::now(),
        });
        Ok(())
    }
}

/// Inspect commands sent to a [`MockBuzzer`].
#[derive(Debug, Clone)]
pub struct MockBuzzerHandle {
    log: Log<bool>,
}

impl MockBuzzerHandle {
    /// Whether the buzzer is sounding right now.
    pub fn is_active(&self) -> bool {
        lock(&self.log).last().is_some_and(|r| r.value)
    }

    /// Full on/off log.
    pub fn events(&self) -> Vec<Recorded<bool>> {
        lock(&self.log).clone()
    }

    /// Durations of every completed on→off period.
    pub fn alarm_periods(&self) -> Vec<std::time::Duration> {
        let log = lock(&self.log);
        let mut periods = Vec::new();
        let mut started = None;
        for record in log.iter() {
            match (record.value, started) {
                (true, None) => started = Some(record.at),
                (false, Some(on)) => {
                    periods.push(record.at - on);
                    started = None;
                }
                _ => {}
            }
        }
        periods
    }
}
