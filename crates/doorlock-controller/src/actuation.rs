//! Door actuation and alarm sequencing.
//!
//! After a successful door-open authentication each node walks the same
//! fixed plan on its own tick clock: Unlocking, Held, Locking, each for a
//! number of ticks, then Locked followed by a short settle pause. The two
//! nodes exchange no signal during the cycle, so their phase boundaries may
//! drift apart by the difference between their tick sources.
//!
//! What "entering a phase" means differs per node (motor commands on the
//! Access node, screen text on the Interface node) and is supplied through
//! [`PhaseSink`].

#![allow(async_fn_in_trait)]

use std::time::Duration;

use doorlock_core::DoorPhase;
use doorlock_hardware::{AlarmDevice, TickClock};
use tracing::{info, warn};

use crate::config::TimingConfig;
use crate::door::DoorCycle;
use crate::error::Result;

/// One timed phase of the door cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseStep {
    pub phase: DoorPhase,
    pub ticks: u32,
}

/// Timed phases of one door cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActuationPlan {
    steps: [PhaseStep; 3],
    settle: Duration,
}

impl ActuationPlan {
    pub fn new(unlock_ticks: u32, hold_ticks: u32, lock_ticks: u32, settle: Duration) -> Self {
        Self {
            steps: [
                PhaseStep {
                    phase: DoorPhase::Unlocking,
                    ticks: unlock_ticks,
                },
                PhaseStep {
                    phase: DoorPhase::Held,
                    ticks: hold_ticks,
                },
                PhaseStep {
                    phase: DoorPhase::Locking,
                    ticks: lock_ticks,
                },
            ],
            settle,
        }
    }

    pub fn from_timing(timing: &TimingConfig) -> Self {
        Self::new(
            timing.unlock_ticks,
            timing.hold_ticks,
            timing.lock_ticks,
            timing.settle(),
        )
    }

    /// Timed phases in execution order. `Locked` is implied at the end.
    pub fn steps(&self) -> &[PhaseStep] {
        &self.steps
    }

    /// Pause after the door is locked again.
    pub fn settle(&self) -> Duration {
        self.settle
    }

    /// Ticks from Unlocking to Locked.
    pub fn total_ticks(&self) -> u32 {
        self.steps.iter().map(|step| step.ticks).sum()
    }
}

/// Node-specific effect of entering a door phase.
pub trait PhaseSink {
    async fn enter(&mut self, phase: DoorPhase) -> Result<()>;
}

/// Walk `plan` from Locked back to Locked.
///
/// For each step the phase is recorded on `door`, the sink is driven, and
/// the clock is reset and awaited for the step's ticks. The sink then enters
/// `Locked` and the settle pause runs.
///
/// # Errors
///
/// Fails if the sink fails or `door` is not `Locked` on entry.
pub async fn run_cycle<C, S>(
    clock: &C,
    plan: &ActuationPlan,
    sink: &mut S,
    door: &mut DoorCycle,
) -> Result<()>
where
    C: TickClock,
    S: PhaseSink,
{
    for step in plan.steps() {
        door.transition_to(step.phase)?;
        sink.enter(step.phase).await?;
        clock.wait_ticks(step.ticks).await;
        info!(phase = %step.phase, ticks = step.ticks, "phase complete");
    }

    door.transition_to(DoorPhase::Locked)?;
    sink.enter(DoorPhase::Locked).await?;
    tokio::time::sleep(plan.settle()).await;
    Ok(())
}

/// Sound `buzzer` for `ticks` ticks of `clock`.
pub async fn sound_alarm<C, A>(clock: &C, buzzer: &mut A, ticks: u32) -> Result<()>
where
    C: TickClock,
    A: AlarmDevice,
{
    warn!(ticks, "alarm on");
    buzzer.set_active(true).await?;
    clock.wait_ticks(ticks).await;
    buzzer.set_active(false).await?;
    info!("alarm off");
    Ok(())
}
