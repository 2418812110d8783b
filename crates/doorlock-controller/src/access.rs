//! Access node controller.
//!
//! The Access node is the credential authority. It answers the Interface
//! node's exchanges, keeps the trial count of each authentication session,
//! drives the door motor through the actuation plan and sounds the buzzer on
//! lockout. It never initiates an exchange: every flow starts by waiting for
//! a code from the peer.
//!
//! # Lifecycle
//!
//! ```text
//! boot ─► await INTERFACE_READY ─► provision ─► serve loop
//!                                                 │
//!                     menu byte '+' ─► authenticate(OpenDoor)  ─► door cycle
//!                     menu byte '-' ─► authenticate(ChangePassword) ─► provision
//! ```

use doorlock_core::{Credential, DoorPhase, TrialOutcome};
use doorlock_hardware::{
    AlarmDevice, DoorMotor, MotorDirection, PersistentStore, SerialLink, TickClock,
};
use doorlock_protocol::{AuthPurpose, Handshake, MatchStatus, ProtocolCode, Verdict};
use tracing::{debug, info, warn};

use crate::actuation::{ActuationPlan, PhaseSink, run_cycle, sound_alarm};
use crate::config::NodeConfig;
use crate::door::DoorCycle;
use crate::error::Result;
use crate::session::{AuthOutcome, AuthSession};
use crate::store::CredentialStore;

/// Peripherals of the Access node.
#[derive(Debug)]
pub struct AccessPeripherals<L, S, M, A, C> {
    pub link: L,
    pub store: S,
    pub motor: M,
    pub buzzer: A,
    pub clock: C,
}

/// Credential authority and door driver.
#[derive(Debug)]
pub struct AccessController<L, S, M, A, C> {
    handshake: Handshake<L>,
    store: CredentialStore<S>,
    motor: M,
    buzzer: A,
    clock: C,
    config: NodeConfig,
    plan: ActuationPlan,
    door: DoorCycle,
    last_session: Option<AuthSession>,
}

impl<L, S, M, A, C> AccessController<L, S, M, A, C>
where
    L: SerialLink,
    S: PersistentStore,
    M: DoorMotor,
    A: AlarmDevice,
    C: TickClock,
{
    pub fn new(peripherals: AccessPeripherals<L, S, M, A, C>, config: NodeConfig) -> Self {
        let AccessPeripherals {
            link,
            store,
            motor,
            buzzer,
            clock,
        } = peripherals;

        Self {
            handshake: Handshake::new(link, config.handshake()),
            store: CredentialStore::from_config(store, &config),
            motor,
            buzzer,
            clock,
            plan: ActuationPlan::from_timing(&config.timing),
            config,
            door: DoorCycle::new(),
            last_session: None,
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn door(&self) -> &DoorCycle {
        &self.door
    }

    /// The most recently finished authentication session.
    pub fn last_session(&self) -> Option<&AuthSession> {
        self.last_session.as_ref()
    }

    /// Wait for the Interface node to come up, then provision.
    pub async fn boot(&mut self) -> Result<()> {
        info!("access node waiting for interface");
        self.handshake.await_exact(ProtocolCode::InterfaceReady).await?;
        self.provision().await?;
        Ok(())
    }

    /// Run provisioning rounds until two matching entries arrive, then
    /// persist the credential.
    ///
    /// Returns the number of rounds it took. Retries are unbounded.
    pub async fn provision(&mut self) -> Result<u32> {
        let mut rounds = 0;
        loop {
            rounds += 1;
            self.handshake.await_request(ProtocolCode::InterfaceReady).await?;
            self.handshake.send_code(ProtocolCode::AccessReady).await?;

            let first = self.handshake.receive_credential().await?;
            self.handshake.send_code(ProtocolCode::FirstDelivered).await?;
            let second = self.handshake.receive_credential().await?;

            let status =
                MatchStatus::from_matched(first.matches(&second, self.config.compare_mode));
            self.handshake.send_code(ProtocolCode::SecondDelivered).await?;
            self.handshake.send_code(status.code()).await?;

            if status == MatchStatus::Match {
                self.store.save(&first).await?;
                info!(rounds, "credential provisioned");
                return Ok(rounds);
            }
            warn!(round = rounds, "provisioning entries differ");
        }
    }

    /// Answer one authentication flow for `purpose`.
    ///
    /// A fresh session is opened with a zero trial count. On a match the
    /// purpose's continuation runs before returning: the door cycle for
    /// [`AuthPurpose::OpenDoor`], provisioning for
    /// [`AuthPurpose::ChangePassword`]. On the last allowed failure the
    /// lockout code is sent and the alarm sounds.
    ///
    /// # Errors
    ///
    /// Link, stall and store failures abort the flow.
    pub async fn authenticate(&mut self, purpose: AuthPurpose) -> Result<AuthOutcome> {
        let mut session = AuthSession::new(purpose, self.config.max_trials);
        info!(session = %session.id(), %purpose, "authentication started");

        let outcome = loop {
            self.handshake.await_request(purpose.command()).await?;
            self.handshake.send_code(ProtocolCode::AccessReady).await?;
            let candidate = self.handshake.receive_credential().await?;

            if self.check(&candidate).await? {
                session.record_match();
                self.handshake.send_code(Verdict::Match.code()).await?;
                info!(session = %session.id(), "credential accepted");
                self.last_session = Some(session.clone());
                self.grant(purpose).await?;
                break AuthOutcome::Granted;
            }

            match session.record_mismatch() {
                TrialOutcome::Retry { remaining } => {
                    warn!(session = %session.id(), remaining, "credential rejected");
                    self.handshake.send_code(Verdict::Mismatch.code()).await?;
                }
                TrialOutcome::LockedOut => {
                    warn!(session = %session.id(), attempts = session.attempts(), "lockout");
                    self.handshake.send_code(Verdict::Lockout.code()).await?;
                    self.last_session = Some(session.clone());
                    sound_alarm(&self.clock, &mut self.buzzer, self.config.timing.alarm_ticks)
                        .await?;
                    break AuthOutcome::LockedOut;
                }
            }
        };

        info!(session = %session.id(), %outcome, "authentication finished");
        Ok(outcome)
    }

    /// Read one menu byte and dispatch it.
    ///
    /// Returns `None` when the byte selects nothing.
    pub async fn serve_once(&mut self) -> Result<Option<AuthOutcome>> {
        let byte = self.handshake.recv_request().await?;
        match AuthPurpose::from_menu_byte(byte) {
            Some(purpose) => Ok(Some(self.authenticate(purpose).await?)),
            None => {
                debug!("ignoring menu byte {byte:#04x}");
                Ok(None)
            }
        }
    }

    /// Boot, then serve menu selections until a fatal error.
    pub async fn run(&mut self) -> Result<()> {
        self.boot().await?;
        loop {
            self.serve_once().await?;
        }
    }

    async fn check(&mut self, candidate: &Credential) -> Result<bool> {
        self.store.verify(candidate, self.config.compare_mode).await
    }

    async fn grant(&mut self, purpose: AuthPurpose) -> Result<()> {
        match purpose {
            AuthPurpose::OpenDoor => {
                let mut sink = MotorSink {
                    motor: &mut self.motor,
                };
                run_cycle(&self.clock, &self.plan, &mut sink, &mut self.door).await
            }
            AuthPurpose::ChangePassword => self.provision().await.map(|_| ()),
        }
    }
}

/// Drives the door motor for each phase.
struct MotorSink<'a, M> {
    motor: &'a mut M,
}

impl<M: DoorMotor> PhaseSink for MotorSink<'_, M> {
    async fn enter(&mut self, phase: DoorPhase) -> Result<()> {
        let direction = match phase {
            DoorPhase::Unlocking => MotorDirection::Clockwise,
            DoorPhase::Locking => MotorDirection::AntiClockwise,
            DoorPhase::Held | DoorPhase::Locked => MotorDirection::Stop,
        };
        self.motor.drive(direction).await?;
        Ok(())
    }
}
