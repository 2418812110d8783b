//! Interface node controller.
//!
//! The Interface node owns the keypad and display and starts every exchange.
//! It has no credential and no trial count of its own: it forwards what the
//! user types and renders whatever the Access node answers. During the door
//! cycle and the lockout alarm it mirrors the Access node's timing on its own
//! tick clock, without any signal from the peer.

use doorlock_core::constants::CREDENTIAL_LENGTH;
use doorlock_core::{Credential, DoorPhase};
use doorlock_hardware::{DisplayDevice, KeypadDevice, KeypadInput, SerialLink, TickClock};
use doorlock_protocol::{AuthPurpose, Handshake, MatchStatus, ProtocolCode, Verdict};
use tracing::{debug, info, warn};

use crate::actuation::{ActuationPlan, PhaseSink, run_cycle};
use crate::config::NodeConfig;
use crate::door::DoorCycle;
use crate::error::Result;
use crate::screen::Screen;
use crate::session::AuthOutcome;

/// Character echoed for every credential key press.
const MASK: char = '*';

/// Peripherals of the Interface node.
#[derive(Debug)]
pub struct InterfacePeripherals<L, K, D, C> {
    pub link: L,
    pub keypad: K,
    pub display: D,
    pub clock: C,
}

/// User-facing node.
#[derive(Debug)]
pub struct InterfaceController<L, K, D, C> {
    handshake: Handshake<L>,
    keypad: K,
    display: D,
    clock: C,
    config: NodeConfig,
    plan: ActuationPlan,
    door: DoorCycle,
}

impl<L, K, D, C> InterfaceController<L, K, D, C>
where
    L: SerialLink,
    K: KeypadDevice,
    D: DisplayDevice,
    C: TickClock,
{
    pub fn new(peripherals: InterfacePeripherals<L, K, D, C>, config: NodeConfig) -> Self {
        let InterfacePeripherals {
            link,
            keypad,
            display,
            clock,
        } = peripherals;

        Self {
            handshake: Handshake::new(link, config.handshake()),
            keypad,
            display,
            clock,
            plan: ActuationPlan::from_timing(&config.timing),
            config,
            door: DoorCycle::new(),
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Door phase as mirrored on this node.
    pub fn door(&self) -> &DoorCycle {
        &self.door
    }

    /// Announce readiness, show the banner, then provision.
    pub async fn boot(&mut self) -> Result<()> {
        self.handshake.send_code(ProtocolCode::InterfaceReady).await?;
        self.show(Screen::Banner).await?;
        tokio::time::sleep(self.config.timing.banner()).await;
        info!("interface node up");
        self.provision().await?;
        Ok(())
    }

    /// Ask for a new credential twice until the Access node reports that
    /// both entries match, then show the main menu.
    ///
    /// Returns the number of rounds it took. Retries are unbounded.
    pub async fn provision(&mut self) -> Result<u32> {
        let mut rounds = 0;
        loop {
            rounds += 1;
            let first = self.prompt_credential(Screen::EnterPassword).await?;
            let second = self.prompt_credential(Screen::ReEnterPassword).await?;

            self.handshake.send_code(ProtocolCode::InterfaceReady).await?;
            self.handshake.await_exact(ProtocolCode::AccessReady).await?;
            self.handshake.send_credential(&first).await?;
            self.handshake.await_exact(ProtocolCode::FirstDelivered).await?;
            self.handshake.send_credential(&second).await?;
            self.handshake.await_exact(ProtocolCode::SecondDelivered).await?;
            let status = MatchStatus::from_byte(self.handshake.recv_byte().await?);

            if status == MatchStatus::Match {
                info!(rounds, "new credential set");
                self.show(Screen::PasswordSet).await?;
                tokio::time::sleep(self.config.timing.confirm()).await;
                self.show_menu().await?;
                return Ok(rounds);
            }

            warn!(round = rounds, "entries differ");
            self.show(Screen::Unmatched).await?;
            tokio::time::sleep(self.config.timing.message_hold()).await;
        }
    }

    /// Run one authentication flow for `purpose`.
    ///
    /// Prompts until the Access node answers MATCH or LOCKOUT. A byte that
    /// is not a verdict re-prompts without a message. After a match the
    /// purpose's continuation runs: the mirrored door cycle or provisioning.
    pub async fn authenticate(&mut self, purpose: AuthPurpose) -> Result<AuthOutcome> {
        let prompt = match purpose {
            AuthPurpose::OpenDoor => Screen::EnterPassword,
            AuthPurpose::ChangePassword => Screen::OldPassword,
        };

        loop {
            let credential = self.prompt_credential(prompt).await?;
            self.handshake.send_code(purpose.command()).await?;
            self.handshake.await_exact(ProtocolCode::AccessReady).await?;
            self.handshake.send_credential(&credential).await?;

            let byte = self.handshake.recv_byte().await?;
            match Verdict::from_byte(byte) {
                Some(Verdict::Match) => {
                    info!(%purpose, "access granted");
                    self.grant(purpose).await?;
                    return Ok(AuthOutcome::Granted);
                }
                Some(Verdict::Mismatch) => {
                    warn!(%purpose, "wrong credential");
                    self.show(Screen::WrongPassword).await?;
                    tokio::time::sleep(self.config.timing.rejection_hold(purpose)).await;
                }
                Some(Verdict::Lockout) => {
                    warn!(%purpose, "locked out");
                    self.show_warning().await?;
                    return Ok(AuthOutcome::LockedOut);
                }
                None => warn!(%purpose, "unexpected verdict byte {byte:#04x}"),
            }
        }
    }

    /// Wait for one menu key and run the selected flow.
    ///
    /// The key is forwarded to the Access node before the flow starts.
    /// Returns `None` when the key selects nothing.
    pub async fn handle_menu_key(&mut self) -> Result<Option<AuthOutcome>> {
        let key = self.keypad.read_input().await?;
        let purpose = match key {
            KeypadInput::OpenDoor => AuthPurpose::OpenDoor,
            KeypadInput::ChangePassword => AuthPurpose::ChangePassword,
            other => {
                debug!(?other, "ignoring menu key");
                return Ok(None);
            }
        };

        self.handshake.send_byte(purpose.command().as_byte()).await?;
        Ok(Some(self.authenticate(purpose).await?))
    }

    /// Boot, then handle menu keys until a fatal error.
    pub async fn run(&mut self) -> Result<()> {
        self.boot().await?;
        loop {
            self.handle_menu_key().await?;
        }
    }

    async fn grant(&mut self, purpose: AuthPurpose) -> Result<()> {
        match purpose {
            AuthPurpose::OpenDoor => {
                let mut sink = DisplaySink {
                    display: &mut self.display,
                };
                run_cycle(&self.clock, &self.plan, &mut sink, &mut self.door).await?;
                self.show_menu().await
            }
            // Provisioning ends on the main menu
            AuthPurpose::ChangePassword => self.provision().await.map(|_| ()),
        }
    }

    async fn show_warning(&mut self) -> Result<()> {
        self.show(Screen::Warning).await?;
        self.clock.wait_ticks(self.config.timing.alarm_ticks).await;
        self.show_menu().await
    }

    async fn show_menu(&mut self) -> Result<()> {
        self.show(Screen::MainMenu).await
    }

    async fn show(&mut self, screen: Screen) -> Result<()> {
        show_screen(&mut self.display, screen).await
    }

    async fn prompt_credential(&mut self, prompt: Screen) -> Result<Credential> {
        self.show(prompt).await?;
        self.read_credential().await
    }

    /// Read `CREDENTIAL_LENGTH` key presses, echoing a mask for each, then
    /// wait for the enter key. Keys after the last symbol other than enter
    /// are dropped.
    async fn read_credential(&mut self) -> Result<Credential> {
        let mut symbols = [0u8; CREDENTIAL_LENGTH];
        for slot in &mut symbols {
            *slot = self.keypad.read_input().await?.code();
            self.display.put_char(MASK).await?;
        }
        loop {
            match self.keypad.read_input().await? {
                KeypadInput::Enter => break,
                other => debug!(?other, "waiting for enter"),
            }
        }
        Ok(Credential::new(symbols))
    }
}

async fn show_screen<D: DisplayDevice>(display: &mut D, screen: Screen) -> Result<()> {
    let lines = screen.render(display.columns());
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    display.show(&lines).await?;
    Ok(())
}

/// Mirrors door phases on the display.
struct DisplaySink<'a, D> {
    display: &'a mut D,
}

impl<D: DisplayDevice> PhaseSink for DisplaySink<'_, D> {
    async fn enter(&mut self, phase: DoorPhase) -> Result<()> {
        show_screen(&mut *self.display, Screen::for_phase(phase)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use doorlock_hardware::mock::{
        MockDisplay, MockDisplayHandle, MockKeypad, MockKeypadHandle, MockLink,
    };
    use doorlock_hardware::tick::{TickCounter, TickSource};
    use doorlock_protocol::HandshakeConfig;
    use rstest::rstest;

    type TestInterface = InterfaceController<MockLink, MockKeypad, MockDisplay, TickCounter>;

    fn rig() -> (TestInterface, Handshake<MockLink>, MockKeypadHandle, MockDisplayHandle) {
        let (interface_end, access_end) = MockLink::pair();
        let (keypad, keys) = MockKeypad::new();
        let (display, screen) = MockDisplay::new();

        let interface = InterfaceController::new(
            InterfacePeripherals {
                link: interface_end,
                keypad,
                display,
                clock: TickCounter::new(),
            },
            NodeConfig::default(),
        );
        (
            interface,
            Handshake::new(access_end, HandshakeConfig::default()),
            keys,
            screen,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_credential_entry_is_masked() {
        let (mut interface, _peer, keys, screen) = rig();
        keys.send_codes(&[1, 2, 3, 4, 5, 9, b'=']).await.unwrap();

        let credential = interface
            .prompt_credential(Screen::EnterPassword)
            .await
            .unwrap();

        assert_eq!(credential, Credential::new([1, 2, 3, 4, 5]));
        assert_eq!(screen.current(), vec!["PLZ Enter Pass:", "*****"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_verdict_reprompts_silently() {
        let (mut interface, mut peer, keys, screen) = rig();
        keys.enter_credential(&[1, 1, 1, 1, 1]).await.unwrap();
        keys.enter_credential(&[1, 2, 3, 4, 5]).await.unwrap();

        let access = async {
            peer.await_exact(ProtocolCode::ChangePassword).await.unwrap();
            peer.send_code(ProtocolCode::AccessReady).await.unwrap();
            peer.receive_credential().await.unwrap();
            peer.send_byte(0x77).await.unwrap();

            peer.await_exact(ProtocolCode::ChangePassword).await.unwrap();
            peer.send_code(ProtocolCode::AccessReady).await.unwrap();
            peer.receive_credential().await.unwrap();
            peer.send_code(ProtocolCode::LockoutWarning).await.unwrap();
        };

        let ticks = TickSource::new(interface.clock.clone(), Duration::from_secs(1)).spawn();
        let (outcome, ()) =
            tokio::join!(interface.authenticate(AuthPurpose::ChangePassword), access);
        ticks.abort();

        assert_eq!(outcome.unwrap(), AuthOutcome::LockedOut);
        assert!(!screen.has_shown("WRONG PASS!!"));
        let headlines = screen.headlines();
        assert_eq!(
            headlines.iter().filter(|h| h.as_str() == "PLZ enter the").count(),
            2
        );
        assert_eq!(headlines.last().map(String::as_str), Some("+ : Open Door"));
        assert!(screen.has_shown("!!!Warning!!!"));
    }

    #[rstest]
    #[case(AuthPurpose::OpenDoor, 1500)]
    #[case(AuthPurpose::ChangePassword, 2000)]
    #[tokio::test(start_paused = true)]
    async fn test_rejection_hold_depends_on_flow(#[case] purpose: AuthPurpose, #[case] ms: u64) {
        let (mut interface, mut peer, keys, screen) = rig();
        keys.enter_credential(&[1, 1, 1, 1, 1]).await.unwrap();
        keys.enter_credential(&[2, 2, 2, 2, 2]).await.unwrap();

        let access = async {
            peer.await_exact(purpose.command()).await.unwrap();
            peer.send_code(ProtocolCode::AccessReady).await.unwrap();
            peer.receive_credential().await.unwrap();
            peer.send_code(ProtocolCode::Mismatch).await.unwrap();
            let rejected_at = tokio::time::Instant::now();

            peer.await_exact(purpose.command()).await.unwrap();
            let held = rejected_at.elapsed();
            peer.send_code(ProtocolCode::AccessReady).await.unwrap();
            peer.receive_credential().await.unwrap();
            peer.send_code(ProtocolCode::LockoutWarning).await.unwrap();
            held
        };

        let ticks = TickSource::new(interface.clock.clone(), Duration::from_secs(1)).spawn();
        let (outcome, held) = tokio::join!(interface.authenticate(purpose), access);
        ticks.abort();

        assert_eq!(outcome.unwrap(), AuthOutcome::LockedOut);
        assert!(screen.has_shown("WRONG PASS!!"));
        assert!(held >= Duration::from_millis(ms), "{held:?}");
        assert!(held < Duration::from_millis(ms + 100), "{held:?}");
    }
}
