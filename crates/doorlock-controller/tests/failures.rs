//! Failure paths: silent peer, failing store and an undetected corrupted byte.

mod common;

use std::time::Duration;

use common::Bench;
use doorlock_controller::{
    AuthOutcome, ControllerError, InterfaceController, InterfacePeripherals, NodeConfig,
};
use doorlock_core::constants::MISMATCH;
use doorlock_hardware::mock::{MockDisplay, MockKeypad, MockLink};
use doorlock_hardware::tick::{TickCounter, TickSource};
use doorlock_protocol::{AuthPurpose, Handshake, HandshakeConfig, ProtocolCode, ProtocolError};

fn with_stall_timeout(ms: u64) -> NodeConfig {
    NodeConfig {
        stall_timeout_ms: Some(ms),
        ..NodeConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_access_boot_stalls_without_interface() {
    let mut bench = Bench::with_config(with_stall_timeout(5000));

    let start = tokio::time::Instant::now();
    let err = bench.access.boot().await.unwrap_err();

    assert!(err.is_stall());
    assert!(err.is_fatal());
    assert_eq!(start.elapsed(), Duration::from_secs(5));
    assert!(matches!(
        err,
        ControllerError::Protocol(ProtocolError::Stall { ref awaiting, .. })
            if awaiting == "INTERFACE_READY(0x10)"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_interface_stalls_when_access_never_answers() {
    let mut bench = Bench::with_config(with_stall_timeout(2000));
    bench.keys.enter_credential(b"12345").await.unwrap();
    bench.keys.enter_credential(b"12345").await.unwrap();

    let err = bench.interface.provision().await.unwrap_err();

    assert!(err.is_stall());
    assert!(err.to_string().contains("ACCESS_READY"), "{err}");
}

#[tokio::test(start_paused = true)]
async fn test_without_timeout_a_late_peer_is_still_served() {
    let mut bench = Bench::new();
    bench.keys.enter_credential(b"12345").await.unwrap();
    bench.keys.enter_credential(b"12345").await.unwrap();

    let late_access = async {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        bench.access.provision().await
    };
    let (interface, access) = tokio::join!(bench.interface.provision(), late_access);

    assert_eq!(interface.unwrap(), 1);
    assert_eq!(access.unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_idle_menu_and_slow_typing_outlast_stall_timeout() {
    let mut bench = Bench::with_config(with_stall_timeout(5000)).provisioned(b"12345");

    let user = async {
        tokio::time::sleep(Duration::from_secs(10)).await;
        bench.keys.send_codes(b"+").await.unwrap();
        tokio::time::sleep(Duration::from_secs(8)).await;
        bench.keys.enter_credential(b"11111").await.unwrap();
        tokio::time::sleep(Duration::from_secs(8)).await;
        bench.keys.enter_credential(b"12345").await.unwrap();
    };
    let (interface, access, ()) = tokio::join!(
        bench.interface.handle_menu_key(),
        bench.access.serve_once(),
        user
    );

    assert_eq!(interface.unwrap(), Some(AuthOutcome::Granted));
    assert_eq!(access.unwrap(), Some(AuthOutcome::Granted));
    assert_eq!(bench.access.last_session().unwrap().attempts(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_slow_provisioning_entry_outlasts_stall_timeout() {
    let mut bench = Bench::with_config(with_stall_timeout(5000));

    let user = async {
        tokio::time::sleep(Duration::from_secs(8)).await;
        bench.keys.enter_credential(b"12345").await.unwrap();
        tokio::time::sleep(Duration::from_secs(8)).await;
        bench.keys.enter_credential(b"12345").await.unwrap();
    };
    let (interface, access, ()) =
        tokio::join!(bench.interface.provision(), bench.access.provision(), user);

    assert_eq!(interface.unwrap(), 1);
    assert_eq!(access.unwrap(), 1);
    assert_eq!(bench.stored_credential(), b"12345".to_vec());
}

#[tokio::test(start_paused = true)]
async fn test_store_write_failure_is_fatal() {
    let mut bench = Bench::new();
    bench.eeprom.set_fail_writes(true);
    bench.keys.enter_credential(b"12345").await.unwrap();
    bench.keys.enter_credential(b"12345").await.unwrap();

    let (interface, access) = tokio::join!(bench.interface.provision(), bench.access.provision());

    // The status goes out before the write, so the Interface believes it
    interface.unwrap();
    let err = access.unwrap_err();
    assert!(err.is_store_failure());
    assert!(err.is_fatal());
}

#[tokio::test(start_paused = true)]
async fn test_store_read_failure_aborts_authentication() {
    let mut bench = Bench::with_config(with_stall_timeout(10_000)).provisioned(b"12345");
    bench.eeprom.set_fail_reads(true);
    bench.keys.send_codes(b"+").await.unwrap();
    bench.keys.enter_credential(b"12345").await.unwrap();

    let (interface, access) = tokio::join!(
        bench.interface.handle_menu_key(),
        bench.access.serve_once()
    );

    assert!(access.unwrap_err().is_store_failure());
    // No verdict ever arrives
    assert!(interface.unwrap_err().is_stall());
}

#[tokio::test(start_paused = true)]
async fn test_corrupted_verdict_is_not_detected() {
    // A noisy line turns the Access node's MISMATCH into MATCH
    let (interface_end, access_end) = MockLink::pair();
    let (keypad, keys) = MockKeypad::new();
    let (display, screen) = MockDisplay::new();
    let clock = TickCounter::new();
    let ticks = TickSource::new(clock.clone(), Duration::from_secs(1)).spawn();
    let mut interface = InterfaceController::new(
        InterfacePeripherals {
            link: interface_end,
            keypad,
            display,
            clock,
        },
        NodeConfig::default(),
    );
    let mut peer = Handshake::new(access_end, HandshakeConfig::default());
    keys.enter_credential(b"00000").await.unwrap();

    let access = async {
        peer.await_exact(ProtocolCode::OpenDoor).await.unwrap();
        peer.send_code(ProtocolCode::AccessReady).await.unwrap();
        peer.receive_credential().await.unwrap();
        peer.send_byte(MISMATCH ^ 0x55).await.unwrap();
    };
    let (outcome, ()) =
        tokio::join!(interface.authenticate(AuthPurpose::OpenDoor), access);
    ticks.abort();

    assert_eq!(outcome.unwrap(), AuthOutcome::Granted);
    assert!(screen.has_shown("Unlocking!"));
}
