//! Two-node test bench wired over an in-memory link.

#![allow(dead_code)]

use std::time::Duration;

use doorlock_controller::{
    AccessController, AccessPeripherals, InterfaceController, InterfacePeripherals, NodeConfig,
};
use doorlock_hardware::mock::{
    MemoryStore, MemoryStoreHandle, MockBuzzer, MockBuzzerHandle, MockDisplay, MockDisplayHandle,
    MockKeypad, MockKeypadHandle, MockLink, MockMotor, MockMotorHandle,
};
use doorlock_hardware::tick::{TickCounter, TickSource};
use tokio::task::JoinHandle;

pub type Interface = InterfaceController<MockLink, MockKeypad, MockDisplay, TickCounter>;
pub type Access = AccessController<MockLink, MemoryStore, MockMotor, MockBuzzer, TickCounter>;

pub const STORE_OFFSET: u16 = 0x0311;

/// Both nodes plus every test handle.
pub struct Bench {
    pub interface: Interface,
    pub access: Access,
    pub keys: MockKeypadHandle,
    pub screen: MockDisplayHandle,
    pub eeprom: MemoryStoreHandle,
    pub motor: MockMotorHandle,
    pub buzzer: MockBuzzerHandle,
    tick_sources: Vec<JoinHandle<()>>,
}

impl Bench {
    pub fn new() -> Self {
        Self::with_configs(NodeConfig::default(), NodeConfig::default())
    }

    pub fn with_config(config: NodeConfig) -> Self {
        Self::with_configs(config.clone(), config)
    }

    /// Build both nodes, each with its own tick source running.
    pub fn with_configs(interface_config: NodeConfig, access_config: NodeConfig) -> Self {
        let (interface_end, access_end) = MockLink::pair();
        let (keypad, keys) = MockKeypad::new();
        let (display, screen) = MockDisplay::new();
        let (store, eeprom) = MemoryStore::new();
        let (motor, motor_handle) = MockMotor::new();
        let (buzzer, buzzer_handle) = MockBuzzer::new();

        let interface_clock = TickCounter::new();
        let access_clock = TickCounter::new();
        let tick_sources = vec![
            TickSource::new(
                interface_clock.clone(),
                interface_config.timing.tick_period(),
            )
            .spawn(),
            TickSource::new(access_clock.clone(), access_config.timing.tick_period()).spawn(),
        ];

        let interface = InterfaceController::new(
            InterfacePeripherals {
                link: interface_end,
                keypad,
                display,
                clock: interface_clock,
            },
            interface_config,
        );
        let access = AccessController::new(
            AccessPeripherals {
                link: access_end,
                store,
                motor,
                buzzer,
                clock: access_clock,
            },
            access_config,
        );

        Self {
            interface,
            access,
            keys,
            screen,
            eeprom,
            motor: motor_handle,
            buzzer: buzzer_handle,
            tick_sources,
        }
    }

    /// Store a credential as if provisioning had already happened.
    pub fn provisioned(self, credential: &[u8]) -> Self {
        self.eeprom.preload(STORE_OFFSET, credential);
        self
    }

    pub fn stored_credential(&self) -> Vec<u8> {
        self.eeprom.peek(STORE_OFFSET, 5)
    }
}

impl Drop for Bench {
    fn drop(&mut self) {
        for source in &self.tick_sources {
            source.abort();
        }
    }
}

/// Assert that `actual` lies within one tick below `ticks` whole seconds.
pub fn assert_ticks(actual: Duration, ticks: u64) {
    let upper = Duration::from_secs(ticks);
    let lower = Duration::from_secs(ticks.saturating_sub(1));
    assert!(
        actual > lower && actual <= upper,
        "expected about {ticks} ticks, got {actual:?}"
    );
}
