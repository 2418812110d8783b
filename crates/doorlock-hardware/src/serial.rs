//! UART link through the `serialport` crate.
//!
//! Enabled with the `hardware-serial` feature. Port I/O is blocking, so each
//! byte is moved to tokio's blocking pool.

use std::io::{ErrorKind, Read, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serialport::{DataBits, Parity, SerialPort, StopBits};
use tracing::{info, trace};

use crate::{HardwareError, Result, traits::SerialLink, types::LinkSettings};

/// Read timeout of a single blocking call. Reads retry until a byte arrives.
const POLL_TIMEOUT: Duration = Duration::from_millis(200);

/// Serial port link to the peer node.
pub struct SerialPortLink {
    reader: Arc<Mutex<Box<dyn SerialPort>>>,
    writer: Arc<Mutex<Box<dyn SerialPort>>>,
    name: String,
}

impl std::fmt::Debug for SerialPortLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPortLink").field("name", &self.name).finish()
    }
}

impl SerialPortLink {
    /// Open `path` with the given frame settings.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::ConfigurationError` for unsupported settings
    /// and `HardwareError::CommunicationError` if the port cannot be opened.
    pub fn open(path: &str, settings: LinkSettings) -> Result<Self> {
        let data_bits = match settings.data_bits {
            5 => DataBits::Five,
            6 => DataBits::Six,
            7 => DataBits::Seven,
            8 => DataBits::Eight,
            other => {
                return Err(HardwareError::configuration(format!(
                    "Unsupported data bits: {other}"
                )));
            }
        };
        let stop_bits = match settings.stop_bits {
            1 => StopBits::One,
            2 => StopBits::Two,
            other => {
                return Err(HardwareError::configuration(format!(
                    "Unsupported stop bits: {other}"
                )));
            }
        };
        let parity = if settings.even_parity {
            Parity::Even
        } else {
            Parity::None
        };

        let port = serialport::new(path, settings.baud_rate)
            .data_bits(data_bits)
            .parity(parity)
            .stop_bits(stop_bits)
            .timeout(POLL_TIMEOUT)
            .open()
            .map_err(|e| HardwareError::communication(format!("Cannot open {path}: {e}")))?;

        let writer = port
            .try_clone()
            .map_err(|e| HardwareError::communication(format!("Cannot clone {path}: {e}")))?;

        info!(path, baud = settings.baud_rate, "Serial link open");

        Ok(Self {
            reader: Arc::new(Mutex::new(port)),
            writer: Arc::new(Mutex::new(writer)),
            name: path.to_string(),
        })
    }
}

impl SerialLink for SerialPortLink {
    async fn send_byte(&mut self, byte: u8) -> Result<()> {
        let port = Arc::clone(&self.writer);
        tokio::task::spawn_blocking(move || {
            let mut port = port.lock().unwrap_or_else(PoisonError::into_inner);
            port.write_all(&[byte])?;
            port.flush()
        })
        .await
        .map_err(|e| HardwareError::other(format!("Serial writer task failed: {e}")))??;
        trace!(port = %self.name, "serial tx {byte:#04x}");
        Ok(())
    }

    async fn recv_byte(&mut self) -> Result<u8> {
        let port = Arc::clone(&self.reader);
        let byte = tokio::task::spawn_blocking(move || {
            let mut port = port.lock().unwrap_or_else(PoisonError::into_inner);
            let mut buf = [0u8; 1];
            loop {
                match port.read(&mut buf) {
                    Ok(1) => return Ok(buf[0]),
                    Ok(_) => continue,
                    Err(e) if e.kind() == ErrorKind::TimedOut => continue,
                    Err(e) => return Err(e),
                }
            }
        })
        .await
        .map_err(|e| HardwareError::other(format!("Serial reader task failed: {e}")))??;
        trace!(port = %self.name, "serial rx {byte:#04x}");
        Ok(byte)
    }
}
