use std::io::Write;
use std::time::Duration;

use log::info;
use serialport::{DataBits, SerialPort};

use crate::transport::{Transport, TransportError};

// Fixed by the controller firmware.
const BAUD: u32 = 9600;
const WRITE_TIMEOUT: Duration = Duration::from_millis(100);

/// Serial link to the motion controller: 9600 baud, 8 data bits, bounded
/// blocking writes.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    pub fn open(device: &str) -> Result<Self, TransportError> {
        let port = serialport::new(device, BAUD)
            .data_bits(DataBits::Eight)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(|e| TransportError::Open {
                device: device.to_string(),
                reason: e.to_string(),
            })?;
        info!("serial port {device} open at {BAUD} baud");
        Ok(Self { port })
    }
}

impl Transport for SerialTransport {
    fn write_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        self.port
            .write_all(&[byte])
            .map_err(|e| TransportError::Write(e.to_string()))
    }

    fn drain(&mut self) -> Result<(), TransportError> {
        self.port
            .flush()
            .map_err(|e| TransportError::Drain(e.to_string()))
    }
}
