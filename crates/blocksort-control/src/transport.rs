/// Transport-level failures. Surfaced as warnings by the channel: a
/// missing or broken link degrades to simulation, it never stops the
/// session.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("could not open {device}: {reason}")]
    Open { device: String, reason: String },
    #[error("write failed: {0}")]
    Write(String),
    #[error("drain failed: {0}")]
    Drain(String),
}

/// Byte sink to the motion controller.
///
/// Half-duplex is sufficient: the controller latches a nonzero byte as a
/// one-shot trigger and treats zero as idle; nothing is read back.
pub trait Transport {
    fn write_byte(&mut self, byte: u8) -> Result<(), TransportError>;
    /// Block until the transmit buffer is empty.
    fn drain(&mut self) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        (**self).write_byte(byte)
    }

    fn drain(&mut self) -> Result<(), TransportError> {
        (**self).drain()
    }
}

/// Recording transport for tests.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub writes: Vec<u8>,
    pub drains: usize,
    pub fail_writes: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for MockTransport {
    fn write_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        if self.fail_writes {
            return Err(TransportError::Write("mock failure".into()));
        }
        self.writes.push(byte);
        Ok(())
    }

    fn drain(&mut self) -> Result<(), TransportError> {
        self.drains += 1;
        Ok(())
    }
}
