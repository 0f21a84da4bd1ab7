use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::command::{Command, MoveClass, RELEASE_BYTE};
use crate::transport::Transport;

/// Dwell durations per move class, in milliseconds.
///
/// The dwell is how long the command byte stays asserted before the zero
/// release. It matches the physical travel time of the move class, which
/// is why reset moves (full column traversals) hold much longer than
/// single-cell forward moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DwellConfig {
    pub forward_ms: u64,
    pub reset_ms: u64,
    pub home_ms: u64,
    pub routine_ms: u64,
}

impl Default for DwellConfig {
    fn default() -> Self {
        Self {
            forward_ms: 2000,
            reset_ms: 8000,
            home_ms: 2000,
            routine_ms: 2000,
        }
    }
}

impl DwellConfig {
    pub fn dwell_for(&self, class: MoveClass) -> Duration {
        let ms = match class {
            MoveClass::Forward => self.forward_ms,
            MoveClass::Reset => self.reset_ms,
            MoveClass::Home => self.home_ms,
            MoveClass::Routine => self.routine_ms,
        };
        Duration::from_millis(ms)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ChannelError {
    #[error("a command is already in flight")]
    Busy,
}

/// Channel protocol state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelState {
    Idle,
    /// Command byte written; waiting out the dwell.
    Asserted { deadline: Instant },
    /// Dwell elapsed; the zero byte is being written and drained.
    Releasing,
}

/// The assert/dwell/release pulse driver.
///
/// One command in flight at a time. The state machine is clocked by
/// [`CommandChannel::poll`] with an explicit `now`, so an embedding loop can
/// keep rendering while a move is under way; [`CommandChannel::send_blocking`]
/// wraps send+poll with a sleep for synchronous callers.
///
/// Constructed without a transport the channel runs in simulation mode:
/// state transitions happen, nothing is written. Transport errors are
/// logged and otherwise ignored; grid logic must keep working with a
/// dead link.
pub struct CommandChannel<T: Transport> {
    transport: Option<T>,
    dwell: DwellConfig,
    state: ChannelState,
}

impl<T: Transport> CommandChannel<T> {
    pub fn new(transport: Option<T>, dwell: DwellConfig) -> Self {
        if transport.is_none() {
            warn!("no transport attached; commands run in simulation");
        }
        Self {
            transport,
            dwell,
            state: ChannelState::Idle,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, ChannelState::Idle)
    }

    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    /// Borrow the transport, e.g. to inspect a mock in tests.
    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    /// Assert a command byte and start its dwell.
    pub fn send(&mut self, command: Command, now: Instant) -> Result<(), ChannelError> {
        if !self.is_idle() {
            return Err(ChannelError::Busy);
        }
        let byte = command.encode();
        debug!("assert {byte:#04x} ({:?})", command.class());
        self.write(byte);
        self.state = ChannelState::Asserted {
            deadline: now + self.dwell.dwell_for(command.class()),
        };
        Ok(())
    }

    /// Advance the state machine. Returns true when the channel is idle.
    ///
    /// Past the dwell deadline this writes the zero release and drains the
    /// transmit buffer before reporting idle.
    pub fn poll(&mut self, now: Instant) -> bool {
        if let ChannelState::Asserted { deadline } = self.state {
            if now >= deadline {
                self.state = ChannelState::Releasing;
                self.write(RELEASE_BYTE);
                if let Some(t) = self.transport.as_mut() {
                    if let Err(err) = t.drain() {
                        warn!("transport drain failed: {err}");
                    }
                }
                debug!("released");
                self.state = ChannelState::Idle;
            }
        }
        self.is_idle()
    }

    /// Send and block through the dwell and release.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip(self)))]
    pub fn send_blocking(&mut self, command: Command) -> Result<(), ChannelError> {
        let now = Instant::now();
        self.send(command, now)?;
        if let ChannelState::Asserted { deadline } = self.state {
            let remaining = deadline.saturating_duration_since(Instant::now());
            std::thread::sleep(remaining);
        }
        self.poll(Instant::now());
        Ok(())
    }

    fn write(&mut self, byte: u8) {
        if let Some(t) = self.transport.as_mut() {
            if let Err(err) = t.write_byte(byte) {
                warn!("transport write failed: {err}");
            }
        }
    }
}
