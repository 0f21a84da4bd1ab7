//! Move planning and the controller wire protocol.
//!
//! The motion controller speaks a one-byte protocol: the host asserts a
//! nonzero command byte, holds it for the duration of the physical motion
//! (the dwell), then writes a zero to return the line to idle. This crate
//! owns the command table, the request → command resolution against the
//! grid model, and the assert/dwell/release state machine. The byte sink
//! itself is behind [`Transport`]; enable the `serial` feature for the
//! serialport-backed implementation.

mod channel;
mod command;
mod planner;
mod request;
#[cfg(feature = "serial")]
mod serial;
mod transport;

pub use channel::{ChannelError, ChannelState, CommandChannel, DwellConfig};
pub use command::{Command, MoveClass, Routine, RELEASE_BYTE};
pub use planner::{plan_reset, resolve, MoveError, PlannedMove};
pub use request::{DestSelector, MoveRequest, ParseRequestError, SourceSelector};
#[cfg(feature = "serial")]
pub use serial::SerialTransport;
pub use transport::{MockTransport, Transport, TransportError};
