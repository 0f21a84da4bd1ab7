//! High-level facade for the `blocksort-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the underlying pipeline crates
//! - [`SortSession`], the owning controller that ties calibration,
//!   occupancy scanning, move planning and the command channel together
//! - (feature-gated) helpers that run the pipeline directly on
//!   `image::RgbImage` frames
//!
//! ## Quickstart
//!
//! ```no_run
//! use blocksort::control::{CommandChannel, DwellConfig, MockTransport};
//! use blocksort::detect;
//! use blocksort::vision::VisionParams;
//! use blocksort::SortSession;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let channel = CommandChannel::new(Some(MockTransport::new()), DwellConfig::default());
//! let mut session = SortSession::new(VisionParams::default(), channel);
//!
//! let reference = detect::load_rgb("empty_board.png")?;
//! session.calibrate(&detect::rgb_view(&reference))?;
//!
//! let live = detect::load_rgb("live.png")?;
//! session.scan(&detect::rgb_view(&live))?;
//!
//! session.execute_blocking(&"r2".parse()?)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - [`core`](blocksort_core): image views, color classification, the grid model.
//! - [`vision`](blocksort_vision): board/cell detection, calibration, occupancy.
//! - [`control`](blocksort_control): command table, move planner, pulse channel.
//! - [`detect`] (feature `image`): end-to-end helpers from `image::RgbImage`.

pub use blocksort_control as control;
pub use blocksort_core as core;
pub use blocksort_vision as vision;

pub use blocksort_control::{Command, MoveRequest, PlannedMove};
pub use blocksort_core::{BlockColor, Cell, GridModel, GridPos};
pub use blocksort_vision::VisionParams;

mod session;
pub use session::{SessionError, SortSession};

#[cfg(feature = "image")]
pub mod detect;
