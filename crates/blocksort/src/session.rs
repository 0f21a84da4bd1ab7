use std::time::{Duration, Instant};

use log::{info, warn};

use blocksort_control::{
    plan_reset, resolve, ChannelError, Command, CommandChannel, MoveError, MoveRequest,
    ParseRequestError, PlannedMove, Routine, Transport,
};
use blocksort_core::{GridModel, RgbImageView};
use blocksort_vision::{scan_occupancy, CalibrationError, Calibrator, VisionParams};

// Settling pause between consecutive reset moves.
const RESET_MOVE_GAP: Duration = Duration::from_millis(1000);

/// Any failure a session operation can report. All locally recoverable:
/// recalibrate, re-issue the move, or reattach the transport.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error(transparent)]
    Request(#[from] ParseRequestError),
}

/// The single owner of the board state.
///
/// The grid model lives here and nowhere else; the calibrator, the
/// occupancy scanner and the planner all operate on it through the session,
/// so its lifecycle (uncalibrated → calibrated → rebuilt by the next
/// calibration) is explicit. A multi-threaded embedding wraps the whole
/// session in one mutex.
pub struct SortSession<T: Transport> {
    params: VisionParams,
    calibrator: Calibrator,
    grid: GridModel,
    channel: CommandChannel<T>,
    // Set after a simulated move; cleared by the next scan or calibration.
    stale: bool,
}

impl<T: Transport> SortSession<T> {
    pub fn new(params: VisionParams, channel: CommandChannel<T>) -> Self {
        Self {
            calibrator: Calibrator::new(params.clone()),
            params,
            grid: GridModel::uncalibrated(),
            channel,
            stale: false,
        }
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    pub fn is_calibrated(&self) -> bool {
        self.grid.is_calibrated()
    }

    /// True while the occupancy reflects an optimistic move update that the
    /// camera has not yet reconfirmed.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn channel(&self) -> &CommandChannel<T> {
        &self.channel
    }

    /// Rebuild the grid from an empty-board reference frame.
    ///
    /// On failure the previous model (calibrated or not) is kept.
    pub fn calibrate(&mut self, frame: &RgbImageView<'_>) -> Result<(), SessionError> {
        let grid = self.calibrator.calibrate(frame)?;
        self.grid = grid;
        self.stale = false;
        info!("grid calibrated");
        Ok(())
    }

    /// Refresh cell occupancy from a live frame.
    pub fn scan(&mut self, frame: &RgbImageView<'_>) -> Result<(), SessionError> {
        if !self.grid.is_calibrated() {
            return Err(MoveError::NotCalibrated.into());
        }
        scan_occupancy(frame, &mut self.grid, &self.params.scan);
        self.stale = false;
        Ok(())
    }

    /// Resolve and start a move without blocking.
    ///
    /// The command is asserted on the channel and the optimistic grid update
    /// applied; drive [`SortSession::poll`] until the channel goes idle
    /// before sending anything else.
    pub fn execute(
        &mut self,
        request: &MoveRequest,
        now: Instant,
    ) -> Result<PlannedMove, SessionError> {
        let planned = resolve(request, &self.grid)?;
        self.channel.send(planned.command, now)?;
        planned.apply(&mut self.grid);
        self.stale = true;
        Ok(planned)
    }

    /// Resolve a move and block through its dwell.
    pub fn execute_blocking(&mut self, request: &MoveRequest) -> Result<PlannedMove, SessionError> {
        let planned = resolve(request, &self.grid)?;
        self.channel.send_blocking(planned.command)?;
        planned.apply(&mut self.grid);
        self.stale = true;
        Ok(planned)
    }

    /// Move every output-column block back to a free input-column cell,
    /// one dwell at a time.
    pub fn execute_reset_blocking(&mut self) -> Result<Vec<PlannedMove>, SessionError> {
        let moves = plan_reset(&self.grid)?;
        if moves.is_empty() {
            warn!("nothing to reset: output column is empty or input column is full");
            return Ok(moves);
        }
        for (i, planned) in moves.iter().enumerate() {
            info!(
                "reset move {}/{}: {} -> {}",
                i + 1,
                moves.len(),
                planned.source,
                planned.dest
            );
            self.channel.send_blocking(planned.command)?;
            planned.apply(&mut self.grid);
            self.stale = true;
            if i + 1 < moves.len() {
                std::thread::sleep(RESET_MOVE_GAP);
            }
        }
        Ok(moves)
    }

    /// Send the arm home and block through the dwell.
    pub fn home_blocking(&mut self) -> Result<(), SessionError> {
        self.channel.send_blocking(Command::Home)?;
        Ok(())
    }

    /// Trigger a firmware routine and block through the dwell.
    pub fn routine_blocking(&mut self, routine: Routine) -> Result<(), SessionError> {
        self.channel.send_blocking(Command::Routine(routine))?;
        Ok(())
    }

    /// Advance the channel state machine; true when idle.
    pub fn poll(&mut self, now: Instant) -> bool {
        self.channel.poll(now)
    }
}
