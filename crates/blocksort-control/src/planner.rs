use log::{debug, info};

use blocksort_core::{BlockColor, GridModel, GridPos, INPUT_COL, OUTPUT_COL};

use crate::command::Command;
use crate::request::{DestSelector, MoveRequest, SourceSelector};

/// Move validation failures. Each is reported to the operator verbatim;
/// none mutates the grid and none reaches the command channel.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MoveError {
    #[error("grid is not calibrated")]
    NotCalibrated,
    #[error("no matching source block on the board")]
    SourceNotFound,
    #[error("destination cell does not exist")]
    DestinationNotFound,
    #[error("destination {pos} already holds a {occupant} block")]
    DestinationOccupied { pos: GridPos, occupant: BlockColor },
}

/// A validated move: concrete cells, the block being moved, and the wire
/// command. Applying it performs the optimistic grid update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedMove {
    pub source: GridPos,
    pub dest: GridPos,
    pub color: BlockColor,
    pub command: Command,
}

impl PlannedMove {
    /// Simulate the move on the grid: the occupant transfers from source to
    /// destination. The real board state is only re-confirmed by the next
    /// occupancy scan.
    pub fn apply(&self, grid: &mut GridModel) {
        if let Some(cell) = grid.cell_mut(self.source) {
            cell.occupant = None;
        }
        if let Some(cell) = grid.cell_mut(self.dest) {
            cell.occupant = Some(self.color);
        }
        debug!("applied {} -> {} ({})", self.source, self.dest, self.color);
    }
}

/// Resolve a symbolic request against the grid.
///
/// Validation order: calibration, source, destination existence,
/// destination emptiness. Pure; the grid is only read.
pub fn resolve(request: &MoveRequest, grid: &GridModel) -> Result<PlannedMove, MoveError> {
    if !grid.is_calibrated() {
        return Err(MoveError::NotCalibrated);
    }

    let source = match request.source {
        SourceSelector::Color(color) => grid
            .find_color_in_col(INPUT_COL, color)
            .ok_or(MoveError::SourceNotFound)?,
        SourceSelector::Cell(pos) => grid
            .cell(pos)
            .filter(|c| c.occupant.is_some())
            .ok_or(MoveError::SourceNotFound)?,
    };
    let color = source.occupant.ok_or(MoveError::SourceNotFound)?;

    let dest_pos = match request.dest {
        DestSelector::Row(row) => {
            GridPos::new(row, OUTPUT_COL).ok_or(MoveError::DestinationNotFound)?
        }
        DestSelector::Cell(pos) => pos,
    };
    let dest = grid.cell(dest_pos).ok_or(MoveError::DestinationNotFound)?;
    if let Some(occupant) = dest.occupant {
        return Err(MoveError::DestinationOccupied {
            pos: dest_pos,
            occupant,
        });
    }

    let command = Command::forward(source.row, dest.row).ok_or(MoveError::DestinationNotFound)?;
    info!(
        "{} block: {} -> {} (cmd {})",
        color,
        source.pos(),
        dest_pos,
        command.encode()
    );
    Ok(PlannedMove {
        source: source.pos(),
        dest: dest_pos,
        color,
        command,
    })
}

/// Plan the bulk return of output-column blocks to the input column.
///
/// Occupied output cells are paired with empty input cells in detection
/// order; an empty plan just means there is nothing to move back.
pub fn plan_reset(grid: &GridModel) -> Result<Vec<PlannedMove>, MoveError> {
    if !grid.is_calibrated() {
        return Err(MoveError::NotCalibrated);
    }

    let picks = grid.occupied_in_col(OUTPUT_COL);
    let places = grid.empty_in_col(INPUT_COL);
    let moves: Vec<PlannedMove> = picks
        .iter()
        .zip(places.iter())
        .filter_map(|(pick, place)| {
            let command = Command::reset(pick.row, place.row)?;
            Some(PlannedMove {
                source: pick.pos(),
                dest: place.pos(),
                color: pick.occupant?,
                command,
            })
        })
        .collect();

    info!(
        "reset plan: {} of {} output blocks have an input slot",
        moves.len(),
        picks.len()
    );
    Ok(moves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocksort_core::Cell;
    use nalgebra::Point2;

    fn grid() -> GridModel {
        let mut cells = Vec::new();
        for row in 1..=3u8 {
            for col in 1..=3u8 {
                let pos = GridPos::new(row, col).unwrap();
                cells.push(Cell {
                    center: Point2::new(col as f32 * 50.0, row as f32 * 50.0),
                    area: 400.0,
                    row,
                    col,
                    position_id: pos.position_id(),
                    occupant: None,
                });
            }
        }
        GridModel::new(cells).unwrap()
    }

    fn put(grid: &mut GridModel, row: u8, col: u8, color: BlockColor) {
        grid.cell_mut(GridPos::new(row, col).unwrap())
            .unwrap()
            .occupant = Some(color);
    }

    fn red_to_row(row: u8) -> MoveRequest {
        MoveRequest {
            source: SourceSelector::Color(BlockColor::Red),
            dest: DestSelector::Row(row),
        }
    }

    #[test]
    fn uncalibrated_grid_rejects_every_request() {
        let grid = GridModel::uncalibrated();
        assert_eq!(
            resolve(&red_to_row(2), &grid).unwrap_err(),
            MoveError::NotCalibrated
        );
        assert_eq!(plan_reset(&grid).unwrap_err(), MoveError::NotCalibrated);
    }

    #[test]
    fn resolves_color_to_row_and_encodes_rows() {
        let mut grid = grid();
        put(&mut grid, 1, 1, BlockColor::Red);

        let planned = resolve(&red_to_row(2), &grid).expect("planned");
        assert_eq!(planned.source, GridPos::new(1, 1).unwrap());
        assert_eq!(planned.dest, GridPos::new(2, 3).unwrap());
        // Encoded from rows: pick row 1, place row 2.
        assert_eq!(planned.command.encode(), ((0 << 4) | 1) + 1);
    }

    #[test]
    fn apply_transfers_the_occupant() {
        let mut grid = grid();
        put(&mut grid, 1, 1, BlockColor::Red);
        let planned = resolve(&red_to_row(2), &grid).expect("planned");
        planned.apply(&mut grid);

        assert_eq!(grid.cell_by_id(1).unwrap().occupant, None);
        assert_eq!(grid.cell_by_id(6).unwrap().occupant, Some(BlockColor::Red));
    }

    #[test]
    fn color_search_is_limited_to_the_input_column() {
        let mut grid = grid();
        put(&mut grid, 1, 2, BlockColor::Red); // middle column, not a source
        assert_eq!(
            resolve(&red_to_row(2), &grid).unwrap_err(),
            MoveError::SourceNotFound
        );
    }

    #[test]
    fn explicit_empty_source_cell_is_not_found() {
        let grid = grid();
        let req = MoveRequest {
            source: SourceSelector::Cell(GridPos::new(2, 2).unwrap()),
            dest: DestSelector::Row(1),
        };
        assert_eq!(resolve(&req, &grid).unwrap_err(), MoveError::SourceNotFound);
    }

    #[test]
    fn occupied_destination_is_rejected_without_mutation() {
        let mut grid = grid();
        put(&mut grid, 1, 1, BlockColor::Red);
        put(&mut grid, 2, 3, BlockColor::Blue);

        let before = grid.clone();
        let err = resolve(&red_to_row(2), &grid).unwrap_err();
        assert_eq!(
            err,
            MoveError::DestinationOccupied {
                pos: GridPos::new(2, 3).unwrap(),
                occupant: BlockColor::Blue,
            }
        );
        for (a, b) in grid.cells().iter().zip(before.cells()) {
            assert_eq!(a.occupant, b.occupant);
        }
    }

    #[test]
    fn reset_pairs_output_blocks_with_free_input_cells() {
        let mut grid = grid();
        put(&mut grid, 1, 3, BlockColor::Red);
        put(&mut grid, 3, 3, BlockColor::Green);
        put(&mut grid, 1, 1, BlockColor::Blue); // occupies an input slot

        let moves = plan_reset(&grid).expect("plan");
        assert_eq!(moves.len(), 2);
        // First output block pairs with the first free input cell (row 2).
        assert_eq!(moves[0].source, GridPos::new(1, 3).unwrap());
        assert_eq!(moves[0].dest, GridPos::new(2, 1).unwrap());
        assert_eq!(moves[0].command.encode(), 130);
        assert_eq!(moves[1].source, GridPos::new(3, 3).unwrap());
        assert_eq!(moves[1].dest, GridPos::new(3, 1).unwrap());
        assert_eq!(moves[1].command.encode(), 139);
    }

    #[test]
    fn reset_with_empty_output_column_plans_nothing() {
        let grid = grid();
        assert!(plan_reset(&grid).expect("plan").is_empty());
    }
}
