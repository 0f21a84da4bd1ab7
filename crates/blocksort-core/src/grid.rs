use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Column blocks are picked from.
pub const INPUT_COL: u8 = 1;
/// Column blocks are placed into.
pub const OUTPUT_COL: u8 = 3;

/// Color of a block occupying a cell. Absence of a block is `None` at the
/// `Option<BlockColor>` level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockColor {
    Red,
    Blue,
    Green,
}

impl BlockColor {
    pub fn name(&self) -> &'static str {
        match self {
            BlockColor::Red => "Red",
            BlockColor::Blue => "Blue",
            BlockColor::Green => "Green",
        }
    }
}

impl std::fmt::Display for BlockColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Logical board coordinate, row and column both in [1, 3].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub row: u8,
    pub col: u8,
}

impl GridPos {
    /// Build a position, rejecting coordinates outside the 3×3 board.
    pub fn new(row: u8, col: u8) -> Option<GridPos> {
        if (1..=3).contains(&row) && (1..=3).contains(&col) {
            Some(GridPos { row, col })
        } else {
            None
        }
    }

    /// The fixed (row, col) → id bijection:
    /// (1,1)→1, (1,2)→2, (1,3)→3, (2,1)→4, …, (3,3)→9.
    #[inline]
    pub fn position_id(&self) -> u8 {
        (self.row - 1) * 3 + self.col
    }

    pub fn from_position_id(id: u8) -> Option<GridPos> {
        if !(1..=9).contains(&id) {
            return None;
        }
        Some(GridPos {
            row: (id - 1) / 3 + 1,
            col: (id - 1) % 3 + 1,
        })
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}C{}", self.row, self.col)
    }
}

/// Direction of column numbering after the row-major calibration sort.
///
/// With the reference rig the robot's input column appears on the right of
/// the camera frame, so columns are numbered right-to-left
/// ([`ColumnLayout::MirroredCols`]). A rig with the camera on the other side
/// of the board uses [`ColumnLayout::AscendingCols`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnLayout {
    /// `col = 3 - index % 3`: leftmost detected cell is column 3.
    #[default]
    MirroredCols,
    /// `col = index % 3 + 1`: leftmost detected cell is column 1.
    AscendingCols,
}

impl ColumnLayout {
    /// Column for the i-th cell of a row-major sorted sequence.
    #[inline]
    pub fn col_for_index(&self, index: usize) -> u8 {
        match self {
            ColumnLayout::MirroredCols => 3 - (index % 3) as u8,
            ColumnLayout::AscendingCols => (index % 3) as u8 + 1,
        }
    }
}

/// One of the 9 board positions.
///
/// `center` and `area` are fixed by calibration; `occupant` is volatile and
/// rewritten by every occupancy scan and by simulated moves.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    pub center: Point2<f32>,
    /// Pixel area of the detected region at calibration time. Diagnostic.
    pub area: f64,
    pub row: u8,
    pub col: u8,
    pub position_id: u8,
    pub occupant: Option<BlockColor>,
}

impl Cell {
    #[inline]
    pub fn pos(&self) -> GridPos {
        GridPos {
            row: self.row,
            col: self.col,
        }
    }
}

/// Errors from grid model construction.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum GridModelError {
    #[error("expected exactly 9 cells, got {0}")]
    CellCount(usize),
    #[error("cell coordinates R{row}C{col} (id {id}) are outside the board")]
    InvalidPosition { row: u8, col: u8, id: u8 },
    #[error("duplicate cell at position id {0}")]
    DuplicatePosition(u8),
}

/// The calibrated 3×3 board: exactly 9 cells in bijection with
/// {1,2,3}×{1,2,3}, or uncalibrated.
///
/// A model starts uncalibrated and is only ever replaced wholesale by a
/// successful calibration; there is no partial update path.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GridModel {
    cells: Vec<Cell>,
}

impl GridModel {
    /// Fresh uncalibrated model.
    pub fn uncalibrated() -> Self {
        Self::default()
    }

    /// Build a calibrated model, checking the 9-cell bijection invariant.
    pub fn new(cells: Vec<Cell>) -> Result<Self, GridModelError> {
        if cells.len() != 9 {
            return Err(GridModelError::CellCount(cells.len()));
        }
        let mut seen = [false; 9];
        for cell in &cells {
            let id = cell.position_id;
            if !(1..=9).contains(&id) || GridPos::new(cell.row, cell.col).is_none() {
                return Err(GridModelError::InvalidPosition {
                    row: cell.row,
                    col: cell.col,
                    id,
                });
            }
            let slot = &mut seen[(id - 1) as usize];
            if *slot {
                return Err(GridModelError::DuplicatePosition(id));
            }
            *slot = true;
        }
        Ok(Self { cells })
    }

    #[inline]
    pub fn is_calibrated(&self) -> bool {
        self.cells.len() == 9
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn cell(&self, pos: GridPos) -> Option<&Cell> {
        self.cells.iter().find(|c| c.pos() == pos)
    }

    pub fn cell_by_id(&self, position_id: u8) -> Option<&Cell> {
        self.cells.iter().find(|c| c.position_id == position_id)
    }

    pub fn cell_mut(&mut self, pos: GridPos) -> Option<&mut Cell> {
        self.cells.iter_mut().find(|c| c.pos() == pos)
    }

    pub fn cell_by_id_mut(&mut self, position_id: u8) -> Option<&mut Cell> {
        self.cells.iter_mut().find(|c| c.position_id == position_id)
    }

    /// First cell in `col` holding a block of `color`, in detection order.
    pub fn find_color_in_col(&self, col: u8, color: BlockColor) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|c| c.col == col && c.occupant == Some(color))
    }

    /// Occupied cells of `col`, in detection order.
    pub fn occupied_in_col(&self, col: u8) -> Vec<&Cell> {
        self.cells
            .iter()
            .filter(|c| c.col == col && c.occupant.is_some())
            .collect()
    }

    /// Empty cells of `col`, in detection order.
    pub fn empty_in_col(&self, col: u8) -> Vec<&Cell> {
        self.cells
            .iter()
            .filter(|c| c.col == col && c.occupant.is_none())
            .collect()
    }
}
