use serde::{Deserialize, Serialize};

/// The idle/release sentinel. Never a valid command, which is why the
/// forward encoding carries a +1 offset.
pub const RELEASE_BYTE: u8 = 0;

// Reset moves use a different physical motion profile than forward moves
// and have their own fixed codes, indexed by (pick_row-1, place_row-1).
const RESET_CODES: [[u8; 3]; 3] = [[129, 130, 131], [133, 134, 135], [137, 138, 139]];

/// Single-purpose controller routines. Ad hoc firmware constants; they are
/// an enumerated table, not an encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Routine {
    NoughtsAndCrosses,
    Podium,
    StackBlocks,
    /// Older firmware's home byte; the grid pipeline uses [`Command::Home`].
    HomePosture,
    Stop,
    Resume,
}

impl Routine {
    pub fn code(&self) -> u8 {
        match self {
            Routine::NoughtsAndCrosses => 1,
            Routine::Podium => 2,
            Routine::StackBlocks => 4,
            Routine::HomePosture => 8,
            Routine::Stop => 16,
            Routine::Resume => 32,
        }
    }

    pub fn from_name(name: &str) -> Option<Routine> {
        match name {
            "noughts" => Some(Routine::NoughtsAndCrosses),
            "podium" => Some(Routine::Podium),
            "stack" => Some(Routine::StackBlocks),
            "posture" => Some(Routine::HomePosture),
            "stop" => Some(Routine::Stop),
            "resume" => Some(Routine::Resume),
            _ => None,
        }
    }
}

/// Dwell class of a command; physical travel times differ per class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveClass {
    Forward,
    Reset,
    Home,
    Routine,
}

/// One controller command, bit-exact against the firmware.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Pick from the input column, place in the output column.
    Forward { pick_row: u8, place_row: u8 },
    /// Output-column → input-column return move, fixed code table.
    Reset { pick_row: u8, place_row: u8 },
    /// Return the arm to its home position.
    Home,
    Routine(Routine),
}

impl Command {
    /// Forward move; indices are 1-based and must fit the 4-bit packing.
    pub fn forward(pick_row: u8, place_row: u8) -> Option<Command> {
        if (1..=9).contains(&pick_row) && (1..=9).contains(&place_row) {
            Some(Command::Forward {
                pick_row,
                place_row,
            })
        } else {
            None
        }
    }

    /// Reset move; rows limited to the 3×3 board.
    pub fn reset(pick_row: u8, place_row: u8) -> Option<Command> {
        if (1..=3).contains(&pick_row) && (1..=3).contains(&place_row) {
            Some(Command::Reset {
                pick_row,
                place_row,
            })
        } else {
            None
        }
    }

    pub fn class(&self) -> MoveClass {
        match self {
            Command::Forward { .. } => MoveClass::Forward,
            Command::Reset { .. } => MoveClass::Reset,
            Command::Home => MoveClass::Home,
            Command::Routine(_) => MoveClass::Routine,
        }
    }

    /// The wire byte. Nonzero for every command.
    pub fn encode(&self) -> u8 {
        match *self {
            Command::Forward {
                pick_row,
                place_row,
            } => (((pick_row - 1) << 4) | (place_row - 1)) + 1,
            Command::Reset {
                pick_row,
                place_row,
            } => RESET_CODES[(pick_row - 1) as usize][(place_row - 1) as usize],
            Command::Home => 64,
            Command::Routine(r) => r.code(),
        }
    }

    /// Invert the forward packing: `byte - 1` splits into the two 4-bit
    /// indices. Diagnostic; does not distinguish the table-coded commands.
    pub fn decode_forward(byte: u8) -> Option<(u8, u8)> {
        if byte == RELEASE_BYTE {
            return None;
        }
        let packed = byte - 1;
        let pick = (packed >> 4) + 1;
        let place = (packed & 0x0f) + 1;
        if (1..=9).contains(&pick) && (1..=9).contains(&place) {
            Some((pick, place))
        } else {
            None
        }
    }
}
