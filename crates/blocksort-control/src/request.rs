use blocksort_core::{BlockColor, GridPos};

/// Where the block comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceSelector {
    /// Whichever input-column cell currently holds this color.
    Color(BlockColor),
    /// An explicit cell.
    Cell(GridPos),
}

/// Where the block goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DestSelector {
    /// This row of the output column.
    Row(u8),
    /// An explicit cell.
    Cell(GridPos),
}

/// A symbolic operator request, consumed by the planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveRequest {
    pub source: SourceSelector,
    pub dest: DestSelector,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseRequestError {
    #[error("empty move request")]
    Empty,
    #[error("unknown color key '{0}' (use r, b or g)")]
    UnknownColor(char),
    #[error("row must be 1-3, got '{0}'")]
    BadRow(char),
    #[error("cell reference must be two digits in 1-3, got {0:?}")]
    BadCell(String),
    #[error("unrecognized request {0:?} (expected e.g. \"r2\" or \"12>33\")")]
    Unrecognized(String),
}

/// Parse the canonical request forms.
///
/// Two shapes are accepted:
/// - `r2`: color key (`r`/`b`/`g`) followed by a destination row;
/// - `12>33`: explicit `<row><col>` cell pair, source then destination.
impl std::str::FromStr for MoveRequest {
    type Err = ParseRequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s.is_empty() {
            return Err(ParseRequestError::Empty);
        }

        if let Some((src, dst)) = s.split_once('>') {
            return Ok(MoveRequest {
                source: SourceSelector::Cell(parse_cell(src)?),
                dest: DestSelector::Cell(parse_cell(dst)?),
            });
        }

        let mut chars = s.chars();
        let color_key = chars.next().ok_or(ParseRequestError::Empty)?;
        let color = match color_key {
            'r' => BlockColor::Red,
            'b' => BlockColor::Blue,
            'g' => BlockColor::Green,
            other => return Err(ParseRequestError::UnknownColor(other)),
        };
        let row_key = chars
            .next()
            .ok_or_else(|| ParseRequestError::Unrecognized(s.clone()))?;
        if chars.next().is_some() {
            return Err(ParseRequestError::Unrecognized(s.clone()));
        }
        let row = row_key
            .to_digit(10)
            .filter(|r| (1..=3).contains(r))
            .ok_or(ParseRequestError::BadRow(row_key))? as u8;

        Ok(MoveRequest {
            source: SourceSelector::Color(color),
            dest: DestSelector::Row(row),
        })
    }
}

fn parse_cell(s: &str) -> Result<GridPos, ParseRequestError> {
    let s = s.trim();
    let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 2 || s.chars().count() != 2 {
        return Err(ParseRequestError::BadCell(s.to_string()));
    }
    GridPos::new(digits[0] as u8, digits[1] as u8)
        .ok_or_else(|| ParseRequestError::BadCell(s.to_string()))
}
