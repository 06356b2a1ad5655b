//! Map file loading
//!
//! A map file holds the row and column counts, one line of terrain codes per
//! row, the number of vehicles, and one `<kind> <x> <y> <direction>` line per
//! vehicle:
//!
//! ```text
//! 3 4
//! X|-X
//! X+#X
//! X|-X
//! 2
//! C 1 0 S
//! H 2 0 S
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use thiserror::Error;

use super::grid::Grid;
use super::types::{Direction, Position, Terrain};
use super::vehicle::{SimVehicle, VehicleKind};

/// Problems found while reading a map description
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("map ended early: expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("line {line}: expected {expected}, found {found:?}")]
    InvalidNumber {
        line: usize,
        expected: &'static str,
        found: String,
    },

    #[error("grid has no cells")]
    EmptyGrid,

    #[error("row {row} has {found} cells, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}, column {column}: unknown terrain code {code:?}")]
    UnknownTerrain { row: usize, column: usize, code: char },

    #[error("line {line}: unknown vehicle kind {code:?}")]
    UnknownKind { line: usize, code: String },

    #[error("line {line}: unknown direction {code:?}")]
    UnknownDirection { line: usize, code: String },

    #[error("line {line}: vehicle at ({x}, {y}) is outside the {width}x{height} grid")]
    VehicleOutOfBounds {
        line: usize,
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },
}

/// A parsed map: the terrain grid and the vehicles in spawn order
#[derive(Debug, Clone)]
pub struct LoadedMap {
    pub grid: Grid,
    pub vehicles: Vec<SimVehicle>,
}

/// Small demo city used when no map file is given
pub const DEMO_MAP: &str = "\
12 20
XXXXXXXXXXXXXXXXXXXX
X----.....----------
X-||||+||||||+|||||X
X-|--.-------#----|X
X-|--.-------#----|X
X-+##+#######+####+X
X-|--.---X---#----|X
X-|--.---X---#----|X
X-|||+||||||||||||+X
X----.......------|X
X-------------|||||X
XXXXXXXXXXXXXXXXXXXX
9
C 3 2 E
C 18 6 S
X 10 8 W
T 2 4 N
B 5 3 S
B 2 8 E
A 7 9 E
H 12 4 N
H 15 6 W
";

/// Upper bound on capacity reserved from counts read out of the file
const MAX_PREALLOCATED: usize = 1024;

struct Lines<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
        }
    }

    /// Next line that has content, with its 1-based line number
    fn next_content(&mut self, expected: &'static str) -> Result<(usize, &'a str), MapError> {
        self.lines
            .by_ref()
            .map(|(index, line)| (index + 1, line.trim_end()))
            .find(|(_, line)| !line.trim().is_empty())
            .ok_or(MapError::UnexpectedEnd { expected })
    }
}

fn parse_number<T: std::str::FromStr>(
    token: Option<&str>,
    line: usize,
    expected: &'static str,
) -> Result<T, MapError> {
    let token = token.ok_or(MapError::UnexpectedEnd { expected })?;
    token.parse().map_err(|_| MapError::InvalidNumber {
        line,
        expected,
        found: token.to_string(),
    })
}

/// Parse a map description into a grid and its vehicles
pub fn parse_map(text: &str) -> Result<LoadedMap, MapError> {
    let mut lines = Lines::new(text);

    // The row and column counts may share a line or sit on separate ones
    let (line_no, header) = lines.next_content("row and column counts")?;
    let mut tokens = header.split_whitespace();
    let rows: usize = parse_number(tokens.next(), line_no, "row count")?;
    let columns: usize = match tokens.next() {
        Some(token) => parse_number(Some(token), line_no, "column count")?,
        None => {
            let (line_no, line) = lines.next_content("column count")?;
            parse_number(line.split_whitespace().next(), line_no, "column count")?
        }
    };

    let mut terrain_rows = Vec::with_capacity(rows.min(MAX_PREALLOCATED));
    for row in 0..rows {
        let (_, line) = lines.next_content("terrain row")?;
        let codes: Vec<char> = line.chars().collect();
        if codes.len() != columns {
            return Err(MapError::RowLength {
                row,
                expected: columns,
                found: codes.len(),
            });
        }
        let terrain_row = codes
            .into_iter()
            .enumerate()
            .map(|(column, code)| {
                Terrain::from_code(code).ok_or(MapError::UnknownTerrain { row, column, code })
            })
            .collect::<Result<Vec<_>, _>>()?;
        terrain_rows.push(terrain_row);
    }
    let grid = Grid::from_rows(terrain_rows)?;

    let (line_no, line) = lines.next_content("vehicle count")?;
    let count: usize = parse_number(line.split_whitespace().next(), line_no, "vehicle count")?;

    let mut vehicles = Vec::with_capacity(count.min(MAX_PREALLOCATED));
    for _ in 0..count {
        let (line_no, line) = lines.next_content("vehicle line")?;
        vehicles.push(parse_vehicle(&grid, line_no, line)?);
    }

    Ok(LoadedMap { grid, vehicles })
}

fn parse_vehicle(grid: &Grid, line_no: usize, line: &str) -> Result<SimVehicle, MapError> {
    let mut tokens = line.split_whitespace();

    let kind_token = tokens.next().ok_or(MapError::UnexpectedEnd {
        expected: "vehicle kind",
    })?;
    let kind = single_char(kind_token)
        .and_then(VehicleKind::from_letter)
        .ok_or_else(|| MapError::UnknownKind {
            line: line_no,
            code: kind_token.to_string(),
        })?;

    let x: i32 = parse_number(tokens.next(), line_no, "vehicle x")?;
    let y: i32 = parse_number(tokens.next(), line_no, "vehicle y")?;

    let direction_token = tokens.next().ok_or(MapError::UnexpectedEnd {
        expected: "vehicle direction",
    })?;
    let direction = single_char(direction_token)
        .and_then(Direction::from_letter)
        .ok_or_else(|| MapError::UnknownDirection {
            line: line_no,
            code: direction_token.to_string(),
        })?;

    let position = Position::new(x, y);
    if !grid.contains(position) {
        return Err(MapError::VehicleOutOfBounds {
            line: line_no,
            x,
            y,
            width: grid.width(),
            height: grid.height(),
        });
    }

    Ok(SimVehicle::new(kind, position, direction))
}

fn single_char(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Read and parse a map file from disk
pub fn load_map(path: impl AsRef<Path>) -> Result<LoadedMap> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Could not read city map file {}", path.display()))?;
    let map = parse_map(&text)
        .with_context(|| format!("Invalid city map file {}", path.display()))?;
    info!(
        "Loaded {}x{} map with {} vehicles from {}",
        map.grid.width(),
        map.grid.height(),
        map.vehicles.len(),
        path.display()
    );
    Ok(map)
}
