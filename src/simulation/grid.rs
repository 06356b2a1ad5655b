//! Terrain grid and neighborhood lookups

use super::map::MapError;
use super::types::{Direction, Position, Terrain};

/// Rectangular terrain grid, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Terrain>,
    width: usize,
    height: usize,
}

impl Grid {
    /// Build a grid from rows of terrain
    ///
    /// Every row must have the same, non-zero length.
    pub fn from_rows(rows: Vec<Vec<Terrain>>) -> Result<Self, MapError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(MapError::EmptyGrid);
        }

        let mut cells = Vec::with_capacity(width * height);
        for (row, terrain_row) in rows.into_iter().enumerate() {
            if terrain_row.len() != width {
                return Err(MapError::RowLength {
                    row,
                    expected: width,
                    found: terrain_row.len(),
                });
            }
            cells.extend(terrain_row);
        }

        Ok(Self {
            cells,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as usize) < self.width
            && (position.y as usize) < self.height
    }

    /// Terrain at `position`, or `None` when it lies off the grid
    pub fn terrain_at(&self, position: Position) -> Option<Terrain> {
        if !self.contains(position) {
            return None;
        }
        let index = position.y as usize * self.width + position.x as usize;
        self.cells.get(index).copied()
    }

    /// Terrain of every in-bounds cell adjacent to `position`
    pub fn neighbors(&self, position: Position) -> Neighborhood {
        let mut neighborhood = Neighborhood::default();
        for direction in Direction::ALL {
            neighborhood.cells[direction.index()] = self.terrain_at(position.step(direction));
        }
        neighborhood
    }

    /// Iterate over the rows of the grid
    pub fn rows(&self) -> impl Iterator<Item = &[Terrain]> {
        self.cells.chunks(self.width)
    }
}

/// Terrain found in each compass direction around a cell
///
/// Directions pointing off the grid have no entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Neighborhood {
    cells: [Option<Terrain>; 4],
}

impl Neighborhood {
    /// Build a neighborhood from explicit entries
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Direction, Terrain)>,
    {
        let mut neighborhood = Self::default();
        for (direction, terrain) in entries {
            neighborhood.cells[direction.index()] = Some(terrain);
        }
        neighborhood
    }

    pub fn get(&self, direction: Direction) -> Option<Terrain> {
        self.cells[direction.index()]
    }

    /// Whether the neighbor in `direction` exists and satisfies `accepts`
    pub fn is(&self, direction: Direction, accepts: impl Fn(Terrain) -> bool) -> bool {
        self.get(direction).is_some_and(accepts)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, Terrain)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|direction| self.get(direction).map(|terrain| (direction, terrain)))
    }
}
