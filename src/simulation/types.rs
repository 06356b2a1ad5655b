//! Core types for the grid traffic simulation
//!
//! Plain value types shared by the grid, the vehicles and the world.

use rand::Rng;

/// Number of ticks between two traffic light changes
pub const LIGHT_CHANGE_TICKS: u64 = 15;

/// Kind of terrain occupying a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terrain {
    Grass,
    Street,
    /// A street cell controlled by the traffic light
    Light,
    Wall,
    Trail,
    Crosswalk,
}

impl Terrain {
    pub const ALL: [Terrain; 6] = [
        Terrain::Grass,
        Terrain::Street,
        Terrain::Light,
        Terrain::Wall,
        Terrain::Trail,
        Terrain::Crosswalk,
    ];

    /// Character used for this terrain in map files
    pub fn code(self) -> char {
        match self {
            Terrain::Grass => '-',
            Terrain::Street => '|',
            Terrain::Light => '+',
            Terrain::Wall => 'X',
            Terrain::Trail => '.',
            Terrain::Crosswalk => '#',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|terrain| terrain.code() == code)
    }

    /// Street-like surfaces that motor vehicles steer toward
    pub fn is_road(self) -> bool {
        matches!(self, Terrain::Street | Terrain::Light | Terrain::Crosswalk)
    }
}

/// A compass direction on the grid
///
/// North points toward decreasing `y`, west toward decreasing `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    West,
    South,
    East,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::West,
        Direction::South,
        Direction::East,
    ];

    pub fn letter(self) -> char {
        match self {
            Direction::North => 'N',
            Direction::West => 'W',
            Direction::South => 'S',
            Direction::East => 'E',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|dir| dir.letter() == letter)
    }

    /// Direction after a quarter turn counter-clockwise
    pub fn left(self) -> Self {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
        }
    }

    /// Direction after a quarter turn clockwise
    pub fn right(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    pub fn reverse(self) -> Self {
        self.left().left()
    }

    pub fn dx(self) -> i32 {
        match self {
            Direction::West => -1,
            Direction::East => 1,
            Direction::North | Direction::South => 0,
        }
    }

    pub fn dy(self) -> i32 {
        match self {
            Direction::North => -1,
            Direction::South => 1,
            Direction::West | Direction::East => 0,
        }
    }

    /// Position of this direction within `ALL`
    pub(crate) fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::West => 1,
            Direction::South => 2,
            Direction::East => 3,
        }
    }

    /// Pick a direction uniformly at random
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// A cell coordinate on the grid (column `x`, row `y`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighboring cell one step in `direction`
    pub fn step(&self, direction: Direction) -> Position {
        Position {
            x: self.x.saturating_add(direction.dx()),
            y: self.y.saturating_add(direction.dy()),
        }
    }
}
