//! Vehicle behavior for the grid traffic simulation
//!
//! Every vehicle shares the same stored state. What differs between kinds
//! (where it may drive, how it steers, what kills it, how long it stays
//! dead) is decided by matching on its [`VehicleKind`].

use std::fmt;

use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;

use super::grid::Neighborhood;
use super::light::TrafficLight;
use super::types::{Direction, Position, Terrain};

/// Red-light refusals a taxi sits through at a crosswalk before forcing its way across
pub const TAXI_CROSSWALK_PATIENCE: u32 = 3;

/// Behavioral category of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleKind {
    Car,
    Truck,
    Taxi,
    Bicycle,
    /// All-terrain vehicle
    Atv,
    /// Pedestrian
    Human,
}

impl VehicleKind {
    pub const ALL: [VehicleKind; 6] = [
        VehicleKind::Car,
        VehicleKind::Truck,
        VehicleKind::Taxi,
        VehicleKind::Bicycle,
        VehicleKind::Atv,
        VehicleKind::Human,
    ];

    /// Letter used for this kind in map files
    pub fn letter(self) -> char {
        match self {
            VehicleKind::Car => 'C',
            VehicleKind::Truck => 'T',
            VehicleKind::Taxi => 'X',
            VehicleKind::Bicycle => 'B',
            VehicleKind::Atv => 'A',
            VehicleKind::Human => 'H',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.letter() == letter)
    }

    pub fn name(self) -> &'static str {
        match self {
            VehicleKind::Car => "car",
            VehicleKind::Truck => "truck",
            VehicleKind::Taxi => "taxi",
            VehicleKind::Bicycle => "bicycle",
            VehicleKind::Atv => "atv",
            VehicleKind::Human => "human",
        }
    }

    /// Ticks a dead vehicle of this kind waits before reviving
    ///
    /// Zero means the vehicle never revives on its own.
    pub fn revival_ticks(self) -> u32 {
        match self {
            VehicleKind::Car | VehicleKind::Taxi => 15,
            VehicleKind::Truck => 0,
            VehicleKind::Bicycle => 35,
            VehicleKind::Atv => 25,
            VehicleKind::Human => 45,
        }
    }

    /// Kinds that kill a vehicle of this kind when they share a cell while alive
    pub fn killers(self) -> &'static [VehicleKind] {
        use VehicleKind::*;
        match self {
            Truck => &[],
            Car | Taxi => &[Truck],
            Bicycle | Atv => &[Truck, Car, Taxi],
            Human => &[Truck, Car, Taxi, Bicycle],
        }
    }

    pub fn is_killed_by(self, other: VehicleKind) -> bool {
        self.killers().contains(&other)
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What one side of a collision looked like when the collision was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionParty {
    pub kind: VehicleKind,
    pub alive: bool,
}

/// A vehicle on the grid
#[derive(Debug, Clone)]
pub struct SimVehicle {
    kind: VehicleKind,
    position: Position,
    direction: Direction,
    alive: bool,
    /// Ticks left until revival while dead, 0 while alive
    revival_countdown: u32,
    /// Consecutive red-light refusals at a crosswalk (taxis only)
    crosswalk_wait: u32,
    spawn_position: Position,
    spawn_direction: Direction,
}

impl SimVehicle {
    pub fn new(kind: VehicleKind, position: Position, direction: Direction) -> Self {
        Self {
            kind,
            position,
            direction,
            alive: true,
            revival_countdown: 0,
            crosswalk_wait: 0,
            spawn_position: position,
            spawn_direction: direction,
        }
    }

    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn revival_countdown(&self) -> u32 {
        self.revival_countdown
    }

    pub fn crosswalk_wait(&self) -> u32 {
        self.crosswalk_wait
    }

    pub fn spawn_position(&self) -> Position {
        self.spawn_position
    }

    pub fn spawn_direction(&self) -> Direction {
        self.spawn_direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Move one cell in the current facing direction
    pub(crate) fn step_forward(&mut self) {
        self.position = self.position.step(self.direction);
    }

    pub fn party(&self) -> CollisionParty {
        CollisionParty {
            kind: self.kind,
            alive: self.alive,
        }
    }

    /// Map letter for rendering, lowercase while dead
    pub fn symbol(&self) -> char {
        if self.alive {
            self.kind.letter()
        } else {
            self.kind.letter().to_ascii_lowercase()
        }
    }

    /// Whether this vehicle may enter `terrain` under `light`
    ///
    /// Side-effect free for every kind except the taxi, which counts how long
    /// it has been held at a red crosswalk.
    pub fn can_pass(&mut self, terrain: Terrain, light: TrafficLight) -> bool {
        match self.kind {
            VehicleKind::Car => match terrain {
                Terrain::Street => true,
                Terrain::Light => light != TrafficLight::Red,
                Terrain::Crosswalk => light == TrafficLight::Green,
                _ => false,
            },
            VehicleKind::Truck => match terrain {
                Terrain::Street | Terrain::Light => true,
                Terrain::Crosswalk => light != TrafficLight::Red,
                _ => false,
            },
            VehicleKind::Taxi => match terrain {
                Terrain::Street => true,
                Terrain::Light => light != TrafficLight::Red,
                Terrain::Crosswalk => self.wait_at_crosswalk(light),
                _ => false,
            },
            VehicleKind::Bicycle => match terrain {
                Terrain::Street | Terrain::Trail => true,
                Terrain::Light | Terrain::Crosswalk => light == TrafficLight::Green,
                _ => false,
            },
            VehicleKind::Atv => terrain != Terrain::Wall,
            VehicleKind::Human => match terrain {
                Terrain::Grass => true,
                Terrain::Crosswalk => light != TrafficLight::Green,
                _ => false,
            },
        }
    }

    fn wait_at_crosswalk(&mut self, light: TrafficLight) -> bool {
        if light != TrafficLight::Red {
            self.crosswalk_wait = 0;
            return true;
        }
        if self.crosswalk_wait >= TAXI_CROSSWALK_PATIENCE {
            trace!("taxi at {:?} runs the red crosswalk", self.position);
            self.crosswalk_wait = 0;
            return true;
        }
        self.crosswalk_wait += 1;
        false
    }

    /// Pick the direction to attempt this tick
    ///
    /// Only terrain is considered here; the light is checked when the move is
    /// applied. Falls back to reversing, or to the current facing when the
    /// cell behind is a wall or off the grid.
    pub fn choose_direction<R: Rng + ?Sized>(
        &self,
        neighbors: &Neighborhood,
        rng: &mut R,
    ) -> Direction {
        let straight = self.direction;
        let forward = [straight, straight.left(), straight.right()];

        let choice = match self.kind {
            VehicleKind::Car | VehicleKind::Taxi => {
                first_match(&forward, neighbors, Terrain::is_road)
            }
            VehicleKind::Bicycle => first_match(&forward, neighbors, |t| t == Terrain::Trail)
                .or_else(|| first_match(&forward, neighbors, Terrain::is_road)),
            VehicleKind::Truck => random_match(straight, neighbors, rng, Terrain::is_road),
            VehicleKind::Atv => random_match(straight, neighbors, rng, |t| t != Terrain::Wall),
            VehicleKind::Human => first_match(&forward, neighbors, |t| t == Terrain::Crosswalk)
                .or_else(|| random_match(straight, neighbors, rng, |t| t == Terrain::Grass)),
        };

        choice.unwrap_or_else(|| self.fallback_direction(neighbors))
    }

    fn fallback_direction(&self, neighbors: &Neighborhood) -> Direction {
        let reverse = self.direction.reverse();
        if neighbors.is(reverse, |t| t != Terrain::Wall) {
            reverse
        } else {
            debug!(
                "{} at {:?} is boxed in, holding {:?}",
                self.kind, self.position, self.direction
            );
            self.direction
        }
    }

    /// React to sharing a cell with `other`
    pub fn collide(&mut self, other: CollisionParty) {
        if other.alive && self.kind.is_killed_by(other.kind) {
            self.die();
        }
    }

    fn die(&mut self) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.revival_countdown = self.kind.revival_ticks();
        debug!(
            "{} killed at {:?}, reviving in {} ticks",
            self.kind, self.position, self.revival_countdown
        );
    }

    /// Count down one tick toward revival
    pub fn poke<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.alive || self.revival_countdown == 0 {
            return;
        }
        self.revival_countdown -= 1;
        if self.revival_countdown == 0 {
            self.direction = Direction::random(rng);
            self.alive = true;
            debug!(
                "{} revived at {:?} facing {:?}",
                self.kind, self.position, self.direction
            );
        }
    }

    /// Return to the spawn cell and facing, alive
    pub fn reset(&mut self) {
        self.position = self.spawn_position;
        self.direction = self.spawn_direction;
        self.alive = true;
        self.revival_countdown = 0;
        self.crosswalk_wait = 0;
    }
}

impl fmt::Display for SimVehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alive {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "dead {}", self.kind)
        }
    }
}

fn first_match(
    candidates: &[Direction],
    neighbors: &Neighborhood,
    accepts: impl Fn(Terrain) -> bool,
) -> Option<Direction> {
    candidates
        .iter()
        .copied()
        .find(|&direction| neighbors.is(direction, &accepts))
}

/// Try left, straight and right in a uniformly shuffled order
fn random_match<R: Rng + ?Sized>(
    straight: Direction,
    neighbors: &Neighborhood,
    rng: &mut R,
    accepts: impl Fn(Terrain) -> bool,
) -> Option<Direction> {
    let mut options = [straight.left(), straight, straight.right()];
    options.shuffle(rng);
    options
        .into_iter()
        .find(|&direction| neighbors.is(direction, &accepts))
}
