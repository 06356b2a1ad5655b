//! Main simulation world that ties everything together
//!
//! The world owns the terrain grid, the vehicles and the traffic light. It
//! does no scheduling of its own: a driver calls [`SimWorld::advance`] once
//! per tick.

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::grid::Grid;
use super::light::TrafficLight;
use super::map::{parse_map, MapError, DEMO_MAP};
use super::observer::{ObserverId, ObserverSet, SimObserver};
use super::types::LIGHT_CHANGE_TICKS;
use super::vehicle::{SimVehicle, VehicleKind};

/// Tunables for a simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Ticks between traffic light changes; 0 keeps the light green
    pub light_change_ticks: u64,
    /// Seed for reproducible runs, OS entropy when `None`
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            light_change_ticks: LIGHT_CHANGE_TICKS,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_light_change_ticks(mut self, ticks: u64) -> Self {
        self.light_change_ticks = ticks;
        self
    }
}

/// The main simulation world
pub struct SimWorld {
    grid: Grid,
    /// Vehicles in spawn order, which is also the order they move in
    vehicles: Vec<SimVehicle>,
    light: TrafficLight,
    tick: u64,
    config: SimConfig,
    rng: StdRng,
    observers: ObserverSet,
}

impl SimWorld {
    pub fn new(grid: Grid, vehicles: Vec<SimVehicle>) -> Self {
        Self::with_config(grid, vehicles, SimConfig::default())
    }

    pub fn with_config(grid: Grid, vehicles: Vec<SimVehicle>, config: SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            grid,
            vehicles,
            light: TrafficLight::Green,
            tick: 0,
            config,
            rng,
            observers: ObserverSet::default(),
        }
    }

    /// Create a world on the built-in demo map
    pub fn create_demo_world(config: SimConfig) -> Result<Self, MapError> {
        let map = parse_map(DEMO_MAP)?;
        Ok(Self::with_config(map.grid, map.vehicles, config))
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn vehicles(&self) -> &[SimVehicle] {
        &self.vehicles
    }

    pub fn light(&self) -> TrafficLight {
        self.light
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn living_count(&self) -> usize {
        self.vehicles.iter().filter(|v| v.is_alive()).count()
    }

    /// Register an observer; it hears every change from now on
    pub fn subscribe(&mut self, observer: Box<dyn SimObserver>) -> ObserverId {
        self.observers.add(observer)
    }

    /// Remove an observer, returning whether it was registered
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    pub fn start(&mut self) {
        info!(
            "Starting simulation: {}x{} grid, {} vehicles, {} observers",
            self.width(),
            self.height(),
            self.vehicles.len(),
            self.observers.len()
        );
        self.reset();
    }

    /// Put every vehicle back at its spawn point and rewind the clock
    pub fn reset(&mut self) {
        for vehicle in &mut self.vehicles {
            vehicle.reset();
        }
        self.set_light(TrafficLight::Green);
        self.set_tick(0);
        self.fire_grid_change();
        self.fire_vehicle_change();
    }

    /// Main simulation tick
    pub fn advance(&mut self) {
        for index in 0..self.vehicles.len() {
            self.update_vehicle(index);
            self.detect_collisions(index);
        }

        self.set_tick(self.tick + 1);
        let interval = self.config.light_change_ticks;
        if interval > 0 && self.tick % interval == 0 {
            let next = self.light.advance();
            debug!("Tick {}: light turns {}", self.tick, next.name());
            self.set_light(next);
        }
        self.fire_vehicle_change();
    }

    /// Move a live vehicle one cell, or bring a dead one closer to revival
    fn update_vehicle(&mut self, index: usize) {
        let light = self.light;
        let neighbors = self.grid.neighbors(self.vehicles[index].position());
        let vehicle = &mut self.vehicles[index];

        if !vehicle.is_alive() {
            vehicle.poke(&mut self.rng);
            return;
        }

        let direction = vehicle.choose_direction(&neighbors, &mut self.rng);
        vehicle.set_direction(direction);

        let passable = neighbors
            .get(direction)
            .is_some_and(|terrain| vehicle.can_pass(terrain, light));
        if passable {
            vehicle.step_forward();
            trace!(
                "{} #{} moves {:?} to {:?}",
                vehicle.kind(),
                index,
                direction,
                vehicle.position()
            );
        }
    }

    /// Tell the vehicle at `index` and everything sharing its cell that they collided
    fn detect_collisions(&mut self, index: usize) {
        let position = self.vehicles[index].position();

        for other in 0..self.vehicles.len() {
            if other == index || self.vehicles[other].position() != position {
                continue;
            }

            // Both sides see each other as they were before either reacts
            let mover = self.vehicles[index].party();
            let occupant = self.vehicles[other].party();
            self.vehicles[index].collide(occupant);
            self.vehicles[other].collide(mover);

            debug!(
                "Tick {}: {} #{} and {} #{} collide at {:?}",
                self.tick, self.vehicles[index], index, self.vehicles[other], other, position
            );
        }
    }

    fn set_light(&mut self, light: TrafficLight) {
        let old = self.light;
        if old == light {
            return;
        }
        self.light = light;
        self.observers
            .notify(|observer| observer.light_changed(old, light));
    }

    fn set_tick(&mut self, tick: u64) {
        let old = self.tick;
        if old == tick {
            return;
        }
        self.tick = tick;
        self.observers
            .notify(|observer| observer.tick_changed(old, tick));
    }

    fn fire_grid_change(&mut self) {
        let grid = &self.grid;
        self.observers.notify(|observer| observer.grid_changed(grid));
    }

    fn fire_vehicle_change(&mut self) {
        let vehicles = &self.vehicles;
        self.observers
            .notify(|observer| observer.vehicles_changed(vehicles));
    }

    /// The grid as map codes with vehicle letters on top (lowercase when dead)
    pub fn render_map(&self) -> String {
        let mut rows: Vec<Vec<char>> = self
            .grid
            .rows()
            .map(|row| row.iter().map(|terrain| terrain.code()).collect())
            .collect();

        // Living vehicles are drawn last so they stay visible over wrecks
        let dead = self.vehicles.iter().filter(|v| !v.is_alive());
        let alive = self.vehicles.iter().filter(|v| v.is_alive());
        for vehicle in dead.chain(alive) {
            let position = vehicle.position();
            if self.grid.contains(position) {
                rows[position.y as usize][position.x as usize] = vehicle.symbol();
            }
        }

        let mut map = String::with_capacity(rows.len() * (self.width() + 1));
        for row in rows {
            map.extend(row);
            map.push('\n');
        }
        map
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Grid Traffic Summary ===");
        println!("Tick: {}", self.tick);
        println!("Light: {}", self.light.name());
        println!(
            "Vehicles: {} alive / {} total",
            self.living_count(),
            self.vehicles.len()
        );

        println!("--- By kind ---");
        for kind in VehicleKind::ALL {
            let total = self.vehicles.iter().filter(|v| v.kind() == kind).count();
            if total == 0 {
                continue;
            }
            let alive = self
                .vehicles
                .iter()
                .filter(|v| v.kind() == kind && v.is_alive())
                .count();
            println!("  {}: {}/{} alive", kind, alive, total);
        }

        let dead: Vec<_> = self
            .vehicles
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_alive())
            .collect();
        if !dead.is_empty() {
            println!("--- Awaiting revival ---");
            for (index, vehicle) in dead {
                println!(
                    "  #{} {} at ({}, {}): {} ticks left",
                    index,
                    vehicle.kind(),
                    vehicle.position().x,
                    vehicle.position().y,
                    vehicle.revival_countdown()
                );
            }
        }
    }

    /// Draw the map in the terminal
    pub fn draw_map(&self) {
        print!("{}", self.render_map());
    }
}
