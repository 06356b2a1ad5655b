//! Simulation world tests: tick ordering, collisions, the light and observers

use std::cell::RefCell;
use std::rc::Rc;

use grid_traffic::simulation::{
    Direction, Grid, Position, SimConfig, SimObserver, SimVehicle, SimWorld, Terrain,
    TrafficLight, VehicleKind, LIGHT_CHANGE_TICKS,
};

fn street_row(length: usize) -> Grid {
    Grid::from_rows(vec![vec![Terrain::Street; length]]).expect("valid grid")
}

fn seeded() -> SimConfig {
    SimConfig::default().with_seed(42)
}

/// Records every notification as a short string
#[derive(Clone, Default)]
struct Recorder {
    events: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    fn take(&self) -> Vec<String> {
        self.events.borrow_mut().drain(..).collect()
    }
}

impl SimObserver for Recorder {
    fn grid_changed(&mut self, grid: &Grid) {
        self.events
            .borrow_mut()
            .push(format!("grid {}x{}", grid.width(), grid.height()));
    }

    fn light_changed(&mut self, old: TrafficLight, new: TrafficLight) {
        self.events
            .borrow_mut()
            .push(format!("light {}->{}", old.name(), new.name()));
    }

    fn vehicles_changed(&mut self, vehicles: &[SimVehicle]) {
        self.events
            .borrow_mut()
            .push(format!("vehicles {}", vehicles.len()));
    }

    fn tick_changed(&mut self, old: u64, new: u64) {
        self.events.borrow_mut().push(format!("tick {}->{}", old, new));
    }
}

#[test]
fn test_world_dimensions() {
    let grid = Grid::from_rows(vec![vec![Terrain::Grass; 4]; 3]).expect("valid grid");
    let world = SimWorld::new(grid, Vec::new());

    assert_eq!(world.width(), 4);
    assert_eq!(world.height(), 3);
    assert_eq!(world.light(), TrafficLight::Green);
    assert_eq!(world.tick(), 0);
}

#[test]
fn test_car_turns_back_at_grid_edge() {
    let car = SimVehicle::new(VehicleKind::Car, Position::new(2, 0), Direction::East);
    let mut world = SimWorld::with_config(street_row(3), vec![car], seeded());
    world.start();

    world.advance();

    let car = &world.vehicles()[0];
    assert_eq!(car.direction(), Direction::West);
    assert_eq!(car.position(), Position::new(1, 0));
}

#[test]
fn test_light_changes_every_fifteen_ticks() {
    let mut world = SimWorld::with_config(street_row(3), Vec::new(), seeded());
    world.start();

    for _ in 0..LIGHT_CHANGE_TICKS - 1 {
        world.advance();
    }
    assert_eq!(world.light(), TrafficLight::Green);

    world.advance();
    assert_eq!(world.tick(), 15);
    assert_eq!(world.light(), TrafficLight::Yellow);

    for _ in 0..LIGHT_CHANGE_TICKS {
        world.advance();
    }
    assert_eq!(world.light(), TrafficLight::Red);

    for _ in 0..LIGHT_CHANGE_TICKS {
        world.advance();
    }
    assert_eq!(world.light(), TrafficLight::Green);
}

#[test]
fn test_light_interval_is_configurable() {
    let config = seeded().with_light_change_ticks(2);
    let mut world = SimWorld::with_config(street_row(3), Vec::new(), config);
    world.start();

    world.advance();
    assert_eq!(world.light(), TrafficLight::Green);
    world.advance();
    assert_eq!(world.light(), TrafficLight::Yellow);

    let frozen = seeded().with_light_change_ticks(0);
    let mut world = SimWorld::with_config(street_row(3), Vec::new(), frozen);
    for _ in 0..100 {
        world.advance();
    }
    assert_eq!(world.light(), TrafficLight::Green);
}

#[test]
fn test_truck_kills_car_and_survives() {
    let truck = SimVehicle::new(VehicleKind::Truck, Position::new(0, 0), Direction::East);
    let car = SimVehicle::new(VehicleKind::Car, Position::new(2, 0), Direction::West);
    let mut world = SimWorld::with_config(street_row(3), vec![truck, car], seeded());
    world.start();

    world.advance();

    let truck = &world.vehicles()[0];
    let car = &world.vehicles()[1];
    assert_eq!(truck.position(), Position::new(1, 0));
    assert_eq!(car.position(), Position::new(1, 0));
    assert!(truck.is_alive());
    assert!(!car.is_alive());
    assert_eq!(car.revival_countdown(), VehicleKind::Car.revival_ticks());
    assert_eq!(world.living_count(), 1);
}

#[test]
fn test_dead_car_revives_after_countdown() {
    let truck = SimVehicle::new(VehicleKind::Truck, Position::new(0, 0), Direction::East);
    let car = SimVehicle::new(VehicleKind::Car, Position::new(2, 0), Direction::West);
    let mut world = SimWorld::with_config(street_row(3), vec![truck, car], seeded());
    world.start();

    // Tick 1 kills the car; ticks 2..=15 count it down to one
    for _ in 0..15 {
        world.advance();
    }
    let car = &world.vehicles()[1];
    assert!(!car.is_alive());
    assert_eq!(car.revival_countdown(), 1);
    assert_eq!(car.position(), Position::new(1, 0));

    world.advance();
    assert!(world.vehicles()[1].is_alive());
}

#[test]
fn test_cars_pass_through_each_other() {
    let east = SimVehicle::new(VehicleKind::Car, Position::new(0, 0), Direction::East);
    let west = SimVehicle::new(VehicleKind::Car, Position::new(2, 0), Direction::West);
    let mut world = SimWorld::with_config(street_row(3), vec![east, west], seeded());
    world.start();

    world.advance();

    assert_eq!(world.vehicles()[0].position(), world.vehicles()[1].position());
    assert_eq!(world.living_count(), 2);
}

#[test]
fn test_atv_and_human_share_a_cell() {
    let grass = Grid::from_rows(vec![vec![Terrain::Grass; 3]]).expect("valid grid");
    let atv = SimVehicle::new(VehicleKind::Atv, Position::new(0, 0), Direction::East);
    let human = SimVehicle::new(VehicleKind::Human, Position::new(2, 0), Direction::West);
    let mut world = SimWorld::with_config(grass, vec![atv, human], seeded());
    world.start();

    world.advance();

    assert_eq!(world.vehicles()[0].position(), Position::new(1, 0));
    assert_eq!(world.vehicles()[1].position(), Position::new(1, 0));
    assert_eq!(world.living_count(), 2);
}

#[test]
fn test_bicycle_kills_human_on_shared_cell() {
    let grid = Grid::from_rows(vec![vec![
        Terrain::Wall,
        Terrain::Crosswalk,
        Terrain::Street,
    ]])
    .expect("valid grid");
    // The pedestrian is boxed in on the crosswalk; the bicycle crosses on green
    let human = SimVehicle::new(VehicleKind::Human, Position::new(1, 0), Direction::South);
    let bike = SimVehicle::new(VehicleKind::Bicycle, Position::new(2, 0), Direction::West);
    let mut world = SimWorld::with_config(grid, vec![human, bike], seeded());
    world.start();

    world.advance();

    let human = &world.vehicles()[0];
    let bike = &world.vehicles()[1];
    assert_eq!(bike.position(), Position::new(1, 0));
    assert!(bike.is_alive());
    assert!(!human.is_alive());
}

#[test]
fn test_every_occupant_of_a_cell_collides() {
    let grid = Grid::from_rows(vec![vec![
        Terrain::Street,
        Terrain::Crosswalk,
        Terrain::Wall,
    ]])
    .expect("valid grid");
    // Both pedestrians are stuck on the crosswalk when the car arrives
    let first = SimVehicle::new(VehicleKind::Human, Position::new(1, 0), Direction::South);
    let second = SimVehicle::new(VehicleKind::Human, Position::new(1, 0), Direction::South);
    let car = SimVehicle::new(VehicleKind::Car, Position::new(0, 0), Direction::East);
    let mut world = SimWorld::with_config(grid, vec![first, second, car], seeded());
    world.start();

    world.advance();

    for human in &world.vehicles()[..2] {
        assert_eq!(human.position(), Position::new(1, 0));
        assert!(!human.is_alive());
    }
    let car = &world.vehicles()[2];
    assert_eq!(car.position(), Position::new(1, 0));
    assert!(car.is_alive());
    assert_eq!(world.living_count(), 1);
}

#[test]
fn test_vehicle_far_off_grid_stays_put() {
    let stray = SimVehicle::new(VehicleKind::Atv, Position::new(i32::MAX, 0), Direction::East);
    let mut world = SimWorld::new(street_row(3), vec![stray]);
    world.start();

    world.advance();

    assert_eq!(world.vehicles()[0].position(), Position::new(i32::MAX, 0));
    assert_eq!(world.render_map(), "|||\n");
}

#[test]
fn test_reset_restores_every_vehicle() {
    let mut world = SimWorld::create_demo_world(seeded()).expect("demo map parses");
    world.start();
    let spawns: Vec<(Position, Direction)> = world
        .vehicles()
        .iter()
        .map(|v| (v.position(), v.direction()))
        .collect();

    for _ in 0..60 {
        world.advance();
    }
    world.reset();

    assert_eq!(world.tick(), 0);
    assert_eq!(world.light(), TrafficLight::Green);
    for (vehicle, (position, direction)) in world.vehicles().iter().zip(spawns) {
        assert_eq!(vehicle.position(), position);
        assert_eq!(vehicle.direction(), direction);
        assert!(vehicle.is_alive());
    }
}

#[test]
fn test_vehicles_never_enter_walls_or_leave_grid() {
    let mut world = SimWorld::create_demo_world(seeded()).expect("demo map parses");
    world.start();

    for _ in 0..300 {
        world.advance();
        for vehicle in world.vehicles() {
            let terrain = world.grid().terrain_at(vehicle.position());
            assert!(terrain.is_some(), "{} left the grid", vehicle);
            assert_ne!(terrain, Some(Terrain::Wall), "{} drove into a wall", vehicle);
        }
    }
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let run = |seed: u64| {
        let mut world =
            SimWorld::create_demo_world(SimConfig::default().with_seed(seed)).expect("demo map");
        world.start();
        for _ in 0..200 {
            world.advance();
        }
        world
            .vehicles()
            .iter()
            .map(|v| (v.position(), v.direction(), v.is_alive()))
            .collect::<Vec<_>>()
    };

    assert_eq!(run(7), run(7));
}

#[test]
fn test_start_publishes_full_snapshot() {
    let car = SimVehicle::new(VehicleKind::Car, Position::new(0, 0), Direction::East);
    let mut world = SimWorld::with_config(street_row(3), vec![car], seeded());
    let recorder = Recorder::default();
    world.subscribe(Box::new(recorder.clone()));

    world.start();

    assert_eq!(recorder.take(), vec!["grid 3x1", "vehicles 1"]);
}

#[test]
fn test_reset_notifies_only_changed_values() {
    let mut world = SimWorld::with_config(street_row(3), Vec::new(), seeded());
    let recorder = Recorder::default();
    world.subscribe(Box::new(recorder.clone()));
    world.start();

    for _ in 0..20 {
        world.advance();
    }
    recorder.take();

    world.reset();
    assert_eq!(
        recorder.take(),
        vec!["light yellow->green", "tick 20->0", "grid 3x1", "vehicles 0"]
    );

    world.reset();
    assert_eq!(recorder.take(), vec!["grid 3x1", "vehicles 0"]);
}

#[test]
fn test_advance_notifies_tick_light_and_vehicles() {
    let mut world = SimWorld::with_config(street_row(3), Vec::new(), seeded());
    let recorder = Recorder::default();
    world.subscribe(Box::new(recorder.clone()));
    world.start();
    recorder.take();

    world.advance();
    assert_eq!(recorder.take(), vec!["tick 0->1", "vehicles 0"]);

    for _ in 1..LIGHT_CHANGE_TICKS - 1 {
        world.advance();
    }
    recorder.take();

    world.advance();
    assert_eq!(
        recorder.take(),
        vec!["tick 14->15", "light green->yellow", "vehicles 0"]
    );
}

#[test]
fn test_unsubscribed_observer_hears_nothing() {
    let mut world = SimWorld::with_config(street_row(3), Vec::new(), seeded());
    let recorder = Recorder::default();
    let id = world.subscribe(Box::new(recorder.clone()));

    assert!(world.unsubscribe(id));
    assert!(!world.unsubscribe(id));

    world.start();
    world.advance();
    assert!(recorder.take().is_empty());
}

#[test]
fn test_neighbors_skip_off_grid_cells() {
    let grid = Grid::from_rows(vec![
        vec![Terrain::Grass, Terrain::Street],
        vec![Terrain::Trail, Terrain::Wall],
    ])
    .expect("valid grid");

    let corner = grid.neighbors(Position::new(0, 0));
    assert_eq!(corner.get(Direction::North), None);
    assert_eq!(corner.get(Direction::West), None);
    assert_eq!(corner.get(Direction::East), Some(Terrain::Street));
    assert_eq!(corner.get(Direction::South), Some(Terrain::Trail));
    assert_eq!(corner.iter().count(), 2);
}

#[test]
fn test_render_map_overlays_vehicles() {
    let truck = SimVehicle::new(VehicleKind::Truck, Position::new(0, 0), Direction::East);
    let car = SimVehicle::new(VehicleKind::Car, Position::new(2, 0), Direction::West);
    let mut world = SimWorld::with_config(street_row(4), vec![truck, car], seeded());
    world.start();
    assert_eq!(world.render_map(), "T|C|\n");

    world.advance();
    // The wrecked car sits under the truck
    assert_eq!(world.render_map(), "|T||\n");
}

#[test]
fn test_car_waits_at_red_signal() {
    let grid = Grid::from_rows(vec![vec![
        Terrain::Street,
        Terrain::Street,
        Terrain::Street,
        Terrain::Light,
        Terrain::Street,
    ]])
    .expect("valid grid");
    let car = SimVehicle::new(VehicleKind::Car, Position::new(0, 0), Direction::East);
    let config = seeded().with_light_change_ticks(1);
    let mut world = SimWorld::with_config(grid, vec![car], config);
    world.start();

    // Green, then yellow: two free steps
    world.advance();
    world.advance();
    assert_eq!(world.light(), TrafficLight::Red);
    assert_eq!(world.vehicles()[0].position(), Position::new(2, 0));

    // Red: the car faces the signal but stays put
    world.advance();
    assert_eq!(world.vehicles()[0].position(), Position::new(2, 0));
    assert_eq!(world.vehicles()[0].direction(), Direction::East);
    assert_eq!(world.light(), TrafficLight::Green);

    world.advance();
    assert_eq!(world.vehicles()[0].position(), Position::new(3, 0));
}
