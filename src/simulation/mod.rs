//! Standalone grid traffic simulation module
//!
//! This module contains all the simulation logic: terrain, the traffic
//! light, per-kind vehicle behavior and the world that steps them. It knows
//! nothing about how the state is displayed.

mod grid;
mod light;
mod map;
mod observer;
mod types;
mod vehicle;
mod world;

pub use grid::{Grid, Neighborhood};
pub use light::TrafficLight;
pub use map::{load_map, parse_map, LoadedMap, MapError, DEMO_MAP};
pub use observer::{ObserverId, SimObserver};
pub use types::{Direction, Position, Terrain, LIGHT_CHANGE_TICKS};
pub use vehicle::{CollisionParty, SimVehicle, VehicleKind, TAXI_CROSSWALK_PATIENCE};
pub use world::{SimConfig, SimWorld};
