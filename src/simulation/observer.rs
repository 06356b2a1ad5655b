//! Change notifications for code that renders or records the simulation
//!
//! Observers are called synchronously from inside the world call that caused
//! the change. Each channel has its own method with a no-op default, so an
//! observer only implements the channels it cares about.

use super::grid::Grid;
use super::light::TrafficLight;
use super::vehicle::SimVehicle;

/// Handle returned by `SimWorld::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub usize);

pub trait SimObserver {
    /// The terrain grid was (re)published
    fn grid_changed(&mut self, _grid: &Grid) {}

    /// The traffic light switched from `old` to `new`
    fn light_changed(&mut self, _old: TrafficLight, _new: TrafficLight) {}

    /// Vehicle state after a tick or a reset, in spawn order
    fn vehicles_changed(&mut self, _vehicles: &[SimVehicle]) {}

    /// The tick counter moved; never sent with `old == new`
    fn tick_changed(&mut self, _old: u64, _new: u64) {}
}

/// Registered observers in subscription order
#[derive(Default)]
pub(crate) struct ObserverSet {
    entries: Vec<(ObserverId, Box<dyn SimObserver>)>,
    next_id: usize,
}

impl ObserverSet {
    pub(crate) fn add(&mut self, observer: Box<dyn SimObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn notify(&mut self, mut deliver: impl FnMut(&mut dyn SimObserver)) {
        for (_, observer) in &mut self.entries {
            deliver(observer.as_mut());
        }
    }
}
