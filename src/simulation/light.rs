//! Traffic light state machine
//!
//! A single light governs every signal cell and crosswalk on the map.

/// Color currently shown by the traffic light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrafficLight {
    #[default]
    Green,
    Yellow,
    Red,
}

impl TrafficLight {
    /// The next color in the green -> yellow -> red -> green cycle
    pub fn advance(self) -> Self {
        match self {
            TrafficLight::Green => TrafficLight::Yellow,
            TrafficLight::Yellow => TrafficLight::Red,
            TrafficLight::Red => TrafficLight::Green,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TrafficLight::Green => "green",
            TrafficLight::Yellow => "yellow",
            TrafficLight::Red => "red",
        }
    }
}
