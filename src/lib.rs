//! Grid Traffic Simulation Library
//!
//! Vehicles of several kinds drive around a terrain grid under a single
//! traffic light. The library is headless; callers clock it and render it.

pub mod simulation;
