//! Test helper utilities for atomsim tests

use crate::engine::{Atom, World};
use crate::runtime::SimulationResult;
use crate::vector::{vector2, Vector2};
use std::fs;

/// Check if two floating point values are approximately equal within tolerance
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

/// Component-wise tolerance check for vectors
pub fn approx_eq_vec(a: Vector2, b: Vector2, tol: f64) -> bool {
    approx_eq(a.x, b.x, tol) && approx_eq(a.y, b.y, tol)
}

/// Atom with inline radius and mass; panics on invalid input
pub fn make_atom(position: (f64, f64), velocity: (f64, f64), radius: f64, mass: f64) -> Atom {
    Atom::with_radius_mass(
        vector2(position.0, position.1),
        vector2(velocity.0, velocity.1),
        radius,
        mass,
    )
    .expect("test atom should be valid")
}

/// True when every atom's position and velocity are finite
pub fn world_is_finite(world: &World) -> bool {
    world.atoms().iter().all(|a| {
        a.position().is_finite() && a.velocity().is_finite()
    })
}

/// Run a scenario from a file path
pub fn run_scenario_file(file: &str) -> crate::Result<SimulationResult> {
    let src = fs::read_to_string(file)?;
    crate::run_scenario(&src)
}

/// Run a scenario from source string
pub fn run_scenario_source(source: &str) -> crate::Result<SimulationResult> {
    crate::run_scenario(source)
}

/// Detector value by name
pub fn detector_value(result: &SimulationResult, name: &str) -> Option<f64> {
    result
        .detectors
        .iter()
        .find(|d| d.name == name)
        .map(|d| d.value)
}

/// Convert simulation result to JSON for golden tests
pub fn result_to_json(result: &SimulationResult) -> serde_json::Value {
    serde_json::to_value(result).expect("simulation result serializes")
}

/// Compare two simulation results with tolerance
pub fn results_approx_equal(a: &SimulationResult, b: &SimulationResult, tol: f64) -> bool {
    if a.steps != b.steps
        || a.detectors.len() != b.detectors.len()
        || a.atoms.len() != b.atoms.len()
    {
        return false;
    }

    let detectors_match = a.detectors.iter().zip(&b.detectors).all(|(x, y)| {
        x.name == y.name && approx_eq(x.value, y.value, tol)
    });
    let atoms_match = a.atoms.iter().zip(&b.atoms).all(|(x, y)| {
        x.name == y.name
            && approx_eq_vec(x.position, y.position, tol)
            && approx_eq_vec(x.velocity, y.velocity, tol)
    });

    detectors_match && atoms_match
}
