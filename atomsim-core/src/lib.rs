pub mod analyzer;
pub mod ast;
pub mod collision;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod integrator;
pub mod parser;
pub mod runtime;
pub mod vector;

pub use analyzer::analyze_scenario;
pub use collision::{CollisionSettings, PairTraversal, Resolution, RESTITUTION};
pub use diagnostics::{Diagnostic, DiagnosticSeverity, Diagnostics, SourceLocation, Span};
pub use engine::{Atom, AtomType, World};
pub use error::{Error, Result};
pub use parser::{parse_scenario, ParseError};
pub use runtime::{
    build_simulation_context, build_simulation_context_from_source, build_world,
    evaluate_detectors, get_atom_states, run_scenario, run_to_end, step_simulation, AtomState,
    DetectorResult, SimulationContext, SimulationResult,
};
pub use vector::{vector2, Vector2};

// Test helpers module (public for integration tests)
// Always compiled - integration tests are separate crates and need access
pub mod tests;
