use crate::analyzer::analyze_scenario;
use crate::ast::{AtomDecl, Axis, DetectorDecl, DetectorKind, Scenario};
use crate::diagnostics::Diagnostics;
use crate::engine::{Atom, AtomType, World};
use crate::error::{Error, Result};
use crate::parser::parse_scenario;
use crate::vector::Vector2;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Result of a detector evaluation
#[derive(Debug, Clone, Serialize)]
pub struct DetectorResult {
    pub name: String,
    pub value: f64,
}

/// Snapshot of one atom for renderers and reports
#[derive(Debug, Clone, Serialize)]
pub struct AtomState {
    pub name: String,
    pub position: Vector2,
    pub velocity: Vector2,
    pub radius: f64,
    pub mass: f64,
}

/// Final result of running a scenario
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    pub steps: u32,
    pub detectors: Vec<DetectorResult>,
    pub atoms: Vec<AtomState>,
}

/// A world plus everything needed to step it and read it back by name
#[derive(Debug, Clone)]
pub struct SimulationContext {
    pub world: World,
    pub names: Vec<String>,
    pub detectors: Vec<DetectorDecl>,
    pub dt: f64,
    pub current_step: u32,
    pub max_steps: u32,
}

impl SimulationContext {
    pub fn is_finished(&self) -> bool {
        self.current_step >= self.max_steps
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

fn atom_type(decl: &AtomDecl, types: &HashMap<&str, AtomType>) -> Result<AtomType> {
    match (&decl.shape.type_name, decl.shape.radius, decl.shape.mass) {
        (Some(name), None, None) => types.get(name.as_str()).copied().ok_or_else(|| {
            Error::InvalidParam(format!("unknown type '{}' for atom '{}'", name, decl.name))
        }),
        (None, Some(radius), Some(mass)) => AtomType::new(radius, mass),
        _ => Err(Error::InvalidParam(format!(
            "atom '{}' needs a type or both radius and mass",
            decl.name
        ))),
    }
}

/// Build a World from a parsed Scenario
pub fn build_world(scenario: &Scenario) -> Result<World> {
    let mut world = World::with_drag(scenario.drag())?;
    world.set_collisions(scenario.collision_settings());

    let mut types = HashMap::new();
    for decl in &scenario.types {
        types.insert(decl.name.as_str(), AtomType::new(decl.radius, decl.mass)?);
    }

    for decl in &scenario.atoms {
        let kind = atom_type(decl, &types)?;
        world.spawn(Atom::new(decl.position, decl.velocity, kind)?);
    }

    Ok(world)
}

/// Build a steppable context from an already analyzed scenario
pub fn build_simulation_context(scenario: &Scenario) -> Result<SimulationContext> {
    let world = build_world(scenario)?;
    debug!(
        atoms = world.len(),
        drag = world.drag(),
        dt = scenario.simulate.dt,
        steps = scenario.simulate.steps,
        "built simulation context"
    );
    Ok(SimulationContext {
        world,
        names: scenario.atoms.iter().map(|a| a.name.clone()).collect(),
        detectors: scenario.detectors.clone(),
        dt: scenario.simulate.dt,
        current_step: 0,
        max_steps: scenario.simulate.steps,
    })
}

/// Parse, analyze and build. Warnings come back alongside the context.
pub fn build_simulation_context_from_source(
    source: &str,
) -> Result<(SimulationContext, Diagnostics)> {
    let scenario = parse_scenario(source)?;
    let diagnostics = analyze_scenario(&scenario);
    if diagnostics.has_errors() {
        return Err(Error::Analysis(diagnostics));
    }
    let ctx = build_simulation_context(&scenario)?;
    Ok((ctx, diagnostics))
}

/// Run one tick. Returns true once every step has been taken.
pub fn step_simulation(ctx: &mut SimulationContext) -> bool {
    if ctx.is_finished() {
        return true;
    }
    ctx.world.update(ctx.dt);
    ctx.current_step += 1;
    ctx.is_finished()
}

/// Named snapshot of every atom, in spawn order
pub fn get_atom_states(ctx: &SimulationContext) -> Vec<AtomState> {
    ctx.world
        .atoms()
        .iter()
        .zip(&ctx.names)
        .map(|(atom, name)| AtomState {
            name: name.clone(),
            position: atom.position(),
            velocity: atom.velocity(),
            radius: atom.radius(),
            mass: atom.mass(),
        })
        .collect()
}

fn component(v: Vector2, axis: Axis) -> f64 {
    match axis {
        Axis::X => v.x,
        Axis::Y => v.y,
    }
}

fn find_atom<'a>(ctx: &'a SimulationContext, name: &str) -> Result<&'a Atom> {
    ctx.index_of(name)
        .and_then(|idx| ctx.world.atom(idx))
        .ok_or_else(|| Error::UnknownAtom(name.to_string()))
}

/// Evaluate all detectors on the current world state
pub fn evaluate_detectors(ctx: &SimulationContext) -> Result<Vec<DetectorResult>> {
    ctx.detectors
        .iter()
        .map(|detector| -> Result<DetectorResult> {
            let value = match &detector.kind {
                DetectorKind::Position(name, axis) => {
                    component(find_atom(ctx, name)?.position(), *axis)
                }
                DetectorKind::Velocity(name, axis) => {
                    component(find_atom(ctx, name)?.velocity(), *axis)
                }
                DetectorKind::Speed(name) => find_atom(ctx, name)?.speed(),
                DetectorKind::Distance { a, b } => find_atom(ctx, a)?
                    .position()
                    .distance(find_atom(ctx, b)?.position()),
                DetectorKind::Energy => ctx.world.total_kinetic_energy(),
                DetectorKind::Momentum => ctx.world.total_momentum().length(),
            };
            Ok(DetectorResult {
                name: detector.name.clone(),
                value,
            })
        })
        .collect()
}

/// Run a context to completion and collect the results
pub fn run_to_end(ctx: &mut SimulationContext) -> Result<SimulationResult> {
    while !step_simulation(ctx) {}
    Ok(SimulationResult {
        steps: ctx.current_step,
        detectors: evaluate_detectors(ctx)?,
        atoms: get_atom_states(ctx),
    })
}

/// Main entry point: parse, check and run a scenario
pub fn run_scenario(source: &str) -> Result<SimulationResult> {
    let (mut ctx, _diagnostics) = build_simulation_context_from_source(source)?;
    run_to_end(&mut ctx)
}
