//! Static checks on parsed scenarios
//!
//! Catches everything that would make world construction fail, plus a few
//! suspicious but legal setups, before any atom is spawned.

use crate::ast::{AtomDecl, Scenario, TypeDecl};
use crate::diagnostics::{Diagnostic, Diagnostics};
use std::collections::HashMap;

/// Analyze a scenario and return diagnostics
pub fn analyze_scenario(scenario: &Scenario) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    check_world(scenario, &mut diagnostics);
    let types = check_types(&scenario.types, &mut diagnostics);
    let atoms = check_atoms(&scenario.atoms, &types, &mut diagnostics);
    check_overlaps(&scenario.atoms, &types, &mut diagnostics);

    let simulate = &scenario.simulate;
    if !simulate.dt.is_finite() || simulate.dt < 0.0 {
        diagnostics.push(Diagnostic::error(
            format!("dt must be finite and >= 0, got {}", simulate.dt),
            simulate.span,
        ));
    }
    if simulate.steps == 0 {
        diagnostics.push(Diagnostic::warning("steps = 0: nothing will move", simulate.span));
    }

    if scenario.collisions.len() > 1 {
        for decl in &scenario.collisions[..scenario.collisions.len() - 1] {
            diagnostics.push(Diagnostic::warning(
                "repeated 'collisions' declaration; later settings override this one",
                decl.span,
            ));
        }
    }

    // Detectors: unique names, existing atoms
    let mut detector_names = HashMap::new();
    for (idx, detector) in scenario.detectors.iter().enumerate() {
        if detector_names.insert(detector.name.as_str(), idx).is_some() {
            diagnostics.push(Diagnostic::error(
                format!("duplicate detector name '{}'", detector.name),
                detector.span,
            ));
        }
        for name in detector.kind.atoms() {
            if !atoms.contains_key(name) {
                diagnostics.push(Diagnostic::error(
                    format!("unknown atom '{}' in detector '{}'", name, detector.name),
                    detector.span,
                ));
            }
        }
    }

    diagnostics
}

fn check_world(scenario: &Scenario, diagnostics: &mut Diagnostics) {
    for (idx, world) in scenario.worlds.iter().enumerate() {
        if idx + 1 < scenario.worlds.len() {
            diagnostics.push(Diagnostic::warning(
                "repeated 'world' declaration; the last one wins",
                world.span,
            ));
        }
        if !world.drag.is_finite() || world.drag < 0.0 {
            diagnostics.push(Diagnostic::error(
                format!("drag must be finite and >= 0, got {}", world.drag),
                world.span,
            ));
        }
    }
}

fn check_radius_mass(
    radius: f64,
    mass: f64,
    what: &str,
    span: Option<crate::diagnostics::Span>,
    diagnostics: &mut Diagnostics,
) {
    if !radius.is_finite() || radius <= 0.0 {
        diagnostics.push(Diagnostic::error(
            format!("radius of {} must be finite and > 0, got {}", what, radius),
            span,
        ));
    }
    if !mass.is_finite() || mass <= 0.0 {
        diagnostics.push(Diagnostic::error(
            format!("mass of {} must be finite and > 0, got {}", what, mass),
            span,
        ));
    } else if !(1.0 / mass).is_finite() {
        diagnostics.push(Diagnostic::error(
            format!("mass of {} is too small to invert, got {}", what, mass),
            span,
        ));
    }
}

fn check_types<'a>(
    types: &'a [TypeDecl],
    diagnostics: &mut Diagnostics,
) -> HashMap<&'a str, &'a TypeDecl> {
    let mut by_name = HashMap::new();
    for decl in types {
        if by_name.insert(decl.name.as_str(), decl).is_some() {
            diagnostics.push(Diagnostic::error(
                format!("duplicate type name '{}'", decl.name),
                decl.span,
            ));
        }
        check_radius_mass(
            decl.radius,
            decl.mass,
            &format!("type '{}'", decl.name),
            decl.span,
            diagnostics,
        );
    }
    by_name
}

fn check_atoms<'a>(
    atoms: &'a [AtomDecl],
    types: &HashMap<&str, &TypeDecl>,
    diagnostics: &mut Diagnostics,
) -> HashMap<&'a str, usize> {
    let mut by_name = HashMap::new();
    for (idx, atom) in atoms.iter().enumerate() {
        if by_name.insert(atom.name.as_str(), idx).is_some() {
            diagnostics.push(Diagnostic::error(
                format!("duplicate atom name '{}'", atom.name),
                atom.span,
            ));
        }

        if !atom.position.is_finite() {
            diagnostics.push(Diagnostic::error(
                format!("position of atom '{}' must be finite", atom.name),
                atom.span,
            ));
        }
        if !atom.velocity.is_finite() {
            diagnostics.push(Diagnostic::error(
                format!("velocity of atom '{}' must be finite", atom.name),
                atom.span,
            ));
        }

        let shape = &atom.shape;
        match (&shape.type_name, shape.radius, shape.mass) {
            (Some(type_name), None, None) => {
                if !types.contains_key(type_name.as_str()) {
                    diagnostics.push(Diagnostic::error(
                        format!("unknown type '{}' for atom '{}'", type_name, atom.name),
                        atom.span,
                    ));
                }
            }
            (Some(_), _, _) => {
                diagnostics.push(Diagnostic::error(
                    format!(
                        "atom '{}' has a type and an inline radius/mass; use one or the other",
                        atom.name
                    ),
                    atom.span,
                ));
            }
            (None, Some(radius), Some(mass)) => {
                check_radius_mass(
                    radius,
                    mass,
                    &format!("atom '{}'", atom.name),
                    atom.span,
                    diagnostics,
                );
            }
            (None, _, _) => {
                diagnostics.push(Diagnostic::error(
                    format!("atom '{}' needs a type or both radius and mass", atom.name),
                    atom.span,
                ));
            }
        }
    }
    by_name
}

/// Radius an atom will get, if it resolves
fn resolved_radius(atom: &AtomDecl, types: &HashMap<&str, &TypeDecl>) -> Option<f64> {
    match &atom.shape.type_name {
        Some(name) => types.get(name.as_str()).map(|t| t.radius),
        None => atom.shape.radius,
    }
}

fn check_overlaps(
    atoms: &[AtomDecl],
    types: &HashMap<&str, &TypeDecl>,
    diagnostics: &mut Diagnostics,
) {
    for (i, a) in atoms.iter().enumerate() {
        let Some(ra) = resolved_radius(a, types) else {
            continue;
        };
        for b in &atoms[i + 1..] {
            let Some(rb) = resolved_radius(b, types) else {
                continue;
            };
            if a.position.distance(b.position) < ra + rb {
                diagnostics.push(Diagnostic::warning(
                    format!("atoms '{}' and '{}' overlap at spawn", a.name, b.name),
                    b.span,
                ));
            }
        }
    }
}
