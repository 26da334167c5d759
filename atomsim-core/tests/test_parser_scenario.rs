//! Parser tests for each declaration kind

use atomsim_core::ast::{Axis, DetectorKind};
use atomsim_core::{parse_scenario, vector2, PairTraversal, Resolution, Vector2};

const SIM: &str = "simulate dt = 0.016 steps = 60\n";

#[test]
fn test_parse_world_and_simulate() {
    let scenario = parse_scenario(&format!("world drag = 0.25\n{}", SIM)).unwrap();
    assert_eq!(scenario.drag(), 0.25);
    assert_eq!(scenario.simulate.dt, 0.016);
    assert_eq!(scenario.simulate.steps, 60);
}

#[test]
fn test_default_drag_is_zero() {
    let scenario = parse_scenario(SIM).unwrap();
    assert_eq!(scenario.drag(), 0.0);
}

#[test]
fn test_parse_type() {
    let scenario = parse_scenario(&format!("type helium radius 0.7 mass 4.0\n{}", SIM)).unwrap();
    assert_eq!(scenario.types.len(), 1);
    assert_eq!(scenario.types[0].name, "helium");
    assert_eq!(scenario.types[0].radius, 0.7);
    assert_eq!(scenario.types[0].mass, 4.0);
}

#[test]
fn test_parse_typed_atom() {
    let scenario = parse_scenario(&format!(
        "atom h1 : hydrogen at (1.0, -2.0) velocity (0.5, 0.25)\n{}",
        SIM
    ))
    .unwrap();
    let atom = &scenario.atoms[0];
    assert_eq!(atom.name, "h1");
    assert_eq!(atom.shape.type_name.as_deref(), Some("hydrogen"));
    assert_eq!(atom.position, vector2(1.0, -2.0));
    assert_eq!(atom.velocity, vector2(0.5, 0.25));
    assert!(atom.shape.radius.is_none());
}

#[test]
fn test_parse_inline_atom_without_velocity() {
    let scenario =
        parse_scenario(&format!("atom big at (4, 0) radius 1.5 mass 6\n{}", SIM)).unwrap();
    let atom = &scenario.atoms[0];
    assert_eq!(atom.velocity, Vector2::ZERO);
    assert_eq!(atom.shape.radius, Some(1.5));
    assert_eq!(atom.shape.mass, Some(6.0));
    assert!(atom.shape.type_name.is_none());
}

#[test]
fn test_parse_collisions() {
    let scenario = parse_scenario(&format!(
        "collisions pairs = ordered resolve = deferred\n{}",
        SIM
    ))
    .unwrap();
    let settings = scenario.collision_settings();
    assert_eq!(settings.pairs, PairTraversal::Ordered);
    assert_eq!(settings.resolution, Resolution::Deferred);
}

#[test]
fn test_partial_collisions_keeps_defaults() {
    let scenario =
        parse_scenario(&format!("collisions resolve = deferred\n{}", SIM)).unwrap();
    let settings = scenario.collision_settings();
    assert_eq!(settings.pairs, PairTraversal::Unordered);
    assert_eq!(settings.resolution, Resolution::Deferred);
}

#[test]
fn test_parse_detectors() {
    let src = format!(
        "{}detect a = position(x)\n\
         detect b = position(x).y\n\
         detect c = velocity(x).x\n\
         detect d = speed(x)\n\
         detect e = distance(x, y)\n\
         detect f = energy()\n\
         detect g = momentum()\n",
        SIM
    );
    let scenario = parse_scenario(&src).unwrap();
    let kinds: Vec<_> = scenario.detectors.iter().map(|d| d.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            DetectorKind::Position("x".into(), Axis::X),
            DetectorKind::Position("x".into(), Axis::Y),
            DetectorKind::Velocity("x".into(), Axis::X),
            DetectorKind::Speed("x".into()),
            DetectorKind::Distance {
                a: "x".into(),
                b: "y".into()
            },
            DetectorKind::Energy,
            DetectorKind::Momentum,
        ]
    );
}

#[test]
fn test_parse_errors() {
    let cases = [
        ("world drag 1.0\n", "key = value"),
        ("type t radius 1.0\n", "mass"),
        ("atom a (0, 0)\n", "'at'"),
        ("atom a at (0, 0) charge 2\n", "Unexpected 'charge 2'"),
        ("atom a at (0, 0) radius 1 radius 2 mass 1\n", "Duplicate 'radius'"),
        ("collisions pairs = sideways\n", "Unknown pairs mode"),
        ("detect x = torque(a)\n", "Unknown detector type"),
        ("detect x = distance(a)\n", "expects 2 argument(s)"),
        ("detect x = speed(a).x\n", "does not take a component"),
        ("simulate dt = 0.1 steps = 1\n", "Duplicate 'simulate'"),
        ("atom 9lives at (0, 0) radius 1 mass 1\n", "Invalid atom name"),
    ];
    for (line, expected) in cases {
        let src = format!("{}{}", SIM, line);
        let err = parse_scenario(&src).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "'{}' should fail with '{}', got '{}'",
            line.trim(),
            expected,
            err
        );
    }
}

#[test]
fn test_parse_simulate_rejects_bad_step_count() {
    for (src, expected) in [
        ("simulate dt = 0.1 steps = -1\n", "Invalid step count"),
        ("simulate dt = 0.1 steps = 2.5\n", "Invalid step count"),
    ] {
        let err = parse_scenario(src).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "'{}' should fail with '{}', got '{}'",
            src.trim(),
            expected,
            err
        );
    }
}
