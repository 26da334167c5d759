use crate::collision::{PairTraversal, Resolution};
use crate::diagnostics::Span;
use crate::vector::Vector2;

/// Parsed scenario file
#[derive(Debug, Clone)]
pub struct Scenario {
    pub worlds: Vec<WorldDecl>,
    pub types: Vec<TypeDecl>,
    pub atoms: Vec<AtomDecl>,
    pub simulate: SimulateDecl,
    pub collisions: Vec<CollisionsDecl>,
    pub detectors: Vec<DetectorDecl>,
}

impl Scenario {
    /// Drag from the last `world` line, 0 when there is none
    pub fn drag(&self) -> f64 {
        self.worlds.last().map(|w| w.drag).unwrap_or(0.0)
    }

    /// Settings merged from every `collisions` line, later keys winning
    pub fn collision_settings(&self) -> crate::collision::CollisionSettings {
        let mut settings = crate::collision::CollisionSettings::default();
        for decl in &self.collisions {
            if let Some(pairs) = decl.pairs {
                settings.pairs = pairs;
            }
            if let Some(resolution) = decl.resolution {
                settings.resolution = resolution;
            }
        }
        settings
    }
}

/// `world drag = d`
#[derive(Debug, Clone)]
pub struct WorldDecl {
    pub drag: f64,
    pub span: Option<Span>,
}

/// `type name radius r mass m`
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub radius: f64,
    pub mass: f64,
    pub span: Option<Span>,
}

/// Where an atom's radius and mass come from
#[derive(Debug, Clone)]
pub struct AtomShape {
    pub type_name: Option<String>,
    pub radius: Option<f64>,
    pub mass: Option<f64>,
}

/// `atom name : type at (x, y) velocity (vx, vy)`
/// or `atom name at (x, y) velocity (vx, vy) radius r mass m`
#[derive(Debug, Clone)]
pub struct AtomDecl {
    pub name: String,
    pub position: Vector2,
    pub velocity: Vector2,
    pub shape: AtomShape,
    pub span: Option<Span>,
}

/// `simulate dt = x steps = n`
#[derive(Debug, Clone)]
pub struct SimulateDecl {
    pub dt: f64,
    pub steps: u32,
    pub span: Option<Span>,
}

/// `collisions pairs = ordered resolve = deferred`
#[derive(Debug, Clone)]
pub struct CollisionsDecl {
    pub pairs: Option<PairTraversal>,
    pub resolution: Option<Resolution>,
    pub span: Option<Span>,
}

/// `detect name = observable`
#[derive(Debug, Clone)]
pub struct DetectorDecl {
    pub name: String,
    pub kind: DetectorKind,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetectorKind {
    /// `position(a)`, `position(a).x`, `position(a).y`
    Position(String, Axis),
    /// `velocity(a).x`, `velocity(a).y`
    Velocity(String, Axis),
    /// `speed(a)`
    Speed(String),
    /// `distance(a, b)`: center to center
    Distance { a: String, b: String },
    /// `energy()`: total kinetic energy
    Energy,
    /// `momentum()`: magnitude of total momentum
    Momentum,
}

impl DetectorKind {
    /// Atom names the detector reads
    pub fn atoms(&self) -> Vec<&str> {
        match self {
            DetectorKind::Position(name, _)
            | DetectorKind::Velocity(name, _)
            | DetectorKind::Speed(name) => vec![name.as_str()],
            DetectorKind::Distance { a, b } => vec![a.as_str(), b.as_str()],
            DetectorKind::Energy | DetectorKind::Momentum => Vec::new(),
        }
    }
}
