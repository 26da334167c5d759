use crate::collision::{self, CollisionSettings};
use crate::error::{Error, Result};
use crate::integrator;
use crate::vector::{self, Vector2};
use tracing::{trace, warn};

/// Immutable size and mass shared by every atom of one kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomType {
    radius: f64,
    mass: f64,
}

impl AtomType {
    /// Errors with `Error::InvalidParam` if `radius` or `mass` is non-positive or not
    /// finite, or if `mass` is so small its inverse overflows.
    pub fn new(radius: f64, mass: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !(1.0 / mass).is_finite() {
            return Err(Error::InvalidParam(format!("mass {} is too small to invert", mass)));
        }
        Ok(Self { radius, mass })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }
}

/// A circular body in the simulation
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub(crate) position: Vector2,
    pub(crate) velocity: Vector2,
    kind: AtomType,
}

impl Atom {
    /// Errors with `Error::InvalidParam` if position or velocity is not finite.
    pub fn new(position: Vector2, velocity: Vector2, kind: AtomType) -> Result<Self> {
        if !vector::is_finite(position) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !vector::is_finite(velocity) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self {
            position,
            velocity,
            kind,
        })
    }

    /// Shorthand for an atom whose radius and mass are not shared with any other.
    pub fn with_radius_mass(
        position: Vector2,
        velocity: Vector2,
        radius: f64,
        mass: f64,
    ) -> Result<Self> {
        Self::new(position, velocity, AtomType::new(radius, mass)?)
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    pub fn velocity(&self) -> Vector2 {
        self.velocity
    }

    pub fn kind(&self) -> AtomType {
        self.kind
    }

    pub fn radius(&self) -> f64 {
        self.kind.radius
    }

    pub fn mass(&self) -> f64 {
        self.kind.mass
    }

    #[inline]
    pub fn inverse_mass(&self) -> f64 {
        1.0 / self.kind.mass
    }

    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    /// 1/2 m |v|^2
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.kind.mass * self.velocity.length_squared()
    }

    pub fn momentum(&self) -> Vector2 {
        self.velocity * self.kind.mass
    }
}

/// The physics world containing atoms
///
/// Atoms are kept in spawn order. That order is part of the simulation's
/// semantics: under sequential collision resolution earlier pairs are
/// resolved first and later pairs observe the result.
#[derive(Debug, Clone, Default)]
pub struct World {
    atoms: Vec<Atom>,
    drag: f64,
    collisions: CollisionSettings,
    last_contacts: usize,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drag(drag: f64) -> Result<Self> {
        let mut world = Self::new();
        world.set_drag(drag)?;
        Ok(world)
    }

    /// Append an atom; it takes part in every following update
    pub fn spawn(&mut self, atom: Atom) {
        trace!(
            index = self.atoms.len(),
            x = atom.position.x,
            y = atom.position.y,
            radius = atom.radius(),
            "spawned atom"
        );
        self.atoms.push(atom);
    }

    /// All spawned atoms in spawn order
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn drag(&self) -> f64 {
        self.drag
    }

    /// Negative drag would accelerate atoms without bound, so it is refused.
    pub fn set_drag(&mut self, drag: f64) -> Result<()> {
        if !drag.is_finite() || drag < 0.0 {
            return Err(Error::InvalidParam("drag must be finite and >= 0".into()));
        }
        self.drag = drag;
        Ok(())
    }

    pub fn collisions(&self) -> CollisionSettings {
        self.collisions
    }

    pub fn set_collisions(&mut self, collisions: CollisionSettings) {
        self.collisions = collisions;
    }

    /// Number of contacts resolved by the most recent `update`
    pub fn last_contacts(&self) -> usize {
        self.last_contacts
    }

    /// Move an atom outside of the normal update, e.g. a user drag in a viewer.
    pub fn set_position(&mut self, index: usize, position: Vector2) -> Result<()> {
        if !vector::is_finite(position) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        self.atom_mut(index)?.position = position;
        Ok(())
    }

    /// Replace an atom's velocity outside of the normal update.
    pub fn set_velocity(&mut self, index: usize, velocity: Vector2) -> Result<()> {
        if !vector::is_finite(velocity) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        self.atom_mut(index)?.velocity = velocity;
        Ok(())
    }

    fn atom_mut(&mut self, index: usize) -> Result<&mut Atom> {
        let len = self.atoms.len();
        self.atoms
            .get_mut(index)
            .ok_or(Error::NoSuchAtom { index, len })
    }

    pub fn total_kinetic_energy(&self) -> f64 {
        self.atoms.iter().map(Atom::kinetic_energy).sum()
    }

    pub fn total_momentum(&self) -> Vector2 {
        self.atoms.iter().map(Atom::momentum).sum()
    }

    /// Advance the world by `dt` seconds: integrate every atom, then resolve contacts.
    ///
    /// A zero `dt` still runs collision resolution. A negative or non-finite
    /// `dt` is refused and leaves the world untouched.
    pub fn update(&mut self, dt: f64) {
        if !dt.is_finite() || dt < 0.0 {
            warn!(dt, "refusing update with negative or non-finite dt");
            return;
        }

        integrator::integrate(&mut self.atoms, self.drag, dt);
        self.last_contacts = collision::resolve(&mut self.atoms, self.collisions);

        trace!(dt, contacts = self.last_contacts, "world updated");
    }
}
