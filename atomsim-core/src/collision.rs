//! Circle-circle contact detection and resolution.
//!
//! Every pair of atoms is tested (no broad phase). An overlapping pair is
//! pushed apart along the contact normal in proportion to inverse mass, and
//! if the pair is closing along that normal it receives a restitution impulse.
//!
//! Two independent knobs select how pairs are visited and when their effects
//! land, see [`CollisionSettings`].

use crate::engine::Atom;
use crate::vector::Vector2;

/// Coefficient of restitution applied to every contact
pub const RESTITUTION: f64 = 0.5;

/// Which pairs of atoms are tested each tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PairTraversal {
    /// Pairs `(i, j)` with `i < j`: each contact is resolved once.
    #[default]
    Unordered,
    /// Every ordered pair `(i, j)` with `i != j`: each contact is visited twice,
    /// once from each side.
    Ordered,
}

/// When the effects of a pair are written back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Resolution {
    /// Apply each pair immediately; later pairs see the updated atoms.
    #[default]
    Sequential,
    /// Evaluate every pair against the state at the start of the pass, sum the
    /// per-atom changes, then apply them together.
    Deferred,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionSettings {
    pub pairs: PairTraversal,
    pub resolution: Resolution,
}

/// Geometry of one overlapping pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector pointing from `a` toward `b`
    pub normal: Vector2,
    /// Overlap depth, always > 0
    pub penetration: f64,
}

/// Changes a contact makes to its pair. `a` receives the negated share.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactResponse {
    pub a_position: Vector2,
    pub b_position: Vector2,
    pub a_velocity: Vector2,
    pub b_velocity: Vector2,
}

/// Test two atoms for overlap.
///
/// Touching circles (`penetration == 0`) are not in contact. When both centers
/// coincide the direction is undefined and `fallback` is used as the normal.
pub fn find_contact(a: &Atom, b: &Atom, fallback: Vector2) -> Option<Contact> {
    let diff = b.position - a.position;
    let dist = diff.length();
    let penetration = a.radius() + b.radius() - dist;
    if penetration <= 0.0 {
        return None;
    }

    let normal = if dist > 0.0 { diff / dist } else { fallback };
    Some(Contact {
        normal,
        penetration,
    })
}

/// Positional correction and impulse for one contact.
pub fn respond(a: &Atom, b: &Atom, contact: Contact) -> ContactResponse {
    let ima = a.inverse_mass();
    let imb = b.inverse_mass();
    let total = ima + imb;

    let separation = contact.normal * (contact.penetration / total);

    // closing speed along the normal; separating pairs keep their velocities
    let impact = (a.velocity - b.velocity).dot(contact.normal);
    let impulse = if impact > 0.0 {
        contact.normal * ((1.0 + RESTITUTION) * impact / total)
    } else {
        Vector2::ZERO
    };

    ContactResponse {
        a_position: -separation * ima,
        b_position: separation * imb,
        a_velocity: -impulse * ima,
        b_velocity: impulse * imb,
    }
}

/// Normal used for coincident centers. It flips with visit order so that the
/// `(a, b)` and `(b, a)` visits push the pair the same way.
#[inline]
fn fallback_normal(i: usize, j: usize) -> Vector2 {
    if i < j {
        Vector2::X
    } else {
        Vector2::NEG_X
    }
}

fn pairs(len: usize, traversal: PairTraversal) -> impl Iterator<Item = (usize, usize)> {
    (0..len).flat_map(move |i| {
        let start = match traversal {
            PairTraversal::Unordered => i + 1,
            PairTraversal::Ordered => 0,
        };
        (start..len).filter(move |&j| j != i).map(move |j| (i, j))
    })
}

/// Two distinct mutable atoms out of one slice
fn pair_mut(atoms: &mut [Atom], i: usize, j: usize) -> (&mut Atom, &mut Atom) {
    debug_assert_ne!(i, j);
    if i < j {
        let (left, right) = atoms.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = atoms.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

/// Resolve every contact among `atoms` once. Returns how many pair visits found a contact.
pub fn resolve(atoms: &mut [Atom], settings: CollisionSettings) -> usize {
    match settings.resolution {
        Resolution::Sequential => resolve_sequential(atoms, settings.pairs),
        Resolution::Deferred => resolve_deferred(atoms, settings.pairs),
    }
}

fn resolve_sequential(atoms: &mut [Atom], traversal: PairTraversal) -> usize {
    let mut contacts = 0;
    for (i, j) in pairs(atoms.len(), traversal) {
        let (a, b) = pair_mut(atoms, i, j);
        let Some(contact) = find_contact(a, b, fallback_normal(i, j)) else {
            continue;
        };
        let response = respond(a, b, contact);
        a.position += response.a_position;
        b.position += response.b_position;
        a.velocity += response.a_velocity;
        b.velocity += response.b_velocity;
        contacts += 1;
    }
    contacts
}

fn resolve_deferred(atoms: &mut [Atom], traversal: PairTraversal) -> usize {
    let mut position_deltas = vec![Vector2::ZERO; atoms.len()];
    let mut velocity_deltas = vec![Vector2::ZERO; atoms.len()];
    let mut contacts = 0;

    for (i, j) in pairs(atoms.len(), traversal) {
        let (a, b) = (&atoms[i], &atoms[j]);
        let Some(contact) = find_contact(a, b, fallback_normal(i, j)) else {
            continue;
        };
        let response = respond(a, b, contact);
        position_deltas[i] += response.a_position;
        position_deltas[j] += response.b_position;
        velocity_deltas[i] += response.a_velocity;
        velocity_deltas[j] += response.b_velocity;
        contacts += 1;
    }

    for ((atom, dp), dv) in atoms.iter_mut().zip(position_deltas).zip(velocity_deltas) {
        atom.position += dp;
        atom.velocity += dv;
    }
    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::vector2;

    fn atom(x: f64, y: f64, vx: f64, vy: f64, radius: f64, mass: f64) -> Atom {
        Atom::with_radius_mass(vector2(x, y), vector2(vx, vy), radius, mass).unwrap()
    }

    #[test]
    fn pair_enumeration() {
        let unordered: Vec<_> = pairs(3, PairTraversal::Unordered).collect();
        assert_eq!(unordered, vec![(0, 1), (0, 2), (1, 2)]);

        let ordered: Vec<_> = pairs(3, PairTraversal::Ordered).collect();
        assert_eq!(
            ordered,
            vec![(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)]
        );

        assert_eq!(pairs(1, PairTraversal::Ordered).count(), 0);
        assert_eq!(pairs(0, PairTraversal::Unordered).count(), 0);
    }

    #[test]
    fn pair_mut_returns_requested_order() {
        let mut atoms = vec![
            atom(0.0, 0.0, 0.0, 0.0, 1.0, 1.0),
            atom(1.0, 0.0, 0.0, 0.0, 1.0, 1.0),
            atom(2.0, 0.0, 0.0, 0.0, 1.0, 1.0),
        ];
        let (a, b) = pair_mut(&mut atoms, 2, 0);
        assert_eq!(a.position.x, 2.0);
        assert_eq!(b.position.x, 0.0);
        let (a, b) = pair_mut(&mut atoms, 1, 2);
        assert_eq!(a.position.x, 1.0);
        assert_eq!(b.position.x, 2.0);
    }

    #[test]
    fn tangent_atoms_are_not_in_contact() {
        let a = atom(0.0, 0.0, 1.0, 0.0, 1.0, 1.0);
        let b = atom(2.0, 0.0, -1.0, 0.0, 1.0, 1.0);
        assert!(find_contact(&a, &b, Vector2::X).is_none());

        let mut atoms = vec![a.clone(), b.clone()];
        assert_eq!(resolve(&mut atoms, CollisionSettings::default()), 0);
        assert_eq!(atoms, vec![a, b]);
    }

    #[test]
    fn contact_normal_points_from_a_to_b() {
        let a = atom(1.0, 1.0, 0.0, 0.0, 1.0, 1.0);
        let b = atom(1.0, 2.5, 0.0, 0.0, 1.0, 1.0);
        let contact = find_contact(&a, &b, Vector2::X).unwrap();
        assert_eq!(contact.normal, Vector2::Y);
        assert!((contact.penetration - 0.5).abs() < 1e-12);
    }

    #[test]
    fn coincident_centers_use_fallback() {
        let a = atom(3.0, 3.0, 0.0, 0.0, 1.0, 1.0);
        let b = atom(3.0, 3.0, 0.0, 0.0, 1.0, 1.0);
        let contact = find_contact(&a, &b, Vector2::NEG_X).unwrap();
        assert_eq!(contact.normal, Vector2::NEG_X);
        assert_eq!(contact.penetration, 2.0);
    }

    #[test]
    fn separating_pair_gets_no_impulse() {
        let a = atom(0.0, 0.0, -1.0, 0.0, 1.0, 1.0);
        let b = atom(1.0, 0.0, 1.0, 0.0, 1.0, 1.0);
        let contact = find_contact(&a, &b, Vector2::X).unwrap();
        let response = respond(&a, &b, contact);
        assert_eq!(response.a_velocity, Vector2::ZERO);
        assert_eq!(response.b_velocity, Vector2::ZERO);
        assert!(response.a_position.x < 0.0);
        assert!(response.b_position.x > 0.0);
    }

    #[test]
    fn heavier_atom_moves_less() {
        let a = atom(0.0, 0.0, 0.0, 0.0, 1.0, 1.0);
        let b = atom(1.0, 0.0, 0.0, 0.0, 1.0, 3.0);
        let contact = find_contact(&a, &b, Vector2::X).unwrap();
        let response = respond(&a, &b, contact);

        // penetration 1.0 split 3:1 by inverse mass
        assert!((response.a_position.x + 0.75).abs() < 1e-12);
        assert!((response.b_position.x - 0.25).abs() < 1e-12);
    }

    #[test]
    fn deferred_evaluates_against_start_state() {
        // three atoms in a row; the middle one touches both neighbours
        let atoms = vec![
            atom(0.0, 0.0, 0.0, 0.0, 1.0, 1.0),
            atom(1.5, 0.0, 0.0, 0.0, 1.0, 1.0),
            atom(3.0, 0.0, 0.0, 0.0, 1.0, 1.0),
        ];
        let mut deferred = atoms.clone();
        let settings = CollisionSettings {
            pairs: PairTraversal::Unordered,
            resolution: Resolution::Deferred,
        };
        assert_eq!(resolve(&mut deferred, settings), 2);

        // the middle atom is pushed equally from both sides
        assert!((deferred[1].position.x - 1.5).abs() < 1e-12);
        assert!((deferred[0].position.x + 0.25).abs() < 1e-12);
        assert!((deferred[2].position.x - 3.25).abs() < 1e-12);

        let mut sequential = atoms;
        resolve(&mut sequential, CollisionSettings::default());
        assert!(sequential[1].position.x != 1.5);
    }
}
