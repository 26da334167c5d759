use crate::engine::Atom;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-atom drag coefficient: the world's drag scaled by radius over mass.
#[inline]
pub fn drag_coefficient(drag: f64, atom: &Atom) -> f64 {
    drag * atom.radius() / atom.mass()
}

/// Ratio between speed after and before a step of quadratic drag `dv/dt = -k v²`.
///
/// The step is implicit in the speed: `v1 = v0 - k v1² dt`, whose positive root
/// gives `v1 / v0 = (sqrt(1 + 4x) - 1) / 2x` with `x = v0 k dt`. This is
/// evaluated as `2 / (1 + sqrt(1 + 4x))`, the same value without the 0/0 at
/// `x = 0` or the cancellation for tiny `x`.
#[inline]
pub fn drag_factor(speed: f64, coefficient: f64, dt: f64) -> f64 {
    let x = speed * coefficient * dt;
    // stationary atom, no drag or no time; NaN from 0 * inf lands here too
    if !(x > 0.0) {
        return 1.0;
    }
    2.0 / (1.0 + (1.0 + 4.0 * x).sqrt())
}

/// Advance one atom by dt: move with the velocity from the start of the step,
/// then decay that velocity by drag. Direction is preserved.
#[inline]
pub fn integrate_atom(atom: &mut Atom, drag: f64, dt: f64) {
    let coefficient = drag_coefficient(drag, atom);
    let speed = atom.velocity.length();

    atom.position += atom.velocity * dt;
    atom.velocity *= drag_factor(speed, coefficient, dt);
}

/// Integrate every atom. Atoms do not interact here, so order does not matter.
pub fn integrate(atoms: &mut [Atom], drag: f64, dt: f64) {
    #[cfg(feature = "parallel")]
    atoms
        .par_iter_mut()
        .for_each(|atom| integrate_atom(atom, drag, dt));

    #[cfg(not(feature = "parallel"))]
    atoms
        .iter_mut()
        .for_each(|atom| integrate_atom(atom, drag, dt));
}
