use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// Numeric types the integrators can run in.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A first-order system x' = f(t, x) of fixed dimension.
pub trait DynamicalSystem<T: Scalar> {
    fn dimension(&self) -> usize;

    /// Writes f(t, x) into `out`. Must not depend on anything but `t` and `x`.
    fn apply(&self, t: T, x: &[T], out: &mut [T]);
}

/// A scalar autonomous right-hand side y' = f(y) seen as a one-dimensional system.
#[derive(Debug, Clone, Copy)]
pub struct Autonomous<F>(pub F);

impl<T: Scalar, F: Fn(T) -> T> DynamicalSystem<T> for Autonomous<F> {
    fn dimension(&self) -> usize {
        1
    }

    fn apply(&self, _t: T, x: &[T], out: &mut [T]) {
        out[0] = (self.0)(x[0]);
    }
}

/// A one-step method: the next state depends only on the current one.
pub trait Steppable<T: Scalar> {
    /// Advances `state` from `t` to `t + dt`, updating both in place.
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T);
}
