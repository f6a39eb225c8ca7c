//! Semi-implicit (symplectic) Euler for the forced unit-frequency oscillator.
//!
//! The state is `[x, v]` with x' = v and v' = a(t, x). Three update orders are
//! supported; they differ only in whether the velocity (or position) update
//! sees the freshly computed partner coordinate.

use crate::error::NumError;
use crate::grid;
use crate::reference::ForcedOscillator;
use crate::traits::{DynamicalSystem, Scalar, Steppable};
use serde::{Deserialize, Serialize};

/// Which coordinate each half of the step reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOrder {
    /// x[n] = x + h v, v[n] = v + h a(t, x): both halves read the old state.
    #[default]
    Lagged,
    /// x[n] = x + h v, then v[n] = v + h a(t, x[n]).
    PositionFirst,
    /// v[n] = v + h a(t, x), then x[n] = x + h v[n].
    VelocityFirst,
}

pub struct SymplecticEuler<T: Scalar> {
    order: UpdateOrder,
    field: Vec<T>,
}

impl<T: Scalar> SymplecticEuler<T> {
    pub fn new(order: UpdateOrder) -> Self {
        Self {
            order,
            field: vec![T::zero(); 2],
        }
    }

    pub fn order(&self) -> UpdateOrder {
        self.order
    }
}

impl<T: Scalar> Steppable<T> for SymplecticEuler<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        let t0 = *t;
        let x = state[0];
        let v = state[1];

        match self.order {
            UpdateOrder::Lagged => {
                system.apply(t0, state, &mut self.field);
                state[0] = x + dt * v;
                state[1] = v + dt * self.field[1];
            }
            UpdateOrder::PositionFirst => {
                state[0] = x + dt * v;
                system.apply(t0, state, &mut self.field);
                state[1] = v + dt * self.field[1];
            }
            UpdateOrder::VelocityFirst => {
                system.apply(t0, state, &mut self.field);
                state[1] = v + dt * self.field[1];
                state[0] = x + dt * state[1];
            }
        }

        *t = t0 + dt;
    }
}

/// Position and velocity sampled on a time grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTrajectory {
    pub t: Vec<f64>,
    pub x: Vec<f64>,
    pub v: Vec<f64>,
}

impl PhaseTrajectory {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// x[n]^2 + v[n]^2 at every grid point.
    pub fn energy(&self) -> Vec<f64> {
        self.x
            .iter()
            .zip(&self.v)
            .map(|(x, v)| x * x + v * v)
            .collect()
    }
}

/// Integrates x' = v, v' = -x + g(t) on a uniform grid with step h = t[1] - t[0].
///
/// A single-point grid yields just the initial state.
pub fn symplectic_euler<G>(
    x0: f64,
    v0: f64,
    t: &[f64],
    forcing: G,
    order: UpdateOrder,
) -> Result<PhaseTrajectory, NumError>
where
    G: Fn(f64) -> f64,
{
    if t.is_empty() {
        return Err(NumError::invalid("time grid needs at least 1 point (got 0)"));
    }
    if t.len() == 1 {
        return Ok(PhaseTrajectory {
            t: t.to_vec(),
            x: vec![x0],
            v: vec![v0],
        });
    }
    let h = grid::uniform_step(t)?;

    let system = ForcedOscillator::new(forcing);
    let mut stepper = SymplecticEuler::new(order);
    let mut state = [x0, v0];
    let mut x = Vec::with_capacity(t.len());
    let mut v = Vec::with_capacity(t.len());
    x.push(x0);
    v.push(v0);

    for n in 1..t.len() {
        let mut time = t[n - 1];
        stepper.step(&system, &mut time, &mut state, h);
        x.push(state[0]);
        v.push(state[1]);
    }

    Ok(PhaseTrajectory {
        t: t.to_vec(),
        x,
        v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::euler::explicit_euler_system;
    use crate::grid::arange;
    use crate::reference::{max_abs_error, sine_forced_position};

    fn zero(_t: f64) -> f64 {
        0.0
    }

    #[test]
    fn lagged_recurrence_on_unit_grid() {
        let run = symplectic_euler(0.0, 1.0, &[0.0, 1.0, 2.0], zero, UpdateOrder::Lagged)
            .expect("integration should run");
        assert_eq!(run.x, vec![0.0, 1.0, 2.0]);
        assert_eq!(run.v, vec![1.0, 1.0, 0.0]);
    }

    #[test]
    fn semi_implicit_orders_on_unit_grid() {
        let run = symplectic_euler(0.0, 1.0, &[0.0, 1.0, 2.0], zero, UpdateOrder::PositionFirst)
            .expect("integration should run");
        assert_eq!(run.x, vec![0.0, 1.0, 1.0]);
        assert_eq!(run.v, vec![1.0, 0.0, -1.0]);

        let run = symplectic_euler(0.0, 1.0, &[0.0, 1.0, 2.0], zero, UpdateOrder::VelocityFirst)
            .expect("integration should run");
        assert_eq!(run.x, vec![0.0, 1.0, 1.0]);
        assert_eq!(run.v, vec![1.0, 1.0, 0.0]);
    }

    #[test]
    fn forcing_is_sampled_at_previous_time() {
        let run = symplectic_euler(0.0, 0.0, &[0.0, 1.0, 2.0], |t| t, UpdateOrder::Lagged)
            .expect("integration should run");
        assert_eq!(run.v, vec![0.0, 0.0, 1.0]);
        assert_eq!(run.x, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn rejects_empty_and_degenerate_grids() {
        let err = symplectic_euler(0.0, 1.0, &[], zero, UpdateOrder::Lagged).unwrap_err();
        assert!(err.is_invalid_input());
        let err = symplectic_euler(0.0, 1.0, &[1.0, 1.0], zero, UpdateOrder::Lagged).unwrap_err();
        assert!(err.is_invalid_input());
        let err = symplectic_euler(0.0, 1.0, &[1.0, 0.5], zero, UpdateOrder::Lagged).unwrap_err();
        assert!(err.is_invalid_input());
        let err =
            symplectic_euler(0.0, 1.0, &[0.0, 1.0, 3.0], zero, UpdateOrder::Lagged).unwrap_err();
        assert!(format!("{err}").contains("not uniform"));
    }

    #[test]
    fn single_point_grid_returns_initial_state() {
        let run = symplectic_euler(0.5, -2.0, &[3.0], zero, UpdateOrder::PositionFirst)
            .expect("integration should run");
        assert_eq!(run.x, vec![0.5]);
        assert_eq!(run.v, vec![-2.0]);
        assert_eq!(run.len(), 1);
    }

    #[test]
    fn semi_implicit_energy_stays_bounded_while_explicit_grows() {
        let t = arange(0.0, 10.0, 0.01).expect("grid");
        assert_eq!(t.len(), 1001);

        for order in [UpdateOrder::PositionFirst, UpdateOrder::VelocityFirst] {
            let run = symplectic_euler(1.0, 0.0, &t, zero, order).expect("integration");
            for e in run.energy() {
                assert!(e > 0.99 && e < 1.01, "{order:?} energy drifted to {e}");
            }
        }

        let explicit =
            explicit_euler_system(&ForcedOscillator::free(), &[1.0, 0.0], &t).expect("euler");
        let energy: Vec<f64> = explicit.iter().map(|s| s[0] * s[0] + s[1] * s[1]).collect();
        for pair in energy.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        assert!(energy[1000] > 1.05);
    }

    #[test]
    fn lagged_order_coincides_with_explicit_euler() {
        let t = arange(0.0, 10.0, 0.125).expect("grid");
        let run = symplectic_euler(1.0, 0.0, &t, f64::sin, UpdateOrder::Lagged).expect("run");
        let explicit = explicit_euler_system(&ForcedOscillator::new(f64::sin), &[1.0, 0.0], &t)
            .expect("euler");
        for (n, state) in explicit.iter().enumerate() {
            assert_eq!(run.x[n], state[0]);
            assert_eq!(run.v[n], state[1]);
        }
    }

    #[test]
    fn sine_forced_error_shrinks_with_step() {
        let mut errors = Vec::new();
        for &h in &[0.02, 0.005] {
            let t = arange(0.0, 10.0, h).expect("grid");
            let run = symplectic_euler(0.0, 1.0, &t, f64::sin, UpdateOrder::PositionFirst)
                .expect("run");
            let exact: Vec<f64> = t.iter().map(|&ti| sine_forced_position(ti)).collect();
            errors.push(max_abs_error(&run.x, &exact).expect("error"));
        }
        assert!(errors[1] < errors[0], "errors: {errors:?}");
        assert!(errors[1] < 0.2);
    }

    #[test]
    fn stepper_reports_order_and_advances_time() {
        let mut stepper = SymplecticEuler::<f64>::new(UpdateOrder::VelocityFirst);
        assert_eq!(stepper.order(), UpdateOrder::VelocityFirst);
        let mut t = 0.0;
        let mut state = [1.0, 0.0];
        stepper.step(&ForcedOscillator::free(), &mut t, &mut state, 0.5);
        assert_eq!(t, 0.5);
        assert_eq!(state, [0.75, -0.5]);
    }
}
