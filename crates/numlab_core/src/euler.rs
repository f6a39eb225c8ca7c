use crate::error::NumError;
use crate::grid;
use crate::traits::{Autonomous, DynamicalSystem, Scalar, Steppable};

/// Forward (explicit) Euler: y_next = y + dt * f(t, y).
pub struct ExplicitEuler<T: Scalar> {
    derivative: Vec<T>,
}

impl<T: Scalar> ExplicitEuler<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            derivative: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for ExplicitEuler<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        let t0 = *t;
        system.apply(t0, state, &mut self.derivative);
        for i in 0..state.len() {
            state[i] = state[i] + dt * self.derivative[i];
        }
        *t = t0 + dt;
    }
}

/// Integrates the scalar IVP y' = f(y) along the grid `t`.
///
/// `y[0]` is `y0` exactly and `y[n] = y[n-1] + (t[n] - t[n-1]) * f(y[n-1])`.
/// Large steps may blow up; the trajectory is returned as computed.
pub fn explicit_euler<F>(y0: f64, t: &[f64], f: F) -> Result<Vec<f64>, NumError>
where
    F: Fn(f64) -> f64,
{
    grid::validate(t)?;

    let system = Autonomous(f);
    let mut stepper = ExplicitEuler::new(1);
    let mut state = [y0];
    let mut y = Vec::with_capacity(t.len());
    y.push(y0);
    for n in 1..t.len() {
        let mut time = t[n - 1];
        stepper.step(&system, &mut time, &mut state, t[n] - t[n - 1]);
        y.push(state[0]);
    }
    Ok(y)
}

/// Integrates a vector system along the grid `t`, one state per grid point.
pub fn explicit_euler_system<S>(
    system: &S,
    y0: &[f64],
    t: &[f64],
) -> Result<Vec<Vec<f64>>, NumError>
where
    S: DynamicalSystem<f64>,
{
    grid::validate(t)?;
    let dim = system.dimension();
    if y0.len() != dim {
        return Err(NumError::invalid(format!(
            "initial state dimension mismatch: expected {dim}, got {}",
            y0.len()
        )));
    }

    let mut stepper = ExplicitEuler::new(dim);
    let mut state = y0.to_vec();
    let mut trajectory = Vec::with_capacity(t.len());
    trajectory.push(state.clone());
    for n in 1..t.len() {
        // Restart from the grid value so time does not accumulate rounding.
        let mut time = t[n - 1];
        stepper.step(system, &mut time, &mut state, t[n] - t[n - 1]);
        trajectory.push(state.clone());
    }
    Ok(trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::arange;
    use crate::reference::{max_abs_error, ForcedOscillator, LogisticProblem};

    fn assert_err_contains<T: std::fmt::Debug>(result: Result<T, NumError>, needle: &str) {
        let err = result.expect_err("expected error");
        assert!(err.is_invalid_input(), "expected InvalidInput, got {err:?}");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn exponential_growth_on_unit_grid() {
        let y = explicit_euler(1.0, &[0.0, 1.0, 2.0], |y| y).expect("euler should run");
        assert_eq!(y, vec![1.0, 2.0, 4.0]);
    }

    #[test]
    fn first_value_is_initial_condition() {
        for &y0 in &[0.0, 1.0, -3.5, 1e-300, 42.125] {
            let y = explicit_euler(y0, &[0.0, 0.3, 0.7], |y| 2.0 * y + 1.0).expect("euler");
            assert_eq!(y[0], y0);
            assert_eq!(y.len(), 3);
        }
    }

    #[test]
    fn rejects_short_or_non_increasing_grids() {
        assert_err_contains(explicit_euler(1.0, &[], |y| y), "at least 2 points");
        assert_err_contains(explicit_euler(1.0, &[0.0], |y| y), "at least 2 points");
        assert_err_contains(explicit_euler(1.0, &[0.0, 0.0], |y| y), "strictly increasing");
        assert_err_contains(
            explicit_euler(1.0, &[0.0, 1.0, 0.5], |y| y),
            "strictly increasing",
        );
    }

    #[test]
    fn uses_each_local_step() {
        let y = explicit_euler(1.0, &[0.0, 0.5, 2.0], |_| 1.0).expect("euler");
        assert_eq!(y, vec![1.0, 1.5, 3.0]);
    }

    #[test]
    fn unstable_steps_are_not_suppressed() {
        // y' = -50 y with h = 0.1 has amplification |1 - 5| = 4 per step.
        let t = arange(0.0, 2.0, 0.1).expect("grid");
        let y = explicit_euler(1.0, &t, |y| -50.0 * y).expect("euler");
        assert!(y[y.len() - 1].abs() > 1e10);
    }

    #[test]
    fn logistic_error_shrinks_with_step_size() {
        let problem = LogisticProblem::default();
        let mut errors = Vec::new();
        for &h in &[0.2, 0.1, 0.05, 0.01] {
            let t = arange(0.0, 10.0, h).expect("grid");
            let y = explicit_euler(problem.initial_value(), &t, |y| problem.rhs(y))
                .expect("euler");
            let exact: Vec<f64> = t.iter().map(|&ti| problem.exact(ti)).collect();
            errors.push(max_abs_error(&y, &exact).expect("error"));
        }
        for pair in errors.windows(2) {
            assert!(pair[1] < pair[0], "errors not decreasing: {errors:?}");
        }
        assert!(errors[3] < errors[0]);
    }

    #[test]
    fn system_stepper_matches_scalar_stepper() {
        struct Growth;
        impl DynamicalSystem<f64> for Growth {
            fn dimension(&self) -> usize {
                1
            }
            fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
                out[0] = x[0];
            }
        }
        let trajectory =
            explicit_euler_system(&Growth, &[1.0], &[0.0, 1.0, 2.0]).expect("euler");
        assert_eq!(trajectory, vec![vec![1.0], vec![2.0], vec![4.0]]);
        assert_err_contains(
            explicit_euler_system(&Growth, &[1.0, 2.0], &[0.0, 1.0]),
            "dimension mismatch",
        );
    }

    #[test]
    fn explicit_oscillator_amplitude_grows_every_step() {
        let system = ForcedOscillator::free();
        let t = arange(0.0, 10.0, 0.01).expect("grid");
        let trajectory = explicit_euler_system(&system, &[1.0, 0.0], &t).expect("euler");
        assert_eq!(trajectory.len(), 1001);
        let energy: Vec<f64> = trajectory.iter().map(|s| s[0] * s[0] + s[1] * s[1]).collect();
        for pair in energy.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        assert!(energy[1000] > 1.05);
    }

    #[test]
    fn stepper_advances_time() {
        struct Constant;
        impl DynamicalSystem<f32> for Constant {
            fn dimension(&self) -> usize {
                2
            }
            fn apply(&self, _t: f32, _x: &[f32], out: &mut [f32]) {
                out[0] = 1.0;
                out[1] = -2.0;
            }
        }
        let mut stepper = ExplicitEuler::<f32>::new(2);
        let mut t = 0.0f32;
        let mut state = [0.0f32, 0.0];
        stepper.step(&Constant, &mut t, &mut state, 0.5);
        assert_eq!(t, 0.5);
        assert_eq!(state, [0.5, -1.0]);
    }
}
