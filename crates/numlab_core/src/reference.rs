//! Closed-form solutions and error measures used to judge the integrators.

use crate::error::NumError;
use crate::traits::DynamicalSystem;
use serde::{Deserialize, Serialize};

/// Logistic growth y' = (1 - y/K) y with y(0) = K / (1 + C).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LogisticProblem {
    pub carrying_capacity: f64,
    pub offset: f64,
}

impl Default for LogisticProblem {
    fn default() -> Self {
        Self {
            carrying_capacity: 100.0,
            offset: 99.0,
        }
    }
}

impl LogisticProblem {
    pub fn rhs(&self, y: f64) -> f64 {
        (1.0 - y / self.carrying_capacity) * y
    }

    /// K / (1 + C e^{-t})
    pub fn exact(&self, t: f64) -> f64 {
        self.carrying_capacity / (1.0 + self.offset * (-t).exp())
    }

    pub fn initial_value(&self) -> f64 {
        self.exact(0.0)
    }
}

/// Unit-frequency oscillator under external forcing: x' = v, v' = -x + g(t).
/// State layout is `[x, v]`.
#[derive(Clone, Copy)]
pub struct ForcedOscillator<G> {
    forcing: G,
}

impl<G: Fn(f64) -> f64> ForcedOscillator<G> {
    pub fn new(forcing: G) -> Self {
        Self { forcing }
    }
}

impl ForcedOscillator<fn(f64) -> f64> {
    /// The unforced oscillator (g = 0).
    pub fn free() -> Self {
        Self::new(no_forcing as fn(f64) -> f64)
    }
}

fn no_forcing(_t: f64) -> f64 {
    0.0
}

impl<G: Fn(f64) -> f64> DynamicalSystem<f64> for ForcedOscillator<G> {
    fn dimension(&self) -> usize {
        2
    }

    fn apply(&self, t: f64, x: &[f64], out: &mut [f64]) {
        out[0] = x[1];
        out[1] = -x[0] + (self.forcing)(t);
    }
}

/// Exact position for x'' + x = sin t, x(0) = 0, x'(0) = 1.
pub fn sine_forced_position(t: f64) -> f64 {
    1.5 * t.sin() - 0.5 * t * t.cos()
}

/// Exact velocity for x'' + x = sin t, x(0) = 0, x'(0) = 1.
pub fn sine_forced_velocity(t: f64) -> f64 {
    t.cos() + 0.5 * t * t.sin()
}

/// Largest pointwise deviation between two equally long sequences.
pub fn max_abs_error(numeric: &[f64], exact: &[f64]) -> Result<f64, NumError> {
    if numeric.is_empty() {
        return Err(NumError::invalid("cannot measure error of an empty trajectory"));
    }
    if numeric.len() != exact.len() {
        return Err(NumError::invalid(format!(
            "trajectory length mismatch: {} numeric vs {} exact",
            numeric.len(),
            exact.len()
        )));
    }
    Ok(numeric
        .iter()
        .zip(exact)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logistic_exact_matches_initial_value_and_limit() {
        let problem = LogisticProblem::default();
        assert_eq!(problem.initial_value(), 1.0);
        assert!((problem.exact(50.0) - 100.0).abs() < 1e-9);
        assert_eq!(problem.rhs(100.0), 0.0);
        assert!((problem.rhs(50.0) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn logistic_exact_satisfies_ode() {
        let problem = LogisticProblem::default();
        let eps = 1e-6;
        for &t in &[0.5, 2.0, 4.6, 7.0] {
            let derivative = (problem.exact(t + eps) - problem.exact(t - eps)) / (2.0 * eps);
            assert!((derivative - problem.rhs(problem.exact(t))).abs() < 1e-5);
        }
    }

    #[test]
    fn sine_forced_solution_satisfies_ode() {
        assert_eq!(sine_forced_position(0.0), 0.0);
        assert_eq!(sine_forced_velocity(0.0), 1.0);
        let eps = 1e-5;
        for &t in &[0.3, 1.7, 5.0, 9.1] {
            let dx = (sine_forced_position(t + eps) - sine_forced_position(t - eps)) / (2.0 * eps);
            let dv = (sine_forced_velocity(t + eps) - sine_forced_velocity(t - eps)) / (2.0 * eps);
            assert!((dx - sine_forced_velocity(t)).abs() < 1e-6);
            assert!((dv - (-sine_forced_position(t) + t.sin())).abs() < 1e-6);
        }
    }

    #[test]
    fn oscillator_vector_field() {
        let system = ForcedOscillator::new(|t: f64| 2.0 * t);
        let mut out = [0.0; 2];
        system.apply(1.5, &[0.25, -1.0], &mut out);
        assert_eq!(out, [-1.0, -0.25 + 3.0]);
        ForcedOscillator::free().apply(3.0, &[0.5, 2.0], &mut out);
        assert_eq!(out, [2.0, -0.5]);
    }

    #[test]
    fn max_abs_error_picks_largest_gap() {
        let err = max_abs_error(&[1.0, 2.0, 3.0], &[1.0, 2.5, 2.9]).expect("error");
        assert!((err - 0.5).abs() < 1e-12);
        assert!(max_abs_error(&[], &[]).is_err());
        assert!(max_abs_error(&[1.0], &[1.0, 2.0]).is_err());
    }
}
