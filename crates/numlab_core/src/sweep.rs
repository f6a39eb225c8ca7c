//! Drivers that run the integrators over fixed configurations and hand each
//! run to an optional rendering sink.

use crate::error::NumError;
use crate::euler::explicit_euler;
use crate::grid;
use crate::reference::{max_abs_error, LogisticProblem};
use crate::symplectic::{symplectic_euler, PhaseTrajectory, UpdateOrder};
use serde::{Deserialize, Serialize};

/// Step-size sweep for explicit Euler on the logistic problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EulerSweepConfig {
    pub step_sizes: Vec<f64>,
    pub t_end: f64,
    pub problem: LogisticProblem,
}

impl Default for EulerSweepConfig {
    fn default() -> Self {
        Self {
            step_sizes: vec![0.2, 0.1, 0.05, 0.01],
            t_end: 10.0,
            problem: LogisticProblem::default(),
        }
    }
}

/// One independent run of the sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRun {
    pub step_size: f64,
    pub t: Vec<f64>,
    pub numeric: Vec<f64>,
    pub exact: Vec<f64>,
    pub max_error: f64,
}

/// Runs explicit Euler once per step size, each from the same initial value.
pub fn run_logistic_sweep(
    config: &EulerSweepConfig,
    mut sink: Option<&mut dyn FnMut(&SweepRun)>,
) -> Result<Vec<SweepRun>, NumError> {
    if config.step_sizes.is_empty() {
        return Err(NumError::invalid("step-size sweep is empty"));
    }

    let problem = config.problem;
    let mut runs = Vec::with_capacity(config.step_sizes.len());
    for &h in &config.step_sizes {
        let t = grid::arange(0.0, config.t_end, h)?;
        let numeric = explicit_euler(problem.initial_value(), &t, |y| problem.rhs(y))?;
        let exact: Vec<f64> = t.iter().map(|&ti| problem.exact(ti)).collect();
        let max_error = max_abs_error(&numeric, &exact)?;
        log::debug!("logistic sweep h={h}: {} points, max error {max_error:.3e}", t.len());

        let run = SweepRun {
            step_size: h,
            t,
            numeric,
            exact,
            max_error,
        };
        if let Some(render) = sink.as_deref_mut() {
            render(&run);
        }
        runs.push(run);
    }
    Ok(runs)
}

/// Forced-oscillator run parameters. The grid is `linspace(0, t_end, N)`
/// with `N = floor(t_end / step) + 1`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OscillatorConfig {
    pub t_end: f64,
    pub step: f64,
    pub x0: f64,
    pub v0: f64,
    pub order: UpdateOrder,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            t_end: 10.0,
            step: 0.01,
            x0: 0.0,
            v0: 1.0,
            order: UpdateOrder::Lagged,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OscillatorRun {
    pub trajectory: PhaseTrajectory,
    /// Last energy sample divided by the first (NaN when the first is zero).
    pub energy_drift: f64,
}

pub fn run_forced_oscillator<G>(
    config: &OscillatorConfig,
    forcing: G,
    sink: Option<&mut dyn FnMut(&PhaseTrajectory)>,
) -> Result<OscillatorRun, NumError>
where
    G: Fn(f64) -> f64,
{
    if !(config.step.is_finite() && config.step > 0.0) {
        return Err(NumError::invalid(format!(
            "oscillator step must be positive (got {})",
            config.step
        )));
    }
    if !(config.t_end.is_finite() && config.t_end >= 0.0) {
        return Err(NumError::invalid(format!(
            "oscillator horizon must be non-negative (got {})",
            config.t_end
        )));
    }
    let count = grid::point_count(config.t_end, config.step)?;
    let t = grid::linspace(0.0, config.t_end, count)?;
    let trajectory = symplectic_euler(config.x0, config.v0, &t, forcing, config.order)?;

    let energy = trajectory.energy();
    let first = energy[0];
    let last = energy[energy.len() - 1];
    let energy_drift = if first == 0.0 { f64::NAN } else { last / first };

    if let Some(render) = sink {
        render(&trajectory);
    }
    Ok(OscillatorRun {
        trajectory,
        energy_drift,
    })
}
