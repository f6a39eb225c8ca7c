//! Krylov solvers and preconditioners over CSR matrices.
//!
//! Solvers report progress through an [`IterationObserver`] instead of
//! keeping counters in their own loop state, and report non-convergence as a
//! [`SolveStatus`] rather than an error.

mod cg;
mod gmres;
mod ilu;

pub use cg::{conjugate_gradient, CgSettings};
pub use gmres::{gmres, GmresSettings};
pub use ilu::{build_preconditioner, IluSettings, IncompleteLu, PreconditionerOutcome};

use crate::error::NumError;
use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;
use serde::{Deserialize, Serialize};

/// Approximate inverse M^{-1} applied to a residual.
pub trait Preconditioner {
    /// Writes z = M^{-1} r.
    fn apply(&self, r: &DVector<f64>, z: &mut DVector<f64>);

    fn name(&self) -> &str;
}

/// M = I.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Preconditioner for Identity {
    fn apply(&self, r: &DVector<f64>, z: &mut DVector<f64>) {
        z.copy_from(r);
    }

    fn name(&self) -> &str {
        "None"
    }
}

/// Called once per solver iteration with the current residual norm.
pub trait IterationObserver {
    fn on_iteration(&mut self, iteration: usize, residual_norm: f64);
}

impl<F: FnMut(usize, f64)> IterationObserver for F {
    fn on_iteration(&mut self, iteration: usize, residual_norm: f64) {
        self(iteration, residual_norm)
    }
}

/// Counts iterations.
#[derive(Debug, Clone, Copy, Default)]
pub struct IterationCounter {
    pub iterations: usize,
}

impl IterationObserver for IterationCounter {
    fn on_iteration(&mut self, _iteration: usize, _residual_norm: f64) {
        self.iterations += 1;
    }
}

/// Records every residual norm, e.g. for a convergence plot.
#[derive(Debug, Clone, Default)]
pub struct ResidualHistory {
    pub norms: Vec<f64>,
}

impl IterationObserver for ResidualHistory {
    fn on_iteration(&mut self, _iteration: usize, residual_norm: f64) {
        self.norms.push(residual_norm);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    Converged,
    MaxIterationsReached,
    /// The Krylov recurrence could not continue (e.g. CG on an indefinite matrix).
    Breakdown,
}

#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub solution: DVector<f64>,
    pub iterations: usize,
    pub residual_norm: f64,
    pub status: SolveStatus,
}

impl SolveOutcome {
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }
}

/// y = A x.
pub fn spmv(a: &CsrMatrix<f64>, x: &DVector<f64>, y: &mut DVector<f64>) {
    for (i, row) in a.row_iter().enumerate() {
        let mut sum = 0.0;
        for (&j, &value) in row.col_indices().iter().zip(row.values()) {
            sum += value * x[j];
        }
        y[i] = sum;
    }
}

/// ||b - A x||_2
pub fn residual_norm(a: &CsrMatrix<f64>, b: &DVector<f64>, x: &DVector<f64>) -> f64 {
    let mut ax = DVector::zeros(b.len());
    spmv(a, x, &mut ax);
    (b - ax).norm()
}

/// Shared argument checks for the Krylov entry points.
pub(crate) fn check_system(
    a: &CsrMatrix<f64>,
    b: &DVector<f64>,
    x0: Option<&DVector<f64>>,
    tolerance: f64,
    max_iterations: usize,
) -> Result<(), NumError> {
    if a.nrows() != a.ncols() {
        return Err(NumError::invalid(format!(
            "matrix must be square (got {}x{})",
            a.nrows(),
            a.ncols()
        )));
    }
    if b.len() != a.nrows() {
        return Err(NumError::invalid(format!(
            "right-hand side length {} does not match matrix size {}",
            b.len(),
            a.nrows()
        )));
    }
    if let Some(x0) = x0 {
        if x0.len() != a.ncols() {
            return Err(NumError::invalid(format!(
                "initial guess length {} does not match matrix size {}",
                x0.len(),
                a.ncols()
            )));
        }
    }
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(NumError::invalid(format!(
            "tolerance must be positive (got {tolerance})"
        )));
    }
    if max_iterations == 0 {
        return Err(NumError::invalid("max_iterations must be greater than zero"));
    }
    Ok(())
}
