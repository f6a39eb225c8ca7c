use super::{check_system, Identity, IterationObserver, Preconditioner, SolveOutcome, SolveStatus};
use crate::error::NumError;
use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CgSettings {
    /// Relative tolerance: stop once ||r|| <= tolerance * ||b||.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for CgSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 1000,
        }
    }
}

/// Preconditioned Conjugate Gradient for symmetric positive definite `a`.
///
/// The observer sees the residual norm after every update of x.
pub fn conjugate_gradient(
    a: &CsrMatrix<f64>,
    b: &DVector<f64>,
    x0: Option<&DVector<f64>>,
    preconditioner: Option<&dyn Preconditioner>,
    settings: CgSettings,
    mut observer: Option<&mut dyn IterationObserver>,
) -> Result<SolveOutcome, NumError> {
    check_system(a, b, x0, settings.tolerance, settings.max_iterations)?;
    let n = b.len();
    let preconditioner = preconditioner.unwrap_or(&Identity);

    let b_norm = b.norm();
    if b_norm == 0.0 {
        return Ok(SolveOutcome {
            solution: DVector::zeros(n),
            iterations: 0,
            residual_norm: 0.0,
            status: SolveStatus::Converged,
        });
    }
    let threshold = settings.tolerance * b_norm;

    let mut x = x0.cloned().unwrap_or_else(|| DVector::zeros(n));
    let mut ap = DVector::zeros(n);
    super::spmv(a, &x, &mut ap);
    let mut r = b - &ap;
    let mut residual_norm = r.norm();
    if residual_norm <= threshold {
        return Ok(SolveOutcome {
            solution: x,
            iterations: 0,
            residual_norm,
            status: SolveStatus::Converged,
        });
    }

    let mut z = DVector::zeros(n);
    preconditioner.apply(&r, &mut z);
    let mut p = z.clone();
    let mut rz = r.dot(&z);
    let mut status = SolveStatus::MaxIterationsReached;
    let mut iterations = 0;

    for k in 1..=settings.max_iterations {
        super::spmv(a, &p, &mut ap);
        let curvature = p.dot(&ap);
        if !(curvature.is_finite() && curvature > 0.0) {
            status = SolveStatus::Breakdown;
            break;
        }

        let alpha = rz / curvature;
        x.axpy(alpha, &p, 1.0);
        r.axpy(-alpha, &ap, 1.0);
        residual_norm = r.norm();
        iterations = k;
        if let Some(observer) = observer.as_deref_mut() {
            observer.on_iteration(k, residual_norm);
        }
        if residual_norm <= threshold {
            status = SolveStatus::Converged;
            break;
        }

        preconditioner.apply(&r, &mut z);
        let rz_next = r.dot(&z);
        if !(rz_next.is_finite() && rz_next != 0.0) {
            status = SolveStatus::Breakdown;
            break;
        }
        let beta = rz_next / rz;
        rz = rz_next;
        p.axpy(1.0, &z, beta);
    }

    log::debug!(
        "CG with {} preconditioner: {:?} after {} iterations (residual {:.3e})",
        preconditioner.name(),
        status,
        iterations,
        residual_norm
    );
    Ok(SolveOutcome {
        solution: x,
        iterations,
        residual_norm,
        status,
    })
}
