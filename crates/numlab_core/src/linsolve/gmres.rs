use super::{check_system, Identity, IterationObserver, Preconditioner, SolveOutcome, SolveStatus};
use crate::error::NumError;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GmresSettings {
    /// Krylov basis size before the cycle restarts.
    pub restart: usize,
    /// Relative tolerance: stop once ||r|| <= tolerance * ||b||.
    pub tolerance: f64,
    /// Cap on inner iterations summed over all cycles.
    pub max_iterations: usize,
}

impl Default for GmresSettings {
    fn default() -> Self {
        Self {
            restart: 20,
            tolerance: 1e-6,
            max_iterations: 10_000,
        }
    }
}

/// Restarted GMRES(m) with right preconditioning, solving A M^{-1} u = b, x = M^{-1} u.
///
/// Right preconditioning keeps the least-squares residual equal to the true
/// residual, so the norm handed to the observer after each inner iteration is
/// directly comparable to the stopping threshold.
pub fn gmres(
    a: &CsrMatrix<f64>,
    b: &DVector<f64>,
    x0: Option<&DVector<f64>>,
    preconditioner: Option<&dyn Preconditioner>,
    settings: GmresSettings,
    mut observer: Option<&mut dyn IterationObserver>,
) -> Result<SolveOutcome, NumError> {
    check_system(a, b, x0, settings.tolerance, settings.max_iterations)?;
    if settings.restart == 0 {
        return Err(NumError::invalid("restart length must be greater than zero"));
    }
    let n = b.len();
    let m = settings.restart.min(n);
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
    let mut w = DVector::zeros(n);
    let mut z = DVector::zeros(n);
    let mut total = 0usize;

    let (status, residual_norm) = loop {
        super::spmv(a, &x, &mut w);
        let r = b - &w;
        let beta = r.norm();
        if beta <= threshold {
            break (SolveStatus::Converged, beta);
        }
        if total >= settings.max_iterations {
            break (SolveStatus::MaxIterationsReached, beta);
        }

        let mut basis: Vec<DVector<f64>> = Vec::with_capacity(m + 1);
        basis.push(r / beta);
        let mut h = DMatrix::<f64>::zeros(m + 1, m);
        let mut cs = vec![0.0; m];
        let mut sn = vec![0.0; m];
        let mut g = DVector::<f64>::zeros(m + 1);
        g[0] = beta;
        let mut used = 0usize;
        let mut singular = false;

        for j in 0..m {
            if total >= settings.max_iterations {
                break;
            }

            preconditioner.apply(&basis[j], &mut z);
            super::spmv(a, &z, &mut w);

            // Modified Gram-Schmidt against the current basis.
            for (i, v) in basis.iter().enumerate() {
                let hij = w.dot(v);
                h[(i, j)] = hij;
                w.axpy(-hij, v, 1.0);
            }
            let next_norm = w.norm();
            h[(j + 1, j)] = next_norm;

            for i in 0..j {
                let upper = h[(i, j)];
                let lower = h[(i + 1, j)];
                h[(i, j)] = cs[i] * upper + sn[i] * lower;
                h[(i + 1, j)] = -sn[i] * upper + cs[i] * lower;
            }

            let diag = h[(j, j)];
            let sub = h[(j + 1, j)];
            let denom = diag.hypot(sub);
            if denom == 0.0 || !denom.is_finite() {
                singular = true;
                break;
            }
            cs[j] = diag / denom;
            sn[j] = sub / denom;
            h[(j, j)] = denom;
            h[(j + 1, j)] = 0.0;
            g[j + 1] = -sn[j] * g[j];
            g[j] = cs[j] * g[j];

            total += 1;
            used = j + 1;
            let estimate = g[j + 1].abs();
            if let Some(observer) = observer.as_deref_mut() {
                observer.on_iteration(total, estimate);
            }
            if estimate <= threshold || next_norm == 0.0 {
                break;
            }
            basis.push(&w / next_norm);
        }

        if used > 0 {
            // Back substitution on the rotated (upper triangular) Hessenberg block.
            let mut y = vec![0.0; used];
            for i in (0..used).rev() {
                let mut sum = g[i];
                for k in (i + 1)..used {
                    sum -= h[(i, k)] * y[k];
                }
                y[i] = sum / h[(i, i)];
            }
            let mut update = DVector::zeros(n);
            for (i, v) in basis.iter().take(used).enumerate() {
                update.axpy(y[i], v, 1.0);
            }
            preconditioner.apply(&update, &mut z);
            x += &z;
        }

        if singular {
            super::spmv(a, &x, &mut w);
            break (SolveStatus::Breakdown, (b - &w).norm());
        }
    };

    log::debug!(
        "GMRES({}) with {} preconditioner: {:?} after {} iterations (residual {:.3e})",
        settings.restart,
        preconditioner.name(),
        status,
        total,
        residual_norm
    );
    Ok(SolveOutcome {
        solution: x,
        iterations: total,
        residual_norm,
        status,
    })
}
