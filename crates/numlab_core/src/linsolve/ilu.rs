use super::Preconditioner;
use crate::error::NumError;
use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Threshold-dropping controls for the incomplete factorization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IluSettings {
    /// Entries below `drop_tolerance * ||A_i||_2` are discarded in row i.
    pub drop_tolerance: f64,
    /// Each of the L and U parts of row i keeps at most
    /// `ceil(fill_factor * nnz(A_i))` entries.
    pub fill_factor: f64,
}

impl Default for IluSettings {
    fn default() -> Self {
        Self {
            drop_tolerance: 1e-4,
            fill_factor: 10.0,
        }
    }
}

/// Threshold incomplete LU (ILUT): A ≈ L U with unit-diagonal L.
#[derive(Debug, Clone)]
pub struct IncompleteLu {
    /// Strictly lower part of L.
    lower: CsrMatrix<f64>,
    /// Strictly upper part of U.
    upper: CsrMatrix<f64>,
    diagonal: Vec<f64>,
}

impl IncompleteLu {
    pub fn factorize(a: &CsrMatrix<f64>, settings: IluSettings) -> Result<Self, NumError> {
        if a.nrows() != a.ncols() {
            return Err(NumError::PreconditionerConstruction(format!(
                "matrix must be square (got {}x{})",
                a.nrows(),
                a.ncols()
            )));
        }
        if !(settings.drop_tolerance.is_finite() && settings.drop_tolerance >= 0.0) {
            return Err(NumError::invalid(format!(
                "drop_tolerance must be non-negative (got {})",
                settings.drop_tolerance
            )));
        }
        if !(settings.fill_factor.is_finite() && settings.fill_factor > 0.0) {
            return Err(NumError::invalid(format!(
                "fill_factor must be positive (got {})",
                settings.fill_factor
            )));
        }

        let n = a.nrows();
        let mut lower_rows: Vec<Vec<(usize, f64)>> = Vec::with_capacity(n);
        let mut upper_rows: Vec<Vec<(usize, f64)>> = Vec::with_capacity(n);
        let mut diagonal: Vec<f64> = Vec::with_capacity(n);

        // Dense work row with a marker array so each row costs O(nnz).
        let mut work = vec![0.0; n];
        let mut touched = vec![false; n];
        let mut nonzeros: Vec<usize> = Vec::new();
        let mut pending: BTreeSet<usize> = BTreeSet::new();

        for i in 0..n {
            let row = a.row(i);
            let row_norm = row.values().iter().map(|v| v * v).sum::<f64>().sqrt();
            if row_norm == 0.0 || !row_norm.is_finite() {
                return Err(NumError::PreconditionerConstruction(format!(
                    "row {i} is empty or not finite"
                )));
            }
            let tau = settings.drop_tolerance * row_norm;
            let keep = (settings.fill_factor * row.nnz() as f64).ceil().max(1.0) as usize;

            for (&j, &value) in row.col_indices().iter().zip(row.values()) {
                if !touched[j] {
                    touched[j] = true;
                    nonzeros.push(j);
                    if j < i {
                        pending.insert(j);
                    }
                }
                work[j] += value;
            }

            // Eliminate with the rows above, in increasing column order.
            while let Some(k) = pending.pop_first() {
                let factor = work[k] / diagonal[k];
                if factor.abs() < tau {
                    work[k] = 0.0;
                    continue;
                }
                work[k] = factor;
                for &(j, u) in &upper_rows[k] {
                    if !touched[j] {
                        touched[j] = true;
                        nonzeros.push(j);
                        if j < i {
                            pending.insert(j);
                        }
                    }
                    work[j] -= factor * u;
                }
            }

            let pivot = work[i];
            let mut lower = Vec::new();
            let mut upper = Vec::new();
            for &j in &nonzeros {
                let value = work[j];
                if j == i || value == 0.0 || value.abs() < tau {
                    continue;
                }
                if j < i {
                    lower.push((j, value));
                } else {
                    upper.push((j, value));
                }
            }
            for &j in &nonzeros {
                work[j] = 0.0;
                touched[j] = false;
            }
            nonzeros.clear();

            if !pivot.is_finite() || pivot.abs() <= f64::EPSILON * row_norm {
                return Err(NumError::PreconditionerConstruction(format!(
                    "zero pivot in row {i}"
                )));
            }
            keep_largest(&mut lower, keep);
            keep_largest(&mut upper, keep);
            if lower.iter().chain(&upper).any(|(_, v)| !v.is_finite()) {
                return Err(NumError::PreconditionerConstruction(format!(
                    "non-finite factor entries in row {i}"
                )));
            }

            lower_rows.push(lower);
            upper_rows.push(upper);
            diagonal.push(pivot);
        }

        Ok(Self {
            lower: rows_to_csr(n, lower_rows)?,
            upper: rows_to_csr(n, upper_rows)?,
            diagonal,
        })
    }

    pub fn dimension(&self) -> usize {
        self.diagonal.len()
    }

    /// Stored entries of L and U together, counting the diagonal once.
    pub fn nnz(&self) -> usize {
        self.lower.nnz() + self.upper.nnz() + self.diagonal.len()
    }
}

impl Preconditioner for IncompleteLu {
    fn apply(&self, r: &DVector<f64>, z: &mut DVector<f64>) {
        z.copy_from(r);
        for (i, row) in self.lower.row_iter().enumerate() {
            let mut sum = z[i];
            for (&j, &l) in row.col_indices().iter().zip(row.values()) {
                sum -= l * z[j];
            }
            z[i] = sum;
        }
        for i in (0..self.diagonal.len()).rev() {
            let row = self.upper.row(i);
            let mut sum = z[i];
            for (&j, &u) in row.col_indices().iter().zip(row.values()) {
                sum -= u * z[j];
            }
            z[i] = sum / self.diagonal[i];
        }
    }

    fn name(&self) -> &str {
        "ILU"
    }
}

/// A built preconditioner, or the reason one could not be built.
#[derive(Debug, Clone)]
pub enum PreconditionerOutcome {
    Ready(IncompleteLu),
    Unavailable { reason: String },
}

impl PreconditionerOutcome {
    pub fn preconditioner(&self) -> Option<&IncompleteLu> {
        match self {
            PreconditionerOutcome::Ready(ilu) => Some(ilu),
            PreconditionerOutcome::Unavailable { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PreconditionerOutcome::Ready(_))
    }
}

/// Factorizes `a`, degrading to `Unavailable` when the factorization breaks
/// down. Invalid settings are still an error.
pub fn build_preconditioner(
    a: &CsrMatrix<f64>,
    settings: IluSettings,
) -> Result<PreconditionerOutcome, NumError> {
    match IncompleteLu::factorize(a, settings) {
        Ok(ilu) => {
            log::debug!(
                "ILU built: {} stored entries for a {}x{} matrix",
                ilu.nnz(),
                a.nrows(),
                a.ncols()
            );
            Ok(PreconditionerOutcome::Ready(ilu))
        }
        Err(err @ NumError::PreconditionerConstruction(_)) => {
            log::warn!("ILU preconditioner unavailable: {err}. Continuing without preconditioning.");
            Ok(PreconditionerOutcome::Unavailable {
                reason: err.to_string(),
            })
        }
        Err(err) => Err(err),
    }
}

fn keep_largest(entries: &mut Vec<(usize, f64)>, keep: usize) {
    if entries.len() > keep {
        entries.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        entries.truncate(keep);
    }
    entries.sort_by_key(|&(j, _)| j);
}

fn rows_to_csr(n: usize, rows: Vec<Vec<(usize, f64)>>) -> Result<CsrMatrix<f64>, NumError> {
    let mut offsets = Vec::with_capacity(n + 1);
    let mut indices = Vec::new();
    let mut values = Vec::new();
    offsets.push(0);
    for row in rows {
        for (j, v) in row {
            indices.push(j);
            values.push(v);
        }
        offsets.push(indices.len());
    }
    CsrMatrix::try_from_csr_data(n, n, offsets, indices, values)
        .map_err(|e| NumError::PreconditionerConstruction(format!("invalid factor layout: {e}")))
}
