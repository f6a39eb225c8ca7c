//! Solver comparisons: iteration counts across restart lengths and
//! preconditioners, and residual histories for convergence plots.
//!
//! A preconditioner that cannot be built is reported in `diagnostics` and the
//! comparison continues with the remaining variants.

use crate::linsolve::{
    build_preconditioner, conjugate_gradient, gmres, CgSettings, GmresSettings, Identity,
    IluSettings, IterationCounter, Preconditioner, PreconditionerOutcome, ResidualHistory,
    SolveStatus,
};
use anyhow::{bail, Context, Result};
use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmresComparisonConfig {
    pub restarts: Vec<usize>,
    pub tolerance: f64,
    pub max_iterations: usize,
    pub ilu: IluSettings,
}

impl Default for GmresComparisonConfig {
    fn default() -> Self {
        Self {
            restarts: vec![10, 20, 40, 80],
            tolerance: 1e-6,
            max_iterations: GmresSettings::default().max_iterations,
            ilu: IluSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmresRow {
    pub preconditioner: String,
    pub restart: usize,
    pub iterations: usize,
    pub status: SolveStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmresReport {
    pub problem: String,
    pub rows: Vec<GmresRow>,
    pub diagnostics: Vec<String>,
}

/// Runs GMRES for every restart length, first unpreconditioned and then with
/// ILU when it can be built.
pub fn compare_gmres(
    problem: &str,
    a: &CsrMatrix<f64>,
    b: &DVector<f64>,
    config: &GmresComparisonConfig,
) -> Result<GmresReport> {
    if config.restarts.is_empty() {
        bail!("GMRES comparison needs at least one restart length.");
    }

    let mut diagnostics = Vec::new();
    let outcome = build_preconditioner(a, config.ilu)
        .with_context(|| format!("ILU settings rejected for {problem}"))?;
    let mut candidates: Vec<&dyn Preconditioner> = Vec::new();
    candidates.push(&Identity);
    match &outcome {
        PreconditionerOutcome::Ready(ilu) => candidates.push(ilu),
        PreconditionerOutcome::Unavailable { reason } => {
            diagnostics.push(format!("ILU preconditioning failed: {reason}"));
        }
    }

    let mut rows = Vec::with_capacity(candidates.len() * config.restarts.len());
    for preconditioner in candidates {
        for &restart in &config.restarts {
            let settings = GmresSettings {
                restart,
                tolerance: config.tolerance,
                max_iterations: config.max_iterations,
            };
            let mut counter = IterationCounter::default();
            let solve = gmres(a, b, None, Some(preconditioner), settings, Some(&mut counter))
                .with_context(|| {
                    format!(
                        "GMRES({restart}) with {} preconditioner failed on {problem}",
                        preconditioner.name()
                    )
                })?;
            rows.push(GmresRow {
                preconditioner: preconditioner.name().to_string(),
                restart,
                iterations: counter.iterations,
                status: solve.status,
            });
        }
    }

    Ok(GmresReport {
        problem: problem.to_string(),
        rows,
        diagnostics,
    })
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CgComparisonConfig {
    pub cg: CgSettings,
    pub ilu: IluSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CgRun {
    pub label: String,
    pub iterations: usize,
    pub residual_norm: f64,
    pub status: SolveStatus,
    pub history: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CgReport {
    pub unpreconditioned: CgRun,
    /// `None` when the ILU factorization could not be built.
    pub preconditioned: Option<CgRun>,
    pub diagnostics: Vec<String>,
}

/// Runs CG without and with ILU preconditioning from a zero initial guess.
pub fn compare_cg(
    a: &CsrMatrix<f64>,
    b: &DVector<f64>,
    config: &CgComparisonConfig,
) -> Result<CgReport> {
    let unpreconditioned = run_cg(a, b, None, config.cg, "CG (no preconditioner)")?;

    let mut diagnostics = Vec::new();
    let outcome = build_preconditioner(a, config.ilu).context("ILU settings rejected")?;
    let preconditioned = match outcome {
        PreconditionerOutcome::Ready(ilu) => Some(run_cg(
            a,
            b,
            Some(&ilu),
            config.cg,
            "CG (incomplete LU)",
        )?),
        PreconditionerOutcome::Unavailable { reason } => {
            diagnostics.push(format!("Incomplete factorization preconditioning failed: {reason}"));
            None
        }
    };

    Ok(CgReport {
        unpreconditioned,
        preconditioned,
        diagnostics,
    })
}

fn run_cg(
    a: &CsrMatrix<f64>,
    b: &DVector<f64>,
    preconditioner: Option<&dyn Preconditioner>,
    settings: CgSettings,
    label: &str,
) -> Result<CgRun> {
    let x0 = DVector::zeros(b.len());
    let mut history = ResidualHistory::default();
    let outcome = conjugate_gradient(a, b, Some(&x0), preconditioner, settings, Some(&mut history))
        .with_context(|| format!("{label} failed"))?;
    Ok(CgRun {
        label: label.to_string(),
        iterations: outcome.iterations,
        residual_norm: outcome.residual_norm,
        status: outcome.status,
        history: history.norms,
    })
}
