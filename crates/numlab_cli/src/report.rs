use numlab_core::harness::{CgReport, CgRun, GmresReport};
use numlab_core::linsolve::SolveStatus;
use numlab_core::sweep::SweepRun;
use numlab_core::symplectic::PhaseTrajectory;

/// Evenly spread indices into a sequence of length `len`, always including
/// the first and last element.
pub fn sample_indices(len: usize, count: usize) -> Vec<usize> {
    if len == 0 || count == 0 {
        return Vec::new();
    }
    if count >= len {
        return (0..len).collect();
    }
    if count == 1 {
        return vec![0];
    }
    let mut indices: Vec<usize> = (0..count)
        .map(|k| k * (len - 1) / (count - 1))
        .collect();
    indices.dedup();
    indices
}

pub fn sweep_header() -> String {
    format!(
        "{:>8}  {:>7}  {:>14}  {:>14}  {:>12}\n{}",
        "h",
        "points",
        "y(T) euler",
        "y(T) exact",
        "max |error|",
        "-".repeat(63)
    )
}

pub fn sweep_row(run: &SweepRun) -> String {
    let last = run.t.len() - 1;
    format!(
        "{:>8}  {:>7}  {:>14.6}  {:>14.6}  {:>12.4e}",
        run.step_size,
        run.t.len(),
        run.numeric[last],
        run.exact[last],
        run.max_error
    )
}

/// Sampled t / x / v table with the closed-form position alongside.
pub fn trajectory_table(
    trajectory: &PhaseTrajectory,
    exact_position: impl Fn(f64) -> f64,
    samples: usize,
) -> String {
    let mut out = format!(
        "{:>8}  {:>12}  {:>12}  {:>12}\n{}\n",
        "t",
        "x",
        "v",
        "x exact",
        "-".repeat(50)
    );
    if trajectory.is_empty() {
        return out;
    }
    for n in sample_indices(trajectory.len(), samples) {
        let t = trajectory.t[n];
        out.push_str(&format!(
            "{:>8.3}  {:>12.6}  {:>12.6}  {:>12.6}\n",
            t,
            trajectory.x[n],
            trajectory.v[n],
            exact_position(t)
        ));
    }
    out
}

fn status_note(status: SolveStatus) -> &'static str {
    match status {
        SolveStatus::Converged => "",
        SolveStatus::MaxIterationsReached => "  (iteration cap)",
        SolveStatus::Breakdown => "  (breakdown)",
    }
}

fn diagnostic_lines(diagnostics: &[String]) -> String {
    diagnostics.iter().map(|message| format!("{message}\n")).collect()
}

pub fn gmres_table(report: &GmresReport) -> String {
    let mut out = format!("\n=== {} ===\n", report.problem);
    out.push_str(&diagnostic_lines(&report.diagnostics));
    out.push_str(&format!("{:>8}  {:>4}  {:>6}\n", "Precond", "m", "Iters"));
    out.push_str(&format!("{}\n", "-".repeat(24)));
    for row in &report.rows {
        out.push_str(&format!(
            "{:>8}  {:4}  {:6}{}\n",
            row.preconditioner,
            row.restart,
            row.iterations,
            status_note(row.status)
        ));
    }
    out
}

fn cg_run_summary(run: &CgRun, samples: usize) -> String {
    let mut out = format!(
        "{}: {} iterations, final residual {:.3e}{}\n",
        run.label,
        run.iterations,
        run.residual_norm,
        status_note(run.status)
    );
    for n in sample_indices(run.history.len(), samples) {
        out.push_str(&format!("  {:>6}  {:>12.4e}\n", n + 1, run.history[n]));
    }
    out
}

pub fn cg_summary(report: &CgReport, samples: usize) -> String {
    let mut out = cg_run_summary(&report.unpreconditioned, samples);
    match &report.preconditioned {
        Some(run) => out.push_str(&cg_run_summary(run, samples)),
        None => out.push_str(&diagnostic_lines(&report.diagnostics)),
    }
    out
}
