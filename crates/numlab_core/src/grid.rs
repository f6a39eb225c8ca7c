//! Fixed-step time grids.
//!
//! Grids are generated as `start + n * step` rather than by repeated addition,
//! so the spacing is uniform up to a single rounding per point.

use crate::error::NumError;

/// Relative tolerance used when checking that a grid is uniform.
const UNIFORM_RTOL: f64 = 1e-8;

/// Largest grid any builder will allocate.
pub const MAX_GRID_POINTS: usize = 1 << 30;

/// Number of points `0, step, 2 step, ...` that fit in `span`, counting both
/// ends when `span` lands on the grid.
pub fn point_count(span: f64, step: f64) -> Result<usize, NumError> {
    let intervals = (span / step + 1e-9).floor();
    if !intervals.is_finite() || intervals < 0.0 || intervals >= MAX_GRID_POINTS as f64 {
        return Err(NumError::invalid(format!(
            "grid with step {step} over a span of {span} exceeds {MAX_GRID_POINTS} points"
        )));
    }
    Ok(intervals as usize + 1)
}

fn allocate(count: usize) -> Result<Vec<f64>, NumError> {
    if count > MAX_GRID_POINTS {
        return Err(NumError::invalid(format!(
            "grid of {count} points exceeds {MAX_GRID_POINTS} points"
        )));
    }
    let mut points = Vec::new();
    points
        .try_reserve_exact(count)
        .map_err(|e| NumError::invalid(format!("cannot allocate a grid of {count} points: {e}")))?;
    Ok(points)
}

/// Builds `start, start + step, ...` up to and including `end` when `end`
/// lands on the grid.
pub fn arange(start: f64, end: f64, step: f64) -> Result<Vec<f64>, NumError> {
    if !(step.is_finite() && step > 0.0) {
        return Err(NumError::invalid(format!(
            "grid step must be positive and finite (got {step})"
        )));
    }
    if !(start.is_finite() && end.is_finite()) || end < start {
        return Err(NumError::invalid(format!(
            "grid bounds must be finite with end >= start (got [{start}, {end}])"
        )));
    }
    let count = point_count(end - start, step)?;
    let mut points = allocate(count)?;
    points.extend((0..count).map(|n| start + n as f64 * step));
    Ok(points)
}

/// Builds `count` evenly spaced points from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Result<Vec<f64>, NumError> {
    if count == 0 {
        return Err(NumError::invalid("linspace requires at least one point"));
    }
    if !(start.is_finite() && end.is_finite()) {
        return Err(NumError::invalid("grid bounds must be finite"));
    }
    if count == 1 {
        return Ok(vec![start]);
    }
    let step = (end - start) / (count - 1) as f64;
    let mut points = allocate(count)?;
    points.extend((0..count).map(|n| start + n as f64 * step));
    points[count - 1] = end;
    Ok(points)
}

/// Checks that `t` has at least two points and every step is positive.
pub fn validate(t: &[f64]) -> Result<(), NumError> {
    if t.len() < 2 {
        return Err(NumError::invalid(format!(
            "time grid needs at least 2 points (got {})",
            t.len()
        )));
    }
    for (n, pair) in t.windows(2).enumerate() {
        let h = pair[1] - pair[0];
        if !(h > 0.0) {
            return Err(NumError::invalid(format!(
                "time grid must be strictly increasing (step {} is {h})",
                n + 1
            )));
        }
    }
    Ok(())
}

/// Returns `t[1] - t[0]` after checking the grid is valid and uniform.
pub fn uniform_step(t: &[f64]) -> Result<f64, NumError> {
    validate(t)?;
    let h = t[1] - t[0];
    let tol = UNIFORM_RTOL * h.abs().max(t[t.len() - 1].abs()).max(1.0);
    for (n, pair) in t.windows(2).enumerate() {
        let h_n = pair[1] - pair[0];
        if (h_n - h).abs() > tol {
            return Err(NumError::invalid(format!(
                "time grid is not uniform (step {} is {h_n}, expected {h})",
                n + 1
            )));
        }
    }
    Ok(h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arange_includes_end_point_on_grid() {
        let t = arange(0.0, 10.0, 0.2).expect("grid should build");
        assert_eq!(t.len(), 51);
        assert_eq!(t[0], 0.0);
        assert!((t[50] - 10.0).abs() < 1e-12);

        let t = arange(0.0, 10.0, 0.01).expect("grid should build");
        assert_eq!(t.len(), 1001);
    }

    #[test]
    fn arange_rejects_bad_step() {
        assert!(arange(0.0, 1.0, 0.0).is_err());
        assert!(arange(0.0, 1.0, -0.1).is_err());
        assert!(arange(0.0, 1.0, f64::NAN).is_err());
        assert!(arange(1.0, 0.0, 0.1).is_err());
    }

    #[test]
    fn oversized_grids_are_rejected() {
        let err = arange(0.0, 1.0, 1e-300).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(format!("{err}").contains("exceeds"));
        assert!(arange(-1e308, 1e308, 1.0).unwrap_err().is_invalid_input());
        assert!(linspace(0.0, 1.0, usize::MAX).unwrap_err().is_invalid_input());
        assert!(point_count(1.0, 1e-300).is_err());
        assert_eq!(point_count(10.0, 0.01).expect("count"), 1001);
        assert_eq!(point_count(0.0, 0.5).expect("count"), 1);
    }

    #[test]
    fn linspace_hits_both_ends() {
        let t = linspace(0.0, 10.0, 1001).expect("grid should build");
        assert_eq!(t.len(), 1001);
        assert_eq!(t[0], 0.0);
        assert_eq!(t[1000], 10.0);
        assert!((uniform_step(&t).expect("uniform") - 0.01).abs() < 1e-12);
        assert_eq!(linspace(2.0, 3.0, 1).expect("single point"), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_err());
    }

    #[test]
    fn validate_requires_two_increasing_points() {
        assert!(validate(&[]).unwrap_err().is_invalid_input());
        assert!(validate(&[0.0]).unwrap_err().is_invalid_input());
        assert!(validate(&[0.0, 0.0]).is_err());
        assert!(validate(&[0.0, 1.0, 0.5]).is_err());
        assert!(validate(&[0.0, 0.5, 1.0]).is_ok());
    }

    #[test]
    fn uniform_step_rejects_ragged_grid() {
        assert!(uniform_step(&[0.0, 1.0, 3.0]).is_err());
        assert_eq!(uniform_step(&[0.0, 1.0, 2.0]).expect("uniform"), 1.0);
    }
}
