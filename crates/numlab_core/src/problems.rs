//! Sparse test-problem generators for the solver experiments.

use crate::error::NumError;
use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

/// 2D Laplacian on an n x n grid: kron(I, K) + kron(K, I) with K = tridiag(-1, 2, -1).
pub fn laplace_2d(n: usize) -> Result<CsrMatrix<f64>, NumError> {
    if n == 0 {
        return Err(NumError::invalid("grid size must be positive"));
    }
    let size = n * n;
    let mut coo = CooMatrix::new(size, size);
    for block in 0..n {
        for j in 0..n {
            let row = block * n + j;
            coo.push(row, row, 4.0);
            if j > 0 {
                coo.push(row, row - 1, -1.0);
            }
            if j + 1 < n {
                coo.push(row, row + 1, -1.0);
            }
            if block > 0 {
                coo.push(row, row - n, -1.0);
            }
            if block + 1 < n {
                coo.push(row, row + n, -1.0);
            }
        }
    }
    Ok(CsrMatrix::from(&coo))
}

/// Unsymmetric five-point convection-diffusion stencil on an n x n grid.
///
/// East/west couplings carry the centered convection bias c / (2(n - 1)):
/// offset +1 is `-D - bias`, offset -1 is `-D + bias`. Couplings that would
/// wrap from the end of one grid row into the next are left out.
pub fn convection_diffusion_2d(
    n: usize,
    diffusion: f64,
    convection: f64,
) -> Result<CsrMatrix<f64>, NumError> {
    if n < 2 {
        return Err(NumError::invalid(format!(
            "convection-diffusion grid needs n >= 2 (got {n})"
        )));
    }
    let size = n * n;
    let bias = convection / (2.0 * (n - 1) as f64);
    let mut coo = CooMatrix::new(size, size);
    for row in 0..size {
        coo.push(row, row, 4.0 * diffusion);
        if row % n != 0 {
            coo.push(row, row - 1, -diffusion + bias);
        }
        if (row + 1) % n != 0 {
            coo.push(row, row + 1, -diffusion - bias);
        }
        if row >= n {
            coo.push(row, row - n, -diffusion);
        }
        if row + n < size {
            coo.push(row, row + n, -diffusion);
        }
    }
    Ok(CsrMatrix::from(&coo))
}

/// `R1 - R2 + 10 I` where R1 and R2 hold `round(density * size^2)` distinct,
/// uniformly placed entries drawn from [0, 1).
pub fn random_diagonally_dominant(
    size: usize,
    density: f64,
    seed1: u64,
    seed2: u64,
) -> Result<CsrMatrix<f64>, NumError> {
    if size == 0 {
        return Err(NumError::invalid("matrix size must be positive"));
    }
    if !(0.0..=1.0).contains(&density) {
        return Err(NumError::invalid(format!(
            "density must lie in [0, 1] (got {density})"
        )));
    }
    let entries = (density * size as f64 * size as f64).round() as usize;
    let mut coo = CooMatrix::new(size, size);
    for row in 0..size {
        coo.push(row, row, 10.0);
    }
    scatter_random(&mut coo, size, entries, seed1, 1.0);
    scatter_random(&mut coo, size, entries, seed2, -1.0);
    Ok(CsrMatrix::from(&coo))
}

fn scatter_random(coo: &mut CooMatrix<f64>, size: usize, entries: usize, seed: u64, sign: f64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut taken = HashSet::with_capacity(entries);
    while taken.len() < entries {
        let position = (rng.random_range(0..size), rng.random_range(0..size));
        if taken.insert(position) {
            let value: f64 = rng.random();
            coo.push(position.0, position.1, sign * value);
        }
    }
}

pub fn ones(n: usize) -> DVector<f64> {
    DVector::from_element(n, 1.0)
}

/// Right-hand side b = A x* for a chosen solution x*.
pub fn manufactured_rhs(a: &CsrMatrix<f64>, x_true: &DVector<f64>) -> Result<DVector<f64>, NumError> {
    if a.ncols() != x_true.len() {
        return Err(NumError::invalid(format!(
            "solution length {} does not match matrix columns {}",
            x_true.len(),
            a.ncols()
        )));
    }
    let mut b = DVector::zeros(a.nrows());
    crate::linsolve::spmv(a, x_true, &mut b);
    Ok(b)
}

/// Uniform [0, 1) vector from a seeded generator.
pub fn random_vector(n: usize, seed: u64) -> DVector<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    DVector::from_fn(n, |_, _| rng.random())
}
