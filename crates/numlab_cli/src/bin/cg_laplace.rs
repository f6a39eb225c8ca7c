//! Conjugate Gradient on the 2D Laplace system A x = b with b = A x* for a
//! random x*, with and without incomplete-factorization preconditioning.
//! Prints the iteration counts and a sampled residual history per variant.

use anyhow::{Context, Result};
use numlab_cli::report;
use numlab_core::harness::{compare_cg, CgComparisonConfig};
use numlab_core::problems::{laplace_2d, manufactured_rhs, random_vector};

const GRID: usize = 100;
const SEED: u64 = 0;
const SAMPLES: usize = 12;

fn main() -> Result<()> {
    let a = laplace_2d(GRID)?;
    let x_true = random_vector(a.nrows(), SEED);
    let b = manufactured_rhs(&a, &x_true)?;

    println!("CG convergence (2D Laplacian, N={})", a.nrows());
    let report = compare_cg(&a, &b, &CgComparisonConfig::default())
        .context("CG comparison failed.")?;
    print!("{}", report::cg_summary(&report, SAMPLES));
    Ok(())
}
