//! Restarted GMRES with and without ILU preconditioning on
//! - a 2D convection-diffusion system (unsymmetric)
//! - a large random unsymmetric diagonally dominant matrix
//!
//! Reports the iteration count for each restart length and preconditioner.

use anyhow::{Context, Result};
use numlab_cli::report;
use numlab_core::harness::{compare_gmres, GmresComparisonConfig};
use numlab_core::problems::{convection_diffusion_2d, ones, random_diagonally_dominant};

fn main() -> Result<()> {
    let problems = [
        (
            "Convection-Diffusion (50x50)",
            convection_diffusion_2d(50, 1.0, 50.0)?,
        ),
        (
            "Random DD Sparse (5000x5000)",
            random_diagonally_dominant(5000, 1e-3, 1, 2)?,
        ),
    ];
    let config = GmresComparisonConfig::default();

    for (name, a) in &problems {
        let b = ones(a.nrows());
        let report = compare_gmres(name, a, &b, &config)
            .with_context(|| format!("GMRES comparison failed for {name}"))?;
        print!("{}", report::gmres_table(&report));
    }
    Ok(())
}
