//! Explicit Euler on the logistic growth IVP y' = (1 - y/100) y, y(0) = 1,
//! compared with the exact solution for several step sizes.

use anyhow::{Context, Result};
use numlab_cli::report;
use numlab_core::sweep::{run_logistic_sweep, EulerSweepConfig, SweepRun};

fn main() -> Result<()> {
    let config = EulerSweepConfig::default();
    println!(
        "Logistic growth IVP on [0, {}]: explicit Euler vs. exact",
        config.t_end
    );
    println!("{}", report::sweep_header());

    let mut print_row = |run: &SweepRun| println!("{}", report::sweep_row(run));
    run_logistic_sweep(&config, Some(&mut print_row)).context("Logistic sweep failed.")?;
    Ok(())
}
