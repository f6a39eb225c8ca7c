//! Symplectic Euler for the forced oscillator y'' + y = sin t, y(0) = 0, y'(0) = 1,
//! integrated as x' = v, v' = -x + sin t.

use anyhow::{Context, Result};
use numlab_cli::report;
use numlab_core::reference::{max_abs_error, sine_forced_position, sine_forced_velocity};
use numlab_core::sweep::{run_forced_oscillator, OscillatorConfig};
use numlab_core::symplectic::PhaseTrajectory;

const SAMPLES: usize = 21;

fn main() -> Result<()> {
    let config = OscillatorConfig::default();
    println!(
        "Forced oscillator, h = {}, t in [0, {}], update order {:?}",
        config.step, config.t_end, config.order
    );

    let mut print_table = |trajectory: &PhaseTrajectory| {
        print!(
            "{}",
            report::trajectory_table(trajectory, sine_forced_position, SAMPLES)
        );
    };
    let run = run_forced_oscillator(&config, f64::sin, Some(&mut print_table))
        .context("Oscillator integration failed.")?;

    let t = &run.trajectory.t;
    let exact_x: Vec<f64> = t.iter().map(|&t| sine_forced_position(t)).collect();
    let exact_v: Vec<f64> = t.iter().map(|&t| sine_forced_velocity(t)).collect();
    let error_x = max_abs_error(&run.trajectory.x, &exact_x)?;
    let error_v = max_abs_error(&run.trajectory.v, &exact_v)?;
    println!("max |x - x_exact| = {error_x:.4e}");
    println!("max |v - v_exact| = {error_v:.4e}");
    println!("energy ratio x^2 + v^2 (end / start) = {:.6}", run.energy_drift);
    Ok(())
}
