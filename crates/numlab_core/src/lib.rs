//! The `numlab_core` crate holds the numerical kernels behind the numlab demos.
//! Integrators are generic over `Scalar`; the sparse experiments work in `f64`.
//!
//! Key components:
//! - **Traits**: `Scalar` (numeric type abstraction), `DynamicalSystem` (vector fields), `Steppable` (one-step integrators).
//! - **Integrators**: explicit Euler and semi-implicit (symplectic) Euler over fixed time grids.
//! - **Reference**: closed-form solutions and error measures used to judge the integrators.
//! - **Linsolve**: CG, restarted GMRES and incomplete-LU preconditioning over CSR matrices.
//! - **Harness**: iteration-count and residual-history comparisons across solver settings.

pub mod error;
pub mod euler;
pub mod grid;
pub mod harness;
pub mod linsolve;
pub mod problems;
pub mod reference;
pub mod sweep;
pub mod symplectic;
pub mod traits;

pub use error::NumError;
