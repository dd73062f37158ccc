//! Compile-time limits.
//!
//! These values bound the work done by closed-form evaluations. They rarely
//! need adjustment.

/// Highest moment order evaluated in closed form for distributions with
/// infinite support.
///
/// Poisson moments are computed through Touchard polynomials, whose Stirling
/// number coefficients grow super-exponentially; past this order the
/// result is reported as unsupported rather than returned inaccurate.
pub const MAX_MOMENT_ORDER: u32 = 64;

/// Largest number of support points a closed-form distribution will
/// tabulate into a [`FiniteDiscrete`](crate::distributions::FiniteDiscrete).
pub const MAX_TABULATED_SUPPORT: u64 = 1 << 24;

/// Weight given to every value when a finite distribution is built from a
/// plain value list.
pub const UNIFORM_WEIGHT: f64 = 1.0;
