//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::{Float, PrimInt, Signed};

/// Return the euclidian norm of an integer difference vector, rounded to the nearest whole unit.
///
/// The squared length is accumulated in `i64` and the root taken in `f64`, which is exact for any
/// difference between two points on the playground.
pub fn int_norm(dx: i64, dy: i64) -> u32 {
    let sq = dx * dx + dy * dy;
    (sq as f64).sqrt().round() as u32
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Wrap an angle in radians into the range [-pi, pi).
pub fn wrap_pi<T>(angle_rad: T) -> T
where
    T: Float,
{
    let pi_t = T::from(std::f64::consts::PI).unwrap_or_else(T::zero);
    rem_euclid(angle_rad + pi_t, pi_t + pi_t) - pi_t
}

/// Wrap an integer angle in degrees into the range (-180, 180].
pub fn wrap_deg<T>(angle_deg: T) -> T
where
    T: PrimInt + Signed,
{
    let full = T::from(360).unwrap_or_else(T::zero);
    let half = T::from(180).unwrap_or_else(T::zero);

    let mut a = angle_deg % full;
    if a <= -half {
        a = a + full;
    }
    if a > half {
        a = a - full;
    }
    a
}
