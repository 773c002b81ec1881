use std::borrow::Borrow;

use num_bigint::BigInt;

use crate::error::ShardError;
use crate::fraction::ExactFraction;
use crate::share::Share;

/// Performs Lagrange interpolation on a set of shares to find the value of the
/// unique polynomial of degree `points.len() - 1` through them at `x`.
///
/// Every term is kept as an [`ExactFraction`], so nothing is rounded. Accepts
/// owned shares or references to them.
///
/// # Errors
///
/// Returns [`ShardError::DegenerateInterpolation`] if two shares have the same
/// x-coordinate.
pub fn interpolate_at<S: Borrow<Share>>(
    points: &[S],
    x: &BigInt,
) -> Result<ExactFraction, ShardError> {
    let at = ExactFraction::of(x.clone());
    let mut value = ExactFraction::zero();

    for (i, a) in points.iter().map(|p| Borrow::<Share>::borrow(p)).enumerate() {
        let a_x = ExactFraction::of(a.x.clone());
        let mut top = ExactFraction::one();
        let mut bottom = ExactFraction::one();

        for (j, b) in points.iter().map(|p| Borrow::<Share>::borrow(p)).enumerate() {
            if i == j {
                continue;
            }
            if a.x == b.x {
                return Err(ShardError::DegenerateInterpolation { x: a.x.to_string() });
            }
            let b_x = ExactFraction::of(b.x.clone());
            top = &top * &(&at - &b_x);
            bottom = &bottom * &(&a_x - &b_x);
        }

        let weight = top.checked_div(&bottom)?;
        value = &value + &(&weight * &ExactFraction::of(a.y.clone()));
    }

    Ok(value)
}

/// Computes the constant term `f(0)` of the polynomial through `points`, which
/// is the shared secret when the points are uncorrupted shares.
///
/// `L_i(0) = Π_{j≠i} (0 − x_j) / (x_i − x_j)` and `f(0) = Σ y_i · L_i(0)`.
///
/// # Examples
///
/// ```rust
/// use shard_consensus::interpolate::lagrange_constant;
/// use shard_consensus::share::Share;
///
/// // f(x) = x^2 + 3
/// let shares = [Share::new(1, 4), Share::new(2, 7), Share::new(3, 12)];
/// assert_eq!(lagrange_constant(&shares).unwrap().to_string(), "3");
/// ```
pub fn lagrange_constant<S: Borrow<Share>>(points: &[S]) -> Result<ExactFraction, ShardError> {
    interpolate_at(points, &BigInt::from(0))
}
