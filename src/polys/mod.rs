//! This module contains the polynomial types used by the evaluation trees and commitments,
//! together with the roots of unity that serve as evaluation points.
use crate::{errors::AmtError, math::Math};
use ff::PrimeField;

pub mod univariate;
pub mod xnc;

/// Returns a primitive `2^log_order`-th root of unity of the scalar field.
///
/// # Errors
/// Returns `AmtError::RootOfUnityUnavailable` if `2^log_order` does not divide `p - 1`.
pub fn primitive_root_of_unity<Scalar: PrimeField>(log_order: usize) -> Result<Scalar, AmtError> {
  if log_order > Scalar::S as usize {
    return Err(AmtError::RootOfUnityUnavailable { log_order });
  }
  // ROOT_OF_UNITY has order 2^S; each squaring halves the order
  Ok(
    (log_order..Scalar::S as usize).fold(Scalar::ROOT_OF_UNITY, |root, _| root.square()),
  )
}

/// Returns the first `n` powers of a primitive `N`-th root of unity, `N = nextPow2(n)`.
///
/// # Errors
/// Returns `AmtError::RootOfUnityUnavailable` if the field has no such root.
pub fn roots_of_unity<Scalar: PrimeField>(n: usize) -> Result<Vec<Scalar>, AmtError> {
  if n == 0 {
    return Ok(Vec::new());
  }
  let omega = primitive_root_of_unity::<Scalar>(n.log_2())?;
  Ok(
    core::iter::successors(Some(Scalar::ONE), |w| Some(*w * omega))
      .take(n)
      .collect(),
  )
}
