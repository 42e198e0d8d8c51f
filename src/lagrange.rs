// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the amtvss project.
// See the LICENSE file in the project root for full license information.

//! Lagrange interpolation at zero over points that are roots of unity.
//!
//! For a subset $T$ of ids with points $x_i = \omega^i$, the coefficient of id $i$ is
//! $L_i(0) = N_i(0) / D_i$ where
//! - $Num(0) = \prod_{j \in T} (0 - \omega^j) = (-1)^{|T|} \omega^{\sum_{j \in T} j \bmod N}$,
//! - $N_i(0) = Num(0) / (0 - \omega^i) = -Num(0) \cdot \omega^{N - i}$,
//! - $D_i = \prod_{j \in T, j \ne i} (\omega^i - \omega^j)$.
//!
//! Only field multiplications and one batch inversion are needed.
use crate::errors::AmtError;
use ff::{BatchInvert, PrimeField};
use itertools::Itertools;

/// Returns $L_i(0)$ for every id in `subset`, in the order of `subset`.
///
/// `all_omegas` must hold every power $\omega^0, \ldots, \omega^{N-1}$ of a primitive $N$-th root.
///
/// # Errors
/// Returns `AmtError::InvalidSubset` if `subset` is empty, has repeated ids, or an id `>= N`.
pub fn lagrange_coefficients_at_zero<Scalar: PrimeField>(
  all_omegas: &[Scalar],
  subset: &[usize],
) -> Result<Vec<Scalar>, AmtError> {
  let n = all_omegas.len();
  if subset.is_empty() {
    return Err(AmtError::InvalidSubset {
      reason: "empty subset".to_string(),
    });
  }
  if let Some(id) = subset.iter().find(|id| **id >= n) {
    return Err(AmtError::InvalidSubset {
      reason: format!("id {id} is not below {n}"),
    });
  }
  if !subset.iter().all_unique() {
    return Err(AmtError::InvalidSubset {
      reason: "repeated id".to_string(),
    });
  }

  let exponent = subset.iter().fold(0usize, |acc, id| (acc + id) % n);
  let num0 = if subset.len() % 2 == 0 {
    all_omegas[exponent]
  } else {
    -all_omegas[exponent]
  };

  let mut denominators = subset
    .iter()
    .map(|i| {
      subset
        .iter()
        .filter(|j| *j != i)
        .fold(Scalar::ONE, |acc, j| acc * (all_omegas[*i] - all_omegas[*j]))
    })
    .collect::<Vec<_>>();
  denominators.iter_mut().batch_invert();

  Ok(
    subset
      .iter()
      .zip(denominators)
      .map(|(i, d_inv)| -num0 * all_omegas[(n - i) % n] * d_inv)
      .collect(),
  )
}

/// Interpolates $f(0)$ from `values[k]` $= f(\omega^{subset[k]})$.
///
/// # Errors
/// Returns `AmtError::InvalidInputLength` if `values` and `subset` differ in length, and the
/// errors of [`lagrange_coefficients_at_zero`].
pub fn interpolate_at_zero<Scalar: PrimeField>(
  all_omegas: &[Scalar],
  subset: &[usize],
  values: &[Scalar],
) -> Result<Scalar, AmtError> {
  if values.len() != subset.len() {
    return Err(AmtError::InvalidInputLength {
      expected: subset.len(),
      actual: values.len(),
    });
  }
  let coeffs = lagrange_coefficients_at_zero(all_omegas, subset)?;
  Ok(
    coeffs
      .iter()
      .zip(values)
      .fold(Scalar::ZERO, |acc, (l, v)| acc + *l * v),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    polys::{roots_of_unity, univariate::UniPoly},
    provider::bn254::bn254::Scalar as Fr,
  };
  use ff::Field;
  use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

  fn naive_coefficients(points: &[Fr]) -> Vec<Fr> {
    (0..points.len())
      .map(|i| {
        (0..points.len()).filter(|j| *j != i).fold(Fr::ONE, |acc, j| {
          acc * (-points[j]) * (points[i] - points[j]).invert().unwrap()
        })
      })
      .collect()
  }

  #[test]
  fn test_matches_naive() {
    let mut rng = StdRng::seed_from_u64(12);
    for n in [1usize, 2, 4, 8, 16] {
      let omegas = roots_of_unity::<Fr>(n).unwrap();
      for size in 1..=n {
        let mut ids: Vec<usize> = (0..n).collect();
        ids.shuffle(&mut rng);
        let subset = &ids[..size];

        let points: Vec<Fr> = subset.iter().map(|i| omegas[*i]).collect();
        assert_eq!(
          lagrange_coefficients_at_zero(&omegas, subset).unwrap(),
          naive_coefficients(&points)
        );
      }
    }
  }

  #[test]
  fn test_interpolate_recovers_constant_term() {
    let mut rng = StdRng::seed_from_u64(13);
    let (t, n) = (5, 16);
    let omegas = roots_of_unity::<Fr>(n).unwrap();
    let f = UniPoly::<Fr>::random(t, &mut rng);

    let subset = [1, 4, 7, 9, 15];
    let values: Vec<Fr> = subset.iter().map(|i| f.evaluate(&omegas[*i])).collect();
    assert_eq!(
      interpolate_at_zero(&omegas, &subset, &values).unwrap(),
      f.eval_at_zero()
    );

    // t - 1 points do not determine f(0)
    assert_ne!(
      interpolate_at_zero(&omegas, &subset[..4], &values[..4]).unwrap(),
      f.eval_at_zero()
    );
  }

  #[test]
  fn test_invalid_subsets() {
    let omegas = roots_of_unity::<Fr>(8).unwrap();
    assert!(matches!(
      lagrange_coefficients_at_zero(&omegas, &[]),
      Err(AmtError::InvalidSubset { .. })
    ));
    assert!(matches!(
      lagrange_coefficients_at_zero(&omegas, &[1, 8]),
      Err(AmtError::InvalidSubset { .. })
    ));
    assert!(matches!(
      lagrange_coefficients_at_zero(&omegas, &[3, 3]),
      Err(AmtError::InvalidSubset { .. })
    ));
    assert!(matches!(
      interpolate_at_zero(&omegas, &[1, 2], &[Fr::ONE]),
      Err(AmtError::InvalidInputLength { .. })
    ));
  }
}
