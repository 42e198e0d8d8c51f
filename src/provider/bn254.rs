// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the amtvss project.
// See the LICENSE file in the project root for full license information.

//! This module implements the `Engine` trait for BN254 (also known as BN256 or alt_bn128).
use crate::{errors::AmtError, provider::msm::msm, traits::Engine};
use halo2curves::{
  bn256::{Bn256, G1, G1Affine},
  group::Curve,
  pairing::Engine as PairingEngine,
};
use serde::{Deserialize, Serialize};

/// Re-exports that give access to the standard aliases used in the code base, for bn254
#[allow(clippy::module_inception)]
pub mod bn254 {
  pub use halo2curves::bn256::{
    Fr as Scalar, G1 as G1Point, G1Affine, G2 as G2Point, G2Affine, Gt as GtPoint,
  };
}

/// An implementation of the `Engine` trait with the BN254 pairing
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bn254Engine;

impl Engine for Bn254Engine {
  type Scalar = bn254::Scalar;
  type G1 = bn254::G1Point;
  type G1Affine = bn254::G1Affine;
  type G2 = bn254::G2Point;
  type Gt = bn254::GtPoint;

  fn batch_normalize_g1(points: &[G1]) -> Vec<G1Affine> {
    let mut affine = vec![G1Affine::default(); points.len()];
    G1::batch_normalize(points, &mut affine);
    affine
  }

  fn msm_g1(scalars: &[Self::Scalar], bases: &[G1Affine]) -> Result<G1, AmtError> {
    msm(scalars, bases, true)
  }

  fn pairing(p: &G1, q: &Self::G2) -> Self::Gt {
    Bn256::pairing(&p.to_affine(), &q.to_affine())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use ff::Field;
  use group::Group;
  use rand::{SeedableRng, rngs::StdRng};

  type E = Bn254Engine;

  #[test]
  fn test_pairing_is_bilinear() {
    let mut rng = StdRng::seed_from_u64(3);
    let a = bn254::Scalar::random(&mut rng);
    let b = bn254::Scalar::random(&mut rng);
    let g1 = <E as Engine>::G1::generator();
    let g2 = <E as Engine>::G2::generator();

    let gt = E::pairing(&g1, &g2);
    assert_eq!(E::pairing(&(g1 * a), &(g2 * b)), gt * (a * b));
    assert_eq!(E::pairing(&(g1 * a), &g2), E::pairing(&g1, &(g2 * a)));
    assert!(bool::from(
      E::pairing(&<E as Engine>::G1::identity(), &g2).is_identity()
    ));
  }

  #[test]
  fn test_batch_normalize_then_msm() {
    let mut rng = StdRng::seed_from_u64(4);
    let points: Vec<G1> = (0..5).map(|_| G1::random(&mut rng)).collect();
    let scalars: Vec<bn254::Scalar> = (0..5).map(|_| bn254::Scalar::random(&mut rng)).collect();
    let bases = E::batch_normalize_g1(&points);

    let expected = points
      .iter()
      .zip(scalars.iter())
      .fold(G1::identity(), |acc, (p, s)| acc + p * s);
    assert_eq!(E::msm_g1(&scalars, &bases).unwrap(), expected);
  }
}
