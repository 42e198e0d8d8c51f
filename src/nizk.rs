// Copyright (c) Microsoft Corporation.
// SPDX-License-Identifier: MIT
// This file is part of the amtvss project.
// See the LICENSE file in the project root for full license information.

//! A non-interactive Schnorr proof of knowledge of a discrete logarithm.
//!
//! In DKG mode every dealer publishes $g^{f(0)}$ together with a `NizkPok` so that the
//! public key cannot be biased by a dealer who does not know its own secret.
use crate::traits::Engine;
use digest::{ExtendableOutput, Update, XofReader};
use ff::{Field, FromUniformBytes};
use group::GroupEncoding;
use rand_core::RngCore;
use serde::{Deserialize, Serialize};
use sha3::Shake256;

const DOMAIN_LABEL: &[u8] = b"amtvss_nizk_pok";

/// A proof of knowledge of $x$ such that $y = g^x$
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct NizkPok<E: Engine> {
  challenge: E::Scalar,
  response: E::Scalar,
}

/// Fiat-Shamir challenge $H(g, y, r)$
fn challenge<E: Engine>(g: &E::G1, y: &E::G1, r: &E::G1) -> E::Scalar {
  let mut shake = Shake256::default();
  shake.update(DOMAIN_LABEL);
  for point in [g, y, r] {
    shake.update(point.to_bytes().as_ref());
  }

  let mut uniform_bytes = [0u8; 64];
  shake.finalize_xof().read(&mut uniform_bytes);
  E::Scalar::from_uniform_bytes(&uniform_bytes)
}

impl<E: Engine> NizkPok<E> {
  /// Proves knowledge of `x` with `y = g * x`
  pub fn prove<R: RngCore + ?Sized>(g: &E::G1, x: &E::Scalar, y: &E::G1, rng: &mut R) -> Self {
    let k = E::Scalar::random(&mut *rng);
    let r = *g * k;
    let challenge = challenge::<E>(g, y, &r);
    Self {
      challenge,
      response: k - challenge * x,
    }
  }

  /// Checks that the prover knows the discrete log of `y` to the base `g`
  pub fn verify(&self, g: &E::G1, y: &E::G1) -> bool {
    // g^s y^h = g^{k - hx} g^{xh} = g^k
    let r = *g * self.response + *y * self.challenge;
    challenge::<E>(g, y, &r) == self.challenge
  }
}
